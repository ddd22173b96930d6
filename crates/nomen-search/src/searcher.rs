//! Staged candidate search and the single-shot lookup API.
//!
//! A name is tried against the taxonomic index in stages: the exact name,
//! then the parsed phrase-name fields, then the canonical name, and finally
//! the phonetic codes when fuzzy matching is allowed. The first stage with a
//! hit wins. Hits from the exact and canonical stages are scored and passed
//! through the [`ConflictResolver`](crate::conflict::ConflictResolver).
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use nomen_core::{MatchType, RankType, TaxonConcept};
//! use nomen_search::memory_index::{MemoryHomonymIndex, MemoryTaxonIndex};
//! use nomen_search::{NameSearcher, SearchRequest};
//!
//! let index = MemoryTaxonIndex::new(vec![TaxonConcept {
//!     id: "1".to_string(),
//!     lsid: Some("urn:lsid:test:1".to_string()),
//!     scientific_name: "Osphranter rufus".to_string(),
//!     rank: Some(RankType::Species),
//!     ..Default::default()
//! }])
//! .unwrap();
//! let searcher = NameSearcher::builder(Arc::new(index), Arc::new(MemoryHomonymIndex::default()))
//!     .build()
//!     .unwrap();
//!
//! let results = SearchRequest::new("Osphranter rufus")
//!     .execute(&searcher)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(results[0].match_type, MatchType::Exact);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use nomen_core::defaults::VERNACULAR_LOOKUP_LIMIT;
use nomen_core::{
    Classification, HomonymIndex, IndexQuery, MatchResult, MatchType, NameParser, NameType,
    ParsedName, RankType, Result, TaxonIndex, VernacularIndex,
};

use crate::config::SearchConfig;
use crate::conflict::ConflictResolver;
use crate::failure::{GenericReason, SearchFailure, SearchResult};
use crate::homonym;
use crate::parser::{is_rank_marker, PhraseNameParser};
use crate::query::{
    cultivar_query, name_query, normalize_common_name, phrase_query, soundex_query,
};
use crate::scoring::MatchScorer;
use crate::soundex::{treat_word, WordKind};

/// Words that mark a virus name but never appear in the indexed name.
static VIRUS_STOP_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" virus| ictv| ICTV").expect("valid virus stop word regex"));

// =============================================================================
// REQUEST
// =============================================================================

/// Parameters of one candidate search.
///
/// Unset limits and flags fall back to the searcher's [`SearchConfig`].
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub name: Option<String>,
    pub rank: Option<RankType>,
    pub classification: Option<Classification>,
    pub max_results: Option<usize>,
    pub fuzzy: Option<bool>,
    /// Accept a homonym failure that carries exactly one result
    pub ignore_homonym: bool,
}

impl SearchRequest {
    /// Create a new request for a scientific name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Restrict matches to a rank.
    pub fn with_rank(mut self, rank: RankType) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Supply the higher classification used for scoring and homonyms.
    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }

    /// Set the number of candidates retrieved per stage.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Enable or disable the phonetic stage.
    pub fn with_fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = Some(fuzzy);
        self
    }

    pub fn with_ignore_homonym(mut self, ignore_homonym: bool) -> Self {
        self.ignore_homonym = ignore_homonym;
        self
    }

    /// Run the request against a searcher.
    pub fn execute(&self, searcher: &NameSearcher) -> SearchResult<Option<Vec<MatchResult>>> {
        searcher.search_for_records(self)
    }
}

// =============================================================================
// SEARCHER
// =============================================================================

/// Resolves names against a shared, read-only set of indices.
///
/// A searcher holds no per-call state and can be shared across threads.
pub struct NameSearcher {
    index: Arc<dyn TaxonIndex>,
    homonyms: Arc<dyn HomonymIndex>,
    vernacular: Option<Arc<dyn VernacularIndex>>,
    parser: Arc<dyn NameParser>,
    config: SearchConfig,
    scorer: MatchScorer,
    cross_rank_homonyms: HashSet<String>,
}

/// Builder for [`NameSearcher`].
pub struct NameSearcherBuilder {
    index: Arc<dyn TaxonIndex>,
    homonyms: Arc<dyn HomonymIndex>,
    vernacular: Option<Arc<dyn VernacularIndex>>,
    parser: Arc<dyn NameParser>,
    config: SearchConfig,
    cross_rank_homonyms: HashSet<String>,
}

impl NameSearcherBuilder {
    pub fn with_vernacular_index(mut self, vernacular: Arc<dyn VernacularIndex>) -> Self {
        self.vernacular = Some(vernacular);
        self
    }

    /// Replace the default [`PhraseNameParser`].
    pub fn with_parser(mut self, parser: Arc<dyn NameParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Names valid at two ranks at once. A match on one of them without a
    /// rank hint is reported as a homonym.
    pub fn with_cross_rank_homonyms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.cross_rank_homonyms
            .extend(names.into_iter().map(|n| n.as_ref().trim().to_lowercase()));
        self
    }

    /// Validates the configuration and builds the searcher.
    pub fn build(self) -> Result<NameSearcher> {
        self.config.validate()?;
        info!(
            subsystem = "search",
            component = "searcher",
            max_results = self.config.max_results,
            score_threshold = self.config.score_threshold,
            cross_rank_homonyms = self.cross_rank_homonyms.len(),
            vernacular = self.vernacular.is_some(),
            "Name searcher constructed"
        );
        Ok(NameSearcher {
            scorer: MatchScorer::new(self.config.score_threshold),
            index: self.index,
            homonyms: self.homonyms,
            vernacular: self.vernacular,
            parser: self.parser,
            config: self.config,
            cross_rank_homonyms: self.cross_rank_homonyms,
        })
    }
}

impl NameSearcher {
    pub fn builder(index: Arc<dyn TaxonIndex>, homonyms: Arc<dyn HomonymIndex>) -> NameSearcherBuilder {
        NameSearcherBuilder {
            index,
            homonyms,
            vernacular: None,
            parser: Arc::new(PhraseNameParser::new()),
            config: SearchConfig::default(),
            cross_rank_homonyms: HashSet::new(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub(crate) fn parser(&self) -> &dyn NameParser {
        self.parser.as_ref()
    }

    fn resolver(&self) -> ConflictResolver<'_> {
        ConflictResolver {
            index: self.index.as_ref(),
            homonyms: self.homonyms.as_ref(),
            parser: self.parser.as_ref(),
            cross_rank_homonyms: &self.cross_rank_homonyms,
            author_similarity: self.config.author_similarity,
        }
    }

    // =========================================================================
    // CANDIDATE SEARCH
    // =========================================================================

    /// Ranked candidates for a name.
    ///
    /// Returns `Ok(None)` when the index has not been opened, and an empty
    /// list when no stage found anything.
    #[instrument(skip(self, request), fields(
        subsystem = "search",
        component = "candidate_search",
        op = "search",
        query = ?request.name,
        rank = ?request.rank,
    ))]
    pub fn search_for_records(&self, request: &SearchRequest) -> SearchResult<Option<Vec<MatchResult>>> {
        let Some(raw) = request.name.as_deref().filter(|n| !n.trim().is_empty()) else {
            return Err(SearchFailure::Generic(GenericReason::NullName));
        };
        if is_rank_marker(raw) {
            return Err(SearchFailure::Generic(GenericReason::RankMarker));
        }
        let name = VIRUS_STOP_WORDS.replace_all(raw, " ").trim().to_string();
        if name.contains("spp.") {
            return Err(SearchFailure::Generic(GenericReason::SubsetOfSpecies));
        }

        match self.staged_search(&name, request) {
            Err(SearchFailure::Homonym { results, .. })
                if request.ignore_homonym && results.len() == 1 =>
            {
                debug!("Ignoring homonym with a single result");
                Ok(Some(results))
            }
            other => other,
        }
    }

    fn staged_search(&self, name: &str, request: &SearchRequest) -> SearchResult<Option<Vec<MatchResult>>> {
        if !self.index.is_ready() {
            debug!("Taxonomic index not ready");
            return Ok(None);
        }
        let rank = request.rank;
        let cl = request.classification.as_ref();
        let limit = request.max_results.unwrap_or(self.config.max_results);
        let fuzzy = request.fuzzy.unwrap_or(self.config.fuzzy);

        let parsed = match self.parser.parse(name) {
            Ok(pn) => Some(pn),
            Err(e) => {
                warn!(query = %name, name_type = %e.name_type, error = %e, "Unable to parse name");
                None
            }
        };

        let hits = self.checked_search(&name_query(name, rank, cl, limit), MatchType::Exact, cl, rank)?;
        if !hits.is_empty() {
            return Ok(Some(hits));
        }

        let Some(pn) = parsed else {
            return Ok(Some(Vec::new()));
        };

        if let Some(phrase) = &pn.phrase {
            let hits = self.fetch(&phrase_query(phrase, limit), MatchType::Phrase)?;
            match hits.len() {
                0 => {}
                1 => return Ok(Some(hits)),
                _ => {
                    return match self.common_accepted(&hits)? {
                        Some(accepted) => Ok(Some(vec![accepted])),
                        None => Err(SearchFailure::homonym(
                            format!("Phrase name {} matches several concepts", name),
                            hits,
                        )),
                    };
                }
            }
        } else if pn.authors_parsed {
            if let Some(hits) = self.canonical_stage(&pn, rank, cl, limit)? {
                return Ok(Some(hits));
            }
        }

        if fuzzy && pn.is_binomial() && !matches!(pn.name_type, NameType::Informal | NameType::Doubtful) {
            if let Some(query) = Self::phonetic_query(&pn, rank, cl, limit) {
                let hits = self.fetch(&query, MatchType::Soundex)?;
                if !hits.is_empty() {
                    return Ok(Some(self.scorer.rank(cl, hits)));
                }
            }
        }

        debug!(query = %name, "No stage matched");
        Ok(Some(Vec::new()))
    }

    /// Canonical name match, with a phrase-style retry for cultivars.
    fn canonical_stage(
        &self,
        pn: &ParsedName,
        rank: Option<RankType>,
        cl: Option<&Classification>,
        limit: usize,
    ) -> SearchResult<Option<Vec<MatchResult>>> {
        let Some(canonical) = pn.canonical_name() else {
            return Ok(None);
        };
        let mut query_cl = cl.cloned().unwrap_or_default();
        if query_cl.authorship().is_none() {
            query_cl.authorship = pn.authorship.clone();
        }
        let hits = self.checked_search(
            &name_query(&canonical, rank, Some(&query_cl), limit),
            MatchType::Canonical,
            Some(&query_cl),
            rank,
        )?;
        if !hits.is_empty() {
            return Ok(Some(hits));
        }

        if pn.name_type == NameType::Cultivar {
            if let (Some(genus), Some(cultivar)) = (&pn.genus_or_above, &pn.cultivar) {
                let hits = self.fetch(&cultivar_query(genus, cultivar, limit), MatchType::Phrase)?;
                if !hits.is_empty() {
                    return Ok(Some(self.scorer.rank(cl, hits)));
                }
            }
        }
        Ok(None)
    }

    fn phonetic_query(
        pn: &ParsedName,
        rank: Option<RankType>,
        cl: Option<&Classification>,
        limit: usize,
    ) -> Option<IndexQuery> {
        let genus = treat_word(pn.genus_or_above.as_deref()?, WordKind::Genus)?;
        let species = treat_word(pn.specific_epithet.as_deref()?, WordKind::Species)?;
        let infra = pn
            .infraspecific_epithet
            .as_deref()
            .and_then(|infra| treat_word(infra, WordKind::Species));
        Some(soundex_query(&genus, &species, infra.as_deref(), rank, cl, limit))
    }

    fn fetch(&self, query: &IndexQuery, match_type: MatchType) -> SearchResult<Vec<MatchResult>> {
        let hits = self.index.search(query)?;
        debug!(
            index_query = %query,
            match_type = %match_type,
            result_count = hits.len(),
            "Index search"
        );
        Ok(hits
            .into_iter()
            .map(|hit| MatchResult::new(hit.concept, match_type))
            .collect())
    }

    /// Fetches, scores and runs the conflict checks.
    fn checked_search(
        &self,
        query: &IndexQuery,
        match_type: MatchType,
        cl: Option<&Classification>,
        rank: Option<RankType>,
    ) -> SearchResult<Vec<MatchResult>> {
        let hits = self.fetch(query, match_type)?;
        if hits.is_empty() {
            return Ok(hits);
        }
        let ranked = self.scorer.rank(cl, hits);
        self.resolver().check(ranked, cl, rank)
    }

    /// The accepted concept shared by every hit, if there is one.
    fn common_accepted(&self, hits: &[MatchResult]) -> SearchResult<Option<MatchResult>> {
        let Some(first) = hits.first() else {
            return Ok(None);
        };
        let accepted = first.concept.accepted_stable_id();
        if hits.iter().any(|h| h.concept.accepted_stable_id() != accepted) {
            return Ok(None);
        }
        Ok(self
            .index
            .get_by_lsid(accepted)?
            .map(|concept| MatchResult::new(concept, MatchType::Phrase)))
    }

    // =========================================================================
    // SINGLE-SHOT LOOKUPS
    // =========================================================================

    /// Top candidate for a name. Typed failures are returned to the caller.
    pub fn search_for_record(&self, request: &SearchRequest) -> SearchResult<Option<MatchResult>> {
        Ok(self
            .search_for_records(request)?
            .and_then(|results| results.into_iter().next()))
    }

    /// Stable identifier of the top candidate: the accepted concept's
    /// identifier when the match is a synonym.
    pub fn search_for_lsid(&self, request: &SearchRequest) -> SearchResult<Option<String>> {
        Ok(self
            .search_for_record(request)?
            .map(|result| result.concept.accepted_stable_id().to_string()))
    }

    pub fn search_for_record_by_id(&self, id: &str) -> Result<Option<MatchResult>> {
        Ok(self
            .index
            .get_by_id(id)?
            .map(|concept| MatchResult::new(concept, MatchType::TaxonId)))
    }

    pub fn search_for_record_by_lsid(&self, lsid: &str) -> Result<Option<MatchResult>> {
        Ok(self
            .index
            .get_by_lsid(lsid)?
            .map(|concept| MatchResult::new(concept, MatchType::TaxonId)))
    }

    /// Accepted identifier of the record with the given internal id.
    pub fn search_for_lsid_by_id(&self, id: &str) -> Result<Option<String>> {
        Ok(self
            .search_for_record_by_id(id)?
            .map(|result| result.concept.accepted_stable_id().to_string()))
    }

    /// Most general classification level that disambiguates the genus (or
    /// species) of `cl`. `Ok(None)` means the name is not a homonym.
    pub fn resolve_homonym(&self, cl: &Classification, rank: RankType) -> SearchResult<Option<RankType>> {
        homonym::resolve_homonym(self.homonyms.as_ref(), cl, rank)
    }

    /// Accepted record for a classification, with typed failures replaced
    /// by the best result they carry. Never fails: index errors are logged
    /// and yield `None`.
    pub fn search_for_accepted_record_default_handling(
        &self,
        cl: &Classification,
        fuzzy: bool,
        ignore_homonym: bool,
    ) -> Option<MatchResult> {
        let request = SearchRequest {
            name: cl.scientific_name.clone(),
            classification: Some(cl.clone()),
            fuzzy: Some(fuzzy),
            ignore_homonym,
            ..Default::default()
        };
        let result = match self.search_for_record(&request) {
            Ok(result) => result,
            Err(failure) => {
                debug!(
                    error_type = %failure.error_type(),
                    error = %failure,
                    "Using best result of failed search"
                );
                failure.best_result().cloned()
            }
        };

        match result {
            Some(result) if result.is_synonym() => {
                match self.search_for_record_by_lsid(result.concept.accepted_stable_id()) {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(lsid = %result.concept.accepted_stable_id(), error = %e, "Accepted record lookup failed");
                        None
                    }
                }
            }
            other => other,
        }
    }

    // =========================================================================
    // VERNACULAR NAMES
    // =========================================================================

    /// Primary identifier for a common name.
    ///
    /// When several records carry the common name, they must all agree on
    /// the canonical scientific name; otherwise the name is ambiguous and
    /// `None` is returned.
    #[instrument(skip(self), fields(subsystem = "search", component = "vernacular", op = "search_common_name"))]
    pub fn search_for_lsid_common_name(&self, name: &str) -> Result<Option<String>> {
        let Some(vernacular) = &self.vernacular else {
            debug!("No vernacular index configured");
            return Ok(None);
        };
        let normalized = normalize_common_name(name);
        if normalized.is_empty() {
            return Ok(None);
        }
        let hits = vernacular.search(&normalized, VERNACULAR_LOOKUP_LIMIT)?;
        debug!(result_count = hits.len(), "Vernacular lookup");
        let Some(first) = hits.first() else {
            return Ok(None);
        };
        let Some(canonical) = self.canonical_of(&first.scientific_name) else {
            return Ok(None);
        };
        for hit in &hits[1..] {
            if self.canonical_of(&hit.scientific_name).as_deref() != Some(canonical.as_str()) {
                debug!(first = %first.scientific_name, other = %hit.scientific_name, "Common name is ambiguous");
                return Ok(None);
            }
        }
        Ok(Some(
            self.index
                .primary_lsid(&first.lsid)?
                .unwrap_or_else(|| first.lsid.clone()),
        ))
    }

    /// Record for a common name, tagged as a vernacular match.
    pub fn search_for_common_name(&self, name: &str) -> Result<Option<MatchResult>> {
        let Some(lsid) = self.search_for_lsid_common_name(name)? else {
            return Ok(None);
        };
        Ok(self
            .search_for_record_by_lsid(&lsid)?
            .map(|result| result.with_match_type(MatchType::Vernacular)))
    }

    fn canonical_of(&self, name: &str) -> Option<String> {
        self.parser.parse(name).ok().and_then(|pn| pn.canonical_name())
    }
}
