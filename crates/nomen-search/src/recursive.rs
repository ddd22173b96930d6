//! Recursive fallback matching with issue metrics.
//!
//! [`NameSearcher::search_for_record_metrics`] never fails. Every typed
//! failure met along the way becomes an [`ErrorType`] flag, and the result
//! it carries is used as the best available match. When nothing matches and
//! recursive matching is on, the query is widened one step at a time: the
//! species part of the name, the genus part, the species from the
//! classification, then each higher classification level from genus up to
//! kingdom.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

use nomen_core::{
    is_infraspecific_marker, is_specific_marker, Classification, ErrorType, MatchResult, MatchType,
    NameType, RankType,
};

use crate::failure::{GenericReason, SearchFailure, SearchResult};
use crate::searcher::{NameSearcher, SearchRequest};

static CONFER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\x00-\x7F\s]* cf[#!?\\. ][\x00-\x7F\s]*$").expect("valid confer regex"));

static AFFINITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\x00-\x7F\s]* aff[#!?\\. ][\x00-\x7F\s]*$").expect("valid affinity regex"));

/// Levels tried, in order, once the name itself has failed.
const WIDENING_LEVELS: [RankType; 6] = [
    RankType::Genus,
    RankType::Family,
    RankType::Order,
    RankType::Class,
    RankType::Phylum,
    RankType::Kingdom,
];

/// Levels a supplied name is compared with to infer its rank.
const NAMED_LEVELS: [RankType; 8] = [
    RankType::Subspecies,
    RankType::Species,
    RankType::Genus,
    RankType::Family,
    RankType::Order,
    RankType::Class,
    RankType::Phylum,
    RankType::Kingdom,
];

/// Outcome of a metrics search.
#[derive(Debug, Default)]
pub struct MetricsResult {
    /// Best available match, if any
    pub result: Option<MatchResult>,
    /// Issues raised along the way; holds `ErrorType::None` when clean
    pub errors: BTreeSet<ErrorType>,
    /// The last typed failure, for callers that need its detail
    pub last_failure: Option<SearchFailure>,
    pub name_type: Option<NameType>,
}

impl MetricsResult {
    fn record(&mut self, failure: SearchFailure) -> Option<MatchResult> {
        let error_type = failure.error_type();
        debug!(error_type = %error_type, error = %failure, "Search failure recorded");
        self.errors.insert(error_type);
        let best = failure.best_result().cloned();
        self.last_failure = Some(failure);
        best
    }
}

/// Search options shared by every attempt of one metrics search.
#[derive(Debug, Clone, Copy)]
struct Attempt {
    fuzzy: bool,
    ignore_homonym: bool,
}

/// Builds a name and rank from the most specific populated level. A level
/// that cannot form a name on its own falls through to the next one.
fn derive_name(cl: &Classification) -> (Option<String>, Option<RankType>) {
    let genus = cl.get(RankType::Genus);
    let specific = cl.specific_epithet().filter(|s| !is_specific_marker(s));

    if let Some(infra) = cl.infraspecific_epithet().filter(|s| !is_infraspecific_marker(s)) {
        if let (Some(genus), Some(specific)) = (genus, specific) {
            return (Some(format!("{} {} {}", genus, specific, infra)), Some(RankType::Subspecies));
        }
    }
    if let Some(subspecies) = cl.get(RankType::Subspecies).filter(|s| !is_infraspecific_marker(s)) {
        return (Some(subspecies.to_string()), Some(RankType::Subspecies));
    }
    if let (Some(genus), Some(specific)) = (genus, specific) {
        return (Some(format!("{} {}", genus, specific)), Some(RankType::Species));
    }
    if let Some(species) = cl
        .get(RankType::Species)
        .filter(|s| !is_specific_marker(s) && s.trim().contains(' '))
    {
        return (Some(species.to_string()), Some(RankType::Species));
    }
    for level in WIDENING_LEVELS {
        if let Some(value) = cl.get(level) {
            return (Some(value.to_string()), Some(level));
        }
    }
    (None, None)
}

fn check_other_issues(original: &str, metrics: &mut MetricsResult) {
    if original.contains('?') {
        metrics.errors.insert(ErrorType::QuestionSpecies);
        metrics.name_type = Some(NameType::Doubtful);
    }
    if CONFER.is_match(original) {
        metrics.errors.insert(ErrorType::ConferSpecies);
    }
    if AFFINITY.is_match(original) {
        metrics.errors.insert(ErrorType::AffinitySpecies);
    }
}

impl NameSearcher {
    /// Resolves a classification to its best match, collecting issue flags
    /// instead of failing.
    ///
    /// When the classification carries no scientific name, one is built from
    /// its most specific level. With `recursive` set, an unmatched name is
    /// widened up the classification and any match found that way is tagged
    /// [`MatchType::Recursive`].
    #[instrument(skip(self, cl), fields(
        subsystem = "search",
        component = "recursive",
        op = "resolve",
        query = ?cl.scientific_name(),
    ))]
    pub fn search_for_record_metrics(
        &self,
        cl: &Classification,
        recursive: bool,
        fuzzy: bool,
        ignore_homonym: bool,
    ) -> MetricsResult {
        let mut metrics = MetricsResult::default();
        let attempt = Attempt { fuzzy, ignore_homonym };
        let mut query = cl.clone();

        let (original, name, rank) = match cl.scientific_name() {
            Some(supplied) => {
                let (name, rank) = self.infer_rank(supplied, &mut query, recursive, &mut metrics);
                (Some(supplied.to_string()), Some(name), rank)
            }
            None => {
                let (name, rank) = derive_name(&query);
                (name.clone(), name, rank)
            }
        };

        let mut result = match name.as_deref() {
            Some(name) => self.attempt(&name.replace('?', ""), &query, rank, attempt, &mut metrics),
            None => metrics.record(SearchFailure::Generic(GenericReason::NullName)),
        };

        if result.is_none() && recursive {
            result = self
                .widen(name.as_deref(), &query, rank, attempt, &mut metrics)
                .map(|r| r.with_match_type(MatchType::Recursive));
        }

        if let Some(original) = original.as_deref() {
            if metrics.name_type.is_none() {
                metrics.name_type = Some(self.name_type_of(original));
            }
            check_other_issues(original, &mut metrics);
        }
        if metrics.errors.is_empty() {
            metrics.errors.insert(ErrorType::None);
        }
        debug!(
            matched = result.is_some(),
            errors = ?metrics.errors,
            "Metrics search complete"
        );
        metrics.result = result;
        metrics
    }

    /// Best match for a classification. Unlike the metrics search, the last
    /// typed failure met is returned to the caller even when a fallback
    /// result was found.
    pub fn search_for_record_by_classification(
        &self,
        cl: &Classification,
        recursive: bool,
        fuzzy: bool,
        ignore_homonym: bool,
    ) -> SearchResult<Option<MatchResult>> {
        let metrics = self.search_for_record_metrics(cl, recursive, fuzzy, ignore_homonym);
        match metrics.last_failure {
            Some(failure) => Err(failure),
            None => Ok(metrics.result),
        }
    }

    /// Rank implied by a supplied name. May rewrite the name and fill in
    /// the genus or species of `query`.
    fn infer_rank(
        &self,
        supplied: &str,
        query: &mut Classification,
        recursive: bool,
        metrics: &mut MetricsResult,
    ) -> (String, Option<RankType>) {
        let named = NAMED_LEVELS.into_iter().find(|level| {
            query
                .get(*level)
                .is_some_and(|value| value.eq_ignore_ascii_case(supplied))
        });
        if named.is_some() {
            return (supplied.to_string(), named);
        }

        let mut name = supplied.to_string();
        if recursive {
            if let Some(genus) = name.strip_suffix(" sp.").or_else(|| name.strip_suffix(" sp")) {
                let genus = genus.trim().to_string();
                query.genus = Some(genus.clone());
                name = genus;
            }
        }

        let mut rank = None;
        match self.parser().parse(&name.replace('?', "")) {
            Ok(pn) if pn.name_type == NameType::Doubtful => {
                if recursive {
                    if let Some(genus) = pn.genus_or_above {
                        name = genus;
                        rank = Some(RankType::Genus);
                    }
                    metrics.name_type = Some(NameType::Doubtful);
                }
            }
            Ok(pn) if pn.is_binomial() => {
                if query.get(RankType::Genus).is_none() {
                    query.genus = pn.genus_or_above.clone();
                }
                if pn.cultivar.is_some() {
                    rank = Some(RankType::Cultivar);
                } else if pn.rank_marker.is_none() && pn.name_type.is_parsable() {
                    if pn.infraspecific_epithet.is_some() {
                        rank = Some(RankType::Subspecies);
                        if query.get(RankType::Species).is_none() {
                            if let (Some(genus), Some(specific)) = (&pn.genus_or_above, &pn.specific_epithet) {
                                query.species = Some(format!("{} {}", genus, specific));
                            }
                        }
                    } else {
                        rank = Some(RankType::Species);
                    }
                }
            }
            Ok(_) => {}
            Err(e) => metrics.name_type = Some(e.name_type),
        }
        (name, rank)
    }

    /// One search, with its failure turned into a flag and best result.
    fn attempt(
        &self,
        name: &str,
        cl: &Classification,
        rank: Option<RankType>,
        attempt: Attempt,
        metrics: &mut MetricsResult,
    ) -> Option<MatchResult> {
        let request = SearchRequest {
            rank,
            classification: Some(cl.clone()),
            fuzzy: Some(attempt.fuzzy),
            ignore_homonym: attempt.ignore_homonym,
            ..SearchRequest::new(name)
        };
        debug!(query = %name, rank = ?rank, "Match attempt");
        match self.search_for_record(&request) {
            Ok(result) => result,
            Err(failure) => metrics.record(failure),
        }
    }

    /// The widening sequence, stopping at the first match.
    fn widen(
        &self,
        name: Option<&str>,
        query: &Classification,
        rank: Option<RankType>,
        attempt: Attempt,
        metrics: &mut MetricsResult,
    ) -> Option<MatchResult> {
        let mut widened = query.clone();
        widened.authorship = None;

        if let Some(name) = name {
            if let Some(found) = self.widen_name(name, &widened, rank, attempt, metrics) {
                return Some(found);
            }
        }

        let has_species = widened.specific_epithet().is_some_and(|s| !is_specific_marker(s))
            || widened.get(RankType::Species).is_some_and(|s| !is_specific_marker(s));
        if rank != Some(RankType::Species) && has_species {
            let species = match (widened.get(RankType::Species), widened.get(RankType::Genus), widened.specific_epithet()) {
                (Some(species), _, _) => Some(species.to_string()),
                (None, Some(genus), Some(specific)) => Some(format!("{} {}", genus, specific)),
                _ => None,
            };
            if let Some(species) = species {
                if let Some(found) = self.attempt(&species, &widened, Some(RankType::Species), attempt, metrics) {
                    return Some(found);
                }
            }
        }

        for level in WIDENING_LEVELS {
            let Some(value) = widened.get(level).map(str::to_string) else {
                continue;
            };
            if let Some(found) = self.attempt(&value, &widened, Some(level), attempt, metrics) {
                debug!(level = %level, "Matched after widening");
                return Some(found);
            }
        }
        None
    }

    /// Steps that work off the supplied name: its species part, then its
    /// genus part, both without a rank. A retry equal to the name already
    /// tried is only worth running when that first try carried a rank.
    fn widen_name(
        &self,
        name: &str,
        widened: &Classification,
        rank: Option<RankType>,
        attempt: Attempt,
        metrics: &mut MetricsResult,
    ) -> Option<MatchResult> {
        let stripped = name.replace('?', "");
        let worth_retrying = |candidate: &str| rank.is_some() || candidate != stripped;

        let parsed = self.parser().parse(name);
        metrics.name_type = Some(match &parsed {
            Ok(pn) => pn.name_type,
            Err(e) => e.name_type,
        });
        let pn = parsed.ok()?;

        let informal_ok = pn.name_type != NameType::Informal
            || pn.rank().is_some_and(|r| r.id() > RankType::Species.id());
        let rank_ok = rank.map_or(true, |r| r.id() >= RankType::Species.id());
        if pn.is_binomial() && pn.name_type != NameType::Doubtful && informal_ok && rank_ok {
            if let (Some(genus), Some(specific)) = (&pn.genus_or_above, &pn.specific_epithet) {
                let species = format!("{} {}", genus, specific);
                if worth_retrying(&species) {
                    if let Some(found) = self.attempt(&species, widened, None, attempt, metrics) {
                        return Some(found);
                    }
                }
            }
        }

        let doubtful = pn.name_type == NameType::Doubtful;
        if doubtful || rank.map_or(true, |r| r.id() <= RankType::Species.id()) {
            if let Some(genus) = pn.genus_or_above.as_deref().filter(|g| worth_retrying(*g)) {
                if let Some(found) = self.attempt(genus, widened, None, attempt, metrics) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn name_type_of(&self, name: &str) -> NameType {
        match self.parser().parse(name) {
            Ok(pn) => pn.name_type,
            Err(e) => e.name_type,
        }
    }
}
