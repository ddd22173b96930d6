//! In-memory reference implementations of the index traits.
//!
//! Records live in an arena and are addressed by [`ConceptHandle`]. Synonym
//! links are resolved to handles once, at construction, so dereferencing the
//! accepted concept of a synonym is a single lookup. The indices are
//! read-only after construction and can be shared across threads.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use nomen_core::defaults::{FUZZY_TERM_SIMILARITY, NO_INFRA_SOUNDEX};
use nomen_core::{
    Classification, Clause, Error, HomonymIndex, IndexField, IndexHit, IndexQuery, RankType,
    Result, TaxonConcept, TaxonIndex, VernacularHit, VernacularIndex, FLAG_TRUE,
};

use crate::query::normalize_common_name;

/// Opaque reference to a record in a [`MemoryTaxonIndex`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConceptHandle(u32);

impl ConceptHandle {
    fn index(self) -> usize {
        self.0 as usize
    }
}

fn normalize_term(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

// =============================================================================
// TAXON INDEX
// =============================================================================

/// Arena-backed taxonomic index.
///
/// # Example
/// ```
/// use nomen_core::{Clause, IndexField, IndexQuery, TaxonConcept, TaxonIndex};
/// use nomen_search::memory_index::MemoryTaxonIndex;
///
/// let index = MemoryTaxonIndex::new(vec![TaxonConcept {
///     id: "1".to_string(),
///     scientific_name: "Macropus rufus".to_string(),
///     ..Default::default()
/// }])
/// .unwrap();
///
/// let query = IndexQuery::new(10).require(Clause::term(IndexField::Name, "macropus  RUFUS"));
/// assert_eq!(index.search(&query).unwrap().len(), 1);
/// ```
#[derive(Debug)]
pub struct MemoryTaxonIndex {
    concepts: Vec<Arc<TaxonConcept>>,
    accepted: Vec<Option<ConceptHandle>>,
    by_id: HashMap<String, ConceptHandle>,
    by_lsid: HashMap<String, ConceptHandle>,
    /// Merged identifier to the record now carrying it
    alternatives: HashMap<String, ConceptHandle>,
    ready: bool,
}

impl MemoryTaxonIndex {
    /// Builds the index, resolving synonym links.
    ///
    /// Fails with [`Error::InvalidIndex`] on duplicate identifiers or when a
    /// synonym points at another synonym.
    pub fn new(concepts: Vec<TaxonConcept>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(concepts.len());
        let mut by_lsid = HashMap::with_capacity(concepts.len());
        let mut alternatives = HashMap::new();
        let mut arena = Vec::with_capacity(concepts.len());

        for (position, concept) in concepts.into_iter().enumerate() {
            let raw = u32::try_from(position)
                .map_err(|_| Error::InvalidIndex("too many records for one index".to_string()))?;
            let handle = ConceptHandle(raw);
            if by_id.insert(concept.id.clone(), handle).is_some() {
                return Err(Error::InvalidIndex(format!("duplicate record id {}", concept.id)));
            }
            if by_lsid.insert(concept.stable_id().to_string(), handle).is_some() {
                return Err(Error::InvalidIndex(format!(
                    "duplicate lsid {}",
                    concept.stable_id()
                )));
            }
            for alt in &concept.alternative_lsids {
                alternatives.insert(alt.clone(), handle);
            }
            arena.push(Arc::new(concept));
        }

        let mut accepted = Vec::with_capacity(arena.len());
        for concept in &arena {
            let Some(target) = concept.accepted_lsid.as_deref() else {
                accepted.push(None);
                continue;
            };
            match by_lsid.get(target).copied() {
                Some(handle) => {
                    let target_concept = &arena[handle.index()];
                    if target_concept.is_synonym() {
                        return Err(Error::InvalidIndex(format!(
                            "synonym chain {} -> {} -> {}",
                            concept.stable_id(),
                            target,
                            target_concept.accepted_stable_id()
                        )));
                    }
                    accepted.push(Some(handle));
                }
                None => {
                    warn!(
                        lsid = %concept.stable_id(),
                        accepted_lsid = %target,
                        "Synonym points at a missing accepted record"
                    );
                    accepted.push(None);
                }
            }
        }

        debug!(record_count = arena.len(), "Taxon index built");
        Ok(Self {
            concepts: arena,
            accepted,
            by_id,
            by_lsid,
            alternatives,
            ready: true,
        })
    }

    /// An index that has not been opened. Every search reports "not ready".
    pub fn unopened() -> Self {
        Self {
            concepts: Vec::new(),
            accepted: Vec::new(),
            by_id: HashMap::new(),
            by_lsid: HashMap::new(),
            alternatives: HashMap::new(),
            ready: false,
        }
    }

    /// Loads records from a JSON array of taxon concepts.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let concepts: Vec<TaxonConcept> = serde_json::from_reader(reader)?;
        Self::new(concepts)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn handle_of(&self, id: &str) -> Option<ConceptHandle> {
        self.by_id.get(id).copied()
    }

    pub fn concept(&self, handle: ConceptHandle) -> Option<&Arc<TaxonConcept>> {
        self.concepts.get(handle.index())
    }

    /// Accepted concept of a synonym; `None` for accepted records and
    /// dangling synonyms.
    pub fn accepted_of(&self, handle: ConceptHandle) -> Option<&Arc<TaxonConcept>> {
        self.accepted
            .get(handle.index())
            .copied()
            .flatten()
            .and_then(|h| self.concept(h))
    }

    fn matches(concept: &TaxonConcept, clause: &Clause) -> bool {
        match clause {
            Clause::Term { field, value } => {
                let wanted = normalize_term(value);
                field_values(concept, *field)
                    .iter()
                    .any(|v| normalize_term(v) == wanted)
            }
            Clause::Range { field, min, max } => field_values(concept, *field)
                .iter()
                .filter_map(|v| v.parse::<u32>().ok())
                .any(|v| v >= *min && v <= *max),
            Clause::AnyOf { clauses } => clauses.iter().any(|c| Self::matches(concept, c)),
            Clause::Fuzzy { field, value } => {
                let wanted = normalize_term(value);
                field_values(concept, *field).iter().any(|v| {
                    strsim::jaro_winkler(&normalize_term(v), &wanted) >= FUZZY_TERM_SIMILARITY
                })
            }
        }
    }
}

fn single(value: Option<&str>) -> Vec<Cow<'_, str>> {
    value.map(Cow::Borrowed).into_iter().collect()
}

fn flag(set: bool) -> Vec<Cow<'static, str>> {
    if set {
        vec![Cow::Borrowed(FLAG_TRUE)]
    } else {
        Vec::new()
    }
}

/// Values a record exposes for a field. Multi-valued for names and LSIDs.
fn field_values(concept: &TaxonConcept, field: IndexField) -> Vec<Cow<'_, str>> {
    let cl = &concept.classification;
    match field {
        IndexField::Id => vec![Cow::Borrowed(concept.id.as_str())],
        IndexField::Lsid => std::iter::once(Cow::Borrowed(concept.stable_id()))
            .chain(concept.alternative_lsids.iter().map(|s| Cow::Borrowed(s.as_str())))
            .collect(),
        IndexField::Name => {
            let mut names = vec![Cow::Borrowed(concept.scientific_name.as_str())];
            if let Some(canonical) = concept.canonical_name.as_deref() {
                names.push(Cow::Borrowed(canonical));
            }
            if concept.authorship.is_some() {
                names.push(Cow::Owned(concept.complete_name()));
            }
            names
        }
        IndexField::Rank => single(concept.rank.map(RankType::label)),
        IndexField::RankId => concept
            .rank
            .map(|r| Cow::Owned(r.id().to_string()))
            .into_iter()
            .collect(),
        IndexField::IsSynonym => flag(concept.is_synonym()),
        IndexField::ExternallyAdded => flag(concept.externally_added),
        IndexField::Kingdom => single(cl.get(RankType::Kingdom)),
        IndexField::Phylum => single(cl.get(RankType::Phylum)),
        IndexField::Class => single(cl.get(RankType::Class)),
        IndexField::Order => single(cl.get(RankType::Order)),
        IndexField::Family => single(cl.get(RankType::Family)),
        IndexField::Genus => single(cl.get(RankType::Genus)),
        IndexField::Species => single(cl.get(RankType::Species)),
        IndexField::Specific => single(
            concept
                .phrase
                .as_ref()
                .and_then(|p| p.specific_epithet.as_deref())
                .or_else(|| cl.specific_epithet()),
        ),
        IndexField::Phrase => single(concept.phrase.as_ref().and_then(|p| p.phrase.as_deref())),
        IndexField::Voucher => single(concept.phrase.as_ref().and_then(|p| p.voucher.as_deref())),
        IndexField::Author => single(concept.authorship.as_deref()),
        IndexField::GenusSoundex => single(concept.phonetic.genus.as_deref()),
        IndexField::SpeciesSoundex => single(concept.phonetic.species.as_deref()),
        IndexField::InfraSoundex => vec![Cow::Borrowed(
            concept
                .phonetic
                .infraspecific
                .as_deref()
                .unwrap_or(NO_INFRA_SOUNDEX),
        )],
    }
}

impl TaxonIndex for MemoryTaxonIndex {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn search(&self, query: &IndexQuery) -> Result<Vec<IndexHit>> {
        if !self.ready {
            return Err(Error::Index("index has not been opened".to_string()));
        }
        let mut hits: Vec<IndexHit> = self
            .concepts
            .iter()
            .filter(|c| query.required.iter().all(|clause| Self::matches(c, clause)))
            .map(|c| {
                let boosted = query
                    .optional
                    .iter()
                    .filter(|clause| Self::matches(c, clause))
                    .count();
                IndexHit {
                    concept: Arc::clone(c),
                    score: 1.0 + boosted as f32,
                }
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(query.limit);
        Ok(hits)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Arc<TaxonConcept>>> {
        Ok(self.handle_of(id).and_then(|h| self.concept(h)).cloned())
    }

    fn get_by_lsid(&self, lsid: &str) -> Result<Option<Arc<TaxonConcept>>> {
        Ok(self
            .by_lsid
            .get(lsid)
            .copied()
            .and_then(|h| self.concept(h))
            .cloned())
    }

    fn primary_lsid(&self, lsid: &str) -> Result<Option<String>> {
        if self.by_lsid.contains_key(lsid) {
            return Ok(Some(lsid.to_string()));
        }
        Ok(self
            .alternatives
            .get(lsid)
            .copied()
            .and_then(|h| self.concept(h))
            .map(|c| c.stable_id().to_string()))
    }
}

// =============================================================================
// HOMONYM REFERENCE INDEX
// =============================================================================

/// A genus or species classification path in the homonym reference index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomonymEntry {
    pub rank: RankType,
    pub classification: Classification,
}

/// In-memory homonym reference index.
#[derive(Debug, Clone, Default)]
pub struct MemoryHomonymIndex {
    entries: Vec<HomonymEntry>,
}

impl MemoryHomonymIndex {
    pub fn new(entries: Vec<HomonymEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::new(serde_json::from_reader(reader)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HomonymIndex for MemoryHomonymIndex {
    fn count_matches(&self, classification: &Classification, rank: RankType) -> Result<usize> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.rank == rank)
            .filter(|entry| {
                classification.has_identical_classification(&entry.classification, RankType::Species)
            })
            .count())
    }
}

// =============================================================================
// VERNACULAR INDEX
// =============================================================================

/// A common name and the scientific name it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VernacularEntry {
    pub common_name: String,
    pub lsid: String,
    pub scientific_name: String,
}

/// In-memory vernacular index keyed by normalised common name.
#[derive(Debug, Clone, Default)]
pub struct MemoryVernacularIndex {
    by_name: HashMap<String, Vec<VernacularHit>>,
}

impl MemoryVernacularIndex {
    pub fn new(entries: Vec<VernacularEntry>) -> Self {
        let mut by_name: HashMap<String, Vec<VernacularHit>> = HashMap::new();
        for entry in entries {
            by_name
                .entry(normalize_common_name(&entry.common_name))
                .or_default()
                .push(VernacularHit {
                    lsid: entry.lsid,
                    scientific_name: entry.scientific_name,
                });
        }
        Self { by_name }
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::new(serde_json::from_reader(reader)?))
    }
}

impl VernacularIndex for MemoryVernacularIndex {
    fn search(&self, normalized: &str, limit: usize) -> Result<Vec<VernacularHit>> {
        Ok(self
            .by_name
            .get(normalized)
            .map(|hits| hits.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nomen_core::{PhraseFields, SynonymType};

    fn concept(id: &str, name: &str, rank: RankType) -> TaxonConcept {
        TaxonConcept {
            id: id.to_string(),
            lsid: Some(format!("urn:lsid:{}", id)),
            scientific_name: name.to_string(),
            rank: Some(rank),
            ..Default::default()
        }
    }

    fn synonym_of(mut c: TaxonConcept, accepted: &str) -> TaxonConcept {
        c.accepted_lsid = Some(format!("urn:lsid:{}", accepted));
        c.synonym_type = Some(SynonymType::SubjectiveSynonym);
        c
    }

    fn sample_index() -> MemoryTaxonIndex {
        let mut genus = concept("1", "Macropus", RankType::Genus);
        genus.classification = Classification::new()
            .with_kingdom("Animalia")
            .with_genus("Macropus");
        let mut species = concept("2", "Macropus rufus", RankType::Species);
        species.authorship = Some("(Desmarest, 1822)".to_string());
        species.alternative_lsids = vec!["urn:lsid:old-2".to_string()];
        let syn = synonym_of(concept("3", "Osphranter rufus", RankType::Species), "2");
        MemoryTaxonIndex::new(vec![genus, species, syn]).unwrap()
    }

    #[test]
    fn test_search_name_variants() {
        let index = sample_index();
        for name in ["Macropus rufus", "MACROPUS  rufus", "Macropus rufus (Desmarest, 1822)"] {
            let query = IndexQuery::new(10).require(Clause::term(IndexField::Name, name));
            let hits = index.search(&query).unwrap();
            assert_eq!(hits.len(), 1, "name variant {}", name);
            assert_eq!(hits[0].concept.id, "2");
        }
    }

    #[test]
    fn test_optional_clauses_raise_score() {
        let index = sample_index();
        let query = IndexQuery::new(10)
            .require(Clause::term(IndexField::Name, "Macropus"))
            .boost(Clause::term(IndexField::Kingdom, "Animalia"))
            .boost(Clause::term(IndexField::Family, "Wrongidae"));
        let hits = index.search(&query).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, 2.0);
    }

    #[test]
    fn test_rank_range_and_flags() {
        let index = sample_index();
        let widened = IndexQuery::new(10).require(Clause::any_of(vec![
            Clause::range(IndexField::RankId, 7000, 9999),
            Clause::flag(IndexField::IsSynonym),
        ]));
        let hits = index.search(&widened).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.concept.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_limit_truncates_in_index_order() {
        let index = sample_index();
        let query = IndexQuery::new(1).require(Clause::range(IndexField::RankId, 0, 9999));
        let hits = index.search(&query).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].concept.id, "1");
    }

    #[test]
    fn test_lookup_by_id_and_lsid() {
        let index = sample_index();
        assert_eq!(index.get_by_id("2").unwrap().unwrap().scientific_name, "Macropus rufus");
        assert_eq!(index.get_by_lsid("urn:lsid:3").unwrap().unwrap().id, "3");
        assert!(index.get_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_primary_lsid() {
        let index = sample_index();
        assert_eq!(
            index.primary_lsid("urn:lsid:old-2").unwrap().as_deref(),
            Some("urn:lsid:2")
        );
        assert_eq!(index.primary_lsid("urn:lsid:1").unwrap().as_deref(), Some("urn:lsid:1"));
        assert_eq!(index.primary_lsid("urn:lsid:nope").unwrap(), None);
    }

    #[test]
    fn test_accepted_of_is_single_lookup() {
        let index = sample_index();
        let syn = index.handle_of("3").unwrap();
        assert_eq!(index.accepted_of(syn).unwrap().id, "2");
        let acc = index.handle_of("2").unwrap();
        assert!(index.accepted_of(acc).is_none());
    }

    #[test]
    fn test_rejects_synonym_chain() {
        let a = concept("a", "Aus", RankType::Genus);
        let b = synonym_of(concept("b", "Bus", RankType::Genus), "a");
        let c = synonym_of(concept("c", "Cus", RankType::Genus), "b");
        let err = MemoryTaxonIndex::new(vec![a, b, c]).unwrap_err();
        assert!(matches!(err, Error::InvalidIndex(_)));
        assert!(err.to_string().contains("synonym chain"));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let a = concept("a", "Aus", RankType::Genus);
        let mut b = concept("a", "Bus", RankType::Genus);
        b.lsid = Some("urn:lsid:other".to_string());
        assert!(MemoryTaxonIndex::new(vec![a, b]).is_err());
    }

    #[test]
    fn test_unopened_index() {
        let index = MemoryTaxonIndex::unopened();
        assert!(!index.is_ready());
        assert!(index.search(&IndexQuery::new(10)).is_err());
    }

    #[test]
    fn test_phrase_and_soundex_fields() {
        let mut c = concept("p", "Marsilea sp. Neutral Junction (D.E.Albrecht 9192)", RankType::Species);
        c.classification = Classification::new().with_genus("Marsilea");
        c.phrase = Some(PhraseFields {
            phrase: Some("Neutral Junction".to_string()),
            voucher: Some("Albrecht9192".to_string()),
            specific_epithet: None,
        });
        let index = MemoryTaxonIndex::new(vec![c]).unwrap();
        let query = IndexQuery::new(10)
            .require(Clause::term(IndexField::Genus, "Marsilea"))
            .require(Clause::term(IndexField::Phrase, "neutral junction"))
            .require(Clause::term(IndexField::Voucher, "Albrecht9192"))
            .require(Clause::term(IndexField::InfraSoundex, NO_INFRA_SOUNDEX));
        assert_eq!(index.search(&query).unwrap().len(), 1);
    }

    #[test]
    fn test_fuzzy_author_clause() {
        let index = sample_index();
        let query = IndexQuery::new(10).require(Clause::fuzzy(IndexField::Author, "(Desmarest 1822)"));
        assert_eq!(index.search(&query).unwrap().len(), 1);
    }

    #[test]
    fn test_from_json_reader() {
        let json = r#"[
            {"id": "10", "lsid": "urn:lsid:10", "scientific_name": "Acacia", "rank": "genus",
             "classification": {"kingdom": "Plantae", "genus": "Acacia"}},
            {"id": "11", "scientific_name": "Racosperma", "rank": "genus", "accepted_lsid": "urn:lsid:10",
             "synonym_type": "objective_synonym"}
        ]"#;
        let index = MemoryTaxonIndex::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(index.len(), 2);
        let syn = index.get_by_id("11").unwrap().unwrap();
        assert!(syn.is_synonym());
        assert_eq!(syn.stable_id(), "11");
    }

    #[test]
    fn test_from_json_reader_invalid() {
        let err = MemoryTaxonIndex::from_json_reader("not json".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_homonym_index_counts() {
        let index = MemoryHomonymIndex::new(vec![
            HomonymEntry {
                rank: RankType::Genus,
                classification: Classification::new()
                    .with_kingdom("Animalia")
                    .with_genus("Macropus"),
            },
            HomonymEntry {
                rank: RankType::Genus,
                classification: Classification::new()
                    .with_kingdom("Plantae")
                    .with_genus("Macropus"),
            },
        ]);
        let bare = Classification::new().with_genus("macropus");
        assert_eq!(index.count_matches(&bare, RankType::Genus).unwrap(), 2);
        let with_kingdom = bare.clone().with_kingdom("Plantae");
        assert_eq!(index.count_matches(&with_kingdom, RankType::Genus).unwrap(), 1);
        assert_eq!(index.count_matches(&bare, RankType::Species).unwrap(), 0);
    }

    #[test]
    fn test_vernacular_index() {
        let index = MemoryVernacularIndex::new(vec![VernacularEntry {
            common_name: "Red Kangaroo".to_string(),
            lsid: "urn:lsid:2".to_string(),
            scientific_name: "Macropus rufus".to_string(),
        }]);
        let hits = index.search("REDKANGAROO", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].lsid, "urn:lsid:2");
        assert!(index.search("GREYKANGAROO", 10).unwrap().is_empty());
    }
}
