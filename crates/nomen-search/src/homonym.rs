//! Homonym disambiguation against the homonym reference index.
//!
//! A genus or species name is ambiguous when the reference index holds more
//! than one classification path for it. The walk adds the caller's higher
//! classification one level at a time, most general first, until exactly one
//! path remains. The level that got it there is the disambiguating rank.

use tracing::debug;

use nomen_core::{Classification, HomonymIndex, RankType};

use crate::failure::{SearchFailure, SearchResult};

/// Finds the most general classification level that narrows `rank`-level
/// homonyms of the classification's genus (or species) to a single path.
///
/// Returns `Ok(None)` when the name is not ambiguous in the reference index,
/// and a homonym failure without results when the classification has no
/// genus or species to look up, or when the supplied levels run out.
/// A level that leaves no path at all is treated as wrong and skipped.
///
/// # Example
/// ```
/// use nomen_core::{Classification, RankType};
/// use nomen_search::homonym::resolve_homonym;
/// use nomen_search::memory_index::{HomonymEntry, MemoryHomonymIndex};
///
/// let index = MemoryHomonymIndex::new(vec![
///     HomonymEntry {
///         rank: RankType::Genus,
///         classification: Classification::new().with_kingdom("Animalia").with_genus("Macropus"),
///     },
///     HomonymEntry {
///         rank: RankType::Genus,
///         classification: Classification::new().with_kingdom("Plantae").with_genus("Macropus"),
///     },
/// ]);
/// let query = Classification::new().with_kingdom("Animalia").with_genus("Macropus");
/// let resolved = resolve_homonym(&index, &query, RankType::Genus).unwrap();
/// assert_eq!(resolved, Some(RankType::Kingdom));
/// ```
pub fn resolve_homonym(
    index: &dyn HomonymIndex,
    cl: &Classification,
    rank: RankType,
) -> SearchResult<Option<RankType>> {
    let mut key = cl.homonym_key(rank);
    if key.genus.is_none() && key.species.is_none() {
        return Err(SearchFailure::homonym(
            format!("No genus or species to resolve in the classification: {}", cl),
            Vec::new(),
        ));
    }
    let mut count = index.count_matches(&key, rank)?;
    debug!(
        rank = %rank,
        homonym_count = count,
        key = %key,
        "Homonym reference lookup"
    );
    if count <= 1 {
        return Ok(None);
    }

    for level in RankType::HIGHER {
        let Some(value) = cl.get(level) else {
            continue;
        };
        let previous = count;
        key.set(level, Some(value.to_string()));
        count = index.count_matches(&key, rank)?;
        debug!(
            level = %level,
            homonym_count = count,
            "Homonym walk step"
        );
        match count {
            1 => return Ok(Some(level)),
            0 => {
                key.set(level, None);
                count = previous;
            }
            _ => {}
        }
    }

    Err(SearchFailure::homonym(
        format!("Problem resolving the classification: {}", cl),
        Vec::new(),
    ))
}

/// Strips everything but letters and digits from an authorship string.
fn squash_author(author: &str) -> String {
    author
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Jaro-Winkler similarity of two authorship strings, ignoring punctuation,
/// whitespace and case.
///
/// ```
/// use nomen_search::homonym::author_similarity;
///
/// assert_eq!(author_similarity("(Desmarest, 1822)", "Desmarest 1822"), 1.0);
/// assert!(author_similarity("Shaw", "Linnaeus") < 0.8);
/// ```
pub fn author_similarity(a: &str, b: &str) -> f64 {
    strsim::jaro_winkler(&squash_author(a), &squash_author(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_index::{HomonymEntry, MemoryHomonymIndex};
    use nomen_core::ErrorType;

    fn entry(rank: RankType, cl: Classification) -> HomonymEntry {
        HomonymEntry {
            rank,
            classification: cl,
        }
    }

    fn genus(kingdom: &str, phylum: &str, class: &str, family: &str) -> HomonymEntry {
        entry(
            RankType::Genus,
            Classification::new()
                .with_kingdom(kingdom)
                .with_phylum(phylum)
                .with_class(class)
                .with_family(family)
                .with_genus("Agathis"),
        )
    }

    fn agathis_index() -> MemoryHomonymIndex {
        MemoryHomonymIndex::new(vec![
            genus("Plantae", "Pinophyta", "Pinopsida", "Araucariaceae"),
            genus("Animalia", "Arthropoda", "Insecta", "Braconidae"),
            genus("Animalia", "Arthropoda", "Insecta", "Agathidae"),
        ])
    }

    #[test]
    fn test_unambiguous_name_needs_no_rank() {
        let index = agathis_index();
        let cl = Classification::new().with_genus("Eucalyptus");
        assert_eq!(resolve_homonym(&index, &cl, RankType::Genus).unwrap(), None);
    }

    #[test]
    fn test_kingdom_resolves_plant() {
        let index = agathis_index();
        let cl = Classification::new().with_kingdom("Plantae").with_genus("Agathis");
        assert_eq!(
            resolve_homonym(&index, &cl, RankType::Genus).unwrap(),
            Some(RankType::Kingdom)
        );
    }

    #[test]
    fn test_walk_continues_to_family() {
        let index = agathis_index();
        let cl = Classification::new()
            .with_kingdom("Animalia")
            .with_class("Insecta")
            .with_family("Braconidae")
            .with_genus("Agathis");
        assert_eq!(
            resolve_homonym(&index, &cl, RankType::Genus).unwrap(),
            Some(RankType::Family)
        );
    }

    #[test]
    fn test_wrong_level_is_skipped() {
        let index = agathis_index();
        let cl = Classification::new()
            .with_kingdom("Animalia")
            .with_phylum("Chordata")
            .with_family("Agathidae")
            .with_genus("Agathis");
        assert_eq!(
            resolve_homonym(&index, &cl, RankType::Genus).unwrap(),
            Some(RankType::Family)
        );
    }

    #[test]
    fn test_exhausted_levels_fail_with_homonym() {
        let index = agathis_index();
        let cl = Classification::new().with_kingdom("Animalia").with_genus("Agathis");
        let failure = resolve_homonym(&index, &cl, RankType::Genus).unwrap_err();
        assert_eq!(failure.error_type(), ErrorType::Homonym);
        assert!(failure.to_string().contains("Problem resolving the classification"));
    }

    #[test]
    fn test_no_classification_fails() {
        let index = agathis_index();
        let cl = Classification::new().with_genus("Agathis");
        assert!(resolve_homonym(&index, &cl, RankType::Genus).is_err());
    }

    #[test]
    fn test_species_rank_uses_species_key() {
        let index = MemoryHomonymIndex::new(vec![
            entry(
                RankType::Species,
                Classification::new()
                    .with_kingdom("Animalia")
                    .with_genus("Aus")
                    .with_species("Aus bus"),
            ),
            entry(
                RankType::Species,
                Classification::new()
                    .with_kingdom("Plantae")
                    .with_genus("Aus")
                    .with_species("Aus bus"),
            ),
            entry(
                RankType::Species,
                Classification::new()
                    .with_kingdom("Plantae")
                    .with_genus("Aus")
                    .with_species("Aus cus"),
            ),
        ]);
        let cl = Classification::new()
            .with_kingdom("Plantae")
            .with_genus("Aus")
            .with_species("Aus bus");
        assert_eq!(
            resolve_homonym(&index, &cl, RankType::Species).unwrap(),
            Some(RankType::Kingdom)
        );
        let other = Classification::new().with_genus("Aus").with_species("Aus cus");
        assert_eq!(resolve_homonym(&index, &other, RankType::Species).unwrap(), None);
    }

    #[test]
    fn test_missing_genus_and_species_fails() {
        let index = agathis_index();
        let cl = Classification::new().with_kingdom("Plantae").with_family("Araucariaceae");
        let failure = resolve_homonym(&index, &cl, RankType::Genus).unwrap_err();
        assert_eq!(failure.error_type(), ErrorType::Homonym);
        assert!(failure.homonym_results().unwrap().is_empty());
    }

    #[test]
    fn test_author_similarity_ignores_punctuation() {
        assert_eq!(author_similarity("L.", "L"), 1.0);
        assert!(author_similarity("(Desmarest, 1822)", "Desmarest, 1823") >= 0.8);
        assert!(author_similarity("Shaw, 1790", "Gray, 1843") < 0.8);
    }
}
