//! Post-match conflict detection.
//!
//! A scored candidate list is checked, in order, for excluded names,
//! parent/child synonym splits, misapplied names, cross-rank homonyms and
//! genus/species homonyms. The first check that fires decides the outcome.

use std::collections::HashSet;

use tracing::{debug, warn};

use nomen_core::{
    Classification, Error, HomonymIndex, MatchResult, NameParser, RankType, TaxonIndex,
};

use crate::failure::{SearchFailure, SearchResult};
use crate::homonym::{author_similarity, resolve_homonym};

/// Replaces a synonym with its accepted concept, keeping the match type and
/// score. Accepted results are returned unchanged.
///
/// Returns `Ok(None)` for a synonym whose accepted record is missing, and
/// [`Error::InvalidIndex`] when the accepted record is itself a synonym.
pub(crate) fn dereference(
    index: &dyn TaxonIndex,
    result: &MatchResult,
) -> SearchResult<Option<MatchResult>> {
    let Some(accepted_lsid) = result.concept.accepted_lsid.as_deref() else {
        return Ok(Some(result.clone()));
    };
    match index.get_by_lsid(accepted_lsid)? {
        Some(accepted) if accepted.is_synonym() => Err(Error::InvalidIndex(format!(
            "synonym chain {} -> {} -> {}",
            result.stable_id(),
            accepted_lsid,
            accepted.accepted_stable_id()
        ))
        .into()),
        Some(accepted) => Ok(Some(MatchResult {
            concept: accepted,
            match_type: result.match_type,
            score: result.score,
        })),
        None => {
            warn!(
                lsid = %result.stable_id(),
                accepted_lsid = %accepted_lsid,
                "Accepted record of synonym not found"
            );
            Ok(None)
        }
    }
}

/// Runs the conflict checks over one candidate list.
pub struct ConflictResolver<'a> {
    pub index: &'a dyn TaxonIndex,
    pub homonyms: &'a dyn HomonymIndex,
    pub parser: &'a dyn NameParser,
    pub cross_rank_homonyms: &'a HashSet<String>,
    pub author_similarity: f64,
}

impl<'a> ConflictResolver<'a> {
    /// Checks a scored, ranked candidate list.
    ///
    /// Returns the list unchanged when nothing fires, a single-element list
    /// when a homonym was disambiguated, or the typed failure of the first
    /// check that fired.
    pub fn check(
        &self,
        results: Vec<MatchResult>,
        cl: Option<&Classification>,
        rank: Option<RankType>,
    ) -> SearchResult<Vec<MatchResult>> {
        if results.is_empty() {
            return Ok(results);
        }
        self.check_excluded(&results)?;
        self.check_species_split(&results)?;
        self.check_misapplied(&results)?;
        if rank.is_none() {
            self.check_cross_rank(&results)?;
        }
        self.check_homonyms(results, cl, rank)
    }

    fn check_excluded(&self, results: &[MatchResult]) -> SearchResult<()> {
        let (excluded, usable): (Vec<&MatchResult>, Vec<&MatchResult>) =
            results.iter().partition(|r| r.concept.is_excluded());
        let Some(first_excluded) = excluded.first() else {
            return Ok(());
        };
        debug!(
            excluded = excluded.len(),
            usable = usable.len(),
            "Excluded name among candidates"
        );
        Err(SearchFailure::Excluded {
            excluded: (*first_excluded).clone(),
            non_excluded: usable.first().map(|r| (*r).clone()),
        })
    }

    /// An accepted name and a synonym whose accepted concept sits inside it.
    fn check_species_split(&self, results: &[MatchResult]) -> SearchResult<()> {
        let accepted: Vec<&MatchResult> = results.iter().filter(|r| !r.is_synonym()).collect();
        let synonyms: Vec<&MatchResult> = results.iter().filter(|r| r.is_synonym()).collect();
        if accepted.len() != 1 || synonyms.is_empty() {
            return Ok(());
        }
        let parent = accepted[0];
        let synonym = synonyms[0];

        let applies = if results.len() == 2 {
            parent.rank() == Some(RankType::Species)
        } else {
            synonyms
                .iter()
                .all(|s| s.concept.accepted_lsid == synonym.concept.accepted_lsid)
        };
        if !applies {
            return Ok(());
        }

        let Some(child) = dereference(self.index, synonym)? else {
            return Ok(());
        };
        if parent.concept.contains(&child.concept) {
            debug!(
                parent = %parent.concept.scientific_name,
                child = %child.concept.scientific_name,
                "Parent-child synonym detected"
            );
            return Err(SearchFailure::ParentChildSynonym {
                parent: parent.clone(),
                child,
            });
        }
        Ok(())
    }

    fn check_misapplied(&self, results: &[MatchResult]) -> SearchResult<()> {
        let misapplied: Vec<&MatchResult> =
            results.iter().filter(|r| r.concept.is_misapplied()).collect();
        let Some(first) = misapplied.first() else {
            return Ok(());
        };
        let usable = results.iter().find(|r| {
            !r.is_synonym() || !(r.concept.is_misapplied() || r.concept.is_excluded())
        });
        let target = dereference(self.index, first)?;

        if let Some(usable) = usable {
            debug!(
                matched = %usable.concept.scientific_name,
                "Misapplied name alongside a usable match"
            );
            return Err(SearchFailure::Misapplied {
                matched: Some(usable.clone()),
                misapplied: Some(target.unwrap_or_else(|| (*first).clone())),
            });
        }

        let agree = misapplied
            .iter()
            .all(|m| m.concept.accepted_lsid == first.concept.accepted_lsid);
        Err(SearchFailure::Misapplied {
            matched: if agree { target } else { None },
            misapplied: None,
        })
    }

    fn check_cross_rank(&self, results: &[MatchResult]) -> SearchResult<()> {
        let top = &results[0];
        let name = top.concept.canonical().to_lowercase();
        if self.cross_rank_homonyms.contains(&name) {
            debug!(name = %name, "Cross rank homonym without a rank");
            return Err(SearchFailure::homonym(
                format!("Cross rank homonym: {}", top.concept.canonical()),
                results.to_vec(),
            ));
        }
        Ok(())
    }

    fn check_homonyms(
        &self,
        results: Vec<MatchResult>,
        cl: Option<&Classification>,
        rank: Option<RankType>,
    ) -> SearchResult<Vec<MatchResult>> {
        let top = &results[0];
        let top_rank = top.rank();
        let applies = matches!(top_rank, Some(RankType::Genus | RankType::Species))
            || (top.is_synonym()
                && matches!(rank, None | Some(RankType::Genus | RankType::Species)));
        if !applies {
            return Ok(results);
        }

        if let (Some(wanted), Some(found)) = (
            cl.and_then(Classification::authorship),
            top.concept.authorship.as_deref(),
        ) {
            let similarity = author_similarity(wanted, found);
            if similarity >= self.author_similarity {
                debug!(similarity, "Homonym settled by authorship");
                return Ok(vec![top.clone()]);
            }
        }

        self.validate_homonyms(results, cl)
    }

    fn validate_homonyms(
        &self,
        results: Vec<MatchResult>,
        cl: Option<&Classification>,
    ) -> SearchResult<Vec<MatchResult>> {
        let top = &results[0];
        let mut query = cl.cloned().unwrap_or_default();

        let homonym_rank = match top.rank() {
            Some(rank) => rank,
            None => match self.parser.parse(&top.concept.scientific_name) {
                Ok(pn) if pn.is_binomial() => RankType::Species,
                Ok(_) => RankType::Genus,
                Err(_) if top.concept.canonical().contains(' ') => RankType::Species,
                Err(_) => RankType::Genus,
            },
        };
        if !matches!(homonym_rank, RankType::Genus | RankType::Species) {
            return Ok(results);
        }

        let canonical = top.concept.canonical();
        if query.get(RankType::Genus).is_none() {
            let genus = canonical.split_whitespace().next().unwrap_or(canonical);
            query.genus = Some(genus.to_string());
        }
        if homonym_rank == RankType::Species && query.get(RankType::Species).is_none() {
            query.species = Some(canonical.to_string());
        }

        let resolved = match resolve_homonym(self.homonyms, &query, homonym_rank) {
            Ok(resolved) => resolved,
            Err(SearchFailure::Homonym { message, .. }) => {
                return Err(SearchFailure::homonym(message, results));
            }
            Err(other) => return Err(other),
        };

        let Some(level) = resolved else {
            return Ok(vec![top.clone()]);
        };
        debug!(level = %level, "Homonym resolved by classification");
        let matching = results
            .iter()
            .find(|r| {
                !r.is_synonym()
                    && query.has_identical_classification(&r.concept.classification, level)
            })
            .cloned();
        if let Some(result) = matching {
            return Ok(vec![result]);
        }
        Err(SearchFailure::homonym(
            format!("No candidate matches the classification at {} level", level),
            results,
        ))
    }
}
