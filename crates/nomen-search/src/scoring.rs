//! Classification-based scoring of candidate matches.
//!
//! Each candidate is compared with the caller's classification level by
//! level. Agreement adds the level's weight, disagreement subtracts it, and a
//! level missing on either side contributes nothing. The raw sum is mapped
//! onto `[0, 1]` relative to the weight of the levels the query supplied, so
//! a candidate agreeing everywhere scores 1.0 and one disagreeing everywhere
//! scores 0.0.

use tracing::trace;

use nomen_core::defaults::{
    NEUTRAL_SCORE, WEIGHT_CLASS, WEIGHT_FAMILY, WEIGHT_GENUS, WEIGHT_KINGDOM, WEIGHT_ORDER,
    WEIGHT_PHYLUM, WEIGHT_SPECIES,
};
use nomen_core::{Classification, MatchResult, RankType};

fn weight(rank: RankType) -> f64 {
    match rank {
        RankType::Kingdom => WEIGHT_KINGDOM,
        RankType::Phylum => WEIGHT_PHYLUM,
        RankType::Class => WEIGHT_CLASS,
        RankType::Order => WEIGHT_ORDER,
        RankType::Family => WEIGHT_FAMILY,
        RankType::Genus => WEIGHT_GENUS,
        RankType::Species => WEIGHT_SPECIES,
        _ => 0.0,
    }
}

/// Ranks candidates against a query classification and drops low-confidence
/// ones when a confident alternative exists.
#[derive(Debug, Clone, Copy)]
pub struct MatchScorer {
    threshold: f64,
}

impl MatchScorer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Scores a stored classification against the query, in `[0, 1]`.
    pub fn score(&self, query: &Classification, candidate: &Classification) -> f64 {
        let mut total = 0.0;
        let mut raw = 0.0;
        for level in RankType::LINNAEAN {
            let Some(wanted) = query.get(level) else {
                continue;
            };
            let w = weight(level);
            total += w;
            match candidate.get(level) {
                Some(found) if found.eq_ignore_ascii_case(wanted) => raw += w,
                Some(_) => raw -= w,
                None => {}
            }
        }
        if total == 0.0 {
            return NEUTRAL_SCORE;
        }
        (raw + total) / (2.0 * total)
    }

    /// Scores, sorts (stable, descending) and filters a candidate list.
    ///
    /// If any candidate scores above the threshold, every candidate at or
    /// below it is dropped; otherwise the full list is kept.
    pub fn rank(&self, query: Option<&Classification>, results: Vec<MatchResult>) -> Vec<MatchResult> {
        let mut scored: Vec<MatchResult> = results
            .into_iter()
            .map(|mut result| {
                result.score = match query {
                    Some(cl) => self.score(cl, &result.concept.classification),
                    None => NEUTRAL_SCORE,
                };
                trace!(
                    candidate = %result.concept.scientific_name,
                    id = %result.id(),
                    score = result.score,
                    "Scored candidate"
                );
                result
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        if scored.iter().any(|r| r.score > self.threshold) {
            scored.retain(|r| r.score > self.threshold);
        }
        scored
    }
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self::new(nomen_core::defaults::SCORE_CONFIDENCE_THRESHOLD)
    }
}
