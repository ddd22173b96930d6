//! Centralized default constants for the nomen name matching system.
//!
//! **This module is the single source of truth** for shared tuning values.
//! Runtime configuration in `nomen-search` starts from these constants and
//! may override them from the environment.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section.

// =============================================================================
// RESULT SCORING
// =============================================================================

/// Candidates scoring above this value are considered confident matches.
///
/// When at least one candidate exceeds it, every candidate at or below it is
/// discarded. When none exceed it the full low-confidence list is kept.
pub const SCORE_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Score assigned when the query supplies no comparable classification level.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Kingdom agreement weight. A kingdom mismatch almost always means a
/// different organism, so it dominates the other levels.
pub const WEIGHT_KINGDOM: f64 = 4.0;

/// Phylum agreement weight.
pub const WEIGHT_PHYLUM: f64 = 1.0;

/// Class agreement weight.
pub const WEIGHT_CLASS: f64 = 1.0;

/// Order agreement weight.
pub const WEIGHT_ORDER: f64 = 1.0;

/// Family agreement weight.
pub const WEIGHT_FAMILY: f64 = 1.5;

/// Genus agreement weight.
pub const WEIGHT_GENUS: f64 = 2.0;

/// Species agreement weight.
pub const WEIGHT_SPECIES: f64 = 1.0;

// =============================================================================
// HOMONYM RESOLUTION
// =============================================================================

/// Minimum Jaro-Winkler similarity between the supplied authorship and the
/// top candidate's authorship for the author to settle a homonym.
pub const AUTHOR_SIMILARITY_THRESHOLD: f64 = 0.8;

// =============================================================================
// SEARCH LIMITS
// =============================================================================

/// Default number of candidates retrieved per search stage.
pub const MAX_RESULTS: usize = 10;

/// Number of vernacular hits inspected when resolving a common name.
pub const VERNACULAR_LOOKUP_LIMIT: usize = 10;

/// Fuzzy term clauses match when Jaro-Winkler similarity reaches this value.
pub const FUZZY_TERM_SIMILARITY: f64 = 0.8;

// =============================================================================
// RANK RANGES
// =============================================================================

/// Lowest rank id treated as species level when widening a rank constraint.
pub const SPECIES_RANK_ID_MIN: u32 = 7000;

/// Highest rank id treated as species level or below.
pub const SPECIES_RANK_ID_MAX: u32 = 9999;

// =============================================================================
// PHONETIC MATCHING
// =============================================================================

/// Phonetic code stored and searched for "no infraspecific epithet".
pub const NO_INFRA_SOUNDEX: &str = "<null>";
