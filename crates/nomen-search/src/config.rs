//! Runtime configuration for the name searcher.
//!
//! Defaults come from [`nomen_core::defaults`]. Values can be overridden from
//! the environment for deployments that need a stricter or looser matcher
//! without a rebuild.

use std::collections::HashSet;
use std::env;
use std::io::BufRead;

use nomen_core::{defaults, Error, Result};

/// Tuning knobs for candidate scoring and homonym resolution.
///
/// # Example
/// ```
/// use nomen_search::config::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_max_results(25)
///     .with_fuzzy(true);
/// assert_eq!(config.max_results, 25);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Candidates above this score evict those at or below it.
    pub score_threshold: f64,
    /// Authorship similarity at which the author alone settles a homonym.
    pub author_similarity: f64,
    /// Candidates retrieved per search stage.
    pub max_results: usize,
    /// Whether the single-shot lookups allow phonetic matching.
    pub fuzzy: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            score_threshold: defaults::SCORE_CONFIDENCE_THRESHOLD,
            author_similarity: defaults::AUTHOR_SIMILARITY_THRESHOLD,
            max_results: defaults::MAX_RESULTS,
            fuzzy: false,
        }
    }
}

impl SearchConfig {
    /// Constructs a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `NOMEN_SCORE_THRESHOLD` (default: 0.5)
    /// - `NOMEN_AUTHOR_SIMILARITY` (default: 0.8)
    /// - `NOMEN_MAX_RESULTS` (default: 10)
    /// - `NOMEN_FUZZY` (default: false)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            score_threshold: parse_env("NOMEN_SCORE_THRESHOLD", base.score_threshold),
            author_similarity: parse_env("NOMEN_AUTHOR_SIMILARITY", base.author_similarity),
            max_results: parse_env("NOMEN_MAX_RESULTS", base.max_results),
            fuzzy: parse_bool_env("NOMEN_FUZZY", base.fuzzy),
        }
    }

    pub fn with_score_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = threshold;
        self
    }

    pub fn with_author_similarity(mut self, similarity: f64) -> Self {
        self.author_similarity = similarity;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    /// Rejects thresholds outside `[0, 1]` and a zero result limit.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(Error::Config(format!(
                "score threshold {} outside [0, 1]",
                self.score_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.author_similarity) {
            return Err(Error::Config(format!(
                "author similarity {} outside [0, 1]",
                self.author_similarity
            )));
        }
        if self.max_results == 0 {
            return Err(Error::Config("max results must be positive".to_string()));
        }
        Ok(())
    }
}

/// Reads a newline-delimited name list, such as the cross-rank homonyms.
///
/// Blank lines and lines starting with `#` are skipped; names are trimmed
/// and lower-cased.
pub fn load_name_set<R: BufRead>(reader: R) -> Result<HashSet<String>> {
    let mut names = HashSet::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        names.insert(trimmed.to_lowercase());
    }
    Ok(names)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|val| val.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses a boolean environment variable with a default fallback.
///
/// Recognizes "true", "1", "yes", "on" (case-insensitive) as true.
fn parse_bool_env(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|val| match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}
