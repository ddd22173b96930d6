//! Structured logging schema and field name constants for nomen.
//!
//! Both crates use these constants for consistent structured logging fields,
//! so log aggregation can query a match decision by the same names whichever
//! stage emitted it.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Index unusable, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied (unparsable name, swallowed index error) |
//! | INFO  | Lifecycle events (index loaded, searcher constructed) |
//! | DEBUG | Decision points: stage hit, conflict detected, homonym resolution rank |
//! | TRACE | Per-candidate scoring and per-clause evaluation |

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "search", "index", "parser"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "candidate_search", "conflict", "homonym", "recursive", "scorer"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "search", "resolve", "resolve_homonym", "search_common_name"
pub const OPERATION: &str = "op";

// ─── Query fields ──────────────────────────────────────────────────────────

/// Name being searched.
pub const QUERY: &str = "query";

/// Rank constraint of the search, if any.
pub const RANK: &str = "rank";

/// Rendered index query.
pub const INDEX_QUERY: &str = "index_query";

/// Stable identifier (LSID) of a record.
pub const LSID: &str = "lsid";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Number of results returned by a search stage.
pub const RESULT_COUNT: &str = "result_count";

/// Number of homonym reference records matching a classification.
pub const HOMONYM_COUNT: &str = "homonym_count";

/// Candidate score produced by the match scorer.
pub const SCORE: &str = "score";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Match type of the accepted result.
pub const MATCH_TYPE: &str = "match_type";

/// Error flag raised by a typed match failure.
pub const ERROR_TYPE: &str = "error_type";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Default filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "nomen_search=info,nomen_core=info";

/// Installs a global `tracing` subscriber for binaries and test harnesses.
///
/// Environment variables:
/// - `RUST_LOG`: standard env filter (default: [`DEFAULT_FILTER`])
/// - `LOG_FORMAT`: `json` or `text` (default: `text`)
///
/// Calling it more than once is harmless; only the first call installs a
/// subscriber. Returns `false` when a subscriber was already set.
pub fn init_tracing() -> bool {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .is_ok()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::info!(log_format = %log_format, "Logging initialized");
    }
    installed
}
