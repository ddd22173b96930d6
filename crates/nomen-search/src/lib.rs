//! # nomen-search
//!
//! Taxonomic name resolution engine for nomen.
//!
//! This crate provides:
//! - Staged candidate search (exact, phrase, canonical, phonetic)
//! - Classification-based scoring of candidates
//! - Conflict detection for excluded, misapplied and split names
//! - Homonym disambiguation against a homonym reference index
//! - Recursive fallback matching with issue metrics
//! - A default name parser and in-memory reference indices
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use nomen_search::{Classification, NameSearcher, SearchRequest};
//! use nomen_search::memory_index::{MemoryHomonymIndex, MemoryTaxonIndex};
//!
//! let index = MemoryTaxonIndex::from_json_reader(std::fs::File::open("taxa.json")?)?;
//! let homonyms = MemoryHomonymIndex::from_json_reader(std::fs::File::open("homonyms.json")?)?;
//! let searcher = NameSearcher::builder(Arc::new(index), Arc::new(homonyms))
//!     .with_cross_rank_homonyms(["achillea"])
//!     .build()?;
//!
//! // Ranked candidates
//! let results = SearchRequest::new("Macropus")
//!     .with_classification(Classification::new().with_kingdom("Animalia"))
//!     .execute(&searcher)?;
//!
//! // Best match with issue flags, widening the query when nothing matches
//! let metrics = searcher.search_for_record_metrics(
//!     &Classification::for_name("Macropus rufus?"),
//!     true,
//!     false,
//!     false,
//! );
//! ```

pub mod config;
pub mod conflict;
pub mod failure;
pub mod homonym;
pub mod memory_index;
pub mod parser;
pub mod query;
pub mod recursive;
pub mod scoring;
pub mod searcher;
pub mod soundex;

// Re-export core types
pub use nomen_core::*;

// Re-export search types
pub use config::{load_name_set, SearchConfig};
pub use conflict::ConflictResolver;
pub use failure::{GenericReason, SearchFailure, SearchResult};
pub use homonym::{author_similarity, resolve_homonym};
pub use memory_index::{
    ConceptHandle, HomonymEntry, MemoryHomonymIndex, MemoryTaxonIndex, MemoryVernacularIndex,
    VernacularEntry,
};
pub use parser::{clean_phrase, clean_voucher, is_rank_marker, PhraseNameParser};
pub use recursive::MetricsResult;
pub use scoring::MatchScorer;
pub use searcher::{NameSearcher, NameSearcherBuilder, SearchRequest};
pub use soundex::{treat_word, WordKind};
