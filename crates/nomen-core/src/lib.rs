//! # nomen-core
//!
//! Core types, traits, and abstractions for the nomen taxonomic name
//! matching library.
//!
//! This crate provides the data model shared by the index and the resolution
//! engine: taxon concepts, query classifications, match results and issue
//! flags, the structured index query model, and the collaborator traits the
//! engine consumes.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod search;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use search::*;
pub use traits::*;
