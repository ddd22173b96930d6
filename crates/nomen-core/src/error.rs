//! Error types for nomen.

use thiserror::Error;

/// Result type alias using nomen's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for index access and infrastructure failures.
///
/// Match outcomes such as homonyms or misapplied names are not errors of this
/// kind; they are reported by the search crate's typed match failures.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying index could not be queried
    #[error("Index error: {0}")]
    Index(String),

    /// Index data violates a structural invariant
    #[error("Invalid index data: {0}")]
    InvalidIndex(String),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
