//! Error types for redactor.

use thiserror::Error;

/// Result type for redactor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for redactor operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tagger invocation failed (model/runtime error in the external tagger).
    #[error("Tagger failed: {0}")]
    Tagger(String),

    /// The placeholder generator ran out of usable candidates.
    #[error("Placeholder space exhausted after {attempts} candidates")]
    AllocationExhausted {
        /// Number of candidates tried before giving up.
        attempts: usize,
    },

    /// Persisting output to a sink failed.
    #[error("Failed to persist '{name}': {source}")]
    Persist {
        /// Name the content was to be stored under.
        name: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a tagger error.
    pub fn tagger(msg: impl Into<String>) -> Self {
        Error::Tagger(msg.into())
    }

    /// Create a persist error.
    pub fn persist(name: impl Into<String>, source: std::io::Error) -> Self {
        Error::Persist {
            name: name.into(),
            source,
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }
}
