//! Error types for the FAQ engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// FAQ engine errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding backend unreachable or returned malformed output.
    /// Fatal to the current request only.
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// A fallback or paraphrase provider failed. Absorbed at the
    /// resolver/generator boundary, never surfaced to the collaborator.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Attempt to persist or load a record with no question variants
    #[error("Invalid knowledge record: {0}")]
    InvalidRecord(String),

    /// Durable write failed; in-memory state remains valid
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// `accept_offer`/`reject_offer` called without a standing offer
    #[error("no pending fallback offer to accept or reject")]
    NoPendingOffer,

    /// `teach` called before any question was submitted
    #[error("no question awaiting an answer")]
    NoQuestionToTeach,
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Create an invalid-record error
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord(message.into())
    }

    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// True for failures of the durable layer. The in-memory store and
    /// index stay valid and queryable when one of these is returned.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Error::Persistence(_) | Error::Io(_) | Error::Json(_))
    }
}
