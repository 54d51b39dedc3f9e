//! Error types for the ESRS assistant.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Backing files of a collection are missing or inconsistent.
    #[error("Failed to load index '{collection}': {reason}")]
    IndexLoad { collection: String, reason: String },

    /// A collection failed to load at startup and cannot serve requests.
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Classification table error: {0}")]
    ClassificationTable(String),

    #[error("Language model gateway error: {0}")]
    Gateway(String),

    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Errors raised while loading resources at startup.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(self, Self::IndexLoad { .. } | Self::ClassificationTable(_))
    }

    /// Request-time errors that should degrade to an apology instead of failing the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Gateway(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
