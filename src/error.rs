//! Wabot error types

use thiserror::Error;

/// Wabot error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Message store error
    #[error("Store error: {0}")]
    Store(String),

    /// Stored message not found
    #[error("Message not found: {0}")]
    NotFound(String),

    /// Text template could not be rendered
    #[error("Template error: {0}")]
    Template(String),

    /// Recipient variable could not be resolved
    #[error("Variable error: {0}")]
    Variable(String),

    /// Stored message is missing data required for its type
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Gateway answered with an unexpected status
    #[error("Gateway returned {status}: {body}")]
    Gateway {
        status: u16,
        body: serde_json::Value,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Wabot operations
pub type Result<T> = std::result::Result<T, Error>;
