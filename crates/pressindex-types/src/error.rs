//! Error types shared across pressindex crates.

use thiserror::Error;

/// Errors raised by domain types and the collaborator traits.
#[derive(Debug, Error)]
pub enum TypesError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration loaded but failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration/progress store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Content repository failure
    #[error("Repository error: {0}")]
    Repository(String),
}
