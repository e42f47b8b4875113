//! Search error types.

use pressindex_types::TypesError;
use thiserror::Error;

/// Errors that can occur while building schemas, preparing documents or
/// talking to the index engine.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Post id does not resolve in the repository
    #[error("Document not found: {0}")]
    DocumentNotFound(u64),

    /// Add without replace for an id the index already holds
    #[error("Document already exists: {0}")]
    DocumentExists(u64),

    /// Two schema fields share a name
    #[error("Schema conflict: duplicate field {0:?}")]
    SchemaConflict(String),

    /// Engine rejected a command or could not be reached
    #[error("Engine error: {0}")]
    Engine(String),

    /// Malformed index name or other unusable setting
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Repository or store failure
    #[error(transparent)]
    Types(#[from] TypesError),

    /// Metadata value could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for SearchError {
    fn from(err: redis::RedisError) -> Self {
        SearchError::Engine(err.to_string())
    }
}

impl SearchError {
    /// Whether the error came from the engine rather than from content.
    pub fn is_engine(&self) -> bool {
        matches!(self, SearchError::Engine(_))
    }
}
