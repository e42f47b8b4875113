//! Error types for batch indexing and lifecycle events.

use pressindex_search::SearchError;
use pressindex_types::{IndexingProgress, TypesError};
use thiserror::Error;

/// Errors that can occur while indexing
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Another batch for the same index is running
    #[error("Batch already in progress for index {0}")]
    BatchInProgress(String),

    /// A batch stopped part way; progress was not advanced
    #[error("Batch at offset {offset} aborted after {indexed} documents: {source}")]
    BatchAborted {
        offset: u64,
        indexed: usize,
        #[source]
        source: SearchError,
    },

    /// The batch was indexed and its progress saved, but persisting failed
    #[error(
        "Persist failed after progress advanced to {}/{}: {source}",
        .progress.offset,
        .progress.found_total
    )]
    PersistFailed {
        progress: IndexingProgress,
        #[source]
        source: SearchError,
    },

    /// Unusable setting, detected before any engine call
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Schema, document or engine error
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Repository or store error
    #[error("Store error: {0}")]
    Types(#[from] TypesError),
}

impl IndexingError {
    /// For an aborted batch, whether some documents reached the engine.
    pub fn partially_indexed(&self) -> bool {
        matches!(self, IndexingError::BatchAborted { indexed, .. } if *indexed > 0)
    }

    /// Progress already saved when the error was raised, if any.
    pub fn committed_progress(&self) -> Option<IndexingProgress> {
        match self {
            IndexingError::PersistFailed { progress, .. } => Some(*progress),
            _ => None,
        }
    }
}
