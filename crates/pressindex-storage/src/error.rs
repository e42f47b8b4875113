//! Storage layer error types.

use pressindex_types::TypesError;
use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// RocksDB operation failed
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Column family not found
    #[error("Column family not found: {0}")]
    ColumnFamilyNotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Corpus file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Corpus file is malformed
    #[error("Corpus error: {0}")]
    Corpus(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<TypesError> for StorageError {
    fn from(err: TypesError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<StorageError> for TypesError {
    fn from(err: StorageError) -> Self {
        TypesError::Store(err.to_string())
    }
}
