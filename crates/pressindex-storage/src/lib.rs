//! Storage layer for pressindex.
//!
//! Provides:
//! - RocksDB-backed options and per-index progress ([`Storage`])
//! - A JSON corpus export acting as the content repository ([`JsonCorpus`])

pub mod column_families;
pub mod corpus;
pub mod db;
pub mod error;
pub mod keys;

pub use corpus::JsonCorpus;
pub use db::{Storage, OPTION_WRITE_TO_DISK};
pub use error::StorageError;
pub use keys::{OptionKey, ProgressKey};
