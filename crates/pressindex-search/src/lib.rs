//! # pressindex-search
//!
//! Everything between a repository post and the index engine.
//!
//! ## Features
//! - Schema derivation from configured taxonomies and metadata keys
//! - Document normalization into ordered field/value pairs
//! - An [`IndexEngine`] trait with RediSearch and in-memory engines
//! - [`IndexWriter`] for create, upsert, delete, persist and drop

pub mod document;
pub mod engine;
pub mod error;
pub mod memory_engine;
pub mod redis_engine;
pub mod schema;
pub mod writer;

pub use document::{parse_post_date, strip_all_tags, DocumentNormalizer};
pub use engine::{EngineCommand, IndexCommand, IndexEngine, IndexInfo, REPLACE_FLAG};
pub use error::SearchError;
pub use memory_engine::MemoryEngine;
pub use redis_engine::RedisEngine;
pub use schema::{build_schema, fixed_fields};
pub use writer::IndexWriter;
