//! # pressindex-types
//!
//! Shared domain types for the pressindex system.
//!
//! This crate defines the data structures and collaborator interfaces used
//! throughout the indexing pipeline:
//! - Posts: documents provided by the content repository
//! - Field specs and schemas: what the index engine is told to create
//! - Prepared documents: flat, ordered field/value pairs sent to the engine
//! - Indexing progress: the resumable bulk-indexing checkpoint
//! - Hooks: typed extension points
//! - Settings: configuration types
//!
//! ## Usage
//!
//! ```rust
//! use pressindex_types::{IndexingProgress, Post};
//!
//! let post = Post::new(1, "Hello");
//! let mut progress = IndexingProgress::new(0, 25);
//! progress.advance(20);
//! assert_eq!(progress.offset, 20);
//! # let _ = post;
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod field;
pub mod hooks;
pub mod post;
pub mod progress;
pub mod repository;
pub mod store;

pub use config::{derive_index_name, validate_index_name, Settings, RESERVED_POST_TYPES};
pub use document::{FieldValue, MetaEntry, MetaValue, PreparedDocument};
pub use error::TypesError;
pub use field::{FieldSpec, FieldType, IndexSchema};
pub use hooks::{Action, DocumentDeleted, DocumentIndexed, Filter, Hooks};
pub use post::{Post, PostStatus, Term, ZERO_DATE};
pub use progress::IndexingProgress;
pub use repository::{
    page_posts, ContentRepository, InMemoryRepository, PostOrder, PostQuery, QueryPage,
};
pub use store::{ConfigStore, MemoryStore};
