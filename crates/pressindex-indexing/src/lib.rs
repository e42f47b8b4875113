//! Indexing for pressindex.
//!
//! ## Key Components
//!
//! - [`BatchCoordinator`]: resumable bulk indexing, one page per call
//! - [`RunRegistry`]: rejects overlapping batch runs for the same index
//! - [`LifecycleAdapter`]: single-post upsert/delete on lifecycle events
//! - [`IndexingError`]: error types for both paths
//!
//! ## Example
//!
//! ```ignore
//! use pressindex_indexing::{BatchCoordinator, CoordinatorConfig, PostEvent};
//!
//! let coordinator = BatchCoordinator::new(config, repository, engine, store, hooks);
//!
//! // Index until the stored offset reaches the corpus size
//! let summary = coordinator.run_until_complete(None)?;
//!
//! // Keep the index current as posts change
//! coordinator.lifecycle_adapter().handle(&PostEvent::saved(42))?;
//! ```

pub mod coordinator;
pub mod error;
pub mod guard;
pub mod lifecycle;

pub use coordinator::{BatchCoordinator, BatchReport, CoordinatorConfig, IndexStatus, RunSummary};
pub use error::IndexingError;
pub use guard::{RunGuard, RunRegistry};
pub use lifecycle::{LifecycleAdapter, LifecycleOutcome, PostEvent, PostEventKind};
