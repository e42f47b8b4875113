//! End-to-end test infrastructure for pressindex.
//!
//! Provides a shared TestHarness wiring an in-memory repository, engine and
//! store into a batch coordinator, plus corpus helpers.

use std::sync::Arc;

use pressindex_indexing::{BatchCoordinator, CoordinatorConfig, LifecycleAdapter};
use pressindex_search::{EngineCommand, IndexCommand, MemoryEngine};
use pressindex_storage::Storage;
use pressindex_types::{Hooks, InMemoryRepository, MemoryStore, Post};

/// Index name used by every E2E scenario.
pub const INDEX_NAME: &str = "e2e_blog";

/// Shared test harness for E2E tests.
///
/// The engine and store outlive any coordinator built from the harness, so
/// a fresh coordinator behaves like a restarted process.
pub struct TestHarness {
    pub repo: Arc<InMemoryRepository>,
    pub engine: Arc<MemoryEngine>,
    pub store: Arc<MemoryStore>,
    pub hooks: Arc<Hooks>,
    pub config: CoordinatorConfig,
}

impl TestHarness {
    /// Harness over `posts` with default configuration and no hooks.
    pub fn new(posts: Vec<Post>) -> Self {
        Self::with_hooks(posts, Hooks::new())
    }

    pub fn with_hooks(posts: Vec<Post>, hooks: Hooks) -> Self {
        Self {
            repo: Arc::new(InMemoryRepository::with_posts(posts)),
            engine: Arc::new(MemoryEngine::new()),
            store: Arc::new(MemoryStore::new()),
            hooks: Arc::new(hooks),
            config: CoordinatorConfig::new(INDEX_NAME),
        }
    }

    pub fn with_config(mut self, f: impl FnOnce(CoordinatorConfig) -> CoordinatorConfig) -> Self {
        self.config = f(self.config);
        self
    }

    /// A coordinator over the shared repository, engine and store.
    pub fn coordinator(&self) -> BatchCoordinator {
        BatchCoordinator::new(
            self.config.clone(),
            self.repo.clone(),
            self.engine.clone(),
            self.store.clone(),
            self.hooks.clone(),
        )
    }

    pub fn lifecycle(&self) -> LifecycleAdapter {
        self.coordinator().lifecycle_adapter()
    }

    /// Every `FT.ADD` the engine accepted, in order.
    pub fn add_commands(&self) -> Vec<IndexCommand> {
        self.engine
            .history()
            .into_iter()
            .filter_map(|cmd| match cmd {
                EngineCommand::Add(add) => Some(add),
                _ => None,
            })
            .collect()
    }

    /// Every `FT.DEL` the engine accepted, as `(doc_id, hard_delete)`.
    pub fn delete_commands(&self) -> Vec<(u64, bool)> {
        self.engine
            .history()
            .into_iter()
            .filter_map(|cmd| match cmd {
                EngineCommand::Delete {
                    doc_id,
                    hard_delete,
                    ..
                } => Some((doc_id, hard_delete)),
                _ => None,
            })
            .collect()
    }

    pub fn indexed_ids(&self) -> Vec<u64> {
        self.engine.document_ids(INDEX_NAME)
    }
}

/// Harness variant persisting progress and options in RocksDB.
pub struct DiskHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    pub repo: Arc<InMemoryRepository>,
    pub engine: Arc<MemoryEngine>,
}

impl DiskHarness {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            _temp_dir: tempfile::TempDir::new().expect("Failed to create temp dir"),
            repo: Arc::new(InMemoryRepository::with_posts(posts)),
            engine: Arc::new(MemoryEngine::new()),
        }
    }

    /// Open the store. Only one may be open at a time.
    pub fn storage(&self) -> Arc<Storage> {
        Arc::new(Storage::open(self._temp_dir.path()).expect("Failed to open test storage"))
    }

    pub fn coordinator(&self, storage: Arc<Storage>) -> BatchCoordinator {
        BatchCoordinator::new(
            CoordinatorConfig::new(INDEX_NAME),
            self.repo.clone(),
            self.engine.clone(),
            storage,
            Arc::new(Hooks::new()),
        )
    }
}

/// `count` published posts with ids `1..=count`.
pub fn published_posts(count: u64) -> Vec<Post> {
    (1..=count)
        .map(|id| {
            Post::new(id, format!("Post {}", id))
                .with_content(format!("<p>Body of <b>post</b> {}</p>", id))
                .with_date("2024-03-01 12:00:00")
        })
        .collect()
}

/// Owned string list, for configuration builders.
pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
