//! Lifecycle adapter: keeps the index in step with single post edits.
//!
//! - Revisions and autosaves are ignored
//! - A saved, published post is upserted with replace semantics
//! - Anything else (unpublished, trashed, deleted) is hard-deleted
//!
//! Each mutation is followed by a persist when the write-to-disk option is
//! set at the time of the event.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pressindex_search::{DocumentNormalizer, IndexWriter, REPLACE_FLAG};
use pressindex_types::{DocumentDeleted, DocumentIndexed, Hooks};

use crate::error::IndexingError;

/// What happened to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostEventKind {
    /// Created or updated; the post's status decides the action
    Saved,
    /// Removed from the repository
    Deleted,
}

/// A single post lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEvent {
    pub post_id: u64,
    pub kind: PostEventKind,
    #[serde(default)]
    pub is_revision: bool,
    #[serde(default)]
    pub is_autosave: bool,
}

impl PostEvent {
    pub fn saved(post_id: u64) -> Self {
        Self {
            post_id,
            kind: PostEventKind::Saved,
            is_revision: false,
            is_autosave: false,
        }
    }

    pub fn deleted(post_id: u64) -> Self {
        Self {
            kind: PostEventKind::Deleted,
            ..Self::saved(post_id)
        }
    }

    pub fn revision(post_id: u64) -> Self {
        Self {
            is_revision: true,
            ..Self::saved(post_id)
        }
    }

    pub fn autosave(post_id: u64) -> Self {
        Self {
            is_autosave: true,
            ..Self::saved(post_id)
        }
    }

    /// Events for non-canonical content.
    pub fn is_ignorable(&self) -> bool {
        self.is_revision || self.is_autosave
    }
}

/// Result of handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum LifecycleOutcome {
    Ignored,
    Indexed { persisted: bool },
    Removed { persisted: bool },
}

/// Translates post events into index commands.
pub struct LifecycleAdapter {
    index_name: String,
    language: String,
    normalizer: Arc<DocumentNormalizer>,
    writer: Arc<IndexWriter>,
    hooks: Arc<Hooks>,
}

impl LifecycleAdapter {
    pub fn new(
        index_name: String,
        language: String,
        normalizer: Arc<DocumentNormalizer>,
        writer: Arc<IndexWriter>,
        hooks: Arc<Hooks>,
    ) -> Self {
        Self {
            index_name,
            language,
            normalizer,
            writer,
            hooks,
        }
    }

    pub fn handle(&self, event: &PostEvent) -> Result<LifecycleOutcome, IndexingError> {
        if event.is_ignorable() {
            debug!(post_id = event.post_id, "Ignoring revision/autosave");
            return Ok(LifecycleOutcome::Ignored);
        }

        match event.kind {
            PostEventKind::Saved => {
                let post = self.normalizer.fetch(event.post_id)?;
                if post.status.is_published() {
                    let fields = self.normalizer.prepare_post(&post)?;
                    let language = self
                        .hooks
                        .language
                        .apply(self.language.clone(), &event.post_id);

                    self.writer.upsert(
                        &self.index_name,
                        event.post_id,
                        &language,
                        fields.clone(),
                        vec![REPLACE_FLAG.to_string()],
                    )?;
                    self.hooks.document_published.fire(&DocumentIndexed {
                        index_name: self.index_name.clone(),
                        post_id: event.post_id,
                        language,
                        fields,
                    });

                    let persisted = self.writer.persist_if_enabled()?;
                    info!(index = %self.index_name, post_id = event.post_id, "Post published to index");
                    Ok(LifecycleOutcome::Indexed { persisted })
                } else {
                    debug!(post_id = event.post_id, status = post.status.as_str(), "Post not published");
                    self.remove(event.post_id)
                }
            }
            PostEventKind::Deleted => self.remove(event.post_id),
        }
    }

    fn remove(&self, post_id: u64) -> Result<LifecycleOutcome, IndexingError> {
        self.writer.delete(&self.index_name, post_id, true)?;
        self.hooks.document_deleted.fire(&DocumentDeleted {
            index_name: self.index_name.clone(),
            post_id,
        });

        let persisted = self.writer.persist_if_enabled()?;
        info!(index = %self.index_name, post_id, "Post removed from index");
        Ok(LifecycleOutcome::Removed { persisted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{BatchCoordinator, CoordinatorConfig};
    use pressindex_search::{EngineCommand, MemoryEngine, SearchError};
    use pressindex_types::{InMemoryRepository, MemoryStore, Post, PostStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixture {
        repo: Arc<InMemoryRepository>,
        engine: Arc<MemoryEngine>,
        store: Arc<MemoryStore>,
        adapter: LifecycleAdapter,
    }

    fn fixture_with(hooks: Hooks) -> Fixture {
        let repo = Arc::new(InMemoryRepository::with_posts(vec![
            Post::new(1, "Published"),
            Post::new(2, "Draft").with_status(PostStatus::Draft),
        ]));
        let engine = Arc::new(MemoryEngine::new());
        let store = Arc::new(MemoryStore::new());
        let coordinator = BatchCoordinator::new(
            CoordinatorConfig::new("blog"),
            repo.clone(),
            engine.clone(),
            store.clone(),
            Arc::new(hooks),
        );
        coordinator.run_batch().unwrap();
        engine.clear_history();

        let adapter = coordinator.lifecycle_adapter();
        Fixture {
            repo,
            engine,
            store,
            adapter,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Hooks::new())
    }

    #[test]
    fn test_revision_and_autosave_ignored() {
        let fx = fixture();
        for event in [PostEvent::revision(1), PostEvent::autosave(1)] {
            assert_eq!(fx.adapter.handle(&event).unwrap(), LifecycleOutcome::Ignored);
        }
        assert!(fx.engine.history().is_empty());
    }

    #[test]
    fn test_publish_upserts_with_replace() {
        let fx = fixture();
        fx.repo.insert(Post::new(1, "Published, edited"));

        let outcome = fx.adapter.handle(&PostEvent::saved(1)).unwrap();
        assert_eq!(outcome, LifecycleOutcome::Indexed { persisted: false });

        let history = fx.engine.history();
        assert_eq!(history.len(), 1);
        match &history[0] {
            EngineCommand::Add(add) => {
                assert!(add.is_replace());
                assert_eq!(add.doc_id, 1);
            }
            other => panic!("expected add, got {:?}", other),
        }
        assert_eq!(fx.engine.num_docs("blog"), 1);
    }

    #[test]
    fn test_publish_twice_keeps_one_document() {
        let fx = fixture();
        fx.repo.insert(Post::new(5, "New"));
        fx.adapter.handle(&PostEvent::saved(5)).unwrap();
        fx.adapter.handle(&PostEvent::saved(5)).unwrap();
        assert_eq!(fx.engine.document_ids("blog"), vec![1, 5]);
    }

    #[test]
    fn test_unpublish_deletes_once() {
        let fx = fixture();
        fx.repo
            .insert(Post::new(1, "Published").with_status(PostStatus::Private));

        let outcome = fx.adapter.handle(&PostEvent::saved(1)).unwrap();
        assert_eq!(outcome, LifecycleOutcome::Removed { persisted: false });

        let history = fx.engine.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].render(), "FT.DEL blog 1 DD");
        assert_eq!(fx.engine.num_docs("blog"), 0);
    }

    #[test]
    fn test_deleted_event_removes_even_if_post_gone() {
        let fx = fixture();
        fx.repo.remove(1);
        let outcome = fx.adapter.handle(&PostEvent::deleted(1)).unwrap();
        assert!(matches!(outcome, LifecycleOutcome::Removed { .. }));
    }

    #[test]
    fn test_missing_post_aborts_event() {
        let fx = fixture();
        let err = fx.adapter.handle(&PostEvent::saved(99)).unwrap_err();
        assert!(matches!(
            err,
            IndexingError::Search(SearchError::DocumentNotFound(99))
        ));
        assert!(fx.engine.history().is_empty());
    }

    #[test]
    fn test_write_to_disk_checked_per_event() {
        let fx = fixture();

        fx.adapter.handle(&PostEvent::saved(1)).unwrap();
        assert_eq!(fx.engine.save_count(), 0);

        fx.store.set_write_to_disk(true);
        let outcome = fx.adapter.handle(&PostEvent::saved(1)).unwrap();
        assert_eq!(outcome, LifecycleOutcome::Indexed { persisted: true });

        let outcome = fx.adapter.handle(&PostEvent::deleted(1)).unwrap();
        assert_eq!(outcome, LifecycleOutcome::Removed { persisted: true });
        assert_eq!(fx.engine.save_count(), 2);
    }

    #[test]
    fn test_actions_fire() {
        let published = Arc::new(AtomicUsize::new(0));
        let deleted = Arc::new(AtomicUsize::new(0));
        let mut hooks = Hooks::new();
        let p = published.clone();
        hooks.document_published.add(move |_: &DocumentIndexed| {
            p.fetch_add(1, Ordering::SeqCst);
        });
        let d = deleted.clone();
        hooks.document_deleted.add(move |event: &DocumentDeleted| {
            assert_eq!(event.post_id, 2);
            d.fetch_add(1, Ordering::SeqCst);
        });

        let fx = fixture_with(hooks);
        fx.adapter.handle(&PostEvent::saved(1)).unwrap();
        fx.adapter.handle(&PostEvent::saved(2)).unwrap();

        assert_eq!(published.load(Ordering::SeqCst), 1);
        assert_eq!(deleted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_event_from_json() {
        let event: PostEvent = serde_json::from_str(r#"{"post_id": 4, "kind": "deleted"}"#).unwrap();
        assert_eq!(event, PostEvent::deleted(4));
    }
}
