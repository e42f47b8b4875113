//! Index writer: the only component that talks to the engine.
//!
//! Commands are executed immediately and never retried. `persist` is a
//! whole-index flush and belongs after a batch or event, not per document.

use std::sync::Arc;

use tracing::{debug, info};

use pressindex_types::{ConfigStore, Hooks, IndexSchema, PreparedDocument};

use crate::engine::{EngineCommand, IndexCommand, IndexEngine, IndexInfo};
use crate::error::SearchError;

/// Submits schema, document and maintenance commands to an engine.
pub struct IndexWriter {
    engine: Arc<dyn IndexEngine>,
    store: Arc<dyn ConfigStore>,
    hooks: Arc<Hooks>,
}

impl IndexWriter {
    pub fn new(
        engine: Arc<dyn IndexEngine>,
        store: Arc<dyn ConfigStore>,
        hooks: Arc<Hooks>,
    ) -> Self {
        Self {
            engine,
            store,
            hooks,
        }
    }

    /// Create (or replace) the index described by `schema`.
    pub fn create_index(&self, schema: &IndexSchema) -> Result<(), SearchError> {
        self.engine.execute(&EngineCommand::Create(schema.clone()))?;
        info!(index = %schema.index_name, fields = schema.len(), "Created index");
        self.hooks.index_created.fire(schema);
        Ok(())
    }

    /// Add or update one document. Field order is preserved.
    pub fn upsert(
        &self,
        index_name: &str,
        doc_id: u64,
        language: &str,
        fields: PreparedDocument,
        extra_params: Vec<String>,
    ) -> Result<(), SearchError> {
        let extra_params = self.hooks.extra_params.apply(extra_params, &());
        let command =
            IndexCommand::new(index_name, doc_id, language, fields).with_extra_params(extra_params);
        self.engine.execute(&EngineCommand::Add(command))?;
        debug!(index = index_name, post_id = doc_id, "Indexed document");
        Ok(())
    }

    /// Remove one document; `hard_delete` also reclaims its stored payload.
    pub fn delete(&self, index_name: &str, doc_id: u64, hard_delete: bool) -> Result<(), SearchError> {
        self.engine.execute(&EngineCommand::Delete {
            index_name: index_name.to_string(),
            doc_id,
            hard_delete,
        })?;
        debug!(index = index_name, post_id = doc_id, hard_delete, "Deleted document");
        Ok(())
    }

    /// Flush the engine's in-memory state to disk.
    pub fn persist(&self) -> Result<(), SearchError> {
        self.engine.execute(&EngineCommand::Save)?;
        info!("Persisted index to disk");
        Ok(())
    }

    /// Persist only if the write-to-disk option is set right now.
    ///
    /// Returns whether a persist was issued.
    pub fn persist_if_enabled(&self) -> Result<bool, SearchError> {
        if self.store.write_to_disk()? {
            self.persist()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Drop the index and forget its indexing progress.
    pub fn drop_index(&self, index_name: &str) -> Result<(), SearchError> {
        self.store.clear_progress(index_name)?;
        self.engine.execute(&EngineCommand::Drop {
            index_name: index_name.to_string(),
        })?;
        info!(index = index_name, "Dropped index");
        Ok(())
    }

    /// Engine statistics, `None` if the index does not exist.
    pub fn info(&self, index_name: &str) -> Result<Option<IndexInfo>, SearchError> {
        self.engine.info(index_name)
    }
}
