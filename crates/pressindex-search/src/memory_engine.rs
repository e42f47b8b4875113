//! In-memory index engine.
//!
//! Keeps documents per index and a full command history. Used by tests and
//! by the CLI's `--dry-run` mode.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use pressindex_types::{IndexSchema, PreparedDocument};

use crate::engine::{EngineCommand, IndexEngine, IndexInfo};
use crate::error::SearchError;

#[derive(Debug, Default)]
struct MemoryIndex {
    schema: Option<IndexSchema>,
    documents: BTreeMap<u64, PreparedDocument>,
}

#[derive(Debug, Default)]
struct EngineState {
    indexes: HashMap<String, MemoryIndex>,
    history: Vec<EngineCommand>,
    saves: usize,
    /// Fail every command once this many more have succeeded
    fail_after: Option<usize>,
}

/// Engine that holds everything in process memory.
///
/// Mirrors RediSearch 1.x behavior closely enough for indexing logic:
/// - `FT.ADD` without `REPLACE` on an existing id is rejected
/// - `FT.ADD`/`FT.DEL` against a missing index is rejected
/// - `FT.DROP` of a missing index is rejected
#[derive(Debug, Default)]
pub struct MemoryEngine {
    state: Mutex<EngineState>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Let `successes` more commands through, then fail every command.
    pub fn fail_after(&self, successes: usize) {
        self.lock().fail_after = Some(successes);
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        self.lock().fail_after = None;
    }

    /// Every command executed successfully, in order.
    pub fn history(&self) -> Vec<EngineCommand> {
        self.lock().history.clone()
    }

    pub fn clear_history(&self) {
        self.lock().history.clear();
    }

    /// Number of `SAVE` commands executed.
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    pub fn has_index(&self, index_name: &str) -> bool {
        self.lock().indexes.contains_key(index_name)
    }

    pub fn schema(&self, index_name: &str) -> Option<IndexSchema> {
        self.lock()
            .indexes
            .get(index_name)
            .and_then(|idx| idx.schema.clone())
    }

    pub fn document(&self, index_name: &str, doc_id: u64) -> Option<PreparedDocument> {
        self.lock()
            .indexes
            .get(index_name)
            .and_then(|idx| idx.documents.get(&doc_id).cloned())
    }

    /// Ids of stored documents in ascending order.
    pub fn document_ids(&self, index_name: &str) -> Vec<u64> {
        self.lock()
            .indexes
            .get(index_name)
            .map(|idx| idx.documents.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn num_docs(&self, index_name: &str) -> u64 {
        self.lock()
            .indexes
            .get(index_name)
            .map_or(0, |idx| idx.documents.len() as u64)
    }
}

impl IndexEngine for MemoryEngine {
    fn execute(&self, command: &EngineCommand) -> Result<(), SearchError> {
        let mut state = self.lock();

        if let Some(remaining) = state.fail_after {
            if remaining == 0 {
                return Err(SearchError::Engine(format!(
                    "injected failure on {}",
                    command.name()
                )));
            }
            state.fail_after = Some(remaining - 1);
        }

        match command {
            EngineCommand::Create(schema) => {
                state.indexes.insert(
                    schema.index_name.clone(),
                    MemoryIndex {
                        schema: Some(schema.clone()),
                        documents: BTreeMap::new(),
                    },
                );
            }
            EngineCommand::Add(cmd) => {
                let index = state
                    .indexes
                    .get_mut(&cmd.index_name)
                    .ok_or_else(|| SearchError::Engine("Unknown index name".to_string()))?;
                if index.documents.contains_key(&cmd.doc_id) && !cmd.is_replace() {
                    return Err(SearchError::DocumentExists(cmd.doc_id));
                }
                index.documents.insert(cmd.doc_id, cmd.fields.clone());
            }
            EngineCommand::Delete {
                index_name, doc_id, ..
            } => {
                let index = state
                    .indexes
                    .get_mut(index_name)
                    .ok_or_else(|| SearchError::Engine("Unknown index name".to_string()))?;
                index.documents.remove(doc_id);
            }
            EngineCommand::Save => {
                state.saves += 1;
            }
            EngineCommand::Drop { index_name } => {
                if state.indexes.remove(index_name).is_none() {
                    return Err(SearchError::Engine("Unknown Index name".to_string()));
                }
            }
        }

        debug!(command = command.name(), "Memory engine executed command");
        state.history.push(command.clone());
        Ok(())
    }

    fn info(&self, index_name: &str) -> Result<Option<IndexInfo>, SearchError> {
        let state = self.lock();
        if let Some(0) = state.fail_after {
            return Err(SearchError::Engine("injected failure on FT.INFO".to_string()));
        }
        Ok(state.indexes.get(index_name).map(|idx| IndexInfo {
            num_docs: idx.documents.len() as u64,
        }))
    }
}
