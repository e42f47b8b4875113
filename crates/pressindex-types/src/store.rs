//! Configuration/progress store interface.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::TypesError;
use crate::progress::IndexingProgress;

/// Persistent options and per-index progress.
///
/// Values are read on every call; implementations must not cache them, since
/// an operator may change the write-to-disk flag between events.
pub trait ConfigStore: Send + Sync {
    fn load_progress(&self, index_name: &str) -> Result<Option<IndexingProgress>, TypesError>;

    fn save_progress(&self, index_name: &str, progress: &IndexingProgress)
        -> Result<(), TypesError>;

    fn clear_progress(&self, index_name: &str) -> Result<(), TypesError>;

    /// Whether the engine should be asked to persist after mutations.
    fn write_to_disk(&self) -> Result<bool, TypesError>;
}

/// Store kept in process memory, for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    progress: Mutex<HashMap<String, IndexingProgress>>,
    write_to_disk: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_write_to_disk(write_to_disk: bool) -> Self {
        let store = Self::new();
        store.set_write_to_disk(write_to_disk);
        store
    }

    pub fn set_write_to_disk(&self, enabled: bool) {
        self.write_to_disk.store(enabled, Ordering::SeqCst);
    }

    /// Peek at stored progress without going through the trait.
    pub fn progress(&self, index_name: &str) -> Option<IndexingProgress> {
        self.progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index_name)
            .copied()
    }
}

impl ConfigStore for MemoryStore {
    fn load_progress(&self, index_name: &str) -> Result<Option<IndexingProgress>, TypesError> {
        let progress = self
            .progress
            .lock()
            .map_err(|e| TypesError::Store(e.to_string()))?;
        Ok(progress.get(index_name).map(|p| p.clamped()))
    }

    fn save_progress(
        &self,
        index_name: &str,
        progress: &IndexingProgress,
    ) -> Result<(), TypesError> {
        self.progress
            .lock()
            .map_err(|e| TypesError::Store(e.to_string()))?
            .insert(index_name.to_string(), *progress);
        Ok(())
    }

    fn clear_progress(&self, index_name: &str) -> Result<(), TypesError> {
        self.progress
            .lock()
            .map_err(|e| TypesError::Store(e.to_string()))?
            .remove(index_name);
        Ok(())
    }

    fn write_to_disk(&self) -> Result<bool, TypesError> {
        Ok(self.write_to_disk.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load_progress("blog").unwrap().is_none());

        store
            .save_progress("blog", &IndexingProgress::new(20, 25))
            .unwrap();
        assert_eq!(
            store.load_progress("blog").unwrap(),
            Some(IndexingProgress::new(20, 25))
        );
        assert!(store.load_progress("other").unwrap().is_none());

        store.clear_progress("blog").unwrap();
        assert!(store.progress("blog").is_none());
    }

    #[test]
    fn test_write_to_disk_flag_is_live() {
        let store = MemoryStore::new();
        assert!(!store.write_to_disk().unwrap());
        store.set_write_to_disk(true);
        assert!(store.write_to_disk().unwrap());
    }
}
