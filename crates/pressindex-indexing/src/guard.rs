//! Single-flight guard for batch runs.
//!
//! At most one batch per index name runs at a time. A second caller is
//! rejected rather than queued; the external trigger retries later.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Registry of index names with a batch in flight.
///
/// Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct RunRegistry {
    running: Arc<Mutex<HashSet<String>>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `index_name` as running.
    ///
    /// Returns `None` if a run for the same name is already active.
    pub fn try_acquire(&self, index_name: &str) -> Option<RunGuard> {
        let mut running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if running.insert(index_name.to_string()) {
            Some(RunGuard {
                running: self.running.clone(),
                index_name: index_name.to_string(),
            })
        } else {
            None
        }
    }

    pub fn is_running(&self, index_name: &str) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(index_name)
    }
}

/// RAII guard that releases the index name when dropped, including on panic.
#[derive(Debug)]
pub struct RunGuard {
    running: Arc<Mutex<HashSet<String>>>,
    index_name: String,
}

impl RunGuard {
    pub fn index_name(&self) -> &str {
        &self.index_name
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.index_name);
    }
}
