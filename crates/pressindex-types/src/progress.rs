//! Bulk indexing progress.
//!
//! The only state that survives between batch runs. Stored per index name so
//! that a restarted run resumes at the last committed offset.

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Offset into the eligible corpus and the corpus size seen by the last batch.
///
/// Invariant: `offset <= found_total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexingProgress {
    pub offset: u64,
    #[serde(alias = "found_posts")]
    pub found_total: u64,
}

impl IndexingProgress {
    pub fn new(offset: u64, found_total: u64) -> Self {
        Self {
            offset,
            found_total,
        }
        .clamped()
    }

    /// Storage key for an index's progress record.
    pub fn storage_key(index_name: &str) -> String {
        format!("index_meta:{}", index_name)
    }

    /// Apply the `offset <= found_total` invariant.
    pub fn clamped(mut self) -> Self {
        if self.offset > self.found_total {
            self.offset = self.found_total;
        }
        self
    }

    /// Record a fresh corpus count, clamping the offset if the corpus shrank.
    pub fn set_found_total(&mut self, found_total: u64) {
        self.found_total = found_total;
        *self = self.clamped();
    }

    /// Move past one batch. Advances by the page size, not the number of
    /// documents actually indexed.
    pub fn advance(&mut self, page_size: u64) {
        self.offset = self.offset.saturating_add(page_size);
        *self = self.clamped();
    }

    pub fn is_complete(&self) -> bool {
        self.offset >= self.found_total
    }

    pub fn remaining(&self) -> u64 {
        self.found_total.saturating_sub(self.offset)
    }

    /// Serialize to JSON bytes for storage
    pub fn to_bytes(&self) -> Result<Vec<u8>, TypesError> {
        serde_json::to_vec(self).map_err(TypesError::from)
    }

    /// Deserialize from JSON bytes, clamping on read
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        let progress: Self = serde_json::from_slice(bytes)?;
        Ok(progress.clamped())
    }
}

impl std::fmt::Display for IndexingProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.offset, self.found_total)
    }
}
