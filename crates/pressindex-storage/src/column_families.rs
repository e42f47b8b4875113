//! Column family definitions for RocksDB.
//!
//! - progress: bulk indexing progress, one record per index name
//! - options: operator-editable flags read on every event

use rocksdb::{ColumnFamilyDescriptor, Options};

/// Column family name for indexing progress records
pub const CF_PROGRESS: &str = "progress";

/// Column family name for runtime options
pub const CF_OPTIONS: &str = "options";

/// All column family names
pub const ALL_CF_NAMES: &[&str] = &[CF_PROGRESS, CF_OPTIONS];

/// Build all column family descriptors
pub fn build_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    vec![
        ColumnFamilyDescriptor::new(CF_PROGRESS, Options::default()),
        ColumnFamilyDescriptor::new(CF_OPTIONS, Options::default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptors_cover_all_names() {
        assert_eq!(build_cf_descriptors().len(), ALL_CF_NAMES.len());
    }
}
