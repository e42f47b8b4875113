//! RocksDB wrapper for pressindex options and progress.
//!
//! Provides:
//! - Database open with column family setup
//! - Per-index progress records (JSON)
//! - Runtime option flags, read from disk on every call

use rocksdb::{Options, DB};
use std::path::Path;
use tracing::{debug, info};

use pressindex_types::{ConfigStore, IndexingProgress, TypesError};

use crate::column_families::{build_cf_descriptors, CF_OPTIONS, CF_PROGRESS};
use crate::error::StorageError;
use crate::keys::{OptionKey, ProgressKey};

/// Option name for the persist-after-mutation flag
pub const OPTION_WRITE_TO_DISK: &str = "write_to_disk";

/// Main storage interface for pressindex
pub struct Storage {
    db: DB,
    /// Used when the write-to-disk option was never stored
    write_to_disk_default: bool,
}

impl Storage {
    /// Open storage at the given path, creating if necessary
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening storage at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let db = DB::open_cf_descriptors(&db_opts, path, build_cf_descriptors())?;

        Ok(Self {
            db,
            write_to_disk_default: false,
        })
    }

    /// Set the write-to-disk value reported while no option is stored.
    pub fn with_write_to_disk_default(mut self, enabled: bool) -> Self {
        self.write_to_disk_default = enabled;
        self
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StorageError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(name.to_string()))
    }

    // ==================== Progress Methods ====================

    /// Store progress for an index
    pub fn put_progress(
        &self,
        index_name: &str,
        progress: &IndexingProgress,
    ) -> Result<(), StorageError> {
        let cf = self.cf(CF_PROGRESS)?;
        let key = ProgressKey::new(index_name);
        self.db.put_cf(cf, key.to_bytes(), progress.to_bytes()?)?;
        debug!(index = index_name, offset = progress.offset, found_total = progress.found_total, "Saved progress");
        Ok(())
    }

    /// Get progress for an index, clamped to its invariant
    pub fn get_progress(&self, index_name: &str) -> Result<Option<IndexingProgress>, StorageError> {
        let cf = self.cf(CF_PROGRESS)?;
        let key = ProgressKey::new(index_name);
        match self.db.get_cf(cf, key.to_bytes())? {
            Some(bytes) => Ok(Some(IndexingProgress::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Delete progress for an index
    pub fn delete_progress(&self, index_name: &str) -> Result<(), StorageError> {
        let cf = self.cf(CF_PROGRESS)?;
        self.db.delete_cf(cf, ProgressKey::new(index_name).to_bytes())?;
        debug!(index = index_name, "Cleared progress");
        Ok(())
    }

    // ==================== Option Methods ====================

    /// Store a raw option value
    pub fn put_option(&self, name: &str, value: &[u8]) -> Result<(), StorageError> {
        let cf = self.cf(CF_OPTIONS)?;
        self.db.put_cf(cf, OptionKey::new(name).to_bytes(), value)?;
        Ok(())
    }

    /// Get a raw option value
    pub fn get_option(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let cf = self.cf(CF_OPTIONS)?;
        Ok(self.db.get_cf(cf, OptionKey::new(name).to_bytes())?)
    }

    /// Delete an option, restoring its default
    pub fn delete_option(&self, name: &str) -> Result<(), StorageError> {
        let cf = self.cf(CF_OPTIONS)?;
        self.db.delete_cf(cf, OptionKey::new(name).to_bytes())?;
        Ok(())
    }

    /// Persist the write-to-disk flag
    pub fn set_write_to_disk(&self, enabled: bool) -> Result<(), StorageError> {
        let value: &[u8] = if enabled { b"1" } else { b"0" };
        self.put_option(OPTION_WRITE_TO_DISK, value)?;
        info!(enabled, "Updated write_to_disk option");
        Ok(())
    }

    /// Current write-to-disk flag; stored value wins over the default
    pub fn get_write_to_disk(&self) -> Result<bool, StorageError> {
        Ok(match self.get_option(OPTION_WRITE_TO_DISK)? {
            Some(bytes) => bytes.as_slice() == b"1",
            None => self.write_to_disk_default,
        })
    }
}

impl ConfigStore for Storage {
    fn load_progress(&self, index_name: &str) -> Result<Option<IndexingProgress>, TypesError> {
        Ok(self.get_progress(index_name)?)
    }

    fn save_progress(
        &self,
        index_name: &str,
        progress: &IndexingProgress,
    ) -> Result<(), TypesError> {
        Ok(self.put_progress(index_name, progress)?)
    }

    fn clear_progress(&self, index_name: &str) -> Result<(), TypesError> {
        Ok(self.delete_progress(index_name)?)
    }

    fn write_to_disk(&self) -> Result<bool, TypesError> {
        Ok(self.get_write_to_disk()?)
    }
}
