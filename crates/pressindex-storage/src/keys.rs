//! Key encoding for the storage layer.

/// Key for a progress record
/// Format: index_meta:{index_name}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressKey {
    pub index_name: String,
}

impl ProgressKey {
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        pressindex_types::IndexingProgress::storage_key(&self.index_name).into_bytes()
    }
}

/// Key for a runtime option
/// Format: option:{name}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionKey {
    pub name: String,
}

impl OptionKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!("option:{}", self.name).into_bytes()
    }
}
