//! Index engine commands and the engine trait.
//!
//! Commands follow the RediSearch 1.x dialect:
//! - `FT.CREATE idx SCHEMA field TYPE ...`
//! - `FT.ADD idx id score LANGUAGE lang [flags...] FIELDS name value ...`
//! - `FT.DEL idx id [DD]`
//! - `SAVE`
//! - `FT.DROP idx`

use pressindex_types::{IndexSchema, PreparedDocument};

use crate::error::SearchError;

/// Default document score on add.
pub const DEFAULT_SCORE: f64 = 1.0;

/// Flag asking the engine to overwrite an existing document.
pub const REPLACE_FLAG: &str = "REPLACE";

/// A single add/update request.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexCommand {
    pub index_name: String,
    pub doc_id: u64,
    pub score: f64,
    pub language: String,
    pub extra_params: Vec<String>,
    pub fields: PreparedDocument,
}

impl IndexCommand {
    pub fn new(
        index_name: impl Into<String>,
        doc_id: u64,
        language: impl Into<String>,
        fields: PreparedDocument,
    ) -> Self {
        Self {
            index_name: index_name.into(),
            doc_id,
            score: DEFAULT_SCORE,
            language: language.into(),
            extra_params: Vec::new(),
            fields,
        }
    }

    pub fn with_extra_params(mut self, extra_params: Vec<String>) -> Self {
        self.extra_params = extra_params;
        self
    }

    /// Whether the command overwrites an existing document.
    pub fn is_replace(&self) -> bool {
        self.extra_params
            .iter()
            .any(|p| p.eq_ignore_ascii_case(REPLACE_FLAG))
    }
}

/// Mutating commands understood by an index engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    Create(IndexSchema),
    Add(IndexCommand),
    Delete {
        index_name: String,
        doc_id: u64,
        hard_delete: bool,
    },
    Save,
    Drop {
        index_name: String,
    },
}

impl EngineCommand {
    /// Command keyword.
    pub fn name(&self) -> &'static str {
        match self {
            EngineCommand::Create(_) => "FT.CREATE",
            EngineCommand::Add(_) => "FT.ADD",
            EngineCommand::Delete { .. } => "FT.DEL",
            EngineCommand::Save => "SAVE",
            EngineCommand::Drop { .. } => "FT.DROP",
        }
    }

    /// Positional arguments, without the keyword.
    pub fn args(&self) -> Vec<String> {
        match self {
            EngineCommand::Create(schema) => {
                let mut args = vec![schema.index_name.clone(), "SCHEMA".to_string()];
                for field in &schema.fields {
                    args.extend(field.to_args());
                }
                args
            }
            EngineCommand::Add(cmd) => {
                let mut args = vec![
                    cmd.index_name.clone(),
                    cmd.doc_id.to_string(),
                    cmd.score.to_string(),
                    "LANGUAGE".to_string(),
                    cmd.language.clone(),
                ];
                args.extend(cmd.extra_params.iter().cloned());
                args.push("FIELDS".to_string());
                args.extend(cmd.fields.to_args());
                args
            }
            EngineCommand::Delete {
                index_name,
                doc_id,
                hard_delete,
            } => {
                let mut args = vec![index_name.clone(), doc_id.to_string()];
                if *hard_delete {
                    args.push("DD".to_string());
                }
                args
            }
            EngineCommand::Save => Vec::new(),
            EngineCommand::Drop { index_name } => vec![index_name.clone()],
        }
    }

    /// Keyword and arguments as one line, for logs and dry runs.
    pub fn render(&self) -> String {
        let mut parts = vec![self.name().to_string()];
        parts.extend(self.args());
        parts.join(" ")
    }
}

/// Subset of index statistics the indexer relies on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexInfo {
    pub num_docs: u64,
}

/// A search engine that executes index commands.
///
/// Calls block until the engine replies. Implementations must not retry.
pub trait IndexEngine: Send + Sync {
    /// Execute one mutating command.
    fn execute(&self, command: &EngineCommand) -> Result<(), SearchError>;

    /// Statistics for an index, or `None` if it does not exist.
    fn info(&self, index_name: &str) -> Result<Option<IndexInfo>, SearchError>;
}
