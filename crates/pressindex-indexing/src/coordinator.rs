//! Batch indexing coordinator.
//!
//! Pages through eligible posts and indexes one page per call. The stored
//! [`IndexingProgress`] is the recovery checkpoint: it is saved only after
//! every engine call of the batch succeeded, so an interrupted batch is
//! simply repeated by the next call.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use pressindex_search::{
    build_schema, DocumentNormalizer, IndexEngine, IndexInfo, IndexWriter, SearchError,
};
use pressindex_types::{
    validate_index_name, ConfigStore, ContentRepository, DocumentIndexed, Hooks, IndexSchema,
    IndexingProgress, PostQuery, Settings, TypesError, RESERVED_POST_TYPES,
};

use crate::error::IndexingError;
use crate::guard::RunRegistry;
use crate::lifecycle::LifecycleAdapter;

/// What the coordinator indexes and how.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub index_name: String,
    pub page_size: usize,
    pub language: String,
    pub post_types: Vec<String>,
    pub indexable_taxonomies: Vec<String>,
    pub indexable_meta_keys: Vec<String>,
}

impl CoordinatorConfig {
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            page_size: 20,
            language: "english".to_string(),
            post_types: vec!["post".to_string()],
            indexable_taxonomies: Vec::new(),
            indexable_meta_keys: Vec::new(),
        }
    }

    /// Build from settings, validating them first.
    pub fn from_settings(settings: &Settings) -> Result<Self, IndexingError> {
        settings.validate().map_err(invalid_config)?;
        Ok(Self {
            index_name: settings.index_name(),
            page_size: settings.indexing_batches,
            language: settings.language.clone(),
            post_types: settings.indexable_post_types(),
            indexable_taxonomies: settings.indexable_taxonomies.clone(),
            indexable_meta_keys: settings.indexable_meta_keys.clone(),
        })
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_post_types(mut self, post_types: Vec<String>) -> Self {
        self.post_types = post_types;
        self
    }

    pub fn with_taxonomies(mut self, taxonomies: Vec<String>) -> Self {
        self.indexable_taxonomies = taxonomies;
        self
    }

    pub fn with_meta_keys(mut self, meta_keys: Vec<String>) -> Self {
        self.indexable_meta_keys = meta_keys;
        self
    }

    pub fn validate(&self) -> Result<(), IndexingError> {
        if self.page_size == 0 {
            return Err(IndexingError::InvalidConfiguration(
                "page size must be > 0".to_string(),
            ));
        }
        validate_index_name(&self.index_name).map_err(invalid_config)
    }
}

fn invalid_config(err: TypesError) -> IndexingError {
    match err {
        TypesError::InvalidConfiguration(msg) | TypesError::Config(msg) => {
            IndexingError::InvalidConfiguration(msg)
        }
        other => IndexingError::Types(other),
    }
}

/// Summary of one successful batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub progress: IndexingProgress,
    /// Documents submitted to the engine
    pub indexed: usize,
    /// Ids that no longer resolved or could not be normalized
    pub skipped: usize,
    /// Ids the index already held, typically from a repeated batch
    pub existing: usize,
    /// Whether the index was (re)created before this batch
    pub created_index: bool,
    /// Whether the engine was asked to persist after the batch
    pub persisted: bool,
}

/// Result of running batches until the corpus is covered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub batches: usize,
    pub indexed: usize,
    pub skipped: usize,
    pub existing: usize,
    pub progress: IndexingProgress,
    pub complete: bool,
}

/// Stored progress next to what the engine reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStatus {
    pub index_name: String,
    pub progress: Option<IndexingProgress>,
    /// `None` when the index does not exist
    pub num_docs: Option<u64>,
    /// Posts currently eligible for indexing
    pub eligible: u64,
}

/// Drives resumable, batched bulk indexing.
pub struct BatchCoordinator {
    config: CoordinatorConfig,
    repository: Arc<dyn ContentRepository>,
    store: Arc<dyn ConfigStore>,
    hooks: Arc<Hooks>,
    writer: Arc<IndexWriter>,
    normalizer: Arc<DocumentNormalizer>,
    runs: RunRegistry,
}

impl BatchCoordinator {
    pub fn new(
        config: CoordinatorConfig,
        repository: Arc<dyn ContentRepository>,
        engine: Arc<dyn IndexEngine>,
        store: Arc<dyn ConfigStore>,
        hooks: Arc<Hooks>,
    ) -> Self {
        let writer = Arc::new(IndexWriter::new(engine, store.clone(), hooks.clone()));
        let normalizer = Arc::new(DocumentNormalizer::new(
            repository.clone(),
            hooks.clone(),
            config.indexable_taxonomies.clone(),
            config.indexable_meta_keys.clone(),
        ));
        Self {
            config,
            repository,
            store,
            hooks,
            writer,
            normalizer,
            runs: RunRegistry::new(),
        }
    }

    /// Share a run registry with other coordinators of the same process.
    pub fn with_run_registry(mut self, runs: RunRegistry) -> Self {
        self.runs = runs;
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn index_name(&self) -> &str {
        &self.config.index_name
    }

    pub fn writer(&self) -> Arc<IndexWriter> {
        self.writer.clone()
    }

    pub fn run_registry(&self) -> RunRegistry {
        self.runs.clone()
    }

    /// Lifecycle adapter sharing this coordinator's writer and normalizer.
    pub fn lifecycle_adapter(&self) -> LifecycleAdapter {
        LifecycleAdapter::new(
            self.config.index_name.clone(),
            self.config.language.clone(),
            self.normalizer.clone(),
            self.writer.clone(),
            self.hooks.clone(),
        )
    }

    /// Schema for the current configuration and hooks.
    pub fn schema(&self) -> Result<IndexSchema, IndexingError> {
        Ok(build_schema(
            &self.config.index_name,
            &self.config.indexable_meta_keys,
            &self.config.indexable_taxonomies,
            &self.hooks,
        )?)
    }

    /// Effective page size after the `page_size` hook.
    pub fn page_size(&self) -> Result<usize, IndexingError> {
        let page_size = self.hooks.page_size.apply(self.config.page_size, &());
        if page_size == 0 {
            return Err(IndexingError::InvalidConfiguration(
                "page size must be > 0".to_string(),
            ));
        }
        Ok(page_size)
    }

    /// Eligible post types after the `indexable_post_types` hook, reserved
    /// types removed.
    pub fn post_types(&self) -> Vec<String> {
        self.hooks
            .indexable_post_types
            .apply(self.config.post_types.clone(), &())
            .into_iter()
            .filter(|t| !RESERVED_POST_TYPES.contains(&t.as_str()))
            .collect()
    }

    fn page_query(&self, limit: usize, offset: u64) -> PostQuery {
        let query = PostQuery::published(self.post_types(), limit, offset);
        self.hooks.post_query.apply(query, &())
    }

    /// Index one page and return the new progress.
    pub fn run_batch(&self) -> Result<IndexingProgress, IndexingError> {
        self.run_batch_report().map(|report| report.progress)
    }

    /// Index one page and return what happened.
    pub fn run_batch_report(&self) -> Result<BatchReport, IndexingError> {
        let index_name = self.config.index_name.as_str();
        validate_index_name(index_name).map_err(invalid_config)?;
        let page_size = self.page_size()?;

        let _run = self
            .runs
            .try_acquire(index_name)
            .ok_or_else(|| IndexingError::BatchInProgress(index_name.to_string()))?;

        let mut progress = self
            .store
            .load_progress(index_name)?
            .unwrap_or_default()
            .clamped();

        let created_index = self.ensure_index(&mut progress)?;

        let query = self.page_query(page_size, progress.offset);
        let page = self.repository.query_posts(&query)?;
        let batch_offset = progress.offset;
        progress.set_found_total(page.found_total);

        info!(
            index = index_name,
            offset = batch_offset,
            found_total = page.found_total,
            page = page.post_ids.len(),
            "Starting batch"
        );

        let mut report = BatchReport {
            created_index,
            ..Default::default()
        };

        for &post_id in &page.post_ids {
            let post = match self.normalizer.fetch(post_id) {
                Ok(post) => post,
                Err(SearchError::DocumentNotFound(_)) => {
                    warn!(index = index_name, post_id, "Post vanished during batch, skipping");
                    report.skipped += 1;
                    continue;
                }
                Err(e) => return Err(self.aborted(batch_offset, report.indexed, e)),
            };

            let fields = match self.normalizer.prepare_post(&post) {
                Ok(fields) => fields,
                Err(e) => {
                    warn!(index = index_name, post_id, error = %e, "Failed to prepare post, skipping");
                    report.skipped += 1;
                    continue;
                }
            };

            let language = self.hooks.language.apply(self.config.language.clone(), &post_id);

            match self
                .writer
                .upsert(index_name, post_id, &language, fields.clone(), Vec::new())
            {
                Ok(()) => report.indexed += 1,
                Err(SearchError::DocumentExists(_)) => {
                    debug!(index = index_name, post_id, "Already indexed, leaving as is");
                    report.existing += 1;
                    continue;
                }
                Err(e) => return Err(self.aborted(batch_offset, report.indexed, e)),
            }

            self.hooks.document_indexed.fire(&DocumentIndexed {
                index_name: index_name.to_string(),
                post_id,
                language,
                fields,
            });
        }

        progress.advance(page_size as u64);
        self.store.save_progress(index_name, &progress)?;

        if report.indexed > 0 {
            report.persisted = self.writer.persist_if_enabled().map_err(|source| {
                warn!(
                    index = index_name,
                    offset = progress.offset,
                    error = %source,
                    "Persist failed after progress was saved"
                );
                IndexingError::PersistFailed { progress, source }
            })?;
        }

        info!(
            index = index_name,
            offset = progress.offset,
            found_total = progress.found_total,
            indexed = report.indexed,
            skipped = report.skipped,
            "Batch complete"
        );

        report.progress = progress;
        Ok(report)
    }

    fn aborted(&self, offset: u64, indexed: usize, source: SearchError) -> IndexingError {
        warn!(
            index = %self.config.index_name,
            offset,
            indexed,
            error = %source,
            "Batch aborted, progress not advanced"
        );
        IndexingError::BatchAborted {
            offset,
            indexed,
            source,
        }
    }

    /// Create the index when it is missing or holds no documents, restarting
    /// progress from offset 0. Returns whether it was created.
    fn ensure_index(&self, progress: &mut IndexingProgress) -> Result<bool, IndexingError> {
        let index_name = self.config.index_name.as_str();
        let info = self.writer.info(index_name)?;

        let rebuild = match info {
            None => true,
            Some(IndexInfo { num_docs }) => num_docs == 0,
        };
        if !rebuild {
            return Ok(false);
        }

        if progress.offset > 0 {
            let reason = if info.is_none() { "missing" } else { "empty" };
            info!(
                index = index_name,
                offset = progress.offset,
                reason,
                "Index {}, restarting from offset 0",
                reason
            );
        }

        let schema = self.schema()?;
        *progress = IndexingProgress::default();
        self.store.clear_progress(index_name)?;
        self.writer.create_index(&schema)?;
        debug!(index = index_name, fields = schema.len(), "Index ready");
        Ok(true)
    }

    /// Run batches until the offset reaches the corpus size, or until
    /// `max_batches` batches ran.
    pub fn run_until_complete(&self, max_batches: Option<usize>) -> Result<RunSummary, IndexingError> {
        let mut summary = RunSummary::default();

        loop {
            if max_batches.is_some_and(|max| summary.batches >= max) {
                break;
            }

            let report = self.run_batch_report()?;
            summary.batches += 1;
            summary.indexed += report.indexed;
            summary.skipped += report.skipped;
            summary.existing += report.existing;
            summary.progress = report.progress;

            if report.progress.is_complete() {
                summary.complete = true;
                break;
            }

            // Rebuilt mid-run: the earlier batches left nothing in the engine.
            if report.created_index && summary.batches > 1 {
                warn!(
                    index = %self.config.index_name,
                    batches = summary.batches,
                    "Index emptied during run, stopping"
                );
                break;
            }
        }

        info!(
            index = %self.config.index_name,
            batches = summary.batches,
            indexed = summary.indexed,
            complete = summary.complete,
            "Run finished"
        );
        Ok(summary)
    }

    /// Stored progress, engine document count and eligible post count.
    pub fn status(&self) -> Result<IndexStatus, IndexingError> {
        let index_name = self.config.index_name.as_str();
        let progress = self.store.load_progress(index_name)?;
        let num_docs = self.writer.info(index_name)?.map(|info| info.num_docs);
        let eligible = self.repository.query_posts(&self.page_query(0, 0))?.found_total;

        Ok(IndexStatus {
            index_name: index_name.to_string(),
            progress,
            num_docs,
            eligible,
        })
    }

    /// Drop the index and its progress, then run the first batch.
    pub fn reindex(&self) -> Result<BatchReport, IndexingError> {
        let index_name = self.config.index_name.as_str();
        if self.runs.is_running(index_name) {
            return Err(IndexingError::BatchInProgress(index_name.to_string()));
        }

        if self.writer.info(index_name)?.is_some() {
            self.writer.drop_index(index_name)?;
        } else {
            debug!(index = index_name, "No index to drop");
            self.store.clear_progress(index_name)?;
        }

        self.run_batch_report()
    }

    /// Drop the index and forget its progress.
    pub fn drop_index(&self) -> Result<(), IndexingError> {
        Ok(self.writer.drop_index(&self.config.index_name)?)
    }
}
