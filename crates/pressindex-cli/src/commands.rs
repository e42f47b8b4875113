//! Command implementations for pressindex.
//!
//! Handles:
//! - index/resume/reindex: drive the batch coordinator
//! - status/drop/persist: inspect and maintain the index
//! - publish/delete: single-post lifecycle events
//! - schema/write-to-disk: configuration helpers

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use pressindex_indexing::{
    BatchCoordinator, BatchReport, CoordinatorConfig, LifecycleOutcome, PostEvent, RunSummary,
};
use pressindex_search::{build_schema, EngineCommand, IndexEngine, MemoryEngine, RedisEngine};
use pressindex_storage::{JsonCorpus, Storage};
use pressindex_types::{
    ConfigStore, ContentRepository, Hooks, InMemoryRepository, MemoryStore, Settings,
};

use crate::cli::{Cli, Commands};

/// Load settings and apply CLI overrides (highest precedence).
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(log_level) = &cli.log_level {
        settings.log_level = log_level.clone();
    }
    if let Some(db_path) = &cli.db_path {
        settings.db_path = db_path.clone();
    }
    if let Some(corpus) = &cli.corpus {
        settings.corpus_path = Some(corpus.clone());
    }

    Ok(settings)
}

/// Initialize logging on stderr. `RUST_LOG` wins over the configured level.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Entry point used by the binary.
pub fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(&cli)?;
    init_logging(&settings.log_level)?;

    let output = match &cli.command {
        Commands::Schema => show_schema(&settings)?,
        Commands::WriteToDisk { state } => {
            if cli.dry_run {
                bail!("write-to-disk changes a stored option and cannot run with --dry-run");
            }
            set_write_to_disk(&settings, state.enabled())?
        }
        command => {
            let runtime = Runtime::open(settings, cli.dry_run)?;
            let mut output = runtime.execute(command)?;
            for line in runtime.dry_run_log() {
                output.push_str("\n[dry-run] ");
                output.push_str(&line);
            }
            output
        }
    };

    println!("{}", output);
    Ok(())
}

/// Print the `FT.CREATE` command for the configured schema.
pub fn show_schema(settings: &Settings) -> Result<String> {
    settings.validate().context("Invalid configuration")?;
    let schema = build_schema(
        &settings.index_name(),
        &settings.indexable_meta_keys,
        &settings.indexable_taxonomies,
        &Hooks::new(),
    )?;
    Ok(EngineCommand::Create(schema).render())
}

/// Store the write-to-disk option.
pub fn set_write_to_disk(settings: &Settings, enabled: bool) -> Result<String> {
    let storage = open_storage(settings)?;
    storage.set_write_to_disk(enabled)?;
    info!(enabled, "Stored write_to_disk option");
    Ok(format!(
        "write_to_disk = {}",
        if enabled { "on" } else { "off" }
    ))
}

fn open_storage(settings: &Settings) -> Result<Storage> {
    let db_path = settings.expanded_db_path();
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    let storage = Storage::open(&db_path)
        .context("Failed to open storage")?
        .with_write_to_disk_default(settings.write_to_disk);
    Ok(storage)
}

fn open_corpus(path: &str) -> Result<JsonCorpus> {
    JsonCorpus::open(Path::new(path)).with_context(|| format!("Failed to load corpus {}", path))
}

/// Wired collaborators for one CLI invocation.
pub struct Runtime {
    settings: Settings,
    coordinator: BatchCoordinator,
    /// Set in dry-run mode; every command goes here instead of the engine
    dry_run_engine: Option<Arc<MemoryEngine>>,
}

impl Runtime {
    /// Wire the configured corpus, storage and engine.
    ///
    /// Dry runs use an in-memory engine and store, so neither the engine
    /// nor the database is touched.
    pub fn open(settings: Settings, dry_run: bool) -> Result<Self> {
        let repository: Arc<dyn ContentRepository> = match settings.corpus_path.as_deref() {
            Some(path) => Arc::new(open_corpus(path)?),
            None => Arc::new(InMemoryRepository::new()),
        };

        if dry_run {
            let engine = Arc::new(MemoryEngine::new());
            let store = Arc::new(MemoryStore::with_write_to_disk(settings.write_to_disk));
            let mut runtime = Self::from_parts(settings, repository, engine.clone(), store)?;
            runtime.dry_run_engine = Some(engine);
            return Ok(runtime);
        }

        let store = Arc::new(open_storage(&settings)?);
        let engine = Arc::new(
            RedisEngine::connect(&settings.redis_url()).context("Failed to connect to RediSearch")?,
        );
        Self::from_parts(settings, repository, engine, store)
    }

    pub fn from_parts(
        settings: Settings,
        repository: Arc<dyn ContentRepository>,
        engine: Arc<dyn IndexEngine>,
        store: Arc<dyn ConfigStore>,
    ) -> Result<Self> {
        let config = CoordinatorConfig::from_settings(&settings)?;
        let coordinator =
            BatchCoordinator::new(config, repository, engine, store, Arc::new(Hooks::new()));
        Ok(Self {
            settings,
            coordinator,
            dry_run_engine: None,
        })
    }

    pub fn coordinator(&self) -> &BatchCoordinator {
        &self.coordinator
    }

    /// Rendered engine commands captured in dry-run mode.
    pub fn dry_run_log(&self) -> Vec<String> {
        self.dry_run_engine
            .as_ref()
            .map(|engine| engine.history().iter().map(EngineCommand::render).collect())
            .unwrap_or_default()
    }

    fn require_corpus(&self) -> Result<()> {
        if self.settings.corpus_path.is_none() {
            bail!("No corpus configured; pass --corpus or set corpus_path");
        }
        Ok(())
    }

    /// Run one command and return what to print.
    pub fn execute(&self, command: &Commands) -> Result<String> {
        match command {
            Commands::Status { json } => self.status(*json),
            Commands::Index => {
                self.require_corpus()?;
                let report = self.coordinator.run_batch_report()?;
                Ok(format_batch(&report))
            }
            Commands::Resume { max_batches } => {
                self.require_corpus()?;
                let summary = self.coordinator.run_until_complete(*max_batches)?;
                Ok(format_summary(&summary))
            }
            Commands::Reindex => {
                self.require_corpus()?;
                let report = self.coordinator.reindex()?;
                Ok(format!("Index rebuilt\n{}", format_batch(&report)))
            }
            Commands::Drop => {
                self.coordinator.drop_index()?;
                Ok(format!("Dropped index {}", self.coordinator.index_name()))
            }
            Commands::Persist { force } => self.persist(*force),
            Commands::Publish { post_id } => {
                self.require_corpus()?;
                self.lifecycle(PostEvent::saved(*post_id))
            }
            Commands::Delete { post_id } => self.lifecycle(PostEvent::deleted(*post_id)),
            Commands::Schema => show_schema(&self.settings),
            Commands::WriteToDisk { .. } => {
                bail!("write-to-disk is handled without an engine connection")
            }
        }
    }

    fn status(&self, json: bool) -> Result<String> {
        let status = self.coordinator.status()?;
        if json {
            return Ok(serde_json::to_string_pretty(&status)?);
        }

        let mut lines = vec![format!("Index: {}", status.index_name)];
        lines.push(match status.num_docs {
            Some(n) => format!("  Documents: {}", n),
            None => "  Documents: index does not exist".to_string(),
        });
        lines.push(match status.progress {
            Some(progress) if progress.is_complete() => format!("  Progress: {} (complete)", progress),
            Some(progress) => format!("  Progress: {}", progress),
            None => "  Progress: no batch has run".to_string(),
        });
        lines.push(format!("  Eligible posts: {}", status.eligible));
        Ok(lines.join("\n"))
    }

    fn persist(&self, force: bool) -> Result<String> {
        let writer = self.coordinator.writer();
        if force {
            writer.persist()?;
            return Ok("Persist requested".to_string());
        }
        if writer.persist_if_enabled()? {
            Ok("Persist requested".to_string())
        } else {
            warn!("write_to_disk is off, skipping persist");
            Ok("write_to_disk is off; nothing persisted (use --force)".to_string())
        }
    }

    fn lifecycle(&self, event: PostEvent) -> Result<String> {
        let outcome = self.coordinator.lifecycle_adapter().handle(&event)?;
        Ok(match outcome {
            LifecycleOutcome::Ignored => format!("Post {} ignored", event.post_id),
            LifecycleOutcome::Indexed { persisted } => {
                format!("Post {} indexed{}", event.post_id, persisted_suffix(persisted))
            }
            LifecycleOutcome::Removed { persisted } => {
                format!("Post {} removed{}", event.post_id, persisted_suffix(persisted))
            }
        })
    }
}

fn persisted_suffix(persisted: bool) -> &'static str {
    if persisted {
        " (persisted)"
    } else {
        ""
    }
}

fn format_batch(report: &BatchReport) -> String {
    let mut out = format!(
        "Indexed {} documents, progress {}",
        report.indexed, report.progress
    );
    if report.skipped > 0 {
        out.push_str(&format!(", {} skipped", report.skipped));
    }
    if report.existing > 0 {
        out.push_str(&format!(", {} already indexed", report.existing));
    }
    if report.progress.is_complete() {
        out.push_str(" (complete)");
    }
    out
}

fn format_summary(summary: &RunSummary) -> String {
    format!(
        "Ran {} batches: {} indexed, {} skipped, {} already indexed, progress {}{}",
        summary.batches,
        summary.indexed,
        summary.skipped,
        summary.existing,
        summary.progress,
        if summary.complete { " (complete)" } else { "" }
    )
}
