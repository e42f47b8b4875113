//! CLI argument parsing for pressindex.
//!
//! CLI flags override every other configuration source.

use clap::{Parser, Subcommand, ValueEnum};

/// pressindex
///
/// Builds and maintains a RediSearch full-text index over a post corpus.
#[derive(Parser, Debug)]
#[command(name = "pressindex")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/pressindex/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override the corpus file (JSON export of posts)
    #[arg(long, global = true)]
    pub corpus: Option<String>,

    /// Override the options/progress database path
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Run against an in-memory engine and store and print the engine
    /// commands instead of sending them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Index commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show stored progress and engine document count
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Index the next batch
    Index,

    /// Run batches until the corpus is covered
    Resume {
        /// Stop after this many batches
        #[arg(long)]
        max_batches: Option<usize>,
    },

    /// Drop the index and progress, then index the first batch
    Reindex,

    /// Drop the index and forget its progress
    Drop,

    /// Ask the engine to write its dataset to disk
    Persist {
        /// Persist even when the write-to-disk option is off
        #[arg(long)]
        force: bool,
    },

    /// Print the index creation command for the current configuration
    Schema,

    /// Index (or remove, when unpublished) a single post
    Publish {
        /// Post id
        post_id: u64,
    },

    /// Remove a single post from the index
    Delete {
        /// Post id
        post_id: u64,
    },

    /// Turn the persist-after-mutation option on or off
    WriteToDisk {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
