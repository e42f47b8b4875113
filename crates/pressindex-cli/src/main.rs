//! pressindex
//!
//! Builds and maintains a RediSearch full-text index over a post corpus.
//!
//! # Usage
//!
//! ```bash
//! pressindex --corpus posts.json index
//! pressindex --corpus posts.json resume [--max-batches N]
//! pressindex status [--json]
//! pressindex publish 42
//! pressindex write-to-disk on
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/pressindex/config.toml)
//! 3. Environment variables (PRESSINDEX_*)
//! 4. CLI flags

use anyhow::Result;

use pressindex_cli::{run, Cli};

fn main() -> Result<()> {
    run(Cli::parse_args())
}
