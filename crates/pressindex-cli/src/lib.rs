//! pressindex command-line library.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations and collaborator wiring

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, Toggle};
pub use commands::{init_logging, load_settings, run, set_write_to_disk, show_schema, Runtime};
