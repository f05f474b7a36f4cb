//! CLI module
//!
//! Command-line interface for extraction runs.
//!
//! # Commands
//!
//! - `run` - Run an extraction from a YAML definition
//! - `validate` - Check a run definition
//! - `queries` - Print the query of every page
//! - `auth` - Authenticate and list the session headers

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputStyle};
pub use runner::Runner;
