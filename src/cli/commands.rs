//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// extractkit CLI
#[derive(Parser, Debug)]
#[command(name = "extractkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputStyle,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also log to a daily file under ~/logs/extractkit with this prefix
    #[arg(long, global = true)]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an extraction and print its report
    Run {
        /// Run definition file (YAML)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Validate a run definition without running it
    Validate {
        /// Run definition file (YAML)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Print the query of every page
    Queries {
        /// Endpoint the queries are built against
        #[arg(long)]
        base: String,

        /// Path segment appended to the endpoint
        #[arg(long)]
        path: Option<String>,

        /// Total number of pages
        #[arg(long)]
        pages: usize,

        /// Name of the page index parameter
        #[arg(long, default_value = "page")]
        page_param: String,

        /// First page index
        #[arg(long, default_value = "0")]
        start: usize,

        /// Text placed before every key=value pair
        #[arg(long, default_value = "")]
        prefix: String,

        /// Text placed after every key=value pair
        #[arg(long, default_value = "")]
        suffix: String,

        /// Extra parameter as key=value (repeatable)
        #[arg(long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        /// Fail if any page query could not be built
        #[arg(long)]
        fail_fast: bool,
    },

    /// Authenticate and show which headers were set
    Auth {
        /// Authentication type: basic, bearer or token
        #[arg(long = "type")]
        auth_type: String,

        /// Credentials as a JSON object
        #[arg(long)]
        credentials_json: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputStyle {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Parse `key=value`; the value may itself contain `=`
pub(crate) fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
