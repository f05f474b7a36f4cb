// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # extractkit
//!
//! Building blocks for data-extraction connectors.
//!
//! ## Features
//!
//! - **Authentication**: basic, OAuth2 client credentials and pre-issued
//!   tokens, producing a preconfigured HTTP client
//! - **Query building**: REST query strings and concurrent page queries
//! - **Paged extraction**: fetch, map, filter/parse and persist in bounded
//!   batches (JSON or Parquet artifacts)
//! - **SQL source**: DuckDB-backed row source with column normalization
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use extractkit::{load_run_config, Result};
//!
//! fn main() -> Result<()> {
//!     let config = load_run_config("people.yaml")?;
//!     let mut pipeline = config.build_pipeline()?;
//!     let report = pipeline.run()?;
//!     println!("{} records in {} files", report.accepted, report.paths.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌─────────────────┐   ┌────────────────┐
//! │ RowSource │ → │ RecordMapper │ → │ FilterParseGate │ → │ BatchPersister │
//! │ (page)    │   │ (rename/bool)│   │ (filter, parse) │   │ (JSON/Parquet) │
//! └───────────┘   └──────────────┘   └─────────────────┘   └────────────────┘
//!        driven page by page by ExtractionPipeline
//!
//! ┌──────────────────────┐   ┌──────────────┐   ┌────────────────────┐
//! │ AuthenticationFactory│   │ QueryBuilder │ ← │ PageQueryPaginator │
//! └──────────────────────┘   └──────────────┘   └────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication implementations
pub mod auth;

/// REST query-string building
pub mod query;

/// Concurrent page queries
pub mod pagination;

/// Row sources (in-memory and DuckDB)
pub mod source;

/// Row-to-record mapping
pub mod mapper;

/// Per-record filter and parse
pub mod gate;

/// Batching and artifact output
pub mod output;

/// Paged extraction pipeline
pub mod pipeline;

/// Run definitions
pub mod config;

/// Logging setup
pub mod logging;

/// Command-line interface
pub mod cli;

/// String, date, timing and path helpers
pub mod utils;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::{load_run_config, load_run_config_from_str, RunConfig};
pub use pipeline::{ExtractionPipeline, ExtractionReport, PipelineConfig, PipelineState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
