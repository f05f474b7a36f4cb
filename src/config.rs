//! Run configuration
//!
//! An extraction run is described in YAML:
//!
//! ```yaml
//! name: people
//! source:
//!   database: ":memory:"
//!   setup:
//!     - CREATE TABLE people AS SELECT * FROM 'people.csv'
//!   query: SELECT * FROM people
//!   page_size: 1000
//! max_size: 5000
//! field_mappings:
//!   first_nm: first_name
//! boolean_mappings:
//!   "y": true
//!   "n": false
//! output:
//!   directory: /tmp/extracts
//!   format: parquet
//! ```

use crate::auth::{Authentication, AuthenticationFactory};
use crate::error::{Error, Result};
use crate::mapper::RecordMapper;
use crate::output::{default_output_root, sink_for_format, ArtifactSink, ParquetWriterConfig};
use crate::pipeline::{ExtractionPipeline, PipelineConfig};
use crate::source::SqlRowSource;
use crate::types::{JsonObject, OutputFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Pipeline built from a [`RunConfig`]
pub type ConfiguredPipeline = ExtractionPipeline<SqlRowSource, Box<dyn ArtifactSink + Send>>;

// ============================================================================
// Run Config
// ============================================================================

/// Complete definition of one extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Run name, also the artifact directory and file prefix
    pub name: String,

    /// Where rows come from
    pub source: SourceConfig,

    /// Records per persisted artifact
    #[serde(default = "default_max_size")]
    pub max_size: usize,

    /// Column renames (old name to new name)
    #[serde(default)]
    pub field_mappings: BTreeMap<String, String>,

    /// Lowercase token to boolean, for `*_ind` and `is_*` columns
    #[serde(default)]
    pub boolean_mappings: BTreeMap<String, bool>,

    /// Where artifacts go
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_max_size() -> usize {
    5000
}

/// SQL source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// `:memory:` or a DuckDB file path
    #[serde(default = "default_database")]
    pub database: String,

    /// Statements run before the query
    #[serde(default)]
    pub setup: Vec<String>,

    /// Query to extract
    pub query: String,

    /// Rows per fetch
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Convert column names to snake_case
    #[serde(default = "default_true")]
    pub normalize_columns: bool,
}

fn default_database() -> String {
    ":memory:".to_string()
}

fn default_page_size() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

/// Artifact settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory (default `~/connectors`)
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Artifact format
    #[serde(default)]
    pub format: OutputFormat,

    /// Parquet writer settings
    #[serde(default)]
    pub parquet: ParquetWriterConfig,
}

impl OutputConfig {
    /// Root directory with the default applied
    pub fn root(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(default_output_root)
    }
}

impl RunConfig {
    /// Check every setting that can be checked without touching the source
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::missing_field("name"));
        }
        if self.name.contains(['/', '\\']) {
            return Err(Error::invalid_value(
                "name",
                "must not contain path separators",
            ));
        }
        if self.source.query.trim().is_empty() {
            return Err(Error::missing_field("source.query"));
        }
        PipelineConfig::new(self.source.page_size, self.max_size)?;
        self.mapper()?;
        Ok(())
    }

    /// Record mapper for the configured mappings
    pub fn mapper(&self) -> Result<RecordMapper> {
        RecordMapper::new(
            self.field_mappings.clone(),
            self.boolean_mappings.clone(),
        )
    }

    /// Open the source, run the setup statements and wire up the pipeline
    pub fn build_pipeline(&self) -> Result<ConfiguredPipeline> {
        self.validate()?;

        let source = SqlRowSource::open(&self.source.database, self.source.query.as_str())?
            .with_column_normalization(self.source.normalize_columns);
        for statement in &self.source.setup {
            debug!("Running setup statement: {}", statement);
            source.execute_batch(statement)?;
        }

        let sink = sink_for_format(
            self.output.format,
            self.output.root(),
            &self.name,
            self.output.parquet.clone(),
        );

        ExtractionPipeline::new(
            self.name.clone(),
            source,
            self.mapper()?,
            sink,
            PipelineConfig::new(self.source.page_size, self.max_size)?,
        )
    }
}

/// Load and validate a run definition from a YAML file
pub fn load_run_config(path: impl AsRef<Path>) -> Result<RunConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| Error::config(format!("Failed to read {}: {e}", path.display())))?;
    load_run_config_from_str(&content)
}

/// Parse and validate a run definition
pub fn load_run_config_from_str(yaml: &str) -> Result<RunConfig> {
    let config: RunConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}

// ============================================================================
// Auth Definition
// ============================================================================

/// Auth type name plus its credentials, as stored in YAML or JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthDefinition {
    /// `basic`, `bearer` or `token`
    #[serde(rename = "type")]
    pub auth_type: String,

    /// Fields the chosen auth type needs
    #[serde(default)]
    pub credentials: JsonObject,
}

impl AuthDefinition {
    /// Build the authenticator through the factory
    pub fn authenticator(&self) -> Result<Box<dyn Authentication>> {
        AuthenticationFactory::get(&self.auth_type, &self.credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthType;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r"
name: people
source:
  query: SELECT * FROM people
";

    #[test]
    fn test_parse_minimal_config() {
        let config = load_run_config_from_str(MINIMAL).unwrap();
        assert_eq!(config.name, "people");
        assert_eq!(config.source.database, ":memory:");
        assert_eq!(config.source.page_size, 1000);
        assert!(config.source.normalize_columns);
        assert_eq!(config.max_size, 5000);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.root().ends_with("connectors"));
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
name: deals
source:
  database: ":memory:"
  setup:
    - CREATE TABLE deals (id INTEGER)
  query: SELECT * FROM deals
  page_size: 50
  normalize_columns: false
max_size: 100
field_mappings:
  deal_id: id
boolean_mappings:
  "y": true
  "n": false
output:
  directory: /tmp/out
  format: parquet
  parquet:
    compression: zstd
"#;
        let config = load_run_config_from_str(yaml).unwrap();
        assert_eq!(config.source.setup.len(), 1);
        assert_eq!(config.field_mappings.get("deal_id").map(String::as_str), Some("id"));
        assert_eq!(config.boolean_mappings.get("n"), Some(&false));
        assert_eq!(config.output.format, OutputFormat::Parquet);
        assert_eq!(config.output.root(), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let yaml = "name: x\nsource:\n  query: SELECT 1\n  page_size: 0\n";
        assert!(matches!(
            load_run_config_from_str(yaml),
            Err(Error::InvalidConfigValue { ref field, .. }) if field == "page_size"
        ));
    }

    #[test]
    fn test_zero_max_size_rejected() {
        let yaml = "name: x\nmax_size: 0\nsource:\n  query: SELECT 1\n";
        assert!(matches!(
            load_run_config_from_str(yaml),
            Err(Error::InvalidConfigValue { ref field, .. }) if field == "max_size"
        ));
    }

    #[test]
    fn test_missing_query_rejected() {
        let yaml = "name: x\nsource:\n  query: '  '\n";
        assert!(matches!(
            load_run_config_from_str(yaml),
            Err(Error::MissingConfigField { .. })
        ));
    }

    #[test]
    fn test_bad_mappings_rejected() {
        let yaml = "name: x\nsource:\n  query: SELECT 1\nboolean_mappings:\n  YES: true\n";
        let err = load_run_config_from_str(yaml).unwrap_err();
        assert!(err.is_fatal_config());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = load_run_config_from_str("name: [unclosed").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        std::fs::write(&path, MINIMAL).unwrap();
        assert_eq!(load_run_config(&path).unwrap().name, "people");

        let missing = load_run_config(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(missing, Error::Config { .. }));
    }

    #[test]
    fn test_build_pipeline_runs_setup() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = format!(
            r#"
name: numbers
source:
  setup:
    - CREATE TABLE numbers AS SELECT range AS "rowId" FROM range(7)
  query: SELECT * FROM numbers ORDER BY "rowId"
  page_size: 3
max_size: 4
output:
  directory: {}
"#,
            dir.path().display()
        );
        let config = load_run_config_from_str(&yaml).unwrap();
        let mut pipeline = config.build_pipeline().unwrap();
        let report = pipeline.run().unwrap();

        assert!(report.is_success());
        assert_eq!(report.gathered, 7);
        assert_eq!(report.paths.len(), 2);
    }

    #[test]
    fn test_auth_definition() {
        let def: AuthDefinition =
            serde_yaml::from_str("type: token\ncredentials:\n  access_token: abc\n").unwrap();
        let auth = def.authenticator().unwrap();
        assert_eq!(auth.auth_type(), AuthType::Token);

        let bad: AuthDefinition = serde_yaml::from_str("type: digest\n").unwrap();
        assert!(bad.authenticator().is_err());
    }
}
