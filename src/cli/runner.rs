//! CLI runner - executes commands

use crate::auth::AuthenticationFactory;
use crate::cli::commands::{Cli, Commands, OutputStyle};
use crate::config::load_run_config;
use crate::error::{Error, Result, ResultExt};
use crate::logging::{LogConfig, LogLevel};
use crate::pagination::{FailurePolicy, PageQueryPaginator};
use crate::query::{QueryBuilder, QueryParams};
use crate::types::JsonObject;
use serde_json::{json, Value};
use std::path::Path;
use tracing::{info, warn};

/// Arguments of the `queries` command
struct QueriesArgs<'a> {
    base: &'a str,
    path: Option<&'a str>,
    pages: usize,
    page_param: &'a str,
    start: usize,
    prefix: &'a str,
    suffix: &'a str,
    params: &'a [(String, String)],
    fail_fast: bool,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Logging settings from the global flags
    pub fn log_config(&self) -> LogConfig {
        let level = if self.cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        };
        let config = LogConfig::new().with_level(level);
        match &self.cli.log_file {
            Some(prefix) => config.with_log_file(prefix.clone()),
            None => config,
        }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run { config } => self.run_extraction(config).await,
            Commands::Validate { config } => self.validate(config),
            Commands::Queries {
                base,
                path,
                pages,
                page_param,
                start,
                prefix,
                suffix,
                params,
                fail_fast,
            } => {
                self.queries(QueriesArgs {
                    base,
                    path: path.as_deref(),
                    pages: *pages,
                    page_param,
                    start: *start,
                    prefix,
                    suffix,
                    params,
                    fail_fast: *fail_fast,
                })
                .await
            }
            Commands::Auth {
                auth_type,
                credentials_json,
            } => self.auth(auth_type, credentials_json).await,
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Run the pipeline on a blocking thread and print the report
    async fn run_extraction(&self, path: &Path) -> Result<()> {
        let config = load_run_config(path)
            .with_context(|| format!("Invalid run definition {}", path.display()))?;
        let mut pipeline = config.build_pipeline()?;

        let report = tokio::task::spawn_blocking(move || pipeline.run())
            .await
            .map_err(|e| Error::Other(format!("Extraction task failed: {e}")))??;

        self.output_message(&json!({
            "type": "REPORT",
            "report": report,
        }));

        match &report.error {
            Some(error) => Err(Error::Other(format!(
                "Run '{}' ended in state {}: {error}",
                report.name, report.state
            ))),
            None => Ok(()),
        }
    }

    /// Validate a run definition
    fn validate(&self, path: &Path) -> Result<()> {
        let config = load_run_config(path)
            .with_context(|| format!("Invalid run definition {}", path.display()))?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Run definition '{}' is valid ({} field mappings, {} boolean mappings, {} output)",
                    config.name,
                    config.field_mappings.len(),
                    config.boolean_mappings.len(),
                    config.output.format.extension()
                )
            }
        }));

        Ok(())
    }

    /// Print every page query, failures go to stderr
    async fn queries(&self, args: QueriesArgs<'_>) -> Result<()> {
        let builder = QueryBuilder::new(args.base)
            .with_prefix(args.prefix)
            .with_suffix(args.suffix);
        let params: QueryParams = args.params.iter().cloned().collect();
        let policy = if args.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::Collect
        };

        let mut paginator = PageQueryPaginator::new(args.pages, args.page_param, builder)
            .with_params(params)
            .with_start_index(args.start)
            .with_failure_policy(policy);
        if let Some(path) = args.path {
            paginator = paginator.with_path(path);
        }

        let outcome = paginator.run().await?;
        for query in &outcome.queries {
            println!("{query}");
        }
        for failure in &outcome.failures {
            eprintln!("page {}: {}", failure.index, failure.reason);
        }
        info!(
            "Built {} queries, {} failures",
            outcome.queries.len(),
            outcome.failures.len()
        );

        Ok(())
    }

    /// Authenticate and print the header names of the session
    async fn auth(&self, auth_type: &str, credentials_json: &str) -> Result<()> {
        let credentials: JsonObject = match serde_json::from_str::<Value>(credentials_json)? {
            Value::Object(map) => map,
            other => {
                return Err(Error::invalid_value(
                    "credentials_json",
                    format!("expected a JSON object, got {other}"),
                ))
            }
        };

        let authenticator = AuthenticationFactory::get(auth_type, &credentials)?;
        let session = authenticator.authenticate().await?;
        if session.is_expired() {
            warn!("Session for {} authentication is already expired", auth_type);
        }

        let headers: Vec<&str> = session.headers().keys().map(|k| k.as_str()).collect();
        self.output_message(&json!({
            "type": "AUTH",
            "auth": {
                "type": authenticator.auth_type(),
                "headers": headers,
                "expires_at": session.expires_at(),
            }
        }));

        Ok(())
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Output a message to stdout
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputStyle::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputStyle::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::parse_key_value;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_parse_run() {
        let cli = parse(&["extractkit", "run", "-c", "run.yaml", "--verbose"]);
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputStyle::Json);
        match cli.command {
            Commands::Run { config } => assert_eq!(config, Path::new("run.yaml")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_queries_defaults() {
        let cli = parse(&["extractkit", "queries", "--base", "http://host", "--pages", "3"]);
        match cli.command {
            Commands::Queries {
                page_param,
                start,
                prefix,
                params,
                fail_fast,
                ..
            } => {
                assert_eq!(page_param, "page");
                assert_eq!(start, 0);
                assert_eq!(prefix, "");
                assert!(params.is_empty());
                assert!(!fail_fast);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_queries_params() {
        let cli = parse(&[
            "extractkit",
            "queries",
            "--base",
            "http://host",
            "--pages",
            "2",
            "--param",
            "q=demo",
            "--param",
            "fq=a=b",
            "--fail-fast",
        ]);
        match cli.command {
            Commands::Queries {
                params, fail_fast, ..
            } => {
                assert_eq!(
                    params,
                    vec![
                        ("q".to_string(), "demo".to_string()),
                        ("fq".to_string(), "a=b".to_string()),
                    ]
                );
                assert!(fail_fast);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_auth() {
        let cli = parse(&[
            "extractkit",
            "auth",
            "--type",
            "token",
            "--credentials-json",
            r#"{"access_token":"abc"}"#,
        ]);
        assert!(matches!(cli.command, Commands::Auth { ref auth_type, .. } if auth_type == "token"));
    }

    #[test]
    fn test_missing_subcommand_rejected() {
        assert!(Cli::try_parse_from(["extractkit"]).is_err());
    }

    #[test_case("q=demo", Ok(("q", "demo")) ; "simple")]
    #[test_case("q=", Ok(("q", "")) ; "empty value")]
    #[test_case("=demo", Err(()) ; "empty key")]
    #[test_case("demo", Err(()) ; "no separator")]
    fn test_parse_key_value(input: &str, expected: std::result::Result<(&str, &str), ()>) {
        let parsed = parse_key_value(input);
        match expected {
            Ok((k, v)) => assert_eq!(parsed.unwrap(), (k.to_string(), v.to_string())),
            Err(()) => assert!(parsed.is_err()),
        }
    }

    #[test]
    fn test_log_config_from_flags() {
        let runner = Runner::new(parse(&["extractkit", "-v", "--log-file", "run", "validate", "-c", "x.yaml"]));
        let config = runner.log_config();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.log_file.as_deref(), Some("run"));

        let quiet = Runner::new(parse(&["extractkit", "validate", "-c", "x.yaml"]));
        assert_eq!(quiet.log_config().level, LogLevel::Info);
    }

    #[tokio::test]
    async fn test_validate_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        std::fs::write(&path, "name: people\nsource:\n  query: SELECT 1\n").unwrap();

        let config = path.to_string_lossy().to_string();
        let runner = Runner::new(parse(&["extractkit", "validate", "-c", config.as_str()]));
        assert!(runner.run().await.is_ok());
    }

    #[tokio::test]
    async fn test_run_command_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        let yaml = format!(
            "name: nums\nsource:\n  query: SELECT range AS n FROM range(5)\n  page_size: 2\nmax_size: 10\noutput:\n  directory: {}\n",
            dir.path().display()
        );
        std::fs::write(&path, yaml).unwrap();

        let config = path.to_string_lossy().to_string();
        let runner = Runner::new(parse(&["extractkit", "run", "-c", config.as_str()]));
        runner.run().await.unwrap();

        let files: Vec<_> = std::fs::read_dir(dir.path().join("nums")).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn test_queries_command() {
        let runner = Runner::new(parse(&[
            "extractkit",
            "queries",
            "--base",
            "http://host",
            "--pages",
            "2",
            "--param",
            "q=demo",
            "--fail-fast",
        ]));
        assert!(runner.run().await.is_ok());
    }

    #[tokio::test]
    async fn test_auth_rejects_non_object_credentials() {
        let runner = Runner::new(parse(&[
            "extractkit",
            "auth",
            "--type",
            "token",
            "--credentials-json",
            "[1, 2]",
        ]));
        let err = runner.run().await.unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));
    }

    #[tokio::test]
    async fn test_auth_token_command() {
        let runner = Runner::new(parse(&[
            "extractkit",
            "auth",
            "--type",
            "token",
            "--credentials-json",
            r#"{"access_token":"abc"}"#,
        ]));
        assert!(runner.run().await.is_ok());
    }
}
