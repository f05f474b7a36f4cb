//! Artifact sinks
//!
//! Each sink writes one file per flushed batch under
//! `<root>/<run_name>/<run_name>_<timestamp>_<seq>.<ext>`.

use super::batch::records_to_batch;
use super::writer::{write_batch_to_parquet, ParquetWriterConfig};
use crate::error::{Error, Result};
use crate::types::{OutputFormat, Record};
use crate::utils::{home_dir_path, timestamp};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes a batch of records to one persisted artifact
pub trait ArtifactSink {
    /// Persist `records`, returning the artifact location
    fn write_batch(&mut self, records: &[Record]) -> Result<PathBuf>;
}

impl<S: ArtifactSink + ?Sized> ArtifactSink for Box<S> {
    fn write_batch(&mut self, records: &[Record]) -> Result<PathBuf> {
        (**self).write_batch(records)
    }
}

// ============================================================================
// Layout
// ============================================================================

/// Numbered file names inside a run directory
#[derive(Debug, Clone)]
struct ArtifactLayout {
    directory: PathBuf,
    run_name: String,
    extension: &'static str,
    seq: usize,
}

impl ArtifactLayout {
    fn new(root: &Path, run_name: &str, extension: &'static str) -> Self {
        Self {
            directory: root.join(run_name),
            run_name: run_name.to_string(),
            extension,
            seq: 0,
        }
    }

    fn next_path(&mut self) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.directory).map_err(|e| {
            Error::persist(format!(
                "Failed to create directory {}: {e}",
                self.directory.display()
            ))
        })?;
        self.seq += 1;
        Ok(self.directory.join(format!(
            "{}_{}_{:04}.{}",
            self.run_name,
            timestamp(),
            self.seq,
            self.extension
        )))
    }
}

/// Default artifact root for a run: `~/connectors`
pub fn default_output_root() -> PathBuf {
    home_dir_path(["connectors"])
}

// ============================================================================
// JSON
// ============================================================================

/// One pretty-printed JSON array per batch
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    layout: ArtifactLayout,
}

impl JsonFileSink {
    /// Write under `<root>/<run_name>/`
    pub fn new(root: impl AsRef<Path>, run_name: &str) -> Self {
        Self {
            layout: ArtifactLayout::new(root.as_ref(), run_name, OutputFormat::Json.extension()),
        }
    }

    /// Directory the artifacts land in
    pub fn directory(&self) -> &Path {
        &self.layout.directory
    }
}

impl ArtifactSink for JsonFileSink {
    fn write_batch(&mut self, records: &[Record]) -> Result<PathBuf> {
        let path = self.layout.next_path()?;
        let file = File::create(&path)
            .map_err(|e| Error::persist(format!("Failed to create {}: {e}", path.display())))?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records)
            .map_err(|e| Error::persist(format!("Failed to write {}: {e}", path.display())))?;
        writer
            .flush()
            .map_err(|e| Error::persist(format!("Failed to write {}: {e}", path.display())))?;

        info!(path = %path.display(), records = records.len(), "Wrote JSON artifact");
        Ok(path)
    }
}

// ============================================================================
// Parquet
// ============================================================================

/// One Parquet file per batch, schema inferred from the batch
#[derive(Debug, Clone)]
pub struct ParquetFileSink {
    layout: ArtifactLayout,
    config: ParquetWriterConfig,
}

impl ParquetFileSink {
    /// Write under `<root>/<run_name>/`
    pub fn new(root: impl AsRef<Path>, run_name: &str) -> Self {
        Self {
            layout: ArtifactLayout::new(
                root.as_ref(),
                run_name,
                OutputFormat::Parquet.extension(),
            ),
            config: ParquetWriterConfig::default(),
        }
    }

    /// Set the writer settings
    #[must_use]
    pub fn with_config(mut self, config: ParquetWriterConfig) -> Self {
        self.config = config;
        self
    }

    /// Directory the artifacts land in
    pub fn directory(&self) -> &Path {
        &self.layout.directory
    }
}

impl ArtifactSink for ParquetFileSink {
    fn write_batch(&mut self, records: &[Record]) -> Result<PathBuf> {
        let batch = records_to_batch(records)?;
        let path = self.layout.next_path()?;
        let rows = write_batch_to_parquet(&path, &batch, &self.config)?;

        info!(path = %path.display(), records = rows, "Wrote Parquet artifact");
        Ok(path)
    }
}

/// Build the sink for an output format
pub fn sink_for_format(
    format: OutputFormat,
    root: impl AsRef<Path>,
    run_name: &str,
    parquet: ParquetWriterConfig,
) -> Box<dyn ArtifactSink + Send> {
    match format {
        OutputFormat::Json => Box::new(JsonFileSink::new(root, run_name)),
        OutputFormat::Parquet => Box::new(ParquetFileSink::new(root, run_name).with_config(parquet)),
    }
}
