//! Size-bounded batching of accepted records

use super::sink::ArtifactSink;
use crate::error::{Error, Result};
use crate::types::Record;
use std::path::PathBuf;
use tracing::{debug, info};

/// Accumulates records and flushes them to a sink in batches of `max_size`.
///
/// A flush happens only once the accumulator holds more than `max_size`
/// records, and always writes exactly `max_size` of them (oldest first).
/// [`BatchPersister::finish`] writes whatever is left, if anything.
pub struct BatchPersister<S> {
    sink: S,
    max_size: usize,
    pending: Vec<Record>,
    paths: Vec<PathBuf>,
    flushed: usize,
}

impl<S: ArtifactSink> BatchPersister<S> {
    /// Create a persister; `max_size` must be greater than zero
    pub fn new(sink: S, max_size: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(Error::invalid_value("max_size", "must be greater than 0"));
        }
        Ok(Self {
            sink,
            max_size,
            pending: Vec::new(),
            paths: Vec::new(),
            flushed: 0,
        })
    }

    /// Add records, returning the artifacts this call produced
    pub fn accumulate(&mut self, records: Vec<Record>) -> Result<Vec<PathBuf>> {
        self.pending.extend(records);

        let mut written = Vec::new();
        while self.pending.len() > self.max_size {
            info!("Data quantity reached the max size of {}", self.max_size);
            written.push(self.flush(self.max_size)?);
        }
        Ok(written)
    }

    /// Flush the remainder. No artifact is written when nothing is pending.
    pub fn finish(&mut self) -> Result<Vec<PathBuf>> {
        if self.pending.is_empty() {
            debug!("Nothing left to flush");
            return Ok(Vec::new());
        }
        let path = self.flush(self.pending.len())?;
        Ok(vec![path])
    }

    fn flush(&mut self, count: usize) -> Result<PathBuf> {
        let path = self
            .sink
            .write_batch(&self.pending[..count])
            .map_err(|e| match e {
                Error::Persist { .. } => e,
                other => Error::persist(other.to_string()),
            })?;

        self.pending.drain(..count);
        self.flushed += count;
        self.paths.push(path.clone());
        Ok(path)
    }

    /// All artifacts written so far, in flush order
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Records accumulated but not yet written
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Records written so far
    pub fn flushed(&self) -> usize {
        self.flushed
    }

    /// Batch size bound
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// The underlying sink
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S> std::fmt::Debug for BatchPersister<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchPersister")
            .field("max_size", &self.max_size)
            .field("pending", &self.pending.len())
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}
