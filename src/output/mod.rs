//! Output module
//!
//! Batches accepted records and persists each batch as one artifact.
//!
//! # Overview
//!
//! - [`BatchPersister`] keeps the run accumulator and decides when to flush
//! - [`ArtifactSink`] writes one batch: [`JsonFileSink`] or [`ParquetFileSink`]
//! - Parquet artifacts go through an inferred Arrow schema

mod batch;
mod persister;
mod sink;
mod writer;

pub use batch::{infer_schema, records_to_batch};
pub use persister::BatchPersister;
pub use sink::{default_output_root, sink_for_format, ArtifactSink, JsonFileSink, ParquetFileSink};
pub use writer::{write_batch_to_parquet, ParquetCompression, ParquetWriterConfig};
