//! Paged extraction pipeline
//!
//! Drives RowSource → RecordMapper → FilterParseGate → BatchPersister one
//! page at a time until the source returns an empty page.
//!
//! ```text
//! Init → Fetching → Mapping → Gating → Accumulating ─┐
//!           ▲                                         │
//!           └─────────────────────────────────────────┘
//! Fetching (empty page) → FlushFinal → Done
//! ```

mod extraction;
mod types;

pub use extraction::ExtractionPipeline;
pub use types::{ExtractionReport, PipelineConfig, PipelineState};
