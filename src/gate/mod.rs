//! Per-record filter and parse gate
//!
//! A [`RecordTransformer`] decides which records to keep (`filter`) and
//! rewrites the kept ones in place (`parse`). The [`FilterParseGate`] runs a
//! transformer over a batch of mapped records.

mod filter_parse;
mod types;

pub use filter_parse::FilterParseGate;
pub use types::{
    FnTransformer, GateOutcome, ParseFailurePolicy, PassThrough, RecordTransformer,
    RejectedRecord,
};
