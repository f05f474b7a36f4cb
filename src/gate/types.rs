//! Gate types

use crate::error::Result;
use crate::types::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Transformer
// ============================================================================

/// Decides record inclusion and rewrites accepted records.
///
/// `filter` must not have side effects. `parse` only ever sees records that
/// passed `filter`.
pub trait RecordTransformer: Send + Sync {
    /// Whether to keep the record
    fn filter(&self, _record: &Record) -> bool {
        true
    }

    /// Rewrite an accepted record in place
    fn parse(&self, _record: &mut Record) -> Result<()> {
        Ok(())
    }
}

/// Keeps every record unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl RecordTransformer for PassThrough {}

type FilterFn = Box<dyn Fn(&Record) -> bool + Send + Sync>;
type ParseFn = Box<dyn Fn(&mut Record) -> Result<()> + Send + Sync>;

/// Transformer built from closures
pub struct FnTransformer {
    filter: FilterFn,
    parse: ParseFn,
}

impl FnTransformer {
    /// A transformer that keeps everything and changes nothing
    pub fn new() -> Self {
        Self {
            filter: Box::new(|_| true),
            parse: Box::new(|_| Ok(())),
        }
    }

    /// Set the filter predicate
    #[must_use]
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.filter = Box::new(filter);
        self
    }

    /// Set the parse step
    #[must_use]
    pub fn with_parse<P>(mut self, parse: P) -> Self
    where
        P: Fn(&mut Record) -> Result<()> + Send + Sync + 'static,
    {
        self.parse = Box::new(parse);
        self
    }
}

impl Default for FnTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FnTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransformer").finish_non_exhaustive()
    }
}

impl RecordTransformer for FnTransformer {
    fn filter(&self, record: &Record) -> bool {
        (self.filter)(record)
    }

    fn parse(&self, record: &mut Record) -> Result<()> {
        (self.parse)(record)
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// What to do when `parse` fails on a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailurePolicy {
    /// Fail the whole batch
    #[default]
    Abort,
    /// Drop the record and keep going
    Isolate,
}

/// A record dropped because `parse` failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRecord {
    /// Position of the record in the batch handed to the gate
    pub position: usize,
    /// The parse error
    pub reason: String,
}

/// Result of running the gate over a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GateOutcome {
    /// Records that passed `filter` and `parse`, in input order
    pub accepted: Vec<Record>,
    /// Number of records `filter` turned away
    pub filtered: usize,
    /// Records whose `parse` failed (only with [`ParseFailurePolicy::Isolate`])
    pub rejected: Vec<RejectedRecord>,
}
