//! FilterParseGate implementation

use super::types::{GateOutcome, ParseFailurePolicy, PassThrough, RecordTransformer, RejectedRecord};
use crate::error::{Error, Result};
use crate::types::Record;
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs a [`RecordTransformer`] over mapped records
#[derive(Clone)]
pub struct FilterParseGate {
    transformer: Arc<dyn RecordTransformer>,
    policy: ParseFailurePolicy,
}

impl FilterParseGate {
    /// Create a gate around a transformer
    pub fn new(transformer: impl RecordTransformer + 'static) -> Self {
        Self::from_arc(Arc::new(transformer))
    }

    /// Create a gate around a shared transformer
    pub fn from_arc(transformer: Arc<dyn RecordTransformer>) -> Self {
        Self {
            transformer,
            policy: ParseFailurePolicy::default(),
        }
    }

    /// Set what happens when `parse` fails
    #[must_use]
    pub fn with_parse_failure_policy(mut self, policy: ParseFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The parse failure policy
    pub fn parse_failure_policy(&self) -> ParseFailurePolicy {
        self.policy
    }

    /// Filter, then parse, every record.
    ///
    /// Filtered records are dropped. With [`ParseFailurePolicy::Abort`] the
    /// first parse error fails the call as [`Error::Transform`].
    pub fn apply(&self, records: Vec<Record>) -> Result<GateOutcome> {
        let total = records.len();
        let mut outcome = GateOutcome::default();

        for (position, mut record) in records.into_iter().enumerate() {
            if !self.transformer.filter(&record) {
                outcome.filtered += 1;
                continue;
            }

            match self.transformer.parse(&mut record) {
                Ok(()) => outcome.accepted.push(record),
                Err(e) => match self.policy {
                    ParseFailurePolicy::Abort => {
                        return Err(Error::transform(format!(
                            "parse failed for record {position}: {e}"
                        )));
                    }
                    ParseFailurePolicy::Isolate => {
                        warn!(position, error = %e, "Dropping record that failed to parse");
                        outcome.rejected.push(RejectedRecord {
                            position,
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }

        debug!(
            "Records from page = {}, after filtering = {}",
            total,
            outcome.accepted.len()
        );
        Ok(outcome)
    }
}

impl Default for FilterParseGate {
    fn default() -> Self {
        Self::new(PassThrough)
    }
}

impl std::fmt::Debug for FilterParseGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterParseGate")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
