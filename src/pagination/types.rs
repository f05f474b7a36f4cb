//! Pagination types and traits

use crate::error::{Error, Result};
use crate::query::{QueryBuilder, QueryParams};
use serde::{Deserialize, Serialize};

/// Anything that can turn a path segment and parameters into a query.
///
/// Implemented by [`QueryBuilder`] and by plain closures, so callers can plug
/// in fallible query construction.
pub trait QueryTarget: Send + Sync + 'static {
    /// Build the query for one page
    fn query(&self, path: Option<&str>, params: &QueryParams) -> Result<String>;
}

impl QueryTarget for QueryBuilder {
    fn query(&self, path: Option<&str>, params: &QueryParams) -> Result<String> {
        Ok(self.build(path, params))
    }
}

impl<F> QueryTarget for F
where
    F: Fn(Option<&str>, &QueryParams) -> Result<String> + Send + Sync + 'static,
{
    fn query(&self, path: Option<&str>, params: &QueryParams) -> Result<String> {
        self(path, params)
    }
}

/// What to do when a page task fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Report failures alongside the successful queries
    #[default]
    Collect,
    /// Fail the whole run if any page task failed
    FailFast,
}

/// A page whose query could not be built
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    /// Page index
    pub index: usize,
    /// Why the task failed
    pub reason: String,
}

impl PageFailure {
    /// Create a failure entry
    pub fn new(index: usize, reason: impl Into<String>) -> Self {
        Self {
            index,
            reason: reason.into(),
        }
    }
}

impl From<PageFailure> for Error {
    fn from(failure: PageFailure) -> Self {
        Error::ConcurrentTask {
            index: failure.index,
            reason: failure.reason,
        }
    }
}

/// Everything a pagination run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct PaginationOutcome {
    /// Queries in completion order
    pub queries: Vec<String>,
    /// Failed pages, sorted by index
    pub failures: Vec<PageFailure>,
}

impl PaginationOutcome {
    /// Whether every page produced a query
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Indices of the failed pages
    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.index).collect()
    }
}
