//! Concurrent page-query paginator

use super::types::{FailurePolicy, PageFailure, PaginationOutcome, QueryTarget};
use crate::error::{Error, Result};
use crate::query::QueryParams;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a single page task needs, shared read-only between tasks
#[derive(Clone)]
struct PageTemplate {
    total_pages: usize,
    page_param: String,
    path: Option<String>,
    params: QueryParams,
    target: Arc<dyn QueryTarget>,
}

impl PageTemplate {
    fn render(&self, index: usize) -> Result<String> {
        if index >= self.total_pages {
            return Err(Error::PagesExhausted {
                index,
                total_pages: self.total_pages,
            });
        }

        let mut params = self.params.clone();
        params.push(self.page_param.clone(), index);
        self.target.query(self.path.as_deref(), &params)
    }
}

/// Builds the query of every page in `[start_index, total_pages)`
///
/// ```rust,ignore
/// let paginator = PageQueryPaginator::new(3, "page", QueryBuilder::new("host"))
///     .with_path("items");
/// let outcome = paginator.run().await?;
/// // host/items?page=0, host/items?page=1, host/items?page=2 in any order
/// ```
pub struct PageQueryPaginator {
    template: PageTemplate,
    start_index: usize,
    policy: FailurePolicy,
}

impl PageQueryPaginator {
    /// Create a paginator over `total_pages` pages
    pub fn new(total_pages: usize, page_param: impl Into<String>, target: impl QueryTarget) -> Self {
        Self {
            template: PageTemplate {
                total_pages,
                page_param: page_param.into(),
                path: None,
                params: QueryParams::new(),
                target: Arc::new(target),
            },
            start_index: 0,
            policy: FailurePolicy::default(),
        }
    }

    /// Path segment appended to the endpoint
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.template.path = Some(path.into());
        self
    }

    /// Parameters sent with every page, before the page parameter
    #[must_use]
    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.template.params = params;
        self
    }

    /// First page index to build (zero-based)
    #[must_use]
    pub fn with_start_index(mut self, start_index: usize) -> Self {
        self.start_index = start_index;
        self
    }

    /// How failed page tasks are surfaced
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Total number of pages
    pub fn total_pages(&self) -> usize {
        self.template.total_pages
    }

    /// Build the query for one page.
    ///
    /// Asking for an index at or past `total_pages` returns
    /// [`Error::PagesExhausted`], the signal that there are no more pages.
    pub fn build_query(&self, index: usize) -> Result<String> {
        self.template.render(index)
    }

    /// Build every page query concurrently, one task per page.
    ///
    /// All tasks are joined before returning. Queries are in completion
    /// order, not index order.
    pub async fn run(&self) -> Result<PaginationOutcome> {
        let total_pages = self.template.total_pages;
        if self.start_index > total_pages {
            return Err(Error::invalid_value(
                "start_index",
                format!(
                    "start index {} is past the last page ({total_pages})",
                    self.start_index
                ),
            ));
        }

        let shared = Arc::new(self.template.clone());
        let mut tasks: FuturesUnordered<_> = (self.start_index..total_pages)
            .map(|index| {
                let template = Arc::clone(&shared);
                let handle = tokio::spawn(async move { template.render(index) });
                async move { (index, handle.await) }
            })
            .collect();

        debug!(
            pages = tasks.len(),
            start_index = self.start_index,
            "Building page queries"
        );

        let mut outcome = PaginationOutcome::default();
        while let Some((index, joined)) = tasks.next().await {
            match joined {
                Ok(Ok(query)) => outcome.queries.push(query),
                Ok(Err(e)) => outcome.failures.push(PageFailure::new(index, e.to_string())),
                Err(join_err) => {
                    let reason = if join_err.is_panic() {
                        "page task panicked".to_string()
                    } else {
                        join_err.to_string()
                    };
                    outcome.failures.push(PageFailure::new(index, reason));
                }
            }
        }

        outcome.failures.sort_by_key(|f| f.index);

        if !outcome.failures.is_empty() {
            warn!(
                failed = ?outcome.failed_indices(),
                succeeded = outcome.queries.len(),
                "Some page queries failed"
            );
            if self.policy == FailurePolicy::FailFast {
                return Err(outcome.failures.swap_remove(0).into());
            }
        }

        Ok(outcome)
    }
}
