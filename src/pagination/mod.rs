//! Pagination module
//!
//! Builds one query per page index, concurrently.
//!
//! # Overview
//!
//! `PageQueryPaginator` fans out one tokio task per page index, each asking a
//! `QueryTarget` (usually a [`crate::query::QueryBuilder`]) for the query of
//! that page. Results come back in completion order. A failed task is never
//! dropped: it is reported as a [`PageFailure`], or turned into an error when
//! the paginator runs with [`FailurePolicy::FailFast`].

mod paginator;
mod types;

pub use paginator::PageQueryPaginator;
pub use types::{FailurePolicy, PageFailure, PaginationOutcome, QueryTarget};

#[cfg(test)]
mod tests;
