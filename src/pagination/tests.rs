//! Tests for pagination module

use super::*;
use crate::error::Error;
use crate::query::{QueryBuilder, QueryParams};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn sorted(mut queries: Vec<String>) -> Vec<String> {
    queries.sort();
    queries
}

// ============================================================================
// build_query Tests
// ============================================================================

#[test]
fn test_build_query_injects_page_param() {
    let paginator = PageQueryPaginator::new(5, "page", QueryBuilder::new("host"))
        .with_path("items")
        .with_params(QueryParams::from([("q", "rust")]));

    assert_eq!(paginator.build_query(2).unwrap(), "host/items?q=rust&page=2");
}

#[test_case(3, 3 ; "index equal to total")]
#[test_case(3, 4 ; "index past total")]
#[test_case(0, 0 ; "no pages at all")]
fn test_build_query_stop_signal(total: usize, index: usize) {
    let paginator = PageQueryPaginator::new(total, "page", QueryBuilder::new("host"));

    match paginator.build_query(index) {
        Err(Error::PagesExhausted {
            index: got,
            total_pages,
        }) => {
            assert_eq!(got, index);
            assert_eq!(total_pages, total);
        }
        other => panic!("Expected PagesExhausted, got {other:?}"),
    }
}

#[test]
fn test_build_query_last_page_allowed() {
    let paginator = PageQueryPaginator::new(3, "p", QueryBuilder::new("host"));
    assert_eq!(paginator.build_query(2).unwrap(), "host?p=2");
}

// ============================================================================
// run Tests
// ============================================================================

#[tokio::test]
async fn test_run_builds_every_page() {
    let paginator = PageQueryPaginator::new(4, "page", QueryBuilder::new("host").with_prefix("$"))
        .with_path("api");

    let outcome = paginator.run().await.unwrap();

    assert!(outcome.is_complete());
    assert_eq!(
        sorted(outcome.queries),
        vec![
            "host/api?$page=0",
            "host/api?$page=1",
            "host/api?$page=2",
            "host/api?$page=3",
        ]
    );
}

#[tokio::test]
async fn test_run_respects_start_index() {
    let paginator =
        PageQueryPaginator::new(4, "page", QueryBuilder::new("host")).with_start_index(2);

    let outcome = paginator.run().await.unwrap();
    assert_eq!(sorted(outcome.queries), vec!["host?page=2", "host?page=3"]);
}

#[tokio::test]
async fn test_run_zero_pages() {
    let paginator = PageQueryPaginator::new(0, "page", QueryBuilder::new("host"));
    let outcome = paginator.run().await.unwrap();
    assert!(outcome.queries.is_empty());
    assert!(outcome.is_complete());
}

#[tokio::test]
async fn test_run_start_index_past_end() {
    let paginator = PageQueryPaginator::new(2, "page", QueryBuilder::new("host")).with_start_index(3);
    let err = paginator.run().await.unwrap_err();
    assert!(err.is_fatal_config());
}

#[tokio::test]
async fn test_run_reports_failed_pages() {
    let target = |_path: Option<&str>, params: &QueryParams| -> crate::Result<String> {
        let page = params
            .iter()
            .find(|(k, _)| *k == "page")
            .map(|(_, v)| v.to_string())
            .unwrap_or_default();
        if page == "1" || page == "3" {
            Err(Error::Other(format!("page {page} unavailable")))
        } else {
            Ok(format!("ok-{page}"))
        }
    };

    let outcome = PageQueryPaginator::new(5, "page", target)
        .run()
        .await
        .unwrap();

    assert_eq!(sorted(outcome.queries.clone()), vec!["ok-0", "ok-2", "ok-4"]);
    assert_eq!(outcome.failed_indices(), vec![1, 3]);
    assert!(outcome.failures[0].reason.contains("page 1 unavailable"));
    assert!(!outcome.is_complete());
}

#[tokio::test]
async fn test_run_reports_panicked_task() {
    let target = |_path: Option<&str>, params: &QueryParams| -> crate::Result<String> {
        let (_, page) = params.iter().last().unwrap_or(("", ""));
        assert_ne!(page, "2", "boom");
        Ok(page.to_string())
    };

    let outcome = PageQueryPaginator::new(3, "page", target)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.queries.len(), 2);
    assert_eq!(outcome.failures, vec![PageFailure::new(2, "page task panicked")]);
}

#[tokio::test]
async fn test_run_fail_fast_surfaces_lowest_failed_index() {
    let target = |_path: Option<&str>, params: &QueryParams| -> crate::Result<String> {
        let (_, page) = params.iter().last().unwrap_or(("", ""));
        if page == "0" {
            Ok("fine".to_string())
        } else {
            Err(Error::Other("nope".to_string()))
        }
    };

    let err = PageQueryPaginator::new(4, "page", target)
        .with_failure_policy(FailurePolicy::FailFast)
        .run()
        .await
        .unwrap_err();

    match err {
        Error::ConcurrentTask { index, reason } => {
            assert_eq!(index, 1);
            assert_eq!(reason, "nope");
        }
        other => panic!("Expected ConcurrentTask, got {other:?}"),
    }
}

#[test]
fn test_failure_policy_default() {
    assert_eq!(FailurePolicy::default(), FailurePolicy::Collect);
}
