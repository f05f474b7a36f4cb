//! Tests for the source module

use super::*;
use crate::error::Error;
use crate::mapper::RecordMapper;
use crate::types::Scalar;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

// ============================================================================
// Page Tests
// ============================================================================

#[test]
fn test_page_rejects_ragged_rows() {
    let result = Page::new(
        cols(&["a", "b"]),
        vec![vec![Scalar::Int(1), Scalar::Int(2)], vec![Scalar::Int(3)]],
    );
    match result {
        Err(Error::Source { message }) => assert!(message.contains("row 1")),
        other => panic!("Expected source error, got {other:?}"),
    }
}

#[test]
fn test_empty_page_keeps_columns() {
    let page = Page::empty(cols(&["a"]));
    assert!(page.is_empty());
    assert_eq!(page.columns(), ["a".to_string()]);
}

// ============================================================================
// Memory Source Tests
// ============================================================================

fn memory_source(rows: i64) -> MemoryRowSource {
    MemoryRowSource::new(
        cols(&["id", "name"]),
        (0..rows)
            .map(|i| vec![Scalar::Int(i), Scalar::Text(format!("row{i}"))])
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_memory_source_pages() {
    let mut source = memory_source(5);

    let first = source.fetch_page(2).unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first.rows()[0][0], Scalar::Int(0));

    let second = source.fetch_page(2).unwrap();
    assert_eq!(second.rows()[0][0], Scalar::Int(2));

    let last = source.fetch_page(2).unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last.rows()[0][1], Scalar::Text("row4".to_string()));

    assert!(source.fetch_page(2).unwrap().is_empty());
    assert_eq!(source.remaining(), 0);
}

#[test]
fn test_memory_source_zero_page_size() {
    let mut source = memory_source(1);
    assert!(matches!(
        source.fetch_page(0),
        Err(Error::InvalidConfigValue { .. })
    ));
}

#[test]
fn test_boxed_source_delegates() {
    let mut source: Box<dyn RowSource> = Box::new(memory_source(3));
    assert_eq!(source.fetch_page(10).unwrap().len(), 3);
    assert!(source.describe().starts_with("memory"));
}

// ============================================================================
// SQL Source Tests
// ============================================================================

fn sql_source() -> SqlRowSource {
    let source = SqlRowSource::in_memory(
        "SELECT \"dealId\", \"createdDate\", \"updatedAt\", active_ind, \"Note\" FROM deals ORDER BY \"dealId\";",
    )
    .unwrap();
    source
        .execute_batch(
            "CREATE TABLE deals (
                \"dealId\" INTEGER,
                \"createdDate\" DATE,
                \"updatedAt\" TIMESTAMP,
                active_ind BOOLEAN,
                \"Note\" VARCHAR
            );
            INSERT INTO deals VALUES
                (1, DATE '2024-01-15', TIMESTAMP '2024-01-15 10:30:00', true, 'first'),
                (2, DATE '2024-02-01', TIMESTAMP '2024-02-01 08:00:00', false, NULL),
                (3, NULL, NULL, NULL, 'third');",
        )
        .unwrap();
    source
}

#[test]
fn test_sql_source_normalizes_columns() {
    let mut source = sql_source();
    let page = source.fetch_page(10).unwrap();
    assert_eq!(
        page.columns(),
        cols(&["deal_id", "created_date", "updated_at", "active_ind", "note"])
    );
}

#[test]
fn test_sql_source_keeps_raw_columns() {
    let mut source = sql_source().with_column_normalization(false);
    let page = source.fetch_page(1).unwrap();
    assert_eq!(page.columns()[0], "dealId");
}

#[test]
fn test_sql_source_converts_values() {
    let mut source = sql_source();
    let page = source.fetch_page(10).unwrap();
    assert_eq!(page.len(), 3);

    let first = &page.rows()[0];
    assert_eq!(first[0], Scalar::Int(1));
    assert_eq!(
        first[1],
        Scalar::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
    );
    assert_eq!(
        first[2],
        Scalar::DateTime(
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap()
        )
    );
    assert_eq!(first[3], Scalar::Bool(true));
    assert_eq!(first[4], Scalar::Text("first".to_string()));

    assert_eq!(page.rows()[1][4], Scalar::Null);
    assert_eq!(page.rows()[2][1], Scalar::Null);
}

#[test]
fn test_sql_source_pages_until_exhausted() {
    let mut source = sql_source();

    let first = source.fetch_page(2).unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first.rows()[1][0], Scalar::Int(2));

    let second = source.fetch_page(2).unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second.rows()[0][0], Scalar::Int(3));

    let done = source.fetch_page(2).unwrap();
    assert!(done.is_empty());
    assert_eq!(done.columns().len(), 5);
}

#[test]
fn test_sql_source_exact_multiple_ends_with_empty_page() {
    let mut source = sql_source();
    assert_eq!(source.fetch_page(3).unwrap().len(), 3);
    assert!(source.fetch_page(3).unwrap().is_empty());
}

#[test]
fn test_sql_source_bad_query() {
    let mut source = SqlRowSource::in_memory("SELECT * FROM missing_table").unwrap();
    assert!(matches!(source.fetch_page(10), Err(Error::Source { .. })));
}

#[test]
fn test_sql_source_zero_page_size() {
    let mut source = sql_source();
    assert!(matches!(
        source.fetch_page(0),
        Err(Error::InvalidConfigValue { .. })
    ));
}

#[test]
fn test_sql_source_timestamp_precisions() {
    let mut source = SqlRowSource::in_memory(
        "SELECT TIMESTAMP_S '2024-01-15 10:30:00' AS ts_s,
                TIMESTAMP_MS '2024-01-15 10:30:00' AS ts_ms,
                TIMESTAMP '2024-01-15 10:30:00' AS ts_us,
                TIMESTAMP_NS '2024-01-15 10:30:00' AS ts_ns,
                TIME '10:30:05.25' AS at_time",
    )
    .unwrap();
    let page = source.fetch_page(10).unwrap();

    let records = RecordMapper::default().map(&page).unwrap();
    let record = &records[0];
    for column in ["ts_s", "ts_ms", "ts_us", "ts_ns"] {
        assert_eq!(
            record.get(column),
            Some(&serde_json::json!("2024-01-15 10:30:00")),
            "column {column}"
        );
    }
    assert_eq!(record.get("at_time"), Some(&serde_json::json!("10:30:05.250000")));
}
