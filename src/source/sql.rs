//! DuckDB-backed SQL row source
//!
//! Runs a query through DuckDB and pages over it with `LIMIT`/`OFFSET`.
//! DuckDB keeps insertion order for plain scans; queries that join or
//! aggregate should carry an `ORDER BY` so pages do not overlap.

use super::types::{Page, RowSource};
use crate::error::{Error, Result};
use crate::types::Scalar;
use crate::utils::camel_to_snake;
use chrono::{DateTime, NaiveDate, NaiveTime};
use duckdb::types::{TimeUnit, Value};
use duckdb::Connection;
use std::path::Path;
use tracing::debug;

/// Pages through the result of a SQL query
pub struct SqlRowSource {
    conn: Connection,
    query: String,
    normalize_columns: bool,
    /// Raw column names, discovered on first fetch
    columns: Option<Vec<String>>,
    offset: usize,
    exhausted: bool,
}

impl SqlRowSource {
    /// Wrap an existing connection
    pub fn new(conn: Connection, query: impl Into<String>) -> Self {
        let query: String = query.into();
        Self {
            conn,
            query: query.trim().trim_end_matches(';').to_string(),
            normalize_columns: true,
            columns: None,
            offset: 0,
            exhausted: false,
        }
    }

    /// Query an in-memory DuckDB database
    pub fn in_memory(query: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::source(format!("Failed to create DuckDB connection: {e}")))?;
        Ok(Self::new(conn, query))
    }

    /// Open a database (`:memory:` or a DuckDB file path) and query it
    pub fn open(database: &str, query: impl Into<String>) -> Result<Self> {
        if database == ":memory:" {
            return Self::in_memory(query);
        }
        let conn = Connection::open(Path::new(database)).map_err(|e| {
            Error::source(format!("Failed to open DuckDB database '{database}': {e}"))
        })?;
        Ok(Self::new(conn, query))
    }

    /// Convert column names with `camel_to_snake` (on by default)
    #[must_use]
    pub fn with_column_normalization(mut self, enabled: bool) -> Self {
        self.normalize_columns = enabled;
        self
    }

    /// Run setup statements (create tables, attach databases, ...)
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| Error::source(format!("Failed to run setup SQL: {e}")))
    }

    /// The wrapped query
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Column names of the query, looked up once with `DESCRIBE`
    fn discover_columns(&mut self) -> Result<Vec<String>> {
        if let Some(columns) = &self.columns {
            return Ok(columns.clone());
        }

        let describe = format!("DESCRIBE {}", self.query);
        let mut stmt = self
            .conn
            .prepare(&describe)
            .map_err(|e| Error::source(format!("Failed to describe query: {e}")))?;

        let columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| Error::source(format!("Failed to describe query: {e}")))?
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::source(format!("Failed to read column names: {e}")))?;

        debug!(columns = ?columns, "Discovered query columns");
        self.columns = Some(columns.clone());
        Ok(columns)
    }

    fn output_columns(&self, raw: &[String]) -> Vec<String> {
        if self.normalize_columns {
            raw.iter().map(|c| camel_to_snake(c)).collect()
        } else {
            raw.to_vec()
        }
    }
}

impl RowSource for SqlRowSource {
    fn fetch_page(&mut self, size: usize) -> Result<Page> {
        if size == 0 {
            return Err(Error::invalid_value("page_size", "must be greater than 0"));
        }

        let raw_columns = self.discover_columns()?;
        let columns = self.output_columns(&raw_columns);
        if self.exhausted {
            return Ok(Page::empty(columns));
        }

        let sql = format!(
            "SELECT * FROM ({}) AS q LIMIT {size} OFFSET {}",
            self.query, self.offset
        );
        debug!("Executing page query: {}", sql);

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| Error::source(format!("Failed to prepare page query: {e}")))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| Error::source(format!("Failed to execute page query: {e}")))?;

        let mut page_rows = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| Error::source(format!("Failed to fetch row: {e}")))?
        {
            let mut values = Vec::with_capacity(raw_columns.len());
            for i in 0..raw_columns.len() {
                let value: Value = row
                    .get(i)
                    .map_err(|e| Error::source(format!("Failed to read column {i}: {e}")))?;
                values.push(duckdb_value_to_scalar(value));
            }
            page_rows.push(values);
        }

        self.offset += page_rows.len();
        if page_rows.len() < size {
            self.exhausted = true;
        }

        Page::new(columns, page_rows)
    }

    fn describe(&self) -> String {
        format!("duckdb query (offset {})", self.offset)
    }
}

/// Convert a DuckDB value to a typed scalar
fn duckdb_value_to_scalar(value: Value) -> Scalar {
    match value {
        Value::Null => Scalar::Null,
        Value::Boolean(b) => Scalar::Bool(b),
        Value::TinyInt(i) => Scalar::Int(i.into()),
        Value::SmallInt(i) => Scalar::Int(i.into()),
        Value::Int(i) => Scalar::Int(i.into()),
        Value::BigInt(i) => Scalar::Int(i),
        Value::UTinyInt(i) => Scalar::Int(i.into()),
        Value::USmallInt(i) => Scalar::Int(i.into()),
        Value::UInt(i) => Scalar::Int(i.into()),
        Value::UBigInt(i) => i64::try_from(i).map_or_else(|_| Scalar::Text(i.to_string()), Scalar::Int),
        Value::HugeInt(i) => Scalar::Text(i.to_string()),
        Value::Float(f) => Scalar::Float(f64::from(f)),
        Value::Double(f) => Scalar::Float(f),
        Value::Text(s) => Scalar::Text(s),
        Value::Blob(b) => Scalar::Text(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            b,
        )),
        Value::Timestamp(unit, value) => {
            let (secs, nsecs) = split_seconds(unit, value);
            DateTime::from_timestamp(secs, nsecs)
                .map_or(Scalar::Int(value), |dt| Scalar::DateTime(dt.naive_utc()))
        }
        Value::Date32(days) => {
            // 719163 days from 0001-01-01 to 1970-01-01
            NaiveDate::from_num_days_from_ce_opt(days + 719_163)
                .map_or(Scalar::Int(days.into()), Scalar::Date)
        }
        Value::Time64(unit, value) => {
            let (secs, nsecs) = split_seconds(unit, value);
            u32::try_from(secs)
                .ok()
                .and_then(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, nsecs))
                .map_or(Scalar::Int(value), |time| {
                    Scalar::Text(time.format("%H:%M:%S%.6f").to_string())
                })
        }
        other => Scalar::Text(format!("{other:?}")),
    }
}

/// Split a count of `unit` since the epoch (or midnight) into seconds and nanoseconds
fn split_seconds(unit: TimeUnit, value: i64) -> (i64, u32) {
    let per_second: i64 = match unit {
        TimeUnit::Second => 1,
        TimeUnit::Millisecond => 1_000,
        TimeUnit::Microsecond => 1_000_000,
        TimeUnit::Nanosecond => 1_000_000_000,
    };
    let nanos = value.rem_euclid(per_second) * (1_000_000_000 / per_second);
    (value.div_euclid(per_second), nanos as u32)
}
