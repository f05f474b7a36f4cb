//! String, date, list and filesystem helpers shared by connectors

use crate::error::Result;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::debug;

// ============================================================================
// Strings
// ============================================================================

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn capitalized_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([^_])([A-Z][a-z]+)").unwrap())
}

fn lower_upper_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap())
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9]+[.\-_])*[A-Za-z0-9]+@[A-Za-z0-9-]+(\.[A-Za-z]{2,})+$")
            .unwrap()
    })
}

/// Convert a camelCase / PascalCase / spaced name to snake_case.
///
/// `"dealId"` -> `"deal_id"`, `"HTTPResponseCode"` -> `"http_response_code"`,
/// `"Created Date"` -> `"created_date"`.
pub fn camel_to_snake(name: &str) -> String {
    let name = whitespace_re().replace_all(name.trim(), "_");
    let name = capitalized_word_re().replace_all(&name, "${1}_${2}");
    lower_upper_re()
        .replace_all(&name, "${1}_${2}")
        .to_lowercase()
}

/// Whether `email` is a plausible address
pub fn is_valid_email(email: &str) -> bool {
    email_re().is_match(email)
}

/// Whether every non-blank entry of a `;`-separated list is a valid address
pub fn is_valid_email_list(emails: &str) -> bool {
    emails
        .split(';')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .all(is_valid_email)
}

// ============================================================================
// Numbers and lists
// ============================================================================

/// Number of pages needed to cover `total_records`
pub fn calc_iterations(total_records: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_records.div_ceil(page_size)
}

/// Split a slice into chunks of at most `size` elements
pub fn split_list<T>(data: &[T], size: usize) -> impl Iterator<Item = &[T]> {
    data.chunks(size.max(1))
}

/// Element-wise sum of several lists, padding shorter ones with zeros
pub fn add_lists(lists: &[Vec<i64>]) -> Vec<i64> {
    let len = lists.iter().map(Vec::len).max().unwrap_or(0);
    let mut sum = vec![0; len];
    for list in lists {
        for (acc, value) in sum.iter_mut().zip(list) {
            *acc += value;
        }
    }
    sum
}

// ============================================================================
// Dates
// ============================================================================

/// Whether more than `delta` has passed since `date` (local time)
pub fn is_date_older_than_delta(date: NaiveDateTime, delta: Duration) -> bool {
    Local::now().naive_local() - date > delta
}

/// Parse a `%Y-%m-%d` date
pub fn str_to_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        crate::error::Error::invalid_value("date", format!("'{value}' is not YYYY-MM-DD: {e}"))
    })
}

/// Format a timestamp the way Solr expects: `2024-01-15T10:30:00.000000Z`
pub fn solr_format_date(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Format a timestamp for reports: `01/15/2024`
pub fn output_format_date(dt: NaiveDateTime) -> String {
    dt.format("%m/%d/%Y").to_string()
}

// ============================================================================
// Timing
// ============================================================================

/// Run `f`, logging its name and elapsed time at debug level
pub fn timed<T>(name: &str, f: impl FnOnce() -> T) -> (std::time::Duration, T) {
    debug!("Running: {}", name);
    let start = Instant::now();
    let value = f();
    let elapsed = start.elapsed();
    debug!("Done: {} in {:.4} seconds", name, elapsed.as_secs_f64());
    (elapsed, value)
}

// ============================================================================
// Files
// ============================================================================

/// A path under the user's home directory (falls back to the current
/// directory when `HOME` is unset)
pub fn home_dir_path<I, P>(parts: I) -> PathBuf
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut path = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
    for part in parts {
        path.push(part);
    }
    path
}

/// `~/connectors/<name>`
pub fn connector_folder(name: &str) -> PathBuf {
    home_dir_path(["connectors", name])
}

/// `~/logs/<name>`
pub fn log_folder(name: &str) -> PathBuf {
    home_dir_path(["logs", name])
}

/// `~/reports/<name>`
pub fn report_folder(name: &str) -> PathBuf {
    home_dir_path(["reports", name])
}

/// Create `path` and its parents if missing
pub fn make_folder(path: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(path)?;
    Ok(path.to_path_buf())
}

/// Local time down to milliseconds, e.g. `2024January15T10_30_00_123`
pub fn timestamp() -> String {
    Local::now().format("%Y%B%dT%H_%M_%S_%3f").to_string()
}

/// `<name>_<timestamp>.<extension>`
pub fn timestamp_name(name: &str, extension: &str) -> String {
    format!("{name}_{}.{extension}", timestamp())
}
