//! Page and row source abstractions

use crate::error::{Error, Result};
use crate::types::Scalar;

/// One fetched chunk of rows.
///
/// Every row has exactly one value per column, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    columns: Vec<String>,
    rows: Vec<Vec<Scalar>>,
}

impl Page {
    /// Create a page, checking every row against the column list
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> Result<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(Error::source(format!(
                "row {i} has {} values but the page has {} columns",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// A page with no rows, signalling exhaustion
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows, aligned with [`Page::columns`]
    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the page has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Split into columns and rows
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Scalar>>) {
        (self.columns, self.rows)
    }
}

/// A sequential cursor over query results
pub trait RowSource {
    /// Fetch up to `size` rows.
    ///
    /// Fewer than `size` rows are only returned on the final page; an empty
    /// page means there is nothing left.
    fn fetch_page(&mut self, size: usize) -> Result<Page>;

    /// Short description for logs
    fn describe(&self) -> String {
        "row source".to_string()
    }
}

impl<R: RowSource + ?Sized> RowSource for Box<R> {
    fn fetch_page(&mut self, size: usize) -> Result<Page> {
        (**self).fetch_page(size)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
