//! In-memory row source

use super::types::{Page, RowSource};
use crate::error::{Error, Result};
use crate::types::Scalar;
use std::collections::VecDeque;

/// Serves rows held in memory, front to back
#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    columns: Vec<String>,
    rows: VecDeque<Vec<Scalar>>,
}

impl MemoryRowSource {
    /// Create a source over the given rows
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> Result<Self> {
        // Reuse the page width check
        let (columns, rows) = Page::new(columns, rows)?.into_parts();
        Ok(Self {
            columns,
            rows: rows.into(),
        })
    }

    /// Rows not yet fetched
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl RowSource for MemoryRowSource {
    fn fetch_page(&mut self, size: usize) -> Result<Page> {
        if size == 0 {
            return Err(Error::invalid_value("page_size", "must be greater than 0"));
        }
        let take = size.min(self.rows.len());
        let rows: Vec<_> = self.rows.drain(..take).collect();
        Page::new(self.columns.clone(), rows)
    }

    fn describe(&self) -> String {
        format!("memory ({} rows left)", self.rows.len())
    }
}
