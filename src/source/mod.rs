//! Row sources
//!
//! A row source is a stateful, sequential cursor over query results,
//! consumed one page at a time. An empty page means the source is exhausted.
//!
//! - [`MemoryRowSource`] serves rows held in memory
//! - [`SqlRowSource`] pages through a SQL query executed by DuckDB

mod memory;
mod sql;
mod types;

pub use memory::MemoryRowSource;
pub use sql::SqlRowSource;
pub use types::{Page, RowSource};

#[cfg(test)]
mod tests;
