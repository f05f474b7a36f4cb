//! Row-to-record mapping
//!
//! Turns a [`Page`](crate::source::Page) of raw rows into [`Record`](crate::types::Record)s:
//!
//! - columns are renamed through the field mappings (all at once, unmapped
//!   columns pass through)
//! - indicator columns (`*_ind`) and condition columns (`is_*`) are
//!   lowercased and substituted through the boolean mappings
//! - dates and timestamps become strings

mod record_mapper;

pub use record_mapper::{is_boolean_column, RecordMapper};
