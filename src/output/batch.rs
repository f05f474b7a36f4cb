//! Record to Arrow RecordBatch conversion
//!
//! Records are flat, so every column maps to one of `Boolean`, `Int64`,
//! `Float64` or `Utf8` (nested values are stored as JSON text).

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, NullArray, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Infer a schema covering every field of every record.
///
/// Columns come out in field-name order. All columns are nullable.
pub fn infer_schema(records: &[Record]) -> Schema {
    let mut field_types: BTreeMap<&str, DataType> = BTreeMap::new();

    for record in records {
        for (name, value) in record.iter() {
            let inferred = infer_type(value);
            field_types
                .entry(name.as_str())
                .and_modify(|existing| *existing = merge_types(existing, &inferred))
                .or_insert(inferred);
        }
    }

    let fields: Vec<Field> = field_types
        .into_iter()
        .map(|(name, dtype)| Field::new(name, dtype, true))
        .collect();
    Schema::new(fields)
}

/// Convert records to a single RecordBatch with an inferred schema
pub fn records_to_batch(records: &[Record]) -> Result<RecordBatch> {
    let schema = Arc::new(infer_schema(records));
    if records.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let columns: Vec<ArrayRef> = schema
        .fields()
        .iter()
        .map(|field| {
            let values: Vec<Option<&JsonValue>> =
                records.iter().map(|r| r.get(field.name())).collect();
            build_array(&values, field.data_type())
        })
        .collect();

    RecordBatch::try_new(schema, columns)
        .map_err(|e| Error::persist(format!("Failed to create RecordBatch: {e}")))
}

fn infer_type(value: &JsonValue) -> DataType {
    match value {
        JsonValue::Null => DataType::Null,
        JsonValue::Bool(_) => DataType::Boolean,
        JsonValue::Number(n) if n.is_i64() => DataType::Int64,
        JsonValue::Number(_) => DataType::Float64,
        JsonValue::String(_) | JsonValue::Array(_) | JsonValue::Object(_) => DataType::Utf8,
    }
}

fn merge_types(existing: &DataType, other: &DataType) -> DataType {
    match (existing, other) {
        (a, b) if a == b => a.clone(),
        (DataType::Null, t) | (t, DataType::Null) => t.clone(),
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }
        // Mixed columns (e.g. indicator tokens that did not all map) fall back to text
        _ => DataType::Utf8,
    }
}

fn build_array(values: &[Option<&JsonValue>], data_type: &DataType) -> ArrayRef {
    match data_type {
        DataType::Null => Arc::new(NullArray::new(values.len())),
        DataType::Boolean => Arc::new(
            values
                .iter()
                .map(|v| v.and_then(JsonValue::as_bool))
                .collect::<BooleanArray>(),
        ),
        DataType::Int64 => Arc::new(
            values
                .iter()
                .map(|v| v.and_then(JsonValue::as_i64))
                .collect::<Int64Array>(),
        ),
        DataType::Float64 => Arc::new(
            values
                .iter()
                .map(|v| v.and_then(JsonValue::as_f64))
                .collect::<Float64Array>(),
        ),
        _ => Arc::new(
            values
                .iter()
                .map(|v| match v {
                    None | Some(JsonValue::Null) => None,
                    Some(JsonValue::String(s)) => Some(s.clone()),
                    Some(other) => Some(other.to_string()),
                })
                .collect::<StringArray>(),
        ),
    }
}
