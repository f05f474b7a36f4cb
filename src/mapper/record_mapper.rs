//! RecordMapper implementation

use crate::error::{Error, Result};
use crate::source::Page;
use crate::types::{JsonValue, Record};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Suffix marking indicator columns
const INDICATOR_SUFFIX: &str = "_ind";

/// Prefix marking condition columns
const CONDITION_PREFIX: &str = "is_";

/// Whether a column holds boolean tokens that go through the boolean mappings
pub fn is_boolean_column(name: &str) -> bool {
    name.ends_with(INDICATOR_SUFFIX) || name.starts_with(CONDITION_PREFIX)
}

/// Renames columns and normalizes values of every row in a page
#[derive(Debug, Clone, Default)]
pub struct RecordMapper {
    field_mappings: BTreeMap<String, String>,
    boolean_mappings: HashMap<String, bool>,
}

impl RecordMapper {
    /// Create a mapper, validating both mapping tables.
    ///
    /// Fails when a rename key or target is empty, when two columns are
    /// renamed to the same target, when a target is itself renamed again,
    /// or when a boolean token is empty or not lowercase.
    pub fn new<F, B>(field_mappings: F, boolean_mappings: B) -> Result<Self>
    where
        F: IntoIterator<Item = (String, String)>,
        B: IntoIterator<Item = (String, bool)>,
    {
        let field_mappings: BTreeMap<String, String> = field_mappings.into_iter().collect();
        let boolean_mappings: HashMap<String, bool> = boolean_mappings.into_iter().collect();

        let mut targets = HashSet::new();
        for (from, to) in &field_mappings {
            if from.is_empty() {
                return Err(Error::invalid_value(
                    "field_mappings",
                    "column names must not be empty",
                ));
            }
            if to.is_empty() {
                return Err(Error::invalid_value(
                    "field_mappings",
                    format!("'{from}' is renamed to an empty name"),
                ));
            }
            if !targets.insert(to.as_str()) {
                return Err(Error::invalid_value(
                    "field_mappings",
                    format!("more than one column is renamed to '{to}'"),
                ));
            }
        }
        for (from, to) in &field_mappings {
            if from != to && field_mappings.get(to).is_some_and(|next| next != to) {
                return Err(Error::invalid_value(
                    "field_mappings",
                    format!("'{from}' is renamed to '{to}', which is renamed again"),
                ));
            }
        }

        for token in boolean_mappings.keys() {
            if token.is_empty() {
                return Err(Error::invalid_value(
                    "boolean_mappings",
                    "tokens must not be empty",
                ));
            }
            if *token != token.to_lowercase() {
                return Err(Error::invalid_value(
                    "boolean_mappings",
                    format!("token '{token}' must be lowercase"),
                ));
            }
        }

        Ok(Self {
            field_mappings,
            boolean_mappings,
        })
    }

    /// Old name to new name
    pub fn field_mappings(&self) -> &BTreeMap<String, String> {
        &self.field_mappings
    }

    /// Lowercase token to boolean
    pub fn boolean_mappings(&self) -> &HashMap<String, bool> {
        &self.boolean_mappings
    }

    /// Post-rename name of a column
    pub fn rename<'a>(&'a self, column: &'a str) -> &'a str {
        self.field_mappings
            .get(column)
            .map_or(column, String::as_str)
    }

    /// Check the mappings against a discovered schema and return the
    /// post-rename column list.
    ///
    /// Two columns landing on the same name is an error. Mapping keys that
    /// the schema does not contain are only logged.
    pub fn validate_schema(&self, columns: &[String]) -> Result<Vec<String>> {
        let present: HashSet<&str> = columns.iter().map(String::as_str).collect();
        for key in self.field_mappings.keys() {
            if !present.contains(key.as_str()) {
                warn!(column = %key, "Mapped column not found in query results");
            }
        }

        let mut seen = HashSet::new();
        let mut renamed = Vec::with_capacity(columns.len());
        for column in columns {
            let name = self.rename(column);
            if !seen.insert(name) {
                return Err(Error::transform(format!(
                    "column '{column}' maps to '{name}', which already exists"
                )));
            }
            renamed.push(name.to_string());
        }

        debug!(columns = ?renamed, "Validated record schema");
        Ok(renamed)
    }

    /// Map every row of a page to a record
    pub fn map(&self, page: &Page) -> Result<Vec<Record>> {
        let names: Vec<&str> = page.columns().iter().map(|c| self.rename(c)).collect();

        page.rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let record: Record = names
                    .iter()
                    .zip(row)
                    .map(|(name, value)| ((*name).to_string(), self.normalize(name, value.to_json())))
                    .collect();
                if record.len() != names.len() {
                    return Err(Error::transform(format!(
                        "row {i} has duplicate column names after renaming"
                    )));
                }
                Ok(record)
            })
            .collect()
    }

    /// Apply the renames and value normalization to a single record
    pub fn apply(&self, record: Record) -> Record {
        record
            .into_object()
            .into_iter()
            .map(|(field, value)| {
                let name = self.rename(&field).to_string();
                let value = self.normalize(&name, value);
                (name, value)
            })
            .collect()
    }

    fn normalize(&self, column: &str, value: JsonValue) -> JsonValue {
        if !is_boolean_column(column) {
            return value;
        }
        match value {
            JsonValue::Null => JsonValue::Null,
            JsonValue::Bool(b) => self
                .boolean_mappings
                .get(&b.to_string())
                .map_or(JsonValue::Bool(b), |mapped| JsonValue::Bool(*mapped)),
            JsonValue::String(s) => self.substitute(s.to_lowercase()),
            other => self.substitute(other.to_string().to_lowercase()),
        }
    }

    fn substitute(&self, token: String) -> JsonValue {
        match self.boolean_mappings.get(&token) {
            Some(mapped) => JsonValue::Bool(*mapped),
            None => JsonValue::String(token),
        }
    }
}
