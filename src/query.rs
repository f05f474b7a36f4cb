//! REST query-string building
//!
//! Builds request targets like `base/path?$q=demo&$fq=url:*iki*` from an
//! endpoint and an ordered list of parameters. Values are inserted verbatim:
//! no URL encoding is performed, callers that need it must encode first.

use std::fmt::Write as _;

/// Ordered query parameters.
///
/// Keeps insertion order because the rendered query string is compared
/// verbatim by callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Create an empty parameter list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter (builder style)
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    /// Append a parameter
    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.push((key.into(), value.to_string()));
    }

    /// Append every parameter of `other`
    pub fn extend_from(&mut self, other: &QueryParams) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no parameters
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: ToString, const N: usize> From<[(K, V); N]> for QueryParams {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Builds query strings against a fixed endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    base_url: String,
    prefix: String,
    suffix: String,
}

impl QueryBuilder {
    /// Create a builder for an endpoint
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    /// Text placed before every `key=value` pair
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Text placed after every `key=value` pair
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// The endpoint queries are built against
    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    /// Build a query string.
    ///
    /// With no parameters the endpoint is returned unchanged, even if a
    /// path segment was given.
    pub fn build(&self, path: Option<&str>, params: &QueryParams) -> String {
        if params.is_empty() {
            return self.base_url.clone();
        }

        let mut query = self.base_url.clone();
        if let Some(path) = path.filter(|p| !p.is_empty()) {
            query.push('/');
            query.push_str(path);
        }
        query.push('?');

        for (i, (key, value)) in params.iter().enumerate() {
            if i > 0 {
                query.push('&');
            }
            // Writing into a String cannot fail
            let _ = write!(query, "{}{key}={value}{}", self.prefix, self.suffix);
        }

        query
    }
}
