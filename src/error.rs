//! Error types for extractkit
//!
//! Every public API returns `Result<T, Error>`. The variants are grouped by
//! the stage that raises them so callers can tell a bad configuration
//! (raised before anything runs) from a failure in the middle of a run.

use thiserror::Error;

/// The main error type for extractkit
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("OAuth2 error: {message}")]
    OAuth2 { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Page index {index} is out of range (total pages: {total_pages})")]
    PagesExhausted { index: usize, total_pages: usize },

    #[error("Page query task failed for index {index}: {reason}")]
    ConcurrentTask { index: usize, reason: String },

    // ============================================================================
    // Extraction Errors
    // ============================================================================
    #[error("Row source error: {message}")]
    Source { message: String },

    #[error("Schema changed mid-run: expected {expected:?}, got {actual:?}")]
    SchemaChanged {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Transform error: {message}")]
    Transform { message: String },

    #[error("Persist error: {message}")]
    Persist { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a row source error
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create a transform error
    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform {
            message: message.into(),
        }
    }

    /// Create a persist error
    pub fn persist(message: impl Into<String>) -> Self {
        Self::Persist {
            message: message.into(),
        }
    }

    /// Errors that describe a bad setup rather than a failure during a run.
    pub fn is_fatal_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
                | Error::YamlParse(_)
                | Error::InvalidUrl(_)
        )
    }
}

/// Result type alias for extractkit
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("token_url");
        assert_eq!(err.to_string(), "Missing required config field: token_url");

        let err = Error::PagesExhausted {
            index: 3,
            total_pages: 3,
        };
        assert_eq!(
            err.to_string(),
            "Page index 3 is out of range (total pages: 3)"
        );
    }

    #[test]
    fn test_is_fatal_config() {
        assert!(Error::config("bad").is_fatal_config());
        assert!(Error::missing_field("user").is_fatal_config());
        assert!(Error::invalid_value("page_size", "must be > 0").is_fatal_config());

        assert!(!Error::transform("boom").is_fatal_config());
        assert!(!Error::persist("disk full").is_fatal_config());
        assert!(!Error::source("cursor closed").is_fatal_config());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::persist("inner"));
        let with_context = result.with_context(|| "outer".to_string());
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Persist error: inner"));
    }
}
