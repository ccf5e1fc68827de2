/// Structured error types for busway-core.
///
/// Uses `thiserror` so the binary can match on store failures while still
/// wrapping everything in `anyhow` at the session boundary.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::model::UserId;

/// Errors raised by user stores and record validation
#[derive(Error, Debug)]
pub enum StoreError {
    /// Query, commit, or connection failure reported by the database
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A required field was blank after trimming
    #[error("all fields are required: '{field}' is empty")]
    MissingField { field: &'static str },

    /// No row with the given identifier
    #[error("user {id} not found")]
    NotFound { id: UserId },

    /// The store was used after `close()`
    #[error("connection already closed")]
    Closed,

    /// Injected failure from the in-memory store
    #[error("simulated write failure")]
    Simulated,
}

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn not_found(id: UserId) -> Self {
        Self::NotFound { id }
    }
}

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid TOML in {path:?}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("config file not found: {path:?}")]
    NotFound { path: PathBuf },

    #[error("invalid port '{value}' in {origin}")]
    InvalidPort { value: String, origin: String },

    #[error("invalid database URL: {0}")]
    InvalidUrl(#[source] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::missing_field("email");
        assert_eq!(err.to_string(), "all fields are required: 'email' is empty");

        let err = StoreError::not_found(42);
        assert_eq!(err.to_string(), "user 42 not found");
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::Database(_)));
        assert!(err.to_string().starts_with("database error"));
    }

    #[test]
    fn test_invalid_port_display() {
        let err = ConfigError::InvalidPort {
            value: "abc".into(),
            origin: "BUSWAY_DB_PORT".into(),
        };
        assert!(err.to_string().contains("'abc'"));
        assert!(err.to_string().contains("BUSWAY_DB_PORT"));
    }
}
