//! Error types for the persistence layer.
//!
//! Every backend reports failures as a [`StorageError`]. The hosted store's
//! boundary hands back either data or an error body; backends translate that
//! pair into a single `Result` before anything reaches the gateway.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::Table;

/// The primary error type for all gateway and backend operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// A single-row fetch matched no rows.
    #[error("row not found: {table}/{id}")]
    NotFound { table: Table, id: String },

    /// The backend rejected or failed the query.
    #[error("query on {table} failed: {message}")]
    QueryFailed { table: Table, message: String },

    /// The HTTP request to the backend could not be completed.
    #[cfg(feature = "postgrest")]
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A row came back in a shape the model cannot represent.
    #[error("failed to decode {table} row: {message}")]
    Decode { table: Table, message: String },

    /// The request itself cannot be expressed against this backend.
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },
}

impl StorageError {
    /// Returns true when this error means "no such row".
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    pub(crate) fn query_failed(table: Table, message: impl Into<String>) -> Self {
        StorageError::QueryFailed {
            table,
            message: message.into(),
        }
    }
}

/// Error body returned by a PostgREST-compatible backend.
///
/// The same shape is used by the in-memory backend for injected failures so
/// both paths go through [`QueryOutcome::into_result`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendErrorBody {
    /// Backend error code (e.g. `PGRST116`, `42P01`).
    #[serde(default)]
    pub code: Option<String>,
    /// Primary message.
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl BackendErrorBody {
    /// Creates an error body with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Renders the message with details appended when present.
    pub fn describe(&self) -> String {
        match (&self.code, &self.details) {
            (Some(code), Some(details)) => format!("{} ({}): {}", self.message, code, details),
            (Some(code), None) => format!("{} ({})", self.message, code),
            (None, Some(details)) => format!("{}: {}", self.message, details),
            (None, None) => self.message.clone(),
        }
    }
}

/// The `(data, error)` pair a query boundary hands back.
///
/// Exactly one side is expected to be populated. A response with neither is
/// treated as an empty successful result; one with both is treated as a failure.
#[derive(Debug, Clone)]
pub struct QueryOutcome<T> {
    pub data: Option<T>,
    pub error: Option<BackendErrorBody>,
}

impl<T> QueryOutcome<T> {
    /// A successful outcome.
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// A failed outcome.
    pub fn failed(error: BackendErrorBody) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    /// Collapses the pair into a `Result`, attributing failures to `table`.
    pub fn into_result(self, table: Table) -> StorageResult<T>
    where
        T: Default,
    {
        match (self.data, self.error) {
            (_, Some(error)) => Err(StorageError::query_failed(table, error.describe())),
            (Some(data), None) => Ok(data),
            (None, None) => Ok(T::default()),
        }
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StorageError::NotFound {
            table: Table::Tests,
            id: "t-1".to_string(),
        };
        assert_eq!(err.to_string(), "row not found: tests/t-1");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_outcome_error_wins() {
        let outcome = QueryOutcome {
            data: Some(vec![1, 2]),
            error: Some(BackendErrorBody::new("boom")),
        };
        let err = outcome.into_result(Table::Labs).unwrap_err();
        assert!(matches!(err, StorageError::QueryFailed { .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_outcome_empty_is_ok() {
        let outcome: QueryOutcome<Vec<u8>> = QueryOutcome {
            data: None,
            error: None,
        };
        assert!(outcome.into_result(Table::Labs).unwrap().is_empty());
    }

    #[test]
    fn test_error_body_describe() {
        let body = BackendErrorBody {
            code: Some("42P01".to_string()),
            message: "relation does not exist".to_string(),
            details: None,
            hint: None,
        };
        assert_eq!(body.describe(), "relation does not exist (42P01)");
    }
}
