//! Error types for the Labwise API.
//!
//! Flow failures are normally rendered inline on the page view; [`RestError`]
//! covers requests that cannot produce a view at all, and maps flow
//! failures to HTTP status codes.
//!
//! # Error Mapping
//!
//! | Source | HTTP Status | Code |
//! |--------|-------------|------|
//! | `FlowError::NotFound` | 404 | not-found |
//! | `FlowError::InvalidInput` | 400 | invalid-input |
//! | `FlowError::BookingRejected` | 409 | booking-rejected |
//! | `FlowError::QueryFailed` | 502 | query-failed |
//! | missing `X-User-Id` | 401 | unauthorized |
//!
//! Every error body has the shape `{"error": {"code": "...", "message": "..."}}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use crate::flows::FlowError;

/// The primary error type for API operations.
#[derive(Debug)]
pub enum RestError {
    /// Row not found (HTTP 404).
    NotFound {
        /// Error message.
        message: String,
    },

    /// Bad request - malformed or incomplete input (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// No caller identity (HTTP 401).
    Unauthorized {
        /// Error message.
        message: String,
    },

    /// The booking cannot be made as requested (HTTP 409).
    Conflict {
        /// Error message.
        message: String,
    },

    /// The hosted store failed (HTTP 502).
    BadGateway {
        /// Error message.
        message: String,
    },
}

impl RestError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RestError::Conflict { .. } => StatusCode::CONFLICT,
            RestError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            RestError::NotFound { .. } => "not-found",
            RestError::BadRequest { .. } => "invalid-input",
            RestError::Unauthorized { .. } => "unauthorized",
            RestError::Conflict { .. } => "booking-rejected",
            RestError::BadGateway { .. } => "query-failed",
        }
    }

    fn message(&self) -> &str {
        match self {
            RestError::NotFound { message }
            | RestError::BadRequest { message }
            | RestError::Unauthorized { message }
            | RestError::Conflict { message }
            | RestError::BadGateway { message } => message,
        }
    }
}

/// Returns the HTTP status a view carrying `error` is served with.
pub fn flow_status(error: &FlowError) -> StatusCode {
    match error {
        FlowError::NotFound(_) => StatusCode::NOT_FOUND,
        FlowError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        FlowError::BookingRejected(_) => StatusCode::CONFLICT,
        FlowError::QueryFailed(_) => StatusCode::BAD_GATEWAY,
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::NotFound { message } => write!(f, "Not found: {}", message),
            RestError::BadRequest { message } => write!(f, "Bad request: {}", message),
            RestError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            RestError::Conflict { message } => write!(f, "Conflict: {}", message),
            RestError::BadGateway { message } => write!(f, "Backend failure: {}", message),
        }
    }
}

impl std::error::Error for RestError {}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": self.code(),
                "message": self.message(),
            }
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<FlowError> for RestError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::NotFound(message) => RestError::NotFound { message },
            FlowError::InvalidInput(message) => RestError::BadRequest { message },
            FlowError::BookingRejected(message) => RestError::Conflict { message },
            FlowError::QueryFailed(message) => RestError::BadGateway { message },
        }
    }
}

/// Result type for API operations.
pub type RestResult<T> = Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            RestError::NotFound {
                message: "x".to_string()
            }
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RestError::Unauthorized {
                message: "x".to_string()
            }
            .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RestError::Conflict {
                message: "x".to_string()
            }
            .status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_flow_error_conversion_matches_flow_status() {
        let errors = [
            FlowError::NotFound("a".to_string()),
            FlowError::InvalidInput("b".to_string()),
            FlowError::BookingRejected("c".to_string()),
            FlowError::QueryFailed("d".to_string()),
        ];
        for err in errors {
            let status = flow_status(&err);
            let code = err.code();
            let rest: RestError = err.into();
            assert_eq!(rest.status(), status);
            assert_eq!(rest.code(), code);
        }
    }

    #[test]
    fn test_error_display() {
        let err = RestError::BadRequest {
            message: "Invalid date".to_string(),
        };
        assert_eq!(err.to_string(), "Bad request: Invalid date");
    }
}
