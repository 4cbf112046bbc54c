//! Search, comparison and booking flows.
//!
//! A flow is a small state machine bound to one gateway. It fetches through
//! the gateway, records the outcome, and renders a view model that the HTTP
//! handlers return as JSON. Flows are usable without HTTP.
//!
//! Every flow follows the same rules:
//!
//! - a settled call always leaves the flow out of its loading state;
//! - gateway failures become an inline [`FlowError`] on the view;
//! - only the latest call issued on a flow may write its result, see
//!   [`RequestSequence`].

pub mod booking;
pub mod comparison;
pub mod labs;
pub mod search;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use booking::{BookingFlow, BookingView, calculate_total};
pub use comparison::{ComparisonFlow, ComparisonView};
pub use labs::{LabDirectory, LabsView};
pub use search::{SearchFlow, SearchView};
pub use state::{RequestSequence, Stage, Ticket};

use labwise_persistence::StorageError;
use serde::Serialize;
use thiserror::Error;

/// A failure shown to the user.
///
/// Serializes as `{"code": "...", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", content = "message", rename_all = "kebab-case")]
pub enum FlowError {
    /// The requested row does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The backend call failed.
    #[error("{0}")]
    QueryFailed(String),

    /// A user selection was malformed or incomplete.
    #[error("{0}")]
    InvalidInput(String),

    /// The booking cannot be confirmed as selected.
    #[error("{0}")]
    BookingRejected(String),
}

impl FlowError {
    /// Returns the user-facing message.
    pub fn message(&self) -> &str {
        match self {
            FlowError::NotFound(m)
            | FlowError::QueryFailed(m)
            | FlowError::InvalidInput(m)
            | FlowError::BookingRejected(m) => m,
        }
    }

    /// Returns the machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            FlowError::NotFound(_) => "not-found",
            FlowError::QueryFailed(_) => "query-failed",
            FlowError::InvalidInput(_) => "invalid-input",
            FlowError::BookingRejected(_) => "booking-rejected",
        }
    }

    /// Maps a gateway failure to a flow error with a user-facing message.
    ///
    /// Missing rows keep their not-found kind; every other storage failure
    /// is reported as `QueryFailed` with `message`.
    pub(crate) fn from_storage(err: &StorageError, message: &str, not_found: &str) -> Self {
        if err.is_not_found() {
            FlowError::NotFound(not_found.to_string())
        } else {
            FlowError::QueryFailed(message.to_string())
        }
    }
}

/// Result type for flow operations.
pub type FlowResult<T> = Result<T, FlowError>;
