//! HTTP request handlers.
//!
//! Page handlers build a fresh flow per request, drive it and return its
//! view as JSON. A view that carries a failure is served with the status for
//! that failure, see [`crate::error::flow_status`].
//!
//! - [`home`] - Landing page
//! - [`search`] - Test search
//! - [`compare`] - Price comparison for one test
//! - [`booking`] - Booking page and confirmation
//! - [`labs`] - Lab directory
//! - [`health`] - Health check endpoints

pub mod booking;
pub mod compare;
pub mod health;
pub mod home;
pub mod labs;
pub mod search;

// Re-export handlers for convenience
pub use booking::{booking_handler, confirm_booking_handler};
pub use compare::compare_handler;
pub use health::{health_handler, liveness_handler, readiness_handler};
pub use home::home_handler;
pub use labs::labs_handler;
pub use search::search_handler;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::flow_status;
use crate::flows::FlowError;

/// Serves `view`, with the failure's status when `error` is set.
pub(crate) fn render<V: Serialize>(
    success: StatusCode,
    error: Option<&FlowError>,
    view: V,
) -> Response {
    let status = error.map(flow_status).unwrap_or(success);
    (status, Json(view)).into_response()
}
