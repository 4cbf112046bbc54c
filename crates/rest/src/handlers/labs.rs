//! Lab directory handler.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use labwise_persistence::QueryBackend;
use serde::Deserialize;
use tracing::debug;

use super::render;
use crate::state::AppState;

/// Query parameters of the lab directory.
#[derive(Debug, Default, Deserialize)]
pub struct LabsParams {
    /// City to list. Defaults to the configured city.
    pub city: Option<String>,
}

/// Handler for the lab directory.
///
/// # HTTP Request
///
/// `GET [base]/labs?city=[city]`
pub async fn labs_handler<B>(
    State(state): State<AppState<B>>,
    Query(params): Query<LabsParams>,
) -> Response
where
    B: QueryBackend + 'static,
{
    let city = params
        .city
        .unwrap_or_else(|| state.default_city().to_string());
    debug!(city = %city, "Processing labs request");

    let view = state.lab_directory().list(&city).await;
    render(StatusCode::OK, view.error.as_ref(), &view)
}
