//! Price comparison handler.

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

/// Query parameters of the comparison page.
#[derive(Debug, Default, Deserialize)]
pub struct CompareParams {
    /// Test to compare.
    #[serde(rename = "testId")]
    pub test_id: Option<String>,
}

/// Handler for the comparison page.
///
/// # HTTP Request
///
/// `GET [base]/compare?testId=[id]`
///
/// # Response
///
/// - `200 OK` - Comparison view, or the "no test selected" view
/// - `404 Not Found` - Unknown test
/// - `502 Bad Gateway` - Backend failure
pub async fn compare_handler<B>(
    State(state): State<AppState<B>>,
    Query(params): Query<CompareParams>,
) -> Response
where
    B: QueryBackend + 'static,
{
    debug!(test_id = ?params.test_id, "Processing compare request");

    let view = state
        .comparison_flow()
        .load(params.test_id.as_deref())
        .await;

    render(StatusCode::OK, view.error.as_ref(), &view)
}
