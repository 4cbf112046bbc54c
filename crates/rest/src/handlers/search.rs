//! Test search handler.

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

/// Query parameters of the search page.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Name fragment. Absent or blank lists every test.
    pub q: Option<String>,
}

/// Handler for the search page.
///
/// # HTTP Request
///
/// `GET [base]/search?q=[query]`
///
/// # Response
///
/// - `200 OK` - Search view
/// - `502 Bad Gateway` - Search view with an inline error
pub async fn search_handler<B>(
    State(state): State<AppState<B>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    B: QueryBackend + 'static,
{
    debug!(query = ?params.q, "Processing search request");

    let flow = state.search_flow();
    let view = match params.q {
        Some(query) => flow.search_for(query).await,
        None => flow.mount().await,
    };

    render(StatusCode::OK, view.error.as_ref(), &view)
}
