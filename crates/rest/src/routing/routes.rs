//! Route table.

use axum::{
    Router,
    routing::{get, post},
};
use labwise_persistence::QueryBackend;

use crate::handlers;
use crate::state::AppState;

/// Creates all API routes.
///
/// # Routes
///
/// ## Pages
/// - `GET /` - Landing page
/// - `GET /search?q=` - Test search
/// - `GET /compare?testId=` - Price comparison
/// - `GET /book/{price_id}` - Booking page
/// - `POST /book/{price_id}/confirm` - Booking confirmation
/// - `GET /labs?city=` - Lab directory
///
/// ## Operations
/// - `GET /health` - Health check
/// - `GET /_liveness` - Liveness check
/// - `GET /_readiness` - Readiness check
pub fn create_routes<B>(state: AppState<B>) -> Router
where
    B: QueryBackend + 'static,
{
    Router::new()
        // Pages
        .route("/", get(handlers::home_handler))
        .route("/search", get(handlers::search_handler::<B>))
        .route("/compare", get(handlers::compare_handler::<B>))
        .route("/book/{price_id}", get(handlers::booking_handler::<B>))
        .route(
            "/book/{price_id}/confirm",
            post(handlers::confirm_booking_handler::<B>),
        )
        .route("/labs", get(handlers::labs_handler::<B>))
        // Operations
        .route("/health", get(handlers::health_handler::<B>))
        .route("/_liveness", get(handlers::liveness_handler))
        .route("/_readiness", get(handlers::readiness_handler::<B>))
        // State
        .with_state(state)
}
