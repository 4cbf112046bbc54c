//! Booking handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use labwise_persistence::QueryBackend;
use serde::Deserialize;
use tracing::debug;

use super::render;
use crate::error::RestResult;
use crate::flows::{BookingFlow, FlowError, FlowResult};
use crate::identity::UserId;
use crate::state::AppState;

/// Selections carried in the booking page's query string.
#[derive(Debug, Default, Deserialize)]
pub struct BookingParams {
    /// `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Slot start, `07:00` to `11:00`.
    pub time: Option<String>,
    /// `home` or `lab`.
    pub collection: Option<String>,
}

/// Body of a confirmation request.
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Slot start, `07:00` to `11:00`.
    pub time: String,
    /// Collect the sample at home. Defaults to `true`.
    #[serde(default = "default_home_collection")]
    pub home_collection: bool,
}

fn default_home_collection() -> bool {
    true
}

/// Handler for the booking page.
///
/// # HTTP Request
///
/// `GET [base]/book/[price_id]?date=[date]&time=[slot]&collection=home|lab`
///
/// # Response
///
/// - `200 OK` - Booking view with total and `can_confirm`
/// - `400 Bad Request` - Booking view with the rejected selection in `form_error`
/// - `404 Not Found` - Unknown offer
/// - `502 Bad Gateway` - Backend failure
pub async fn booking_handler<B>(
    State(state): State<AppState<B>>,
    Path(price_id): Path<String>,
    Query(params): Query<BookingParams>,
) -> Response
where
    B: QueryBackend + 'static,
{
    debug!(price_id = %price_id, "Processing booking page request");

    let flow = state.booking_flow();
    let view = flow.load(Some(&price_id)).await;
    if view.error.is_some() {
        return render(StatusCode::OK, view.error.as_ref(), &view);
    }

    let selected = apply_selection(
        &flow,
        params.date.as_deref(),
        params.time.as_deref(),
        params.collection.as_deref(),
    );
    if let Err(err) = selected {
        flow.reject_input(err);
    }

    let view = flow.view();
    render(StatusCode::OK, view.form_error.as_ref(), &view)
}

/// Handler for booking confirmation.
///
/// # HTTP Request
///
/// `POST [base]/book/[price_id]/confirm` with `X-User-Id` and a JSON
/// [`ConfirmRequest`] body.
///
/// # Response
///
/// - `201 Created` - Booking view with `confirmation` set
/// - `400 Bad Request` - Incomplete or malformed selection
/// - `401 Unauthorized` - Missing `X-User-Id`
/// - `404 Not Found` - Unknown offer
/// - `409 Conflict` - Booking rejected
/// - `502 Bad Gateway` - Backend failure
pub async fn confirm_booking_handler<B>(
    State(state): State<AppState<B>>,
    Path(price_id): Path<String>,
    user: UserId,
    Json(request): Json<ConfirmRequest>,
) -> RestResult<Response>
where
    B: QueryBackend + 'static,
{
    debug!(price_id = %price_id, user = %user, "Processing booking confirmation");

    let flow = state.booking_flow();
    let view = flow.load(Some(&price_id)).await;
    if let Some(err) = view.error {
        return Err(err.into());
    }

    let selected = apply_selection(&flow, Some(&request.date), Some(&request.time), None);
    if let Err(err) = selected {
        flow.reject_input(err.clone());
        return Ok(render(StatusCode::OK, Some(&err), &flow.view()));
    }
    flow.set_home_collection(request.home_collection);

    let response = match flow.confirm(&user).await {
        Ok(_) => render(StatusCode::CREATED, None, &flow.view()),
        Err(err) => render(StatusCode::OK, Some(&err), &flow.view()),
    };
    Ok(response)
}

fn apply_selection<B: QueryBackend>(
    flow: &BookingFlow<B>,
    date: Option<&str>,
    time: Option<&str>,
    collection: Option<&str>,
) -> FlowResult<()> {
    if let Some(date) = date {
        flow.select_date(date)?;
    }
    if let Some(time) = time {
        flow.select_time(time)?;
    }
    if let Some(collection) = collection {
        flow.set_home_collection(parse_collection(collection)?);
    }
    Ok(())
}

/// `home` is home collection, `lab` a lab visit.
fn parse_collection(value: &str) -> FlowResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "home" => Ok(true),
        "lab" => Ok(false),
        other => Err(FlowError::InvalidInput(format!(
            "Unknown collection type '{}' (expected home or lab)",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collection() {
        assert_eq!(parse_collection("home"), Ok(true));
        assert_eq!(parse_collection(" LAB "), Ok(false));
        assert!(parse_collection("clinic").is_err());
    }

    #[test]
    fn test_confirm_request_defaults_to_home() {
        let request: ConfirmRequest =
            serde_json::from_str(r#"{"date": "2025-06-01", "time": "09:00"}"#).unwrap();
        assert!(request.home_collection);
    }
}
