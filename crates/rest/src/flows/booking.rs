//! Booking flow: pick a slot for one lab's offer and confirm it.
//!
//! The flow loads a price row with its lab and test, then collects a date,
//! a time slot and the collection type. The total is recomputed from the
//! loaded price on every render. Confirming writes a single booking row.
//!
//! Confirmation rules, checked in order:
//!
//! 1. date and time must both be selected (`InvalidInput`);
//! 2. the date may not be before the flow's reference day (`BookingRejected`);
//! 3. home collection needs a lab that offers it (`BookingRejected`);
//! 4. a flow confirms at most once (`BookingRejected`).
//!
//! Submission failures stay on the page next to the loaded details.

#![allow(missing_docs)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use labwise_persistence::QueryBackend;
use labwise_persistence::gateway::Gateway;
use labwise_persistence::models::{Booking, LabTestPrice, LabTestPriceWithRelations, TimeSlot};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::state::{RequestSequence, Stage, Ticket};
use super::{FlowError, FlowResult};
use crate::identity::UserId;

const INVALID_BOOKING: &str = "Invalid booking details";
const FETCH_FAILED: &str = "Failed to fetch booking details";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Price of a booking: the test price plus the home collection fee when the
/// sample is collected at home.
pub fn calculate_total(price: &LabTestPrice, is_home_collection: bool) -> Decimal {
    if is_home_collection {
        price.price + price.home_collection_fee
    } else {
        price.price
    }
}

/// The user's current choices. Never persisted until confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub date: Option<NaiveDate>,
    pub time: Option<TimeSlot>,
    pub is_home_collection: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            date: None,
            time: None,
            is_home_collection: true,
        }
    }
}

impl Selection {
    /// Whether both a date and a time slot are chosen.
    pub fn is_complete(&self) -> bool {
        self.date.is_some() && self.time.is_some()
    }
}

/// A time slot as offered on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// The offer being booked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingDetails {
    pub price_id: String,
    pub test_id: String,
    pub test_name: String,
    pub preparation_instructions: String,
    pub report_time_hours: u32,
    pub lab_id: String,
    pub lab_name: String,
    pub lab_address: String,
    pub accredited: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub home_collection_available: bool,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub home_collection_fee: Option<Decimal>,
}

impl From<&LabTestPriceWithRelations> for BookingDetails {
    fn from(row: &LabTestPriceWithRelations) -> Self {
        Self {
            price_id: row.price.id.clone(),
            test_id: row.test.id.clone(),
            test_name: row.test.name.clone(),
            preparation_instructions: row.test.preparation_instructions.clone(),
            report_time_hours: row.test.report_time_hours,
            lab_id: row.lab.id.clone(),
            lab_name: row.lab.name.clone(),
            lab_address: row.lab.address.clone(),
            accredited: row.lab.accredited,
            price: row.price.price,
            home_collection_available: row.price.home_collection_available,
            home_collection_fee: row.price.home_collection_annotation(),
        }
    }
}

/// What the booking page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingView {
    pub loading: bool,
    /// Load failure. The page shows nothing else when set.
    pub error: Option<FlowError>,
    pub details: Option<BookingDetails>,
    pub selection: Selection,
    pub time_slots: Vec<SlotOption>,
    /// Earliest selectable date.
    pub min_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub total: Option<Decimal>,
    pub can_confirm: bool,
    pub submitting: bool,
    /// Rejected input or a failed submission.
    pub form_error: Option<FlowError>,
    pub confirmation: Option<Booking>,
}

#[derive(Debug, Default)]
struct BookingState {
    stage: Stage<LabTestPriceWithRelations>,
    selection: Selection,
    submitting: bool,
    form_error: Option<FlowError>,
    confirmation: Option<Booking>,
}

#[derive(Serialize)]
struct NewBooking<'a> {
    id: String,
    price_id: &'a str,
    user_id: &'a str,
    date: NaiveDate,
    time_slot: TimeSlot,
    home_collection: bool,
    #[serde(with = "rust_decimal::serde::float")]
    total: Decimal,
    created_at: DateTime<Utc>,
}

/// Drives the booking page.
pub struct BookingFlow<B> {
    gateway: Arc<Gateway<B>>,
    state: Mutex<BookingState>,
    sequence: RequestSequence,
    today: NaiveDate,
}

impl<B: QueryBackend> BookingFlow<B> {
    /// Creates an idle flow whose reference day is today (UTC).
    pub fn new(gateway: Arc<Gateway<B>>) -> Self {
        Self {
            gateway,
            state: Mutex::new(BookingState::default()),
            sequence: RequestSequence::new(),
            today: Utc::now().date_naive(),
        }
    }

    /// Replaces the reference day used for date checks.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Loads the offer identified by `price_id`.
    pub async fn load(&self, price_id: Option<&str>) -> BookingView {
        let ticket = self.sequence.issue();

        let Some(price_id) = price_id.map(str::trim).filter(|id| !id.is_empty()) else {
            self.finish(ticket, Err(FlowError::NotFound(INVALID_BOOKING.to_string())));
            return self.view();
        };

        self.begin(ticket);
        debug!(price_id = %price_id, "Loading booking details");
        let result = self
            .gateway
            .get_by_id::<LabTestPriceWithRelations>(price_id)
            .await
            .map_err(|e| {
                warn!(price_id = %price_id, error = %e, "Failed to load booking details");
                FlowError::from_storage(&e, FETCH_FAILED, INVALID_BOOKING)
            });
        self.finish(ticket, result);
        self.view()
    }

    /// Selects a date from `YYYY-MM-DD` input. Blank input clears the date.
    pub fn select_date(&self, input: &str) -> FlowResult<()> {
        let input = input.trim();
        let date = if input.is_empty() {
            None
        } else {
            let date = NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| {
                FlowError::InvalidInput(format!("'{}' is not a date (expected YYYY-MM-DD)", input))
            })?;
            if date < self.today {
                return Err(FlowError::InvalidInput(format!(
                    "Choose {} or a later date",
                    self.today.format(DATE_FORMAT)
                )));
            }
            Some(date)
        };
        self.state.lock().selection.date = date;
        Ok(())
    }

    /// Selects a time slot by its start (`"09:00"`). Blank input clears it.
    pub fn select_time(&self, input: &str) -> FlowResult<()> {
        let input = input.trim();
        let time = if input.is_empty() {
            None
        } else {
            Some(TimeSlot::parse(input).ok_or_else(|| {
                FlowError::InvalidInput(format!("'{}' is not an available time slot", input))
            })?)
        };
        self.state.lock().selection.time = time;
        Ok(())
    }

    /// Chooses home collection (`true`) or a lab visit (`false`).
    pub fn set_home_collection(&self, is_home_collection: bool) {
        self.state.lock().selection.is_home_collection = is_home_collection;
    }

    /// The current selection.
    pub fn selection(&self) -> Selection {
        self.state.lock().selection.clone()
    }

    /// Whether date and time are both chosen.
    pub fn can_confirm(&self) -> bool {
        self.state.lock().selection.is_complete()
    }

    /// Total for the loaded offer and current collection choice.
    pub fn total(&self) -> Option<Decimal> {
        let state = self.state.lock();
        state
            .stage
            .loaded()
            .map(|row| calculate_total(&row.price, state.selection.is_home_collection))
    }

    /// Records a rejected input so the page can show it.
    pub fn reject_input(&self, err: FlowError) {
        self.state.lock().form_error = Some(err);
    }

    /// Confirms the booking for `user`.
    ///
    /// On success the flow reaches its terminal confirmed state. Any failure
    /// is also kept as the view's `form_error`; the loaded details remain.
    pub async fn confirm(&self, user: &UserId) -> FlowResult<Booking> {
        let (row, selection) = self.prepare_submission()?;

        let result = self.submit(&row, &selection, user).await;

        let mut state = self.state.lock();
        state.submitting = false;
        if self.sequence.is_torn_down() {
            return result;
        }
        match &result {
            Ok(booking) => {
                state.form_error = None;
                state.confirmation = Some(booking.clone());
            }
            Err(err) => state.form_error = Some(err.clone()),
        }
        result
    }

    /// Stops the flow. Results still in flight are dropped.
    pub fn tear_down(&self) {
        self.sequence.tear_down();
    }

    /// Renders the current state.
    pub fn view(&self) -> BookingView {
        let state = self.state.lock();
        let row = state.stage.loaded();

        BookingView {
            loading: state.stage.is_loading(),
            error: state.stage.error().cloned(),
            details: row.map(BookingDetails::from),
            selection: state.selection.clone(),
            time_slots: TimeSlot::ALL
                .iter()
                .map(|slot| SlotOption {
                    value: slot.value(),
                    label: slot.label(),
                    selected: state.selection.time == Some(*slot),
                })
                .collect(),
            min_date: self.today,
            total: row.map(|row| calculate_total(&row.price, state.selection.is_home_collection)),
            can_confirm: state.selection.is_complete(),
            submitting: state.submitting,
            form_error: state.form_error.clone(),
            confirmation: state.confirmation.clone(),
        }
    }

    /// Validates the selection and marks the flow as submitting.
    fn prepare_submission(&self) -> FlowResult<(LabTestPriceWithRelations, Selection)> {
        let mut state = self.state.lock();

        let checked = Self::check(&state, self.today);
        match checked {
            Ok(row) => {
                state.submitting = true;
                Ok((row, state.selection.clone()))
            }
            Err(err) => {
                debug!(code = err.code(), "Booking rejected before submission");
                state.form_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn check(state: &BookingState, today: NaiveDate) -> FlowResult<LabTestPriceWithRelations> {
        let row = state
            .stage
            .loaded()
            .ok_or_else(|| FlowError::NotFound(INVALID_BOOKING.to_string()))?;
        let selection = &state.selection;

        let (Some(date), Some(_)) = (selection.date, selection.time) else {
            return Err(FlowError::InvalidInput(
                "Select a date and a time slot to continue".to_string(),
            ));
        };
        if date < today {
            return Err(FlowError::BookingRejected(format!(
                "{} has already passed",
                date.format(DATE_FORMAT)
            )));
        }
        if selection.is_home_collection && !row.price.home_collection_available {
            return Err(FlowError::BookingRejected(format!(
                "{} does not offer home collection",
                row.lab.name
            )));
        }
        if state.confirmation.is_some() {
            return Err(FlowError::BookingRejected(
                "This booking is already confirmed".to_string(),
            ));
        }
        if state.submitting {
            return Err(FlowError::BookingRejected(
                "This booking is already being submitted".to_string(),
            ));
        }
        Ok(row.clone())
    }

    async fn submit(
        &self,
        row: &LabTestPriceWithRelations,
        selection: &Selection,
        user: &UserId,
    ) -> FlowResult<Booking> {
        let (Some(date), Some(time_slot)) = (selection.date, selection.time) else {
            return Err(FlowError::InvalidInput(
                "Select a date and a time slot to continue".to_string(),
            ));
        };

        let booking = NewBooking {
            id: uuid::Uuid::new_v4().to_string(),
            price_id: &row.price.id,
            user_id: user.as_str(),
            date,
            time_slot,
            home_collection: selection.is_home_collection,
            total: calculate_total(&row.price, selection.is_home_collection),
            created_at: Utc::now(),
        };

        let stored: Vec<Booking> = self.gateway.insert(&[booking]).await.map_err(|e| {
            warn!(price_id = %row.price.id, error = %e, "Failed to store booking");
            FlowError::QueryFailed("Failed to confirm booking".to_string())
        })?;

        let booking = stored.into_iter().next().ok_or_else(|| {
            FlowError::QueryFailed("Failed to confirm booking".to_string())
        })?;
        info!(
            booking_id = %booking.id,
            price_id = %booking.price_id,
            user = %user,
            "Booking confirmed"
        );
        Ok(booking)
    }

    fn begin(&self, ticket: Ticket) {
        let mut state = self.state.lock();
        if self.sequence.is_current(ticket) {
            state.stage = Stage::Loading;
        }
    }

    fn finish(&self, ticket: Ticket, result: FlowResult<LabTestPriceWithRelations>) {
        let mut state = self.state.lock();
        if !self.sequence.is_current(ticket) {
            debug!(?ticket, "Dropping superseded booking details");
            return;
        }
        state.stage.settle(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::testing::GatedBackend;
    use chrono::Days;
    use labwise_persistence::backends::memory::MemoryBackend;
    use labwise_persistence::query::Table;
    use rust_decimal_macros::dec;

    const FULL_BODY: &str = "price-pathkind-labs-full-body-checkup";
    const KIDNEY: &str = "price-path-plus-care-kidney-function-test";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    fn flow_over(backend: MemoryBackend) -> BookingFlow<MemoryBackend> {
        BookingFlow::new(Arc::new(Gateway::new(backend))).with_today(today())
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn price(amount: Decimal, fee: Decimal) -> LabTestPrice {
        LabTestPrice {
            id: "p".to_string(),
            lab_id: "l".to_string(),
            test_id: "t".to_string(),
            price: amount,
            home_collection_available: true,
            home_collection_fee: fee,
        }
    }

    #[test]
    fn test_calculate_total() {
        let p = price(dec!(999), dec!(199));
        assert_eq!(calculate_total(&p, true), dec!(1198));
        assert_eq!(calculate_total(&p, false), dec!(999));
    }

    #[tokio::test]
    async fn test_load_joins_lab_and_test() {
        let flow = flow_over(MemoryBackend::seeded());
        let view = flow.load(Some(FULL_BODY)).await;

        let details = view.details.unwrap();
        assert_eq!(details.test_name, "Full Body Checkup");
        assert_eq!(details.lab_name, "Pathkind Labs");
        assert!(view.selection.is_home_collection);
        assert_eq!(view.total, Some(dec!(1198)));
        assert_eq!(view.time_slots.len(), 5);
        assert_eq!(view.min_date, today());
        assert!(!view.can_confirm);
    }

    #[tokio::test]
    async fn test_missing_or_unknown_id_is_invalid_booking() {
        let flow = flow_over(MemoryBackend::seeded());
        for id in [None, Some(""), Some("price-none")] {
            let view = flow.load(id).await;
            assert!(!view.loading);
            assert_eq!(
                view.error,
                Some(FlowError::NotFound(INVALID_BOOKING.to_string()))
            );
        }
    }

    #[tokio::test]
    async fn test_backend_failure_is_fetch_failure() {
        let backend = MemoryBackend::seeded();
        backend.fail_table(Table::Labs, "timeout");
        let view = flow_over(backend).load(Some(FULL_BODY)).await;
        assert!(!view.loading);
        assert_eq!(
            view.error,
            Some(FlowError::QueryFailed(FETCH_FAILED.to_string()))
        );
    }

    #[tokio::test]
    async fn test_total_follows_collection_choice() {
        let flow = flow_over(MemoryBackend::seeded());
        flow.load(Some(FULL_BODY)).await;
        flow.set_home_collection(false);
        assert_eq!(flow.total(), Some(dec!(999)));
        flow.set_home_collection(true);
        assert_eq!(flow.total(), Some(dec!(1198)));
    }

    #[test]
    fn test_can_confirm_needs_date_and_time() {
        let flow = flow_over(MemoryBackend::new());
        assert!(!flow.can_confirm());

        flow.select_date("2025-06-01").unwrap();
        assert!(!flow.can_confirm());

        flow.select_time("09:00").unwrap();
        assert!(flow.can_confirm());

        flow.select_date("").unwrap();
        assert!(!flow.can_confirm());
    }

    #[test]
    fn test_selection_input_is_validated() {
        let flow = flow_over(MemoryBackend::new());
        assert!(matches!(
            flow.select_time("12:00"),
            Err(FlowError::InvalidInput(_))
        ));
        assert!(matches!(
            flow.select_date("01/06/2025"),
            Err(FlowError::InvalidInput(_))
        ));
        assert!(matches!(
            flow.select_date("2025-05-19"),
            Err(FlowError::InvalidInput(_))
        ));
        assert!(flow.select_date("2025-05-20").is_ok());
        assert_eq!(flow.selection().date, Some(today()));
    }

    #[tokio::test]
    async fn test_confirm_requires_selection() {
        let flow = flow_over(MemoryBackend::seeded());
        flow.load(Some(FULL_BODY)).await;

        let err = flow.confirm(&user()).await.unwrap_err();
        assert!(matches!(err, FlowError::InvalidInput(_)));
        let view = flow.view();
        assert_eq!(view.form_error, Some(err));
        assert!(view.details.is_some());
    }

    #[tokio::test]
    async fn test_confirm_writes_booking_once() {
        let backend = MemoryBackend::seeded();
        let flow = flow_over(backend.clone());
        flow.load(Some(FULL_BODY)).await;
        flow.select_date("2025-06-01").unwrap();
        flow.select_time("09:00").unwrap();

        let booking = flow.confirm(&user()).await.unwrap();
        assert_eq!(booking.price_id, FULL_BODY);
        assert_eq!(booking.user_id, "user-1");
        assert_eq!(booking.time_slot, TimeSlot::H09);
        assert_eq!(booking.total, dec!(1198));
        assert_eq!(backend.rows(Table::Bookings).len(), 1);
        assert_eq!(flow.view().confirmation, Some(booking));

        let again = flow.confirm(&user()).await.unwrap_err();
        assert!(matches!(again, FlowError::BookingRejected(_)));
        assert_eq!(backend.rows(Table::Bookings).len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_rejects_home_collection_where_unavailable() {
        let flow = flow_over(MemoryBackend::seeded());
        let view = flow.load(Some(KIDNEY)).await;
        assert_eq!(view.details.unwrap().home_collection_fee, None);

        flow.select_date("2025-06-01").unwrap();
        flow.select_time("07:00").unwrap();
        let err = flow.confirm(&user()).await.unwrap_err();
        assert!(matches!(err, FlowError::BookingRejected(_)));

        flow.set_home_collection(false);
        let booking = flow.confirm(&user()).await.unwrap();
        assert_eq!(booking.total, dec!(899));
        assert!(!booking.home_collection);
    }

    #[tokio::test]
    async fn test_confirm_rejects_past_date() {
        let backend = MemoryBackend::seeded();
        let flow = flow_over(backend.clone());
        flow.load(Some(FULL_BODY)).await;
        flow.select_date("2025-05-20").unwrap();
        flow.select_time("10:00").unwrap();

        // The same selection a day later.
        let later = BookingFlow::new(Arc::new(Gateway::new(backend)))
            .with_today(today().checked_add_days(Days::new(1)).unwrap());
        later.load(Some(FULL_BODY)).await;
        {
            let mut state = later.state.lock();
            state.selection = flow.selection();
        }
        let err = later.confirm(&user()).await.unwrap_err();
        assert!(matches!(err, FlowError::BookingRejected(_)));
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_details() {
        let backend = MemoryBackend::seeded();
        backend.fail_table(Table::Bookings, "permission denied for table bookings");
        let flow = flow_over(backend);
        flow.load(Some(FULL_BODY)).await;
        flow.select_date("2025-06-01").unwrap();
        flow.select_time("08:00").unwrap();

        let err = flow.confirm(&user()).await.unwrap_err();
        assert!(matches!(err, FlowError::QueryFailed(_)));

        let view = flow.view();
        assert!(view.error.is_none());
        assert!(view.details.is_some());
        assert!(!view.submitting);
        assert_eq!(view.form_error, Some(err));
        assert!(view.confirmation.is_none());
    }

    #[tokio::test]
    async fn test_torn_down_load_ignores_late_details() {
        let backend = GatedBackend::new(MemoryBackend::seeded());
        let tx = backend.gate();
        let flow = BookingFlow::new(Arc::new(Gateway::new(backend))).with_today(today());

        let teardown = async {
            tokio::task::yield_now().await;
            flow.tear_down();
            let _ = tx.send(());
        };
        let (view, _) = tokio::join!(flow.load(Some(FULL_BODY)), teardown);

        assert!(view.details.is_none());
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn test_torn_down_confirm_leaves_view_untouched() {
        let store = MemoryBackend::seeded();
        let backend = Arc::new(GatedBackend::new(store.clone()));
        let flow = BookingFlow::new(Arc::new(Gateway::new(Arc::clone(&backend))))
            .with_today(today());
        flow.load(Some(FULL_BODY)).await;
        flow.select_date("2025-06-01").unwrap();
        flow.select_time("09:00").unwrap();

        let tx = backend.gate();
        let teardown = async {
            tokio::task::yield_now().await;
            flow.tear_down();
            let _ = tx.send(());
        };
        let user = user();
        let (result, _) = tokio::join!(flow.confirm(&user), teardown);

        assert!(result.is_ok());
        let view = flow.view();
        assert!(view.confirmation.is_none());
        assert!(view.form_error.is_none());
        assert!(!view.submitting);
        assert_eq!(store.rows(Table::Bookings).len(), 1);
    }
}
