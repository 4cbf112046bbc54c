//! Comparison flow: one test and every lab's price for it.
//!
//! Loading takes two gateway calls, the test by id and then its price rows
//! joined with their labs. Either failing fails the flow. Price rows are
//! shown in backend order.

#![allow(missing_docs)]

use std::sync::Arc;

use labwise_persistence::QueryBackend;
use labwise_persistence::gateway::Gateway;
use labwise_persistence::models::{LabTestPriceWithLab, Test};
use labwise_persistence::query::{Embed, Filter};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use super::state::{RequestSequence, Stage, Ticket};
use super::{FlowError, FlowResult};

const FETCH_FAILED: &str = "Failed to fetch comparison data";

/// Page shown when no test id was given.
pub const SEARCH_HREF: &str = "/search";

/// A loaded comparison. `test` is `None` when nothing was selected.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub test: Option<Test>,
    pub prices: Vec<LabTestPriceWithLab>,
}

/// One lab's offer for the compared test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRow {
    pub price_id: String,
    pub lab_id: String,
    pub lab_name: String,
    pub lab_address: String,
    pub accredited: bool,
    pub rating: f64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Present only when the lab collects samples at home.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub home_collection_fee: Option<Decimal>,
    pub report_time_hours: u32,
    pub book_href: String,
}

/// What the comparison page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonView {
    pub loading: bool,
    pub error: Option<FlowError>,
    pub no_test_selected: bool,
    pub search_href: &'static str,
    pub test: Option<Test>,
    pub rows: Vec<PriceRow>,
}

/// Drives the comparison page.
pub struct ComparisonFlow<B> {
    gateway: Arc<Gateway<B>>,
    stage: Mutex<Stage<Comparison>>,
    sequence: RequestSequence,
}

impl<B: QueryBackend> ComparisonFlow<B> {
    /// Creates an idle flow.
    pub fn new(gateway: Arc<Gateway<B>>) -> Self {
        Self {
            gateway,
            stage: Mutex::new(Stage::Idle),
            sequence: RequestSequence::new(),
        }
    }

    /// Loads the comparison for `test_id`.
    ///
    /// A missing or blank id is not an error: the view reports that no test
    /// was selected.
    pub async fn load(&self, test_id: Option<&str>) -> ComparisonView {
        let ticket = self.sequence.issue();

        let Some(test_id) = test_id.map(str::trim).filter(|id| !id.is_empty()) else {
            debug!("No test selected for comparison");
            self.finish(
                ticket,
                Ok(Comparison {
                    test: None,
                    prices: Vec::new(),
                }),
            );
            return self.view();
        };

        self.begin(ticket);
        let result = self.fetch(test_id).await;
        self.finish(ticket, result);
        self.view()
    }

    /// Stops the flow. Results still in flight are dropped.
    pub fn tear_down(&self) {
        self.sequence.tear_down();
    }

    /// Renders the current state.
    pub fn view(&self) -> ComparisonView {
        let stage = self.stage.lock();
        let comparison = stage.loaded();

        let test = comparison.and_then(|c| c.test.clone());
        let report_time_hours = test.as_ref().map_or(0, |t| t.report_time_hours);
        let rows = comparison
            .map(|c| {
                c.prices
                    .iter()
                    .map(|row| PriceRow {
                        price_id: row.price.id.clone(),
                        lab_id: row.lab.id.clone(),
                        lab_name: row.lab.name.clone(),
                        lab_address: row.lab.address.clone(),
                        accredited: row.lab.accredited,
                        rating: row.lab.rating,
                        price: row.price.price,
                        home_collection_fee: row.price.home_collection_annotation(),
                        report_time_hours,
                        book_href: format!("/book/{}", row.price.id),
                    })
                    .collect()
            })
            .unwrap_or_default();

        ComparisonView {
            loading: stage.is_loading(),
            error: stage.error().cloned(),
            no_test_selected: comparison.is_some_and(|c| c.test.is_none()),
            search_href: SEARCH_HREF,
            test,
            rows,
        }
    }

    async fn fetch(&self, test_id: &str) -> FlowResult<Comparison> {
        debug!(test_id = %test_id, "Loading comparison");

        let test = self
            .gateway
            .get_by_id::<Test>(test_id)
            .await
            .map_err(|e| {
                warn!(test_id = %test_id, error = %e, "Failed to load test");
                FlowError::from_storage(
                    &e,
                    FETCH_FAILED,
                    &format!("No test found with id {}", test_id),
                )
            })?;

        let prices = self
            .gateway
            .list_with_join::<LabTestPriceWithLab>(
                &[Embed::Lab],
                vec![Filter::eq("test_id", test_id)],
            )
            .await
            .map_err(|e| {
                warn!(test_id = %test_id, error = %e, "Failed to load prices");
                FlowError::QueryFailed(FETCH_FAILED.to_string())
            })?;

        Ok(Comparison {
            test: Some(test),
            prices,
        })
    }

    fn begin(&self, ticket: Ticket) {
        let mut stage = self.stage.lock();
        if self.sequence.is_current(ticket) {
            *stage = Stage::Loading;
        }
    }

    fn finish(&self, ticket: Ticket, result: FlowResult<Comparison>) {
        let mut stage = self.stage.lock();
        if !self.sequence.is_current(ticket) {
            debug!(?ticket, "Dropping superseded comparison");
            return;
        }
        stage.settle(result);
    }
}
