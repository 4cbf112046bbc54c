//! Search flow: lists tests, optionally filtered by name.
//!
//! `Idle -> Loading -> {Loaded, Failed}`. A blank query lists every test;
//! otherwise tests whose name contains the trimmed query (ignoring case) are
//! returned. Results are always ordered by name.

#![allow(missing_docs)]

use std::sync::Arc;

use labwise_persistence::QueryBackend;
use labwise_persistence::gateway::Gateway;
use labwise_persistence::models::Test;
use labwise_persistence::query::{Filter, Order};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use super::FlowError;
use super::state::{RequestSequence, Stage, Ticket};

const DEFAULT_PREVIEW_LENGTH: usize = 120;

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestSummary {
    pub id: String,
    pub name: String,
    /// Description shortened for the result list.
    pub description: String,
    pub category: String,
    pub report_time_hours: u32,
    /// Where "compare prices" leads.
    pub compare_href: String,
}

/// What the search page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchView {
    pub query: String,
    pub loading: bool,
    pub error: Option<FlowError>,
    pub results: Vec<TestSummary>,
}

#[derive(Debug, Default)]
struct SearchState {
    query: String,
    stage: Stage<Vec<Test>>,
}

/// Drives the search page.
pub struct SearchFlow<B> {
    gateway: Arc<Gateway<B>>,
    state: Mutex<SearchState>,
    sequence: RequestSequence,
    preview_length: usize,
}

impl<B: QueryBackend> SearchFlow<B> {
    /// Creates an idle flow.
    pub fn new(gateway: Arc<Gateway<B>>) -> Self {
        Self {
            gateway,
            state: Mutex::new(SearchState::default()),
            sequence: RequestSequence::new(),
            preview_length: DEFAULT_PREVIEW_LENGTH,
        }
    }

    /// Sets how many characters of each description the results show.
    pub fn with_preview_length(mut self, length: usize) -> Self {
        self.preview_length = length;
        self
    }

    /// The query as typed.
    pub fn query(&self) -> String {
        self.state.lock().query.clone()
    }

    /// Replaces the query without searching.
    pub fn set_query(&self, query: impl Into<String>) {
        self.state.lock().query = query.into();
    }

    /// Loads the full listing.
    pub async fn mount(&self) -> SearchView {
        self.run(None, "Failed to fetch tests").await
    }

    /// Searches with the current query.
    ///
    /// A query that is empty after trimming behaves exactly like [`mount`](Self::mount).
    pub async fn search(&self) -> SearchView {
        let query = self.state.lock().query.trim().to_string();
        if query.is_empty() {
            return self.mount().await;
        }
        self.run(Some(query), "Failed to search tests").await
    }

    /// Sets the query and searches.
    pub async fn search_for(&self, query: impl Into<String>) -> SearchView {
        self.set_query(query);
        self.search().await
    }

    /// Stops the flow. Results still in flight are dropped.
    pub fn tear_down(&self) {
        self.sequence.tear_down();
    }

    /// Renders the current state.
    pub fn view(&self) -> SearchView {
        let state = self.state.lock();
        let results = state
            .stage
            .loaded()
            .map(|tests| {
                tests
                    .iter()
                    .map(|test| TestSummary {
                        id: test.id.clone(),
                        name: test.name.clone(),
                        description: preview(&test.description, self.preview_length),
                        category: test.category.clone(),
                        report_time_hours: test.report_time_hours,
                        compare_href: format!("/compare?testId={}", test.id),
                    })
                    .collect()
            })
            .unwrap_or_default();

        SearchView {
            query: state.query.clone(),
            loading: state.stage.is_loading(),
            error: state.stage.error().cloned(),
            results,
        }
    }

    async fn run(&self, needle: Option<String>, failure: &str) -> SearchView {
        let ticket = self.sequence.issue();
        self.begin(ticket);

        debug!(query = needle.as_deref().unwrap_or(""), "Searching tests");
        let filters = needle
            .map(|needle| vec![Filter::contains("name", needle)])
            .unwrap_or_default();
        let result = self
            .gateway
            .list::<Test>(filters, Some(Order::asc("name")))
            .await
            .map_err(|e| {
                warn!(error = %e, "Test search failed");
                FlowError::QueryFailed(failure.to_string())
            });

        self.finish(ticket, result);
        self.view()
    }

    fn begin(&self, ticket: Ticket) {
        let mut state = self.state.lock();
        if self.sequence.is_current(ticket) {
            state.stage = Stage::Loading;
        }
    }

    fn finish(&self, ticket: Ticket, result: Result<Vec<Test>, FlowError>) {
        let mut state = self.state.lock();
        if !self.sequence.is_current(ticket) {
            debug!(?ticket, "Dropping superseded search result");
            return;
        }
        state.stage.settle(result);
    }
}

/// Shortens `text` to at most `max_chars` characters, marking the cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.truncate(cut.trim_end().len());
    cut.push_str("...");
    cut
}
