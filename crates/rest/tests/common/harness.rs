//! API test harness.
//!
//! Builds a [`TestServer`] over an in-memory backend. The harness keeps a
//! handle on the backend so tests can inject failures and inspect writes.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use chrono::{Days, NaiveDate, Utc};
use labwise_persistence::backends::memory::MemoryBackend;
use labwise_persistence::gateway::Gateway;
use labwise_rest::{AppState, ServerConfig};

/// Test harness for API testing.
pub struct TestApp {
    /// The test server instance.
    pub server: TestServer,

    /// The backend behind the server. Clones share tables.
    pub backend: MemoryBackend,
}

impl TestApp {
    /// A server over the demo catalog.
    pub fn seeded() -> Self {
        Self::with_backend(MemoryBackend::seeded(), ServerConfig::for_testing())
    }

    /// A server over `backend` with `config`.
    pub fn with_backend(backend: MemoryBackend, config: ServerConfig) -> Self {
        let state = AppState::new(Arc::new(Gateway::new(backend.clone())), config);
        let app = labwise_rest::routing::create_routes(state);
        let server = TestServer::new(app).expect("Failed to create test server");
        Self { server, backend }
    }
}

/// A date `days` from today, as the booking page expects it.
pub fn days_from_today(days: u64) -> String {
    date_from_today(days).format("%Y-%m-%d").to_string()
}

fn date_from_today(days: u64) -> NaiveDate {
    Utc::now()
        .date_naive()
        .checked_add_days(Days::new(days))
        .expect("date in range")
}

/// Yesterday, as the booking page expects it.
pub fn yesterday() -> String {
    Utc::now()
        .date_naive()
        .pred_opt()
        .expect("date in range")
        .format("%Y-%m-%d")
        .to_string()
}
