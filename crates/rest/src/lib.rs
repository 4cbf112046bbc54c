//! # labwise-rest - Lab test comparison and booking API
//!
//! This crate holds the search, comparison and booking flows of Labwise and
//! the HTTP API that serves them. Each page of the application is one route;
//! a request builds the page's flow, drives it against the data access
//! gateway and returns the flow's view as JSON.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use labwise_rest::{create_app, ServerConfig};
//! use labwise_persistence::backends::memory::MemoryBackend;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // A backend preloaded with the demo catalog
//!     let backend = MemoryBackend::seeded();
//!
//!     // Create the Axum application
//!     let app = create_app(backend);
//!
//!     // Start the server
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Page | HTTP Method | URL Pattern |
//! |------|-------------|-------------|
//! | landing | GET | `/` |
//! | search | GET | `/search?q=[query]` |
//! | compare | GET | `/compare?testId=[id]` |
//! | booking | GET | `/book/[price_id]?date=&time=&collection=home\|lab` |
//! | confirm | POST | `/book/[price_id]/confirm` |
//! | labs | GET | `/labs?city=[city]` |
//! | health | GET | `/health`, `/_liveness`, `/_readiness` |
//!
//! ## Error Handling
//!
//! Page views carry their failure inline as `error` (or `form_error` on the
//! booking page) and are served with a matching status:
//!
//! | HTTP Status | Code | Description |
//! |-------------|------|-------------|
//! | 400 | invalid-input | Malformed or incomplete selection |
//! | 401 | unauthorized | Missing `X-User-Id` on confirmation |
//! | 404 | not-found | Unknown test or offer |
//! | 409 | booking-rejected | Booking cannot be confirmed |
//! | 502 | query-failed | The hosted store failed |
//!
//! ## Architecture
//!
//! - [`flows`] - Search, comparison and booking state machines
//! - [`error`] - Error types and status mapping
//! - [`config`] - Server configuration
//! - [`state`] - Application state (gateway, configuration)
//! - [`identity`] - Caller identity
//! - [`handlers`] - HTTP request handlers
//! - [`routing`] - Route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod flows;
pub mod handlers;
pub mod identity;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::{BackendKind, ServerConfig};
pub use error::{RestError, RestResult};
pub use flows::FlowError;
pub use identity::UserId;
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use labwise_persistence::QueryBackend;
use labwise_persistence::gateway::Gateway;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// This is a convenience function that creates the app with default settings.
/// For more control, use [`create_app_with_config`].
pub fn create_app<B>(backend: B) -> Router
where
    B: QueryBackend + 'static,
{
    create_app_with_config(backend, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// # Example
///
/// ```rust
/// use labwise_rest::{create_app_with_config, ServerConfig};
/// use labwise_persistence::backends::memory::MemoryBackend;
///
/// let config = ServerConfig {
///     port: 3000,
///     enable_cors: true,
///     ..Default::default()
/// };
/// let app = create_app_with_config(MemoryBackend::seeded(), config);
/// ```
pub fn create_app_with_config<B>(backend: B, config: ServerConfig) -> Router
where
    B: QueryBackend + 'static,
{
    info!(
        "Creating Labwise API server with backend: {}",
        backend.backend_name()
    );

    // Create application state
    let state = AppState::new(Arc::new(Gateway::new(backend)), config.clone());

    let router = routing::create_routes(state);

    // Build middleware stack
    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    // Add CORS if enabled
    let router = if config.enable_cors {
        let cors = build_cors_layer(&config);
        router.layer(cors)
    } else {
        router
    };

    // Apply remaining middleware
    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "labwise_rest={level},labwise_persistence={level},labwise_server={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
