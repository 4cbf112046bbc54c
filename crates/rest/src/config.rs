//! Server configuration for the Labwise API.
//!
//! This module provides configuration types for the server, supporting both
//! programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LABWISE_SERVER_PORT` | 8080 | Server port |
//! | `LABWISE_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `LABWISE_LOG_LEVEL` | info | Log level |
//! | `LABWISE_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `LABWISE_ENABLE_CORS` | true | Enable CORS |
//! | `LABWISE_CORS_ORIGINS` | * | Allowed origins |
//! | `LABWISE_CORS_METHODS` | GET,POST,OPTIONS | Allowed methods |
//! | `LABWISE_CORS_HEADERS` | Content-Type,Accept,X-User-Id | Allowed headers |
//! | `LABWISE_BACKEND` | memory | Data backend (`memory` or `postgrest`) |
//! | `LABWISE_BACKEND_URL` | - | Base URL of the PostgREST/Supabase project |
//! | `LABWISE_BACKEND_API_KEY` | - | API key sent as `apikey` and bearer token |
//! | `LABWISE_BACKEND_TIMEOUT` | 10 | Backend request timeout (seconds) |
//! | `LABWISE_SEED_DEMO_DATA` | true | Load the demo catalog into the memory backend |
//! | `LABWISE_DESCRIPTION_PREVIEW` | 120 | Characters of test description shown in search results |
//! | `LABWISE_DEFAULT_CITY` | Jaipur | City listed by `/labs` when none is given |
//!
//! # Example
//!
//! ```rust
//! use labwise_rest::ServerConfig;
//!
//! // Create from environment
//! let config = ServerConfig::from_env();
//!
//! // Or create programmatically
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     enable_cors: true,
//!     ..Default::default()
//! };
//! ```

use std::fmt;

use clap::{Parser, ValueEnum};

/// Which data backend the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// In-process tables, optionally seeded with the demo catalog.
    Memory,
    /// A hosted PostgREST/Supabase project.
    Postgrest,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Memory => write!(f, "memory"),
            BackendKind::Postgrest => write!(f, "postgrest"),
        }
    }
}

/// Server configuration for the Labwise API.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "labwise")]
#[command(about = "Lab test price comparison and booking server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "LABWISE_SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "LABWISE_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "LABWISE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds.
    #[arg(long, env = "LABWISE_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "LABWISE_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "LABWISE_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(long, env = "LABWISE_CORS_METHODS", default_value = "GET,POST,OPTIONS")]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "LABWISE_CORS_HEADERS",
        default_value = "Content-Type,Accept,X-User-Id"
    )]
    pub cors_headers: String,

    /// Data backend.
    #[arg(long, env = "LABWISE_BACKEND", value_enum, default_value = "memory")]
    pub backend: BackendKind,

    /// Base URL of the hosted store (required for the postgrest backend).
    #[arg(long, env = "LABWISE_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// API key for the hosted store.
    #[arg(long, env = "LABWISE_BACKEND_API_KEY", hide_env_values = true)]
    pub backend_api_key: Option<String>,

    /// Backend request timeout in seconds.
    #[arg(long, env = "LABWISE_BACKEND_TIMEOUT", default_value = "10")]
    pub backend_timeout: u64,

    /// Load the demo catalog into the memory backend at startup.
    #[arg(long, env = "LABWISE_SEED_DEMO_DATA", default_value = "true")]
    pub seed_demo_data: bool,

    /// Characters of a test description shown in search results.
    #[arg(long, env = "LABWISE_DESCRIPTION_PREVIEW", default_value = "120")]
    pub description_preview_length: usize,

    /// City listed by the lab directory when none is given.
    #[arg(long, env = "LABWISE_DEFAULT_CITY", default_value = "Jaipur")]
    pub default_city: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,OPTIONS".to_string(),
            cors_headers: "Content-Type,Accept,X-User-Id".to_string(),
            backend: BackendKind::Memory,
            backend_url: None,
            backend_api_key: None,
            backend_timeout: 10,
            seed_demo_data: true,
            description_preview_length: 120,
            default_city: "Jaipur".to_string(),
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        Self::try_parse_from(["labwise"]).unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connection settings for the postgrest backend.
    #[cfg(feature = "postgrest")]
    pub fn postgrest_config(
        &self,
    ) -> Result<labwise_persistence::backends::postgrest::PostgrestConfig, String> {
        let base_url = self
            .backend_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| "Backend URL is required for the postgrest backend".to_string())?;

        Ok(labwise_persistence::backends::postgrest::PostgrestConfig {
            base_url: base_url.to_string(),
            api_key: self.backend_api_key.clone(),
            timeout: std::time::Duration::from_secs(self.backend_timeout),
            ..Default::default()
        })
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.backend_timeout == 0 {
            errors.push("Backend timeout cannot be 0".to_string());
        }

        if self.description_preview_length == 0 {
            errors.push("Description preview length cannot be 0".to_string());
        }

        if self.default_city.trim().is_empty() {
            errors.push("Default city cannot be empty".to_string());
        }

        if self.backend == BackendKind::Postgrest {
            match self.backend_url.as_deref().map(str::trim) {
                None | Some("") => {
                    errors.push("Backend URL is required for the postgrest backend".to_string())
                }
                Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                    errors.push(format!("Backend URL must be http(s): {}", url))
                }
                Some(_) => {}
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0 and disables features that might interfere
    /// with tests.
    pub fn for_testing() -> Self {
        Self {
            port: 0, // Let OS assign port
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            cors_origins: "*".to_string(),
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            backend: BackendKind::Memory,
            backend_url: None,
            backend_api_key: None,
            backend_timeout: 2,
            seed_demo_data: true,
            description_preview_length: 40,
            default_city: "Jaipur".to_string(),
        }
    }
}
