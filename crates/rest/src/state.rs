//! Application state for the Labwise API.
//!
//! Every request builds fresh flow instances; the only shared state is the
//! gateway and the configuration.

use std::sync::Arc;

use labwise_persistence::QueryBackend;
use labwise_persistence::gateway::Gateway;

use crate::config::ServerConfig;
use crate::flows::{BookingFlow, ComparisonFlow, LabDirectory, SearchFlow};

/// Shared application state for the API.
///
/// # Type Parameters
///
/// * `B` - The query backend behind the gateway (must implement [`QueryBackend`])
///
/// # Example
///
/// ```rust
/// use labwise_rest::{AppState, ServerConfig};
/// use labwise_persistence::backends::memory::MemoryBackend;
/// use labwise_persistence::gateway::Gateway;
/// use std::sync::Arc;
///
/// let gateway = Gateway::new(MemoryBackend::seeded());
/// let state = AppState::new(Arc::new(gateway), ServerConfig::default());
/// assert_eq!(state.gateway().backend_name(), "memory");
/// ```
pub struct AppState<B> {
    /// The data access gateway.
    gateway: Arc<Gateway<B>>,

    /// Server configuration.
    config: Arc<ServerConfig>,
}

// Manually implement Clone since B is wrapped in Arc and doesn't need to be Clone
impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            config: Arc::clone(&self.config),
        }
    }
}

impl<B: QueryBackend> AppState<B> {
    /// Creates a new AppState with the given gateway and configuration.
    pub fn new(gateway: Arc<Gateway<B>>, config: ServerConfig) -> Self {
        Self {
            gateway,
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the gateway.
    pub fn gateway(&self) -> &Gateway<B> {
        &self.gateway
    }

    /// Returns a clone of the gateway Arc.
    pub fn gateway_arc(&self) -> Arc<Gateway<B>> {
        Arc::clone(&self.gateway)
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the city listed when a request names none.
    pub fn default_city(&self) -> &str {
        &self.config.default_city
    }

    /// A fresh search flow.
    pub fn search_flow(&self) -> SearchFlow<B> {
        SearchFlow::new(self.gateway_arc())
            .with_preview_length(self.config.description_preview_length)
    }

    /// A fresh comparison flow.
    pub fn comparison_flow(&self) -> ComparisonFlow<B> {
        ComparisonFlow::new(self.gateway_arc())
    }

    /// A fresh booking flow.
    pub fn booking_flow(&self) -> BookingFlow<B> {
        BookingFlow::new(self.gateway_arc())
    }

    /// The lab directory.
    pub fn lab_directory(&self) -> LabDirectory<B> {
        LabDirectory::new(self.gateway_arc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labwise_persistence::backends::memory::MemoryBackend;

    fn state(config: ServerConfig) -> AppState<MemoryBackend> {
        AppState::new(Arc::new(Gateway::new(MemoryBackend::new())), config)
    }

    #[test]
    fn test_app_state_creation() {
        let state = state(ServerConfig::default());
        assert_eq!(state.gateway().backend_name(), "memory");
        assert_eq!(state.default_city(), "Jaipur");
    }

    #[test]
    fn test_app_state_clone_shares_gateway() {
        let state = state(ServerConfig::default());
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.gateway_arc(), &cloned.gateway_arc()));
    }

    #[tokio::test]
    async fn test_flows_use_configured_preview() {
        let state = AppState::new(
            Arc::new(Gateway::new(MemoryBackend::seeded())),
            ServerConfig {
                description_preview_length: 5,
                ..Default::default()
            },
        );
        let view = state.search_flow().search_for("sugar").await;
        assert!(view.results[0].description.ends_with("..."));
    }
}
