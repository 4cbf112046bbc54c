//! Lab directory: the labs operating in one city.

use std::sync::Arc;

use labwise_persistence::QueryBackend;
use labwise_persistence::gateway::Gateway;
use labwise_persistence::models::Lab;
use labwise_persistence::query::{Filter, Order};
use serde::Serialize;
use tracing::{debug, warn};

use super::FlowError;

/// What the lab directory renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabsView {
    /// City the listing is for.
    pub city: String,
    /// Load failure, if any.
    pub error: Option<FlowError>,
    /// Labs in the city, by name.
    pub labs: Vec<Lab>,
}

/// Lists labs by city.
pub struct LabDirectory<B> {
    gateway: Arc<Gateway<B>>,
}

impl<B: QueryBackend> LabDirectory<B> {
    /// Creates a directory over `gateway`.
    pub fn new(gateway: Arc<Gateway<B>>) -> Self {
        Self { gateway }
    }

    /// Lists the labs whose city is exactly `city`.
    pub async fn list(&self, city: &str) -> LabsView {
        let city = city.trim().to_string();
        if city.is_empty() {
            return LabsView {
                city,
                error: Some(FlowError::InvalidInput("Choose a city".to_string())),
                labs: Vec::new(),
            };
        }

        debug!(city = %city, "Listing labs");
        let result = self
            .gateway
            .list::<Lab>(vec![Filter::eq("city", city.as_str())], Some(Order::asc("name")))
            .await;

        match result {
            Ok(labs) => LabsView {
                city,
                error: None,
                labs,
            },
            Err(e) => {
                warn!(city = %city, error = %e, "Failed to list labs");
                LabsView {
                    city,
                    error: Some(FlowError::QueryFailed("Failed to fetch labs".to_string())),
                    labs: Vec::new(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labwise_persistence::backends::memory::MemoryBackend;
    use labwise_persistence::query::Table;

    fn directory(backend: MemoryBackend) -> LabDirectory<MemoryBackend> {
        LabDirectory::new(Arc::new(Gateway::new(backend)))
    }

    #[tokio::test]
    async fn test_lists_city_labs_by_name() {
        let view = directory(MemoryBackend::seeded()).list("Jaipur").await;
        let names: Vec<_> = view.labs.iter().map(|lab| lab.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Dr. Lal PathLabs",
                "Path Plus Care",
                "Pathkind Labs",
                "Redcliffe Labs",
                "Tata 1mg Labs"
            ]
        );
    }

    #[tokio::test]
    async fn test_other_city_is_empty() {
        let view = directory(MemoryBackend::seeded()).list("Pune").await;
        assert!(view.labs.is_empty());
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn test_failure_and_blank_city() {
        let backend = MemoryBackend::seeded();
        backend.fail_table(Table::Labs, "down");
        let dir = directory(backend);

        let view = dir.list("Jaipur").await;
        assert!(matches!(view.error, Some(FlowError::QueryFailed(_))));

        let view = dir.list("  ").await;
        assert!(matches!(view.error, Some(FlowError::InvalidInput(_))));
    }
}
