//! Typed data access gateway.
//!
//! The gateway is the only way flows reach the store. It builds
//! [`SelectRequest`]s from entity types, runs them on a [`QueryBackend`] and
//! decodes the rows. Nothing is cached and nothing is retried: every call hits
//! the backend.

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::QueryBackend;
use crate::error::{StorageError, StorageResult};
use crate::models::Entity;
use crate::query::{Embed, Filter, InsertRequest, Order, SelectRequest, Table};

/// Typed access to the hosted store.
///
/// # Example
///
/// ```
/// use labwise_persistence::backends::memory::MemoryBackend;
/// use labwise_persistence::gateway::Gateway;
/// use labwise_persistence::models::Test;
/// use labwise_persistence::query::Order;
///
/// # tokio_test::block_on(async {
/// let gateway = Gateway::new(MemoryBackend::seeded());
/// let tests: Vec<Test> = gateway.list(Vec::new(), Some(Order::asc("name"))).await?;
/// assert!(!tests.is_empty());
/// # Ok::<(), labwise_persistence::error::StorageError>(())
/// # }).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Gateway<B> {
    backend: B,
}

impl<B: QueryBackend> Gateway<B> {
    /// Wraps a backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the backend's name.
    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Lists rows of `T`, optionally filtered and ordered.
    ///
    /// Relations declared in [`Entity::EMBEDS`] are embedded automatically.
    pub async fn list<T: Entity>(
        &self,
        filters: Vec<Filter>,
        order: Option<Order>,
    ) -> StorageResult<Vec<T>> {
        let request = SelectRequest::new(T::TABLE)
            .with_embeds(T::EMBEDS)
            .with_filters(filters)
            .with_order(order);
        self.fetch(&request).await
    }

    /// Lists rows of a hydrated shape, embedding `joins`.
    ///
    /// `joins` must match the shape's declared embeds; a bare row type cannot
    /// be fetched through this call.
    pub async fn list_with_join<T: Entity>(
        &self,
        joins: &[Embed],
        filters: Vec<Filter>,
    ) -> StorageResult<Vec<T>> {
        if T::EMBEDS.is_empty() {
            return Err(StorageError::InvalidQuery {
                message: format!("{} rows of this shape carry no joins", T::TABLE),
            });
        }
        if let Some(missing) = T::EMBEDS.iter().find(|embed| !joins.contains(embed)) {
            return Err(StorageError::InvalidQuery {
                message: format!(
                    "{} join is required for this {} shape",
                    missing.alias(),
                    T::TABLE
                ),
            });
        }

        let request = SelectRequest::new(T::TABLE)
            .with_embeds(joins)
            .with_filters(filters);
        self.fetch(&request).await
    }

    /// Fetches exactly one row of `T` by primary key.
    ///
    /// Zero rows is [`StorageError::NotFound`]; more than one is a query failure.
    pub async fn get_by_id<T: Entity>(&self, id: &str) -> StorageResult<T> {
        let request = SelectRequest::new(T::TABLE)
            .with_embeds(T::EMBEDS)
            .with_filter(Filter::eq("id", id));

        let mut rows: Vec<T> = self.fetch(&request).await?;
        match rows.len() {
            0 => {
                debug!(table = %T::TABLE, id = %id, "Row not found");
                Err(StorageError::NotFound {
                    table: T::TABLE,
                    id: id.to_string(),
                })
            }
            1 => Ok(rows.remove(0)),
            n => Err(StorageError::QueryFailed {
                table: T::TABLE,
                message: format!("expected a single row for id {}, found {}", id, n),
            }),
        }
    }

    /// Checks that `table` can be read, fetching at most one row.
    ///
    /// Rows are not decoded, so the check does not depend on the table's shape.
    pub async fn check_readable(&self, table: Table) -> StorageResult<()> {
        let request = SelectRequest::new(table).with_limit(1);
        self.backend
            .select(&request)
            .await
            .inspect_err(|e| warn!(table = %table, error = %e, "Readability check failed"))?;
        Ok(())
    }

    /// Inserts rows into `T`'s table and returns them as stored.
    pub async fn insert<T, R>(&self, rows: &[R]) -> StorageResult<Vec<T>>
    where
        T: Entity,
        R: Serialize,
    {
        let rows = rows
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::InvalidQuery {
                message: format!("row for {} is not serializable: {}", T::TABLE, e),
            })?;

        debug!(table = %T::TABLE, count = rows.len(), "Inserting rows");
        let stored = self
            .backend
            .insert(InsertRequest {
                table: T::TABLE,
                rows,
            })
            .await
            .inspect_err(|e| warn!(table = %T::TABLE, error = %e, "Insert failed"))?;

        decode_rows(T::TABLE, stored)
    }

    async fn fetch<T: Entity>(&self, request: &SelectRequest) -> StorageResult<Vec<T>> {
        debug!(
            backend = self.backend.backend_name(),
            table = %request.table,
            filters = request.filters.len(),
            embeds = request.embeds.len(),
            "Selecting rows"
        );

        let rows = self
            .backend
            .select(request)
            .await
            .inspect_err(|e| warn!(table = %request.table, error = %e, "Select failed"))?;

        decode_rows(request.table, rows)
    }
}

fn decode_rows<T: Entity>(table: Table, rows: Vec<serde_json::Value>) -> StorageResult<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| StorageError::Decode {
                table,
                message: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::memory::MemoryBackend;
    use crate::models::{Lab, LabTestPrice, LabTestPriceWithLab, LabTestPriceWithRelations};
    use serde_json::json;

    fn gateway() -> Gateway<MemoryBackend> {
        Gateway::new(MemoryBackend::seeded())
    }

    #[tokio::test]
    async fn test_list_with_join_rejects_bare_shape() {
        let err = gateway()
            .list_with_join::<LabTestPrice>(&[Embed::Lab], Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidQuery { .. }));
    }

    #[tokio::test]
    async fn test_list_with_join_requires_declared_embeds() {
        let err = gateway()
            .list_with_join::<LabTestPriceWithRelations>(&[Embed::Lab], Vec::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("test join"));
    }

    #[tokio::test]
    async fn test_list_with_join_embeds_lab() {
        let rows: Vec<LabTestPriceWithLab> = gateway()
            .list_with_join(&[Embed::Lab], Vec::new())
            .await
            .unwrap();
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|row| row.lab.id == row.price.lab_id));
    }

    #[tokio::test]
    async fn test_check_readable_skips_decoding() {
        let backend = MemoryBackend::new();
        backend.put_rows(Table::Labs, vec![json!({"id": 7})]);
        let gateway = Gateway::new(backend.clone());
        assert!(gateway.check_readable(Table::Labs).await.is_ok());
        assert!(gateway.check_readable(Table::Bookings).await.is_ok());

        backend.fail_table(Table::Labs, "permission denied");
        assert!(gateway.check_readable(Table::Labs).await.is_err());
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let err = gateway().get_by_id::<Lab>("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_by_id_duplicate_rows_fail() {
        let backend = MemoryBackend::new();
        let lab = json!({
            "id": "dup",
            "name": "Twin Labs",
            "address": "Somewhere",
            "city": "Jaipur",
            "rating": 4.0,
            "accredited": false
        });
        backend.put_rows(Table::Labs, vec![lab.clone(), lab]);

        let err = Gateway::new(backend)
            .get_by_id::<Lab>("dup")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::QueryFailed { .. }));
    }

    #[tokio::test]
    async fn test_decode_failure_is_typed() {
        let backend = MemoryBackend::new();
        backend.put_rows(Table::Labs, vec![json!({"id": "broken"})]);

        let err = Gateway::new(backend)
            .list::<Lab>(Vec::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Decode { table: Table::Labs, .. }));
    }
}
