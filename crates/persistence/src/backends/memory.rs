//! In-memory backend.
//!
//! Holds each table as a vector of JSON rows and answers requests with the
//! same semantics as the hosted store: `eq` compares the column's text form,
//! `ilike` substring matching is case-insensitive, embeds resolve foreign keys
//! and unordered reads keep insertion order.
//!
//! Failures can be injected per table to exercise error paths.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::core::QueryBackend;
use crate::error::{BackendErrorBody, QueryOutcome, StorageError, StorageResult};
use crate::query::{Embed, Filter, InsertRequest, SelectRequest, Table};
use crate::seed::jaipur_catalog;

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<Table, Vec<Value>>,
    failures: HashMap<Table, BackendErrorBody>,
}

/// Thread-safe in-memory store.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend preloaded with the Jaipur catalog.
    pub fn seeded() -> Self {
        let backend = Self::new();
        let catalog = jaipur_catalog();
        backend.put_rows(Table::Labs, to_rows(&catalog.labs));
        backend.put_rows(Table::Tests, to_rows(&catalog.tests));
        backend.put_rows(Table::LabTestPrices, to_rows(&catalog.prices));
        backend
    }

    /// Appends raw rows to a table.
    pub fn put_rows(&self, table: Table, rows: Vec<Value>) {
        self.inner
            .write()
            .tables
            .entry(table)
            .or_default()
            .extend(rows);
    }

    /// Returns a copy of a table's rows.
    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.inner
            .read()
            .tables
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    /// Makes every call touching `table` fail with `message`.
    pub fn fail_table(&self, table: Table, message: impl Into<String>) {
        self.inner
            .write()
            .failures
            .insert(table, BackendErrorBody::new(message));
    }

    /// Removes all injected failures.
    pub fn clear_failures(&self) {
        self.inner.write().failures.clear();
    }

    fn run_select(&self, request: &SelectRequest) -> QueryOutcome<Vec<Value>> {
        let inner = self.inner.read();

        let touched = std::iter::once(request.table)
            .chain(request.embeds.iter().map(Embed::target));
        for table in touched {
            if let Some(error) = inner.failures.get(&table) {
                return QueryOutcome::failed(error.clone());
            }
        }

        let mut rows: Vec<Value> = inner
            .tables
            .get(&request.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| request.filters.iter().all(|f| matches_filter(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &request.order {
            rows.sort_by(|a, b| compare_values(&a[&order.column], &b[&order.column]));
        }
        if let Some(limit) = request.limit {
            rows.truncate(limit);
        }

        for row in &mut rows {
            for embed in &request.embeds {
                let embedded = row
                    .get(embed.foreign_key())
                    .and_then(|key| find_by_id(&inner.tables, embed.target(), key))
                    .unwrap_or(Value::Null);
                if let Value::Object(map) = row {
                    map.insert(embed.alias().to_string(), embedded);
                }
            }
        }

        QueryOutcome::ok(rows)
    }
}

#[async_trait]
impl QueryBackend for MemoryBackend {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn select(&self, request: &SelectRequest) -> StorageResult<Vec<Value>> {
        let rows = self.run_select(request).into_result(request.table)?;
        debug!(table = %request.table, rows = rows.len(), "Memory select");
        Ok(rows)
    }

    async fn insert(&self, request: InsertRequest) -> StorageResult<Vec<Value>> {
        let mut inner = self.inner.write();

        if let Some(error) = inner.failures.get(&request.table) {
            return QueryOutcome::<Vec<Value>>::failed(error.clone()).into_result(request.table);
        }

        let mut stored = Vec::with_capacity(request.rows.len());
        for mut row in request.rows {
            let Value::Object(map) = &mut row else {
                return Err(StorageError::InvalidQuery {
                    message: format!("{} rows must be JSON objects", request.table),
                });
            };
            let has_id = map.get("id").is_some_and(|id| !id.is_null());
            if !has_id {
                map.insert(
                    "id".to_string(),
                    Value::String(uuid::Uuid::new_v4().to_string()),
                );
            }
            stored.push(row);
        }

        inner
            .tables
            .entry(request.table)
            .or_default()
            .extend(stored.iter().cloned());
        Ok(stored)
    }
}

fn to_rows<T: serde::Serialize>(items: &[T]) -> Vec<Value> {
    items
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect()
}

fn find_by_id(tables: &HashMap<Table, Vec<Value>>, table: Table, key: &Value) -> Option<Value> {
    let key = text_of(key)?;
    tables
        .get(&table)?
        .iter()
        .find(|row| row.get("id").and_then(text_of).as_deref() == Some(key.as_str()))
        .cloned()
}

/// Text form of a scalar, as the store would compare it in an `eq` filter.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn matches_filter(row: &Value, filter: &Filter) -> bool {
    let Some(value) = row.get(filter.column()) else {
        return false;
    };
    match filter {
        Filter::Eq { value: expected, .. } => text_of(value).as_deref() == Some(expected.as_str()),
        Filter::Contains { needle, .. } => value
            .as_str()
            .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase())),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a
            .to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        // Nulls sort last, as in an ascending SQL order.
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => Ordering::Equal,
    }
}
