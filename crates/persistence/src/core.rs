//! Backend abstraction.
//!
//! [`QueryBackend`] is the seam between the typed [`Gateway`](crate::gateway::Gateway)
//! and a concrete store. Backends deal in JSON rows only; decoding into entity
//! types happens in the gateway so every backend shares one set of models.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageResult;
use crate::query::{InsertRequest, SelectRequest};

/// A store that can answer select and insert requests.
///
/// Implementations must apply filters, ordering and embeds exactly as
/// described on [`SelectRequest`]. Without an ordering, rows come back in the
/// store's natural order.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Returns a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;

    /// Runs a read and returns the matching rows.
    async fn select(&self, request: &SelectRequest) -> StorageResult<Vec<Value>>;

    /// Inserts rows and returns them as stored (with generated columns).
    async fn insert(&self, request: InsertRequest) -> StorageResult<Vec<Value>>;
}

#[async_trait]
impl<B> QueryBackend for std::sync::Arc<B>
where
    B: QueryBackend + ?Sized,
{
    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    async fn select(&self, request: &SelectRequest) -> StorageResult<Vec<Value>> {
        (**self).select(request).await
    }

    async fn insert(&self, request: InsertRequest) -> StorageResult<Vec<Value>> {
        (**self).insert(request).await
    }
}
