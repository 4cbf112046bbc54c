//! Test backend that holds calls until the test releases them.

use std::collections::VecDeque;

use async_trait::async_trait;
use labwise_persistence::QueryBackend;
use labwise_persistence::StorageResult;
use labwise_persistence::backends::memory::MemoryBackend;
use labwise_persistence::query::{InsertRequest, SelectRequest};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

/// Wraps a [`MemoryBackend`] and holds each call until its gate opens.
///
/// Gates are consumed in call order by selects and inserts alike; calls made
/// once every gate is used run immediately.
pub(crate) struct GatedBackend {
    inner: MemoryBackend,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl GatedBackend {
    pub(crate) fn new(inner: MemoryBackend) -> Self {
        Self {
            inner,
            gates: Mutex::new(VecDeque::new()),
        }
    }

    /// Adds a gate for the next ungated call. Sending on (or dropping) the
    /// returned sender releases it.
    pub(crate) fn gate(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().push_back(rx);
        tx
    }

    async fn wait(&self) {
        let gate = self.gates.lock().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }
}

#[async_trait]
impl QueryBackend for GatedBackend {
    fn backend_name(&self) -> &'static str {
        "gated"
    }

    async fn select(&self, request: &SelectRequest) -> StorageResult<Vec<Value>> {
        self.wait().await;
        self.inner.select(request).await
    }

    async fn insert(&self, request: InsertRequest) -> StorageResult<Vec<Value>> {
        self.wait().await;
        self.inner.insert(request).await
    }
}
