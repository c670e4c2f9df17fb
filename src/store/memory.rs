use crate::core::snapshot::{Snapshot, SnapshotStore};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// Snapshot store that lives only as long as the process.
#[derive(Default)]
pub struct MemorySnapshotStore {
    inner: Mutex<Option<Snapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: Mutex::new(Some(snapshot)),
        }
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Option<Snapshot> {
        let snapshot = self.inner.lock().await.clone();
        if snapshot.is_some() {
            debug!("Snapshot HIT");
        } else {
            debug!("Snapshot MISS");
        }
        snapshot
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        *self.inner.lock().await = Some(snapshot.clone());
        debug!("Snapshot PUT");
        Ok(())
    }
}
