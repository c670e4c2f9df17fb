use crate::core::snapshot::{Snapshot, SnapshotStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::{debug, warn};

const PARTITION: &str = "trade";
const SNAPSHOT_KEY: &str = "price_table";

/// Snapshot store backed by a fjall keyspace, stored as JSON.
pub struct DiskSnapshotStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskSnapshotStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;

        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open snapshot store at {}", path.display()))?;
        let partition = keyspace.open_partition(PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened snapshot store at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }

    fn read(&self) -> Result<Option<Snapshot>> {
        let Some(value) = self.partition.get(SNAPSHOT_KEY)? else {
            return Ok(None);
        };
        let snapshot: Snapshot = serde_json::from_slice(&value)?;
        Ok(Some(snapshot))
    }
}

#[async_trait]
impl SnapshotStore for DiskSnapshotStore {
    async fn load(&self) -> Option<Snapshot> {
        match self.read() {
            Ok(Some(snapshot)) if snapshot.table.is_consistent() => {
                debug!(built_at = %snapshot.built_at, "Snapshot HIT");
                Some(snapshot)
            }
            Ok(Some(snapshot)) => {
                warn!(
                    dangling = snapshot.table.dangling_locations().len(),
                    "Stored snapshot references unknown locations, ignoring it"
                );
                None
            }
            Ok(None) => {
                debug!("Snapshot MISS");
                None
            }
            Err(e) => {
                warn!("Failed to read stored snapshot: {}", e);
                None
            }
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.partition
            .insert(SNAPSHOT_KEY, serde_json::to_vec(snapshot)?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!(built_at = %snapshot.built_at, "Snapshot PUT");
        Ok(())
    }
}
