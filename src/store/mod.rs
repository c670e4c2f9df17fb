pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::snapshot::SnapshotStore;
use disk::DiskSnapshotStore;
use memory::MemorySnapshotStore;
use std::sync::Arc;
use tracing::warn;

/// Opens the on-disk snapshot store under the configured data directory.
///
/// Falls back to an in-memory store when `persist` is false or the disk store
/// cannot be opened.
pub fn open_snapshot_store(config: &AppConfig, persist: bool) -> Arc<dyn SnapshotStore> {
    if !persist {
        return Arc::new(MemorySnapshotStore::new());
    }

    let disk = config
        .default_data_path()
        .and_then(|path| DiskSnapshotStore::open(&path.join("snapshots")));
    match disk {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Snapshot store unavailable, using memory only: {:#}", e);
            Arc::new(MemorySnapshotStore::new())
        }
    }
}
