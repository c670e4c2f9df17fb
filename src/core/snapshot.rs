use crate::core::table::PriceTable;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A built price table and the time it was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub built_at: DateTime<Utc>,
    pub table: PriceTable,
}

impl Snapshot {
    pub fn new(table: PriceTable) -> Self {
        Self {
            built_at: Utc::now(),
            table,
        }
    }

    /// Human-readable age, e.g. `42m` or `3d`.
    pub fn age_string(&self) -> String {
        let secs = (Utc::now() - self.built_at).num_seconds().max(0);
        if secs < 60 {
            format!("{secs}s")
        } else if secs < 3600 {
            format!("{}m", secs / 60)
        } else if secs < 86400 {
            format!("{}h", secs / 3600)
        } else {
            format!("{}d", secs / 86400)
        }
    }
}

/// Persistent cache of the last good price table.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Last saved snapshot, or `None` when nothing usable is stored.
    async fn load(&self) -> Option<Snapshot>;

    async fn save(&self, snapshot: &Snapshot) -> Result<()>;
}
