use crate::core::builder::TableBuilder;
use crate::core::grid::GridProvider;
use crate::core::routes::{RouteQuery, TradeRoute, compute_routes};
use crate::core::snapshot::{Snapshot, SnapshotStore};
use crate::core::table::PriceTable;
use anyhow::{Context, Result, anyhow};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Outcome of a [`TradeAssistant::refresh`].
#[derive(Debug)]
pub enum Refresh {
    Rebuilt(Arc<Snapshot>),
    /// Download or build failed; an older snapshot stays in use.
    Kept {
        snapshot: Arc<Snapshot>,
        reason: anyhow::Error,
    },
}

impl Refresh {
    pub fn snapshot(&self) -> &Arc<Snapshot> {
        match self {
            Refresh::Rebuilt(snapshot) | Refresh::Kept { snapshot, .. } => snapshot,
        }
    }
}

/// Owns the published price table and answers route queries from it.
///
/// A rebuilt table is constructed completely before it replaces the published
/// one, so a query sees either the old table or the new one.
pub struct TradeAssistant {
    provider: Arc<dyn GridProvider>,
    store: Arc<dyn SnapshotStore>,
    builder: TableBuilder,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl TradeAssistant {
    pub fn new(
        provider: Arc<dyn GridProvider>,
        store: Arc<dyn SnapshotStore>,
        builder: TableBuilder,
    ) -> Self {
        Self {
            provider,
            store,
            builder,
            current: RwLock::new(None),
        }
    }

    /// Makes a table available: the published one, else the stored snapshot,
    /// else a fresh download.
    pub async fn initialize(&self) -> Result<Arc<Snapshot>> {
        if let Some(snapshot) = self.published() {
            return Ok(snapshot);
        }
        if let Some(snapshot) = self.store.load().await {
            info!(built_at = %snapshot.built_at, "Using stored price table");
            return Ok(self.publish(snapshot));
        }
        debug!("No stored price table, downloading");
        Ok(Arc::clone(self.refresh().await?.snapshot()))
    }

    /// Downloads and rebuilds the table, then stores it.
    ///
    /// On failure the published table, or the stored one, stays in use. Fails
    /// only when neither exists.
    pub async fn refresh(&self) -> Result<Refresh> {
        let reason = match self.download().await {
            Ok(table) => {
                let snapshot = self.publish(Snapshot::new(table));
                if let Err(e) = self.store.save(&snapshot).await {
                    warn!(error = %e, "Failed to store price table");
                }
                return Ok(Refresh::Rebuilt(snapshot));
            }
            Err(e) => e,
        };
        warn!(error = %reason, "Price table refresh failed");

        let fallback = match self.published() {
            Some(snapshot) => Some(snapshot),
            None => self.store.load().await.map(|s| self.publish(s)),
        };
        match fallback {
            Some(snapshot) => Ok(Refresh::Kept { snapshot, reason }),
            None => Err(reason.context("No price table available")),
        }
    }

    /// The published snapshot. Errors if no table has been built or loaded yet.
    pub fn snapshot(&self) -> Result<Arc<Snapshot>> {
        self.published()
            .ok_or_else(|| anyhow!("Price table has not been built yet"))
    }

    pub fn routes(&self, query: &RouteQuery) -> Result<Vec<TradeRoute>> {
        let snapshot = self.snapshot()?;
        Ok(compute_routes(&snapshot.table, query))
    }

    async fn download(&self) -> Result<PriceTable> {
        let grid = self
            .provider
            .fetch_grid()
            .await
            .context("Failed to download price grid")?;
        if grid.is_empty() {
            return Err(anyhow!("Downloaded price grid is empty"));
        }
        debug!(rows = grid.len(), "Downloaded price grid");
        Ok(self.builder.build(&grid)?)
    }

    fn published(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Some(Arc::clone(&snapshot));
        snapshot
    }
}
