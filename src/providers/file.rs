use crate::core::config::FileSourceConfig;
use crate::core::grid::{Grid, GridProvider};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Reads a grid exported as a JSON array of string rows.
pub struct FileGridProvider {
    path: PathBuf,
}

impl FileGridProvider {
    pub fn new(config: &FileSourceConfig) -> Self {
        Self {
            path: PathBuf::from(&config.path),
        }
    }
}

#[async_trait]
impl GridProvider for FileGridProvider {
    async fn fetch_grid(&self) -> Result<Grid> {
        debug!("Reading price grid from {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read grid file: {}", self.path.display()))?;
        let grid: Grid = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse grid file: {}", self.path.display()))?;
        Ok(grid)
    }
}
