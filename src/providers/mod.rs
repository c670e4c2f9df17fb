pub mod file;
pub mod sheets;
pub mod util;

use crate::core::config::SourceConfig;
use crate::core::grid::GridProvider;
use std::sync::Arc;

/// Grid provider for the configured price source.
pub fn grid_provider(source: &SourceConfig) -> Arc<dyn GridProvider> {
    match source {
        SourceConfig::Sheets(config) => Arc::new(sheets::SheetsProvider::new(config)),
        SourceConfig::File(config) => Arc::new(file::FileGridProvider::new(config)),
    }
}
