//! Price table ingestion and route planning

pub mod assistant;
pub mod builder;
pub mod config;
pub mod grid;
pub mod log;
pub mod routes;
pub mod snapshot;
pub mod table;

// Re-export main types for cleaner imports
pub use assistant::{Refresh, TradeAssistant};
pub use builder::{BuilderConfig, DataFormatError, TableBuilder};
pub use grid::{Grid, GridProvider};
pub use routes::{RouteQuery, RouteStop, TradeRoute, compute_routes};
pub use snapshot::{Snapshot, SnapshotStore};
pub use table::{CommodityPrices, LocationMap, PriceIndex, PriceTable, Side};
