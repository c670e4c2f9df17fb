pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::routes::RouteOptions;
use crate::core::config::AppConfig;
use crate::core::{TableBuilder, TradeAssistant};
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Routes(RouteOptions),
    Refresh,
    Locations,
    Prices { commodity: String },
    Status,
}

/// Loads the config, wires the price source and snapshot store, and runs `command`.
///
/// With `persist` false the price table lives in memory for this run only.
pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    persist: bool,
) -> Result<()> {
    info!("Trade assistant starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let assistant = TradeAssistant::new(
        providers::grid_provider(&config.source),
        store::open_snapshot_store(&config, persist),
        TableBuilder::new(config.table.clone()),
    );

    if command == AppCommand::Refresh {
        return cli::refresh::run(&assistant).await;
    }

    let spinner = cli::ui::new_spinner("Loading price table...");
    let loaded = assistant.initialize().await;
    spinner.finish_and_clear();
    loaded?;

    match command {
        AppCommand::Routes(options) => cli::routes::run(&assistant, &options, &config.routes).await,
        AppCommand::Locations => cli::locations::run(&assistant).await,
        AppCommand::Prices { commodity } => cli::prices::run(&assistant, &commodity).await,
        AppCommand::Status => cli::status::run(&assistant).await,
        AppCommand::Refresh => cli::refresh::run(&assistant).await,
    }
}
