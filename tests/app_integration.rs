use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tradepost::AppCommand;
use tradepost::cli::routes::RouteOptions;
use tradepost::core::{SnapshotStore, TableBuilder, TradeAssistant};
use tradepost::store::disk::DiskSnapshotStore;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const SHEET_ID: &str = "test-sheet";

    pub const SHEET_RESPONSE: &str = r#"{
        "range": "'3.2'!B3:AF31",
        "majorDimension": "ROWS",
        "values": [
            ["Prices for release 3.2"],
            ["", "CRUSADER", "", "", "", "HURSTON", ""],
            ["", "Port Olisar", "", "Grim Hex", "", "Lorville", ""],
            ["", "Buy", "Sell", "Buy", "Sell", "Buy", "Sell"],
            ["Agricium", "24,5", "", "", "", "", "27,90"],
            ["Gold", "5.8", "", "5,80", "6.1"],
            ["Waste", "", "0.005"]
        ]
    }"#;

    pub async fn create_sheets_mock_server(body: &str, status_code: u16) -> MockServer {
        let mock_server = MockServer::start().await;
        let url_path = format!("/v4/spreadsheets/{SHEET_ID}/values/3.2!B3:AF31");

        Mock::given(method("GET"))
            .and(path(url_path))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

fn write_sheets_config(dir: &Path, base_url: &str) -> String {
    let config_path = dir.join("config.yaml");
    let config_content = format!(
        r#"
source:
  type: sheets
  base_url: "{base_url}"
  spreadsheet_id: "{}"
  api_key: "test-key"
data_path: "{}"
"#,
        test_utils::SHEET_ID,
        dir.join("data").display()
    );
    fs::write(&config_path, config_content).expect("Failed to write config");
    config_path.to_string_lossy().into_owned()
}

async fn stored_commodities(dir: &Path) -> Option<usize> {
    let store = DiskSnapshotStore::open(&dir.join("data").join("snapshots"))
        .expect("Failed to open snapshot store");
    store.load().await.map(|snapshot| snapshot.table.prices.len())
}

#[test_log::test(tokio::test)]
async fn test_routes_download_and_store_price_table() {
    let mock_server =
        test_utils::create_sheets_mock_server(test_utils::SHEET_RESPONSE, 200).await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_sheets_config(temp_dir.path(), &mock_server.uri());

    let options = RouteOptions {
        cargo: Some(1.0),
        budget: Some(10_000.0),
        ..Default::default()
    };
    let result =
        tradepost::run_command(AppCommand::Routes(options), Some(&config_path), true).await;
    assert!(result.is_ok(), "Routes failed: {result:?}");

    assert_eq!(stored_commodities(temp_dir.path()).await, Some(3));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_stored_table_is_used_without_download() {
    let mock_server =
        test_utils::create_sheets_mock_server(test_utils::SHEET_RESPONSE, 200).await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_sheets_config(temp_dir.path(), &mock_server.uri());

    tradepost::run_command(AppCommand::Status, Some(&config_path), true)
        .await
        .expect("First run failed");
    tradepost::run_command(AppCommand::Locations, Some(&config_path), true)
        .await
        .expect("Second run failed");

    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_failed_refresh_keeps_stored_table() {
    let good_server =
        test_utils::create_sheets_mock_server(test_utils::SHEET_RESPONSE, 200).await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_sheets_config(temp_dir.path(), &good_server.uri());
    tradepost::run_command(AppCommand::Refresh, Some(&config_path), true)
        .await
        .expect("Initial refresh failed");

    let bad_server = test_utils::create_sheets_mock_server("Server Error", 500).await;
    let config_path = write_sheets_config(temp_dir.path(), &bad_server.uri());
    info!("Refreshing against a failing server");
    let result = tradepost::run_command(AppCommand::Refresh, Some(&config_path), true).await;

    assert!(result.is_ok(), "Refresh should fall back: {result:?}");
    assert!(!bad_server.received_requests().await.unwrap().is_empty());
    assert_eq!(stored_commodities(temp_dir.path()).await, Some(3));
}

#[test_log::test(tokio::test)]
async fn test_refresh_without_any_table_fails() {
    let bad_server = test_utils::create_sheets_mock_server("Server Error", 500).await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_sheets_config(temp_dir.path(), &bad_server.uri());

    let result = tradepost::run_command(AppCommand::Refresh, Some(&config_path), false).await;

    let error = result.unwrap_err();
    assert_eq!(error.to_string(), "No price table available");
}

#[test_log::test(tokio::test)]
async fn test_file_source_routes_and_prices() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let grid_path = temp_dir.path().join("prices.json");
    fs::write(
        &grid_path,
        r#"[
            ["", "CRUSADER", "", "", "", "HURSTON", ""],
            ["", "Port Olisar", "", "Grim Hex", "", "Lorville", ""],
            ["Gold", "10", "", "", "", "", "20"]
        ]"#,
    )
    .expect("Failed to write grid");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(
        &config_path,
        format!(
            "source:\n  type: file\n  path: \"{}\"\n",
            grid_path.display()
        ),
    )
    .expect("Failed to write config");
    let config_path = config_path.to_string_lossy().into_owned();

    let options = RouteOptions {
        avoid: vec!["Port Olisar".to_string()],
        all: true,
        ..Default::default()
    };
    tradepost::run_command(AppCommand::Routes(options), Some(&config_path), false)
        .await
        .expect("Routes failed");
    tradepost::run_command(
        AppCommand::Prices {
            commodity: "GOLD".to_string(),
        },
        Some(&config_path),
        false,
    )
    .await
    .expect("Prices failed");

    let result = tradepost::run_command(
        AppCommand::Prices {
            commodity: "Diamond".to_string(),
        },
        Some(&config_path),
        false,
    )
    .await;
    assert!(result.unwrap_err().to_string().contains("Unknown commodity"));
}

#[test_log::test(tokio::test)]
async fn test_malformed_grid_reports_every_bad_cell() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let grid_path = temp_dir.path().join("prices.json");
    fs::write(
        &grid_path,
        r#"[
            ["", "CRUSADER", ""],
            ["", "Port Olisar", ""],
            ["Gold", "abc", "n/a"]
        ]"#,
    )
    .expect("Failed to write grid");
    let source = tradepost::core::config::FileSourceConfig {
        path: grid_path.to_string_lossy().into_owned(),
    };
    let assistant = TradeAssistant::new(
        std::sync::Arc::new(tradepost::providers::file::FileGridProvider::new(&source)),
        std::sync::Arc::new(tradepost::store::memory::MemorySnapshotStore::new()),
        TableBuilder::default(),
    );

    let error = assistant.refresh().await.unwrap_err();
    let chain = format!("{error:#}");
    assert!(chain.contains("2 invalid cell(s)"), "Unexpected error: {chain}");
    assert!(assistant.snapshot().is_err());
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let missing = temp_dir.path().join("absent.yaml");

    let result = tradepost::run_command(
        AppCommand::Status,
        Some(&missing.to_string_lossy()),
        false,
    )
    .await;

    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file")
    );
}
