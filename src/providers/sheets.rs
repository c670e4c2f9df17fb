use crate::core::config::SheetsSourceConfig;
use crate::core::grid::{Grid, GridProvider};
use crate::providers::util::{RetryPolicy, with_retry};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Reads a cell range through the Google Sheets values API.
///
/// Only public sheets are supported: requests authenticate with an API key.
pub struct SheetsProvider {
    base_url: String,
    spreadsheet_id: String,
    range: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl SheetsProvider {
    pub fn new(config: &SheetsSourceConfig) -> Self {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("TRADEPOST_SHEETS_API_KEY").ok());
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            range: format!("{}!{}", config.release, config.range),
            api_key,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, self.range
        )
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl GridProvider for SheetsProvider {
    async fn fetch_grid(&self) -> Result<Grid> {
        let mut params = vec![("majorDimension", "ROWS")];
        if let Some(key) = &self.api_key {
            params.push(("key", key.as_str()));
        }
        let url = reqwest::Url::parse_with_params(&self.url(), &params)
            .with_context(|| format!("Invalid sheet URL: {}", self.url()))?;
        debug!("Requesting price grid from {}", self.url());

        let client = reqwest::Client::builder()
            .user_agent("tradepost/0.1")
            .build()?;
        let response = with_retry(
            || async {
                client
                    .get(url.clone())
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
            },
            self.retry,
        )
        .await
        .with_context(|| format!("Failed to fetch sheet range: {}", self.range))?;

        let response_text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for range: {}", self.range))?;
        if response_text.trim().is_empty() {
            return Err(anyhow!("Received empty response for range: {}", self.range));
        }

        let value_range: ValueRange = serde_json::from_str(&response_text).with_context(|| {
            format!(
                "Failed to parse sheet response for range: {}. Response: '{response_text}'",
                self.range
            )
        })?;

        let grid: Grid = value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        debug!(rows = grid.len(), "Fetched price grid");
        Ok(grid)
    }
}
