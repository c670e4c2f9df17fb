use crate::core::builder::BuilderConfig;
use crate::core::routes::DEFAULT_UNITS_PER_CARGO_SPACE;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SheetsSourceConfig {
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,
    pub spreadsheet_id: String,
    /// Sheet tab, named after the game release the prices were collected in.
    #[serde(default = "default_release")]
    pub release: String,
    #[serde(default = "default_range")]
    pub range: String,
    pub api_key: Option<String>,
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_release() -> String {
    "3.2".to_string()
}

fn default_range() -> String {
    "B3:AF31".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FileSourceConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Sheets(SheetsSourceConfig),
    File(FileSourceConfig),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RoutesConfig {
    pub units_per_cargo_space: f64,
    /// Routes shown when no count is given on the command line.
    pub top: usize,
    /// Locations skipped by `routes --legal`.
    pub illegal_locations: Vec<String>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        RoutesConfig {
            units_per_cargo_space: DEFAULT_UNITS_PER_CARGO_SPACE,
            top: 3,
            illegal_locations: vec!["Jumptown".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub table: BuilderConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "tradepost", "tradepost")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("org", "tradepost", "tradepost")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let units = self.routes.units_per_cargo_space;
        if !(units.is_finite() && units > 0.0) {
            bail!("routes.units_per_cargo_space must be a positive number, got {units}");
        }
        Ok(())
    }
}
