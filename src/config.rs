use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{DashboardError, Result};

/// Locations of the two input tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    pub track_table_path: PathBuf,
    pub summary_table_path: PathBuf,
}

/// Application configuration loaded from TOML config file.
/// All fields have defaults; the config file is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataPaths,
    pub server: ServerConfig,
    pub display: DisplayConfig,
}

/// Input paths as they appear in the config file, either may be absent
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct DataPaths {
    pub track_table_path: Option<PathBuf>,
    pub summary_table_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// Port for the local dashboard server.
    pub port: u16,
    /// Open the dashboard in a browser once the server is listening.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3002,
            open_browser: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    /// Cap on rows shown in the per-cluster feature table.
    pub max_table_rows: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { max_table_rows: 500 }
    }
}

impl AppConfig {
    /// Load config from `~/.config/clusterscope/config.toml`.
    /// Returns default config if the file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("{}. Using defaults.", e);
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`], failure is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = toml::from_str::<AppConfig>(&contents).map_err(|e| {
            DashboardError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve input paths, letting explicit values override the file.
    pub fn data_config(
        &self,
        tracks: Option<PathBuf>,
        summary: Option<PathBuf>,
    ) -> Result<DataConfig> {
        let track_table_path = tracks
            .or_else(|| self.data.track_table_path.clone())
            .ok_or_else(|| DashboardError::Config("no track table path configured".into()))?;
        let summary_table_path = summary
            .or_else(|| self.data.summary_table_path.clone())
            .ok_or_else(|| DashboardError::Config("no summary table path configured".into()))?;
        Ok(DataConfig {
            track_table_path,
            summary_table_path,
        })
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
