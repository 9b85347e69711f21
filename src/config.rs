//! Analysis configuration, loadable from a JSON file.

use crate::charts::{chart_size_supported, MAX_CHART_SIDE, MIN_CHART_HEIGHT, MIN_CHART_WIDTH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Directory receiving the rendered PNG charts
    pub output_dir: PathBuf,
    /// Name of the time column split off before PCA
    pub time_column: String,
    /// Variables shown per loading chart
    pub top_contributors: usize,
    /// Number of leading components that get a loading chart
    pub loading_components: usize,
    pub chart_width: u32,
    pub chart_height: u32,
    pub render_charts: bool,
    /// Open each rendered chart with the system image viewer
    pub open_charts: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("pca_charts"),
            time_column: "time".to_string(),
            top_contributors: 5,
            loading_components: 4,
            chart_width: 800,
            chart_height: 500,
            render_charts: true,
            open_charts: false,
        }
    }
}

impl AnalysisConfig {
    /// Load from a JSON file; missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_column.trim().is_empty() {
            return Err(ConfigError::Invalid("time_column must not be empty".into()));
        }
        if self.top_contributors == 0 {
            return Err(ConfigError::Invalid("top_contributors must be at least 1".into()));
        }
        if self.loading_components == 0 {
            return Err(ConfigError::Invalid("loading_components must be at least 1".into()));
        }
        if !chart_size_supported(self.chart_width, self.chart_height) {
            return Err(ConfigError::Invalid(format!(
                "chart size {}x{} is outside {MIN_CHART_WIDTH}x{MIN_CHART_HEIGHT} to \
                 {MAX_CHART_SIDE}x{MAX_CHART_SIDE}",
                self.chart_width, self.chart_height
            )));
        }
        Ok(())
    }
}
