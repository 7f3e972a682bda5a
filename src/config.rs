//! Dashboard configuration: JSON file values with CLI overrides on top.

use crate::stats::DEFAULT_HISTOGRAM_BINS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CSV_PATH: &str = "ITI_DATASet.csv";
/// Largest accepted export chart side, in pixels.
pub const MAX_EXPORT_SIDE: u32 = 8192;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("histogram_bins must be at least 1")]
    InvalidBins,
    #[error("export size must be 1..=8192 pixels per side, got {0}x{1}")]
    InvalidExportSize(u32, u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub csv_path: PathBuf,
    /// Track preselected in the filter; `None` means "All Tracks".
    pub default_track: Option<String>,
    pub histogram_bins: usize,
    pub employed_statuses: Vec<String>,
    /// Compute the detail charts over the selected track instead of all records.
    pub scope_details_to_track: bool,
    pub export_width: u32,
    pub export_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            default_track: None,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            employed_statuses: ["Intern", "Freelancer", "Part-time", "Full-time"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            scope_details_to_track: false,
            export_width: 1200,
            export_height: 700,
        }
    }
}

impl DashboardConfig {
    /// Load from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.histogram_bins == 0 {
            return Err(ConfigError::InvalidBins);
        }
        let side_ok = |side: u32| (1..=MAX_EXPORT_SIDE).contains(&side);
        if !side_ok(self.export_width) || !side_ok(self.export_height) {
            return Err(ConfigError::InvalidExportSize(
                self.export_width,
                self.export_height,
            ));
        }
        Ok(())
    }
}
