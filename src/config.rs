//! Tracker, transport and heatmap configuration
//!
//! Every struct deserializes with `#[serde(default)]`, so a config file only
//! needs the keys it overrides.

use crate::heatmap::projection::ProjectionConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Collector cadence and buffer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerConfig {
    /// Period of the cursor sampling timer
    pub sample_interval_ms: u64,
    /// Period of the background flush timer; `None` flushes only on page-hide and teardown
    pub flush_interval_ms: Option<u64>,
    /// Capacity of the cursor sample ring buffer
    pub sample_capacity: usize,
    /// Deliver snapshots before an application id has been bound
    pub flush_without_application_id: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 1_000,
            flush_interval_ms: Some(10_000),
            sample_capacity: 100,
            flush_without_application_id: false,
        }
    }
}

impl TrackerConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }

    pub fn flush_interval(&self) -> Option<Duration> {
        self.flush_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// Backend endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransportConfig {
    /// Base URL, e.g. `https://example.com/api`
    pub base_url: String,
    /// Post to `/behavior-metrics/` instead of `/behavior-metrics`
    pub trailing_slash: bool,
    pub timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "/api".to_string(),
            trailing_slash: false,
            timeout_ms: 10_000,
        }
    }
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Heatmap reconstruction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeatmapConfig {
    pub projection: ProjectionConfig,
    /// Density grid cell size in canvas pixels
    pub cell_size: f64,
    /// Prefix cap on processed samples
    pub max_samples: usize,
    /// Cap on the fine-detail dot overlay
    pub max_detail_dots: usize,
    pub draw_detail_dots: bool,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionConfig::default(),
            cell_size: 15.0,
            max_samples: 10_000,
            max_detail_dots: 1_000,
            draw_detail_dots: true,
        }
    }
}

/// Complete settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tracker: TrackerConfig,
    pub transport: TransportConfig,
    pub heatmap: HeatmapConfig,
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    /// Load settings when `path` is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}
