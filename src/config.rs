use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use d2d_analysis::coordinates::Frame;

/// Configuration for the application.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Frame in which error components are reported.
    pub frame: Frame,
    /// Label attached to statistics reports, e.g. "LEO".
    pub orbit_type: String,
    pub histogram: HistogramConfig,
    pub transfers: TransferConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame: Frame::Rtn,
            orbit_type: String::from("unspecified"),
            histogram: HistogramConfig::default(),
            transfers: TransferConfig::default(),
        }
    }
}

impl Config {
    /// Reads the configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Configuration for error histograms.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistogramConfig {
    pub component_bins: usize,
    pub magnitude_bins: usize,
    /// Report fractions of the sample instead of counts.
    pub normed: bool,

    /// Lower and upper edge for position errors in km.
    pub position_range: Option<[f64; 2]>,
    /// Lower and upper edge for velocity errors in km/s.
    pub velocity_range: Option<[f64; 2]>,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            component_bins: 200,
            magnitude_bins: 50,
            normed: false,
            position_range: None,
            velocity_range: None,
        }
    }
}

/// Configuration for the Lambert transfer Δv histogram.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransferConfig {
    pub bins: usize,
    /// Transfers at or above this Δv in km/s are left out.
    pub cutoff: Option<f64>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            bins: 50,
            cutoff: None,
        }
    }
}
