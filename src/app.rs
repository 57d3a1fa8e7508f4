use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};

use d2d_analysis::{
    coordinates::Frame,
    histogram::Histogram,
    object::Object,
    sample::{ErrorComponents, ErrorSample, ReferenceArrival, resolve_components},
    stats::{Summary, summarize},
    transfer::{Transfer, delta_v_histogram, top_list},
};

use crate::config::{Config, HistogramConfig};

/// Application.
pub struct App {
    config: Config,
}

impl App {
    /// Creates a new `App` with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Writes the error components of the samples in `input`.
    pub fn convert(&self, input: &Path, frame: Option<Frame>, output: Option<&Path>) -> Result<()> {
        let components = self.load_components(input, frame)?;
        write_json(&components, output)
    }

    /// Writes summary statistics of the position and velocity error
    /// magnitudes, and of each error component in `frame`.
    pub fn stats(&self, input: &Path, frame: Option<Frame>, output: Option<&Path>) -> Result<()> {
        let components = self.load_components(input, frame)?;
        let report = StatsReport::new(&self.config.orbit_type, &components)?;
        for stats in &report.magnitudes {
            tracing::info!(
                error_type = %stats.error_type,
                mean = stats.summary.mean,
                std_dev = stats.summary.std_dev,
                median = stats.summary.median,
                iqr = stats.summary.iqr,
                "computed statistics"
            );
        }
        write_json(&report, output)
    }

    /// Writes histograms of the error magnitudes and components.
    pub fn histogram(&self, input: &Path, frame: Option<Frame>, output: Option<&Path>) -> Result<()> {
        let components = self.load_components(input, frame)?;
        let report = HistogramReport::new(&components, &self.config.histogram)?;
        write_json(&report, output)
    }

    /// Propagates the object described by `tle` to each reference arrival in
    /// `input` and writes the resulting error samples.
    ///
    /// Arrivals that fail to propagate are skipped.
    pub fn propagate(&self, tle: &Path, input: &Path, output: Option<&Path>) -> Result<()> {
        let text = std::fs::read_to_string(tle)
            .with_context(|| format!("failed to read TLE file {}", tle.display()))?;
        let object = Object::from_tle(&text)
            .with_context(|| format!("failed to load TLE file {}", tle.display()))?;
        let arrivals: Vec<ReferenceArrival> = read_json(input)?;

        tracing::info!(
            object = object.name().unwrap_or("unnamed"),
            arrivals = arrivals.len(),
            "propagating arrivals"
        );

        let (samples, failures) = object.error_samples(&arrivals);
        tracing::info!(
            propagated = samples.len(),
            failures,
            "propagation finished"
        );
        write_json(&samples, output)
    }

    /// Writes the lowest-Δv transfer of every object pair in `input`, ranked
    /// by Δv.
    pub fn top_list(&self, input: &Path, output: Option<&Path>) -> Result<()> {
        let transfers: Vec<Transfer> = read_json(input)?;
        let ranked = top_list(&transfers);
        tracing::info!(
            transfers = transfers.len(),
            pairs = ranked.len(),
            "ranked transfers"
        );
        write_json(&ranked, output)
    }

    /// Writes a histogram of the transfer Δv in `input` below `cutoff`.
    pub fn delta_v(&self, input: &Path, cutoff: Option<f64>, output: Option<&Path>) -> Result<()> {
        let transfers: Vec<Transfer> = read_json(input)?;
        let config = &self.config.transfers;
        let report = DeltaVReport::new(&transfers, cutoff.or(config.cutoff), config.bins)?;
        tracing::info!(
            transfers = transfers.len(),
            binned = report.histogram.histogram.total(),
            "binned transfer delta-v"
        );
        write_json(&report, output)
    }

    fn load_components(&self, input: &Path, frame: Option<Frame>) -> Result<ErrorComponents> {
        let frame = frame.unwrap_or(self.config.frame);
        let samples: Vec<ErrorSample> = read_json(input)?;
        tracing::info!(samples = samples.len(), %frame, "resolving error components");

        let start = Instant::now();
        let components = resolve_components(&samples, frame)?;
        tracing::debug!(elapsed = ?start.elapsed(), "resolved error components");
        Ok(components)
    }
}

#[derive(Debug, Serialize)]
struct ErrorStats<'a> {
    orbit_type: &'a str,
    error_type: String,
    #[serde(flatten)]
    summary: Summary,
}

impl<'a> ErrorStats<'a> {
    fn new(orbit_type: &'a str, error_type: impl Into<String>, values: &[f64]) -> Result<Self> {
        let error_type = error_type.into();
        let summary =
            summarize(values).with_context(|| format!("failed to summarize {error_type}"))?;
        Ok(Self {
            orbit_type,
            error_type,
            summary,
        })
    }
}

#[derive(Debug, Serialize)]
struct StatsReport<'a> {
    frame: Frame,
    magnitudes: Vec<ErrorStats<'a>>,
    components: Vec<ErrorStats<'a>>,
}

impl<'a> StatsReport<'a> {
    fn new(orbit_type: &'a str, components: &ErrorComponents) -> Result<Self> {
        let magnitudes = vec![
            ErrorStats::new(orbit_type, "position error", &components.position_magnitude)?,
            ErrorStats::new(orbit_type, "velocity error", &components.velocity_magnitude)?,
        ];

        let labels = components.frame.component_labels();
        let mut position = Vec::with_capacity(3);
        let mut velocity = Vec::with_capacity(3);
        for (index, label) in labels.into_iter().enumerate() {
            position.push(ErrorStats::new(
                orbit_type,
                format!("{label} position error"),
                &components.position_component(index),
            )?);
            velocity.push(ErrorStats::new(
                orbit_type,
                format!("{label} velocity error"),
                &components.velocity_component(index),
            )?);
        }
        position.append(&mut velocity);

        Ok(Self {
            frame: components.frame,
            magnitudes,
            components: position,
        })
    }
}

#[derive(Debug, Serialize)]
struct LabelledHistogram {
    label: String,
    centres: Vec<f64>,
    #[serde(flatten)]
    histogram: Histogram,
}

impl LabelledHistogram {
    fn new(
        label: impl Into<String>,
        values: &[f64],
        bins: usize,
        range: Option<[f64; 2]>,
        normed: bool,
    ) -> Result<Self> {
        let label = label.into();
        let histogram = Histogram::new(values, bins, range.map(|[lo, hi]| (lo, hi)), normed)
            .with_context(|| format!("failed to bin {label}"))?;
        Ok(Self {
            label,
            centres: histogram.centres(),
            histogram,
        })
    }
}

#[derive(Debug, Serialize)]
struct HistogramReport {
    frame: Frame,
    normed: bool,
    position_magnitude: LabelledHistogram,
    velocity_magnitude: LabelledHistogram,
    position_components: Vec<LabelledHistogram>,
    velocity_components: Vec<LabelledHistogram>,
}

impl HistogramReport {
    fn new(components: &ErrorComponents, config: &HistogramConfig) -> Result<Self> {
        let labels = components.frame.component_labels();

        let mut position_components = Vec::with_capacity(3);
        let mut velocity_components = Vec::with_capacity(3);
        for (index, label) in labels.into_iter().enumerate() {
            position_components.push(LabelledHistogram::new(
                format!("{label} position error [km]"),
                &components.position_component(index),
                config.component_bins,
                config.position_range,
                config.normed,
            )?);
            velocity_components.push(LabelledHistogram::new(
                format!("{label} velocity error [km/s]"),
                &components.velocity_component(index),
                config.component_bins,
                config.velocity_range,
                config.normed,
            )?);
        }

        Ok(Self {
            frame: components.frame,
            normed: config.normed,
            position_magnitude: LabelledHistogram::new(
                "Arrival position error [km]",
                &components.position_magnitude,
                config.magnitude_bins,
                None,
                config.normed,
            )?,
            velocity_magnitude: LabelledHistogram::new(
                "Arrival velocity error [km/s]",
                &components.velocity_magnitude,
                config.magnitude_bins,
                None,
                config.normed,
            )?,
            position_components,
            velocity_components,
        })
    }
}

#[derive(Debug, Serialize)]
struct DeltaVReport {
    cutoff: Option<f64>,
    #[serde(flatten)]
    histogram: LabelledHistogram,
}

impl DeltaVReport {
    fn new(transfers: &[Transfer], cutoff: Option<f64>, bins: usize) -> Result<Self> {
        let label = String::from("Transfer delta-v [km/s]");
        let histogram = delta_v_histogram(transfers, cutoff, bins)
            .with_context(|| format!("failed to bin {label}"))?;
        Ok(Self {
            cutoff,
            histogram: LabelledHistogram {
                label,
                centres: histogram.centres(),
                histogram,
            },
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Returns the default configuration file path, `~/.config/d2d-analysis/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    std::env::home_dir().map(|home| home.join(".config/d2d-analysis/config.toml"))
}
