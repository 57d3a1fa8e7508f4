use serde::Serialize;

use crate::error::{Error, Result};

/// Descriptive statistics of a series of values.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Population variance.
    pub variance: f64,
    pub std_dev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Interquartile range, `q75 - q25`.
    pub iqr: f64,
}

/// Computes the summary statistics of `values`.
pub fn summarize(values: &[f64]) -> Result<Summary> {
    if values.is_empty() {
        return Err(Error::EmptySample);
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    Ok(Summary {
        count,
        mean,
        variance,
        std_dev: variance.sqrt(),
        median: percentile_sorted(&sorted, 50.0),
        min: sorted[0],
        max: sorted[count - 1],
        iqr: percentile_sorted(&sorted, 75.0) - percentile_sorted(&sorted, 25.0),
    })
}

/// Returns the `p`-th percentile of `values`, interpolating linearly between
/// the closest ranks.
///
/// `p` must lie in `[0, 100]`.
pub fn percentile(values: &[f64], p: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&p) {
        return Err(Error::InvalidPercentile(p));
    }
    if values.is_empty() {
        return Err(Error::EmptySample);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(percentile_sorted(&sorted, p))
}

/// `sorted` must be non-empty and sorted in ascending order, `p` in `[0, 100]`.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    debug_assert!((0.0..=100.0).contains(&p));

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}
