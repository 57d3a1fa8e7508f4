use serde::Serialize;

use crate::error::{Error, Result};

/// Equal-width histogram of a series of values.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Histogram {
    /// Bin edges, one more than the number of bins.
    edges: Vec<f64>,
    /// Number of values per bin, or fraction of all values if normalized.
    counts: Vec<f64>,
}

impl Histogram {
    /// Bins `values` into `bins` equal-width bins.
    ///
    /// # Arguments
    ///
    /// * `values` - The data to bin
    /// * `bins` - Number of bins
    /// * `range` - Lower and upper edge, defaults to the data's min and max
    /// * `normed` - Weights each value by `1 / values.len()` instead of 1
    ///
    /// Every bin is half-open except the last one, which includes its upper
    /// edge. Values outside the range are not counted but still contribute to
    /// the normalization.
    pub fn new(values: &[f64], bins: usize, range: Option<(f64, f64)>, normed: bool) -> Result<Self> {
        if bins == 0 {
            return Err(Error::InvalidBins);
        }

        let (lo, hi) = match range {
            Some((lo, hi)) => {
                if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                    return Err(Error::InvalidRange { lo, hi });
                }
                (lo, hi)
            }
            None => data_range(values)?,
        };

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins)
            .map(|i| if i == bins { hi } else { lo + width * i as f64 })
            .collect();

        let weight = if normed {
            1.0 / values.len() as f64
        } else {
            1.0
        };

        let mut counts = vec![0.0; bins];
        for &value in values {
            // NaN fails both comparisons
            if !(value >= lo && value <= hi) {
                continue;
            }
            counts[bin_index(&edges, value)] += weight;
        }

        Ok(Self { edges, counts })
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Returns the midpoint of each bin.
    pub fn centres(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }

    /// Returns the sum of all bin counts.
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }
}

/// Returns the bin of `value` that agrees with `edges`.
///
/// `value` must lie within the outer edges. The index estimated from the
/// bin width can be off by one next to an edge, so it is corrected against
/// the edges themselves.
fn bin_index(edges: &[f64], value: f64) -> usize {
    let bins = edges.len() - 1;
    let (lo, hi) = (edges[0], edges[bins]);

    let mut index = (((value - lo) / (hi - lo)) * bins as f64) as usize;
    index = index.min(bins - 1);
    if value < edges[index] {
        index -= 1;
    } else if value >= edges[index + 1] && index + 1 != bins {
        index += 1;
    }
    index
}

/// Returns the min and max of the finite values, widened by 0.5 on each side
/// when they coincide.
fn data_range(values: &[f64]) -> Result<(f64, f64)> {
    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |range, &v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
        .ok_or(Error::EmptySample)?;

    if lo == hi {
        Ok((lo - 0.5, hi + 0.5))
    } else {
        Ok((lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn counts_with_auto_range() {
        let histogram = Histogram::new(&[0.0, 1.0, 1.0, 2.5, 4.0], 4, None, false).unwrap();
        assert_eq!(histogram.edges(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
        // Last bin includes its upper edge.
        assert_eq!(histogram.counts(), &[1.0, 2.0, 1.0, 1.0]);
        assert_eq!(histogram.centres(), vec![0.5, 1.5, 2.5, 3.5]);
    }

    #[test]
    fn values_outside_range_are_dropped() {
        let histogram =
            Histogram::new(&[-5.0, 0.1, 0.6, 0.9, 7.0], 2, Some((0.0, 1.0)), false).unwrap();
        assert_eq!(histogram.counts(), &[1.0, 2.0]);
        assert_eq!(histogram.total(), 3.0);
    }

    #[test]
    fn normalized_by_total_sample_size() {
        let histogram =
            Histogram::new(&[0.1, 0.2, 0.8, 5.0], 2, Some((0.0, 1.0)), true).unwrap();
        assert_relative_eq!(histogram.counts()[0], 0.5, epsilon = EPSILON);
        assert_relative_eq!(histogram.counts()[1], 0.25, epsilon = EPSILON);
        assert_relative_eq!(histogram.total(), 0.75, epsilon = EPSILON);
    }

    #[test]
    fn bins_agree_with_reported_edges() {
        let histogram = Histogram::new(&[0.3], 10, Some((0.0, 1.0)), false).unwrap();
        let bin = histogram.counts().iter().position(|&c| c == 1.0).unwrap();
        assert!(histogram.edges()[bin] <= 0.3 && 0.3 < histogram.edges()[bin + 1]);

        let values: Vec<f64> = (0..=100).map(|i| i as f64 / 100.0).collect();
        for &value in &values {
            let histogram = Histogram::new(&[value], 10, Some((0.0, 1.0)), false).unwrap();
            let bin = histogram.counts().iter().position(|&c| c == 1.0).unwrap();
            let edges = histogram.edges();
            assert!(edges[bin] <= value, "{value} below bin {bin}");
            assert!(value < edges[bin + 1] || bin == 9, "{value} above bin {bin}");
        }
    }

    #[test]
    fn constant_data_is_widened() {
        let histogram = Histogram::new(&[3.0, 3.0], 2, None, false).unwrap();
        assert_eq!(histogram.edges(), &[2.5, 3.0, 3.5]);
        assert_eq!(histogram.counts(), &[0.0, 2.0]);
    }

    #[test]
    fn nan_is_ignored() {
        let histogram = Histogram::new(&[f64::NAN, 0.0, 1.0], 1, None, false).unwrap();
        assert_eq!(histogram.counts(), &[2.0]);
    }

    #[test]
    fn invalid_arguments() {
        assert_eq!(Histogram::new(&[1.0], 0, None, false), Err(Error::InvalidBins));
        assert_eq!(Histogram::new(&[], 10, None, false), Err(Error::EmptySample));
        assert_eq!(
            Histogram::new(&[1.0], 10, Some((2.0, 1.0)), false),
            Err(Error::InvalidRange { lo: 2.0, hi: 1.0 })
        );
    }

    #[test]
    fn empty_data_with_range() {
        let histogram = Histogram::new(&[], 3, Some((0.0, 3.0)), false).unwrap();
        assert_eq!(histogram.counts(), &[0.0, 0.0, 0.0]);
    }
}
