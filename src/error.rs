use thiserror::Error;

/// Errors produced by the analysis routines.
#[derive(Error, Clone, PartialEq, Debug)]
pub enum Error {
    #[error("expected one error vector per reference state, got {references} states and {vectors} vectors")]
    DimensionMismatch { references: usize, vectors: usize },

    #[error("sample is empty")]
    EmptySample,

    #[error("percentile {0} is outside [0, 100]")]
    InvalidPercentile(f64),

    #[error("histogram needs at least one bin")]
    InvalidBins,

    #[error("invalid histogram range [{lo}, {hi}]")]
    InvalidRange { lo: f64, hi: f64 },

    #[error("invalid TLE: {0}")]
    InvalidTle(String),

    #[error("SGP4 propagation failed: {0}")]
    Propagation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
