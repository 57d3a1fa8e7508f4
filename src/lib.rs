//! Analysis of arrival errors of debris-to-debris transfers.
//!
//! Converts error vectors between the ECI and RTN frames, summarizes and bins
//! them, and produces error samples by propagating two-line elements with SGP4.
//! Lambert transfers can be ranked per object pair and binned by Δv.

pub mod coordinates;
pub mod error;
pub mod histogram;
pub mod object;
pub mod sample;
pub mod stats;
pub mod transfer;

pub use error::{Error, Result};
