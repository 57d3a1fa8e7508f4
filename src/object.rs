use chrono::{DateTime, Datelike, Timelike, Utc};
use hifitime::Epoch;
use nalgebra::Vector3;

use crate::{
    coordinates::StateVector,
    error::{Error, Result},
    sample::{ErrorSample, ReferenceArrival},
};

/// A space object propagated with SGP4.
#[derive(Clone, Debug)]
pub struct Object {
    epoch: Epoch,
    elements: sgp4::Elements,
    constants: sgp4::Constants,
}

impl Object {
    /// Creates a new `Object` from SGP4 elements.
    pub fn from_elements(elements: sgp4::Elements) -> Result<Self> {
        let constants = sgp4::Constants::from_elements(&elements)
            .map_err(|e| Error::Propagation(e.to_string()))?;

        Ok(Self {
            epoch: utc_to_epoch(DateTime::from_naive_utc_and_offset(elements.datetime, Utc)),
            elements,
            constants,
        })
    }

    /// Creates a new `Object` from the text of a two-line element set.
    ///
    /// The text holds either the two element lines, or a name line followed by
    /// the two element lines. Blank lines are ignored.
    pub fn from_tle(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect();

        let (name, line1, line2) = match lines.as_slice() {
            [line1, line2] => (None, *line1, *line2),
            [name, line1, line2] => (Some(name.trim().to_owned()), *line1, *line2),
            _ => {
                return Err(Error::InvalidTle(format!(
                    "expected 2 or 3 lines, found {}",
                    lines.len()
                )));
            }
        };

        let elements = sgp4::Elements::from_tle(name, line1.as_bytes(), line2.as_bytes())
            .map_err(|e| Error::InvalidTle(e.to_string()))?;
        Self::from_elements(elements)
    }

    /// Returns the name of the object.
    pub fn name(&self) -> Option<&str> {
        self.elements.object_name.as_deref()
    }

    /// Returns the epoch of the elements.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Returns the SGP4 elements of the object.
    pub fn elements(&self) -> &sgp4::Elements {
        &self.elements
    }

    /// Predicts the state of the object at the given epoch.
    ///
    /// The state is expressed in the TEME frame, in km and km/s.
    pub fn predict(&self, epoch: Epoch) -> Result<StateVector> {
        let minutes_since_epoch = (epoch - self.epoch).to_seconds() / 60.0;

        let prediction = self
            .constants
            .propagate(sgp4::MinutesSinceEpoch(minutes_since_epoch))
            .map_err(|e| Error::Propagation(e.to_string()))?;

        Ok(StateVector::new(
            Vector3::from(prediction.position),
            Vector3::from(prediction.velocity),
        ))
    }

    /// Predicts the state of the object at the given UTC Julian date.
    pub fn predict_at_jd(&self, julian_date: f64) -> Result<StateVector> {
        if !julian_date.is_finite() {
            return Err(Error::Propagation(format!(
                "invalid Julian date {julian_date}"
            )));
        }
        self.predict(Epoch::from_jde_utc(julian_date))
    }

    /// Propagates the object to `arrival_epoch_jd` and compares the result with
    /// the `reference` arrival state.
    pub fn error_sample(
        &self,
        transfer_id: Option<i64>,
        arrival_epoch_jd: f64,
        reference: &StateVector,
    ) -> Result<ErrorSample> {
        let propagated = self.predict_at_jd(arrival_epoch_jd)?;
        Ok(ErrorSample::from_states(transfer_id, reference, &propagated))
    }

    /// Builds an error sample for every arrival that can be propagated.
    ///
    /// Returns the samples in input order and the number of arrivals skipped
    /// because propagation failed.
    pub fn error_samples(&self, arrivals: &[ReferenceArrival]) -> (Vec<ErrorSample>, usize) {
        collect_error_samples(arrivals, |arrival| {
            self.error_sample(
                arrival.transfer_id,
                arrival.arrival_epoch_jd,
                &arrival.state(),
            )
        })
    }
}

/// Applies `error_sample` to each arrival, skipping and counting failures.
fn collect_error_samples<F>(arrivals: &[ReferenceArrival], mut error_sample: F) -> (Vec<ErrorSample>, usize)
where
    F: FnMut(&ReferenceArrival) -> Result<ErrorSample>,
{
    let mut samples = Vec::with_capacity(arrivals.len());
    let mut failures = 0;
    for arrival in arrivals {
        match error_sample(arrival) {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                failures += 1;
                tracing::warn!(transfer_id = ?arrival.transfer_id, error = %e, "propagation failed");
            }
        }
    }
    (samples, failures)
}

/// Returns the Epoch for the given UTC datetime.
fn utc_to_epoch(datetime: DateTime<Utc>) -> Epoch {
    Epoch::from_gregorian_utc(
        datetime.year(),
        datetime.month() as u8,
        datetime.day() as u8,
        datetime.hour() as u8,
        datetime.minute() as u8,
        datetime.second() as u8,
        datetime.nanosecond(),
    )
}
