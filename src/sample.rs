use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    coordinates::{Frame, StateVector, rotate_batch},
    error::Result,
};

/// Arrival error of one transfer, as produced by the propagation scanner.
///
/// Errors are expressed in ECI frame and are the propagated state minus the
/// reference arrival state.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorSample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<i64>,
    /// Reference arrival position in km.
    pub arrival_position: [f64; 3],
    /// Reference arrival velocity in km/s.
    pub arrival_velocity: [f64; 3],
    /// Position error in km.
    pub position_error: [f64; 3],
    /// Velocity error in km/s.
    pub velocity_error: [f64; 3],
}

impl ErrorSample {
    /// Creates a sample from a reference state and a propagated estimate of
    /// the same state.
    pub fn from_states(
        transfer_id: Option<i64>,
        reference: &StateVector,
        propagated: &StateVector,
    ) -> Self {
        Self {
            transfer_id,
            arrival_position: reference.position.into(),
            arrival_velocity: reference.velocity.into(),
            position_error: (propagated.position - reference.position).into(),
            velocity_error: (propagated.velocity - reference.velocity).into(),
        }
    }

    pub fn reference_state(&self) -> StateVector {
        StateVector::from((self.arrival_position, self.arrival_velocity))
    }

    pub fn position_error(&self) -> Vector3<f64> {
        Vector3::from(self.position_error)
    }

    pub fn velocity_error(&self) -> Vector3<f64> {
        Vector3::from(self.velocity_error)
    }
}

/// A reference arrival state of a transfer.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceArrival {
    #[serde(default)]
    pub transfer_id: Option<i64>,
    /// UTC Julian date.
    pub arrival_epoch_jd: f64,
    /// Arrival position in km.
    pub arrival_position: [f64; 3],
    /// Arrival velocity in km/s.
    pub arrival_velocity: [f64; 3],
}

impl ReferenceArrival {
    pub fn state(&self) -> StateVector {
        StateVector::from((self.arrival_position, self.arrival_velocity))
    }
}

/// Error components of a set of samples in a single frame.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct ErrorComponents {
    pub frame: Frame,
    /// Position error components in km.
    pub position: Vec<[f64; 3]>,
    /// Velocity error components in km/s.
    pub velocity: Vec<[f64; 3]>,
    pub position_magnitude: Vec<f64>,
    pub velocity_magnitude: Vec<f64>,
}

impl ErrorComponents {
    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// Returns the `index`-th component of every position error.
    pub fn position_component(&self, index: usize) -> Vec<f64> {
        self.position.iter().map(|v| v[index]).collect()
    }

    /// Returns the `index`-th component of every velocity error.
    pub fn velocity_component(&self, index: usize) -> Vec<f64> {
        self.velocity.iter().map(|v| v[index]).collect()
    }
}

/// Expresses the errors of all samples in `frame`.
///
/// For [`Frame::Rtn`] each sample is rotated with the basis of its own
/// reference arrival state. Magnitudes are those of the ECI error vectors in
/// either frame.
pub fn resolve_components(samples: &[ErrorSample], frame: Frame) -> Result<ErrorComponents> {
    let position: Vec<Vector3<f64>> = samples.iter().map(ErrorSample::position_error).collect();
    let velocity: Vec<Vector3<f64>> = samples.iter().map(ErrorSample::velocity_error).collect();

    // Magnitudes come from the ECI vectors so a degenerate basis cannot
    // shrink them.
    let position_magnitude = position.iter().map(|v| v.norm()).collect();
    let velocity_magnitude = velocity.iter().map(|v| v.norm()).collect();

    let (position, velocity) = match frame {
        Frame::Eci => (position, velocity),
        Frame::Rtn => {
            let references: Vec<StateVector> =
                samples.iter().map(ErrorSample::reference_state).collect();
            (
                rotate_batch(&references, &position)?,
                rotate_batch(&references, &velocity)?,
            )
        }
    };

    Ok(ErrorComponents {
        frame,
        position_magnitude,
        velocity_magnitude,
        position: position.into_iter().map(Into::into).collect(),
        velocity: velocity.into_iter().map(Into::into).collect(),
    })
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    const EPSILON: f64 = 1e-9;

    fn samples() -> Vec<ErrorSample> {
        vec![
            ErrorSample {
                transfer_id: Some(1),
                arrival_position: [0.0, 10.0, 0.0],
                arrival_velocity: [-30.0, 0.0, 0.0],
                position_error: [10.0, 10.0, 0.0],
                velocity_error: [0.0, 0.0, 2.0],
            },
            ErrorSample {
                transfer_id: Some(2),
                arrival_position: [10000.0, 0.0, 0.0],
                arrival_velocity: [0.0, 7.0, 0.0],
                position_error: [10.0, 10.0, 0.0],
                velocity_error: [0.5, 0.0, 0.0],
            },
        ]
    }

    #[test]
    fn errors_are_propagated_minus_reference() {
        let reference = StateVector::from(([7000.0, 0.0, 0.0], [0.0, 7.5, 0.0]));
        let propagated = StateVector::from(([7001.0, -2.0, 0.5], [0.0, 7.25, 0.01]));
        let sample = ErrorSample::from_states(Some(3), &reference, &propagated);

        assert_eq!(sample.arrival_position, [7000.0, 0.0, 0.0]);
        assert_eq!(sample.position_error, [1.0, -2.0, 0.5]);
        assert_eq!(sample.velocity_error, [0.0, -0.25, 0.01]);
        assert_eq!(sample.reference_state(), reference);
    }

    #[test]
    fn eci_components_are_unchanged() {
        let components = resolve_components(&samples(), Frame::Eci).unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components.position[0], [10.0, 10.0, 0.0]);
        assert_eq!(components.velocity_component(2), vec![2.0, 0.0]);
    }

    #[test]
    fn rtn_components_use_each_reference_state() {
        let components = resolve_components(&samples(), Frame::Rtn).unwrap();
        assert_eq!(components.frame, Frame::Rtn);

        let expected = [[10.0, -10.0, 0.0], [10.0, 10.0, 0.0]];
        for (actual, expected) in components.position.iter().zip(expected) {
            assert_abs_diff_eq!(Vector3::from(*actual), Vector3::from(expected), epsilon = EPSILON);
        }
        assert_relative_eq!(components.velocity[0][2], 2.0, epsilon = EPSILON);
        assert_relative_eq!(components.velocity[1][0], 0.5, epsilon = EPSILON);
    }

    #[test]
    fn magnitudes_do_not_depend_on_frame() {
        let eci = resolve_components(&samples(), Frame::Eci).unwrap();
        let rtn = resolve_components(&samples(), Frame::Rtn).unwrap();
        assert_eq!(eci.position_magnitude, rtn.position_magnitude);
        assert_eq!(eci.velocity_magnitude, rtn.velocity_magnitude);
    }

    #[test]
    fn degenerate_basis_keeps_eci_magnitudes() {
        // Purely radial arrival velocity leaves T and N undefined.
        let samples = vec![ErrorSample {
            transfer_id: None,
            arrival_position: [7000.0, 0.0, 0.0],
            arrival_velocity: [1.0, 0.0, 0.0],
            position_error: [0.0, 3.0, 4.0],
            velocity_error: [0.0, 0.6, 0.8],
        }];
        let components = resolve_components(&samples, Frame::Rtn).unwrap();

        assert_eq!(components.position[0], [0.0, 0.0, 0.0]);
        assert_relative_eq!(components.position_magnitude[0], 5.0, epsilon = EPSILON);
        assert_relative_eq!(components.velocity_magnitude[0], 1.0, epsilon = EPSILON);
    }

    #[test]
    fn deserializes_without_transfer_id() {
        let json = r#"[{
            "arrival_position": [7000.0, 0.0, 0.0],
            "arrival_velocity": [0.0, 7.5, 0.0],
            "position_error": [1.0, 2.0, 3.0],
            "velocity_error": [0.1, 0.2, 0.3]
        }]"#;
        let samples: Vec<ErrorSample> = serde_json::from_str(json).unwrap();
        assert_eq!(samples[0].transfer_id, None);
        assert_eq!(samples[0].position_error(), Vector3::new(1.0, 2.0, 3.0));
    }
}
