use nalgebra::{Matrix3, Vector3};

use super::StateVector;
use crate::error::{Error, Result};

/// Rotation from ECI to the radial, transverse, normal frame of a reference
/// state.
///
/// Rows are the radial, transverse and normal unit vectors, in that order.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RtnBasis {
    matrix: Matrix3<f64>,
}

impl RtnBasis {
    /// Builds the basis for the given reference state.
    pub fn from_state(state: &StateVector) -> Self {
        build_basis(&state.position, &state.velocity)
    }

    /// Returns the 3x3 rotation matrix.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Returns the radial unit vector R̂.
    pub fn radial(&self) -> Vector3<f64> {
        self.matrix.row(0).transpose()
    }

    /// Returns the transverse unit vector T̂.
    pub fn transverse(&self) -> Vector3<f64> {
        self.matrix.row(1).transpose()
    }

    /// Returns the orbit normal unit vector N̂.
    pub fn normal(&self) -> Vector3<f64> {
        self.matrix.row(2).transpose()
    }

    /// Expresses an ECI vector in this basis.
    pub fn to_rtn(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.matrix * vector
    }

    /// Reconstructs the ECI vector `r R̂ + t T̂ + n N̂` from RTN components.
    ///
    /// Only the inverse of [`RtnBasis::to_rtn`] when the basis is orthonormal.
    pub fn to_eci(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.matrix.transpose() * vector
    }

    /// Returns `true` if every row has unit norm and the rows are pairwise
    /// orthogonal, within `tolerance`.
    ///
    /// A zero reference position or a purely radial reference velocity
    /// produces a degenerate basis that fails this check.
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        (self.matrix * self.matrix.transpose() - Matrix3::identity()).amax() <= tolerance
    }
}

/// Builds the RTN basis from a reference position and velocity.
///
/// # Arguments
///
/// * `position` - Reference position in ECI frame
/// * `velocity` - Reference velocity in ECI frame
///
/// # Returns
///
/// The basis with rows R̂ = r/‖r‖, T̂ = N̂ × R̂ and N̂ = h/‖h‖, where h = r × v.
/// A zero `r` or `h` leaves the corresponding row zero.
pub fn build_basis(position: &Vector3<f64>, velocity: &Vector3<f64>) -> RtnBasis {
    let radial = unit_or_zero(position);
    let normal = unit_or_zero(&position.cross(velocity));
    let transverse = normal.cross(&radial);

    RtnBasis {
        matrix: Matrix3::from_rows(&[
            radial.transpose(),
            transverse.transpose(),
            normal.transpose(),
        ]),
    }
}

/// Returns `(v·R̂, v·T̂, v·N̂)`.
pub fn rotate(basis: &RtnBasis, vector: &Vector3<f64>) -> Vector3<f64> {
    basis.to_rtn(vector)
}

/// Rotates each vector into the RTN frame of the reference state at the same
/// index.
///
/// A fresh basis is built for every index since each sample has its own
/// reference state.
pub fn rotate_batch(
    references: &[StateVector],
    vectors: &[Vector3<f64>],
) -> Result<Vec<Vector3<f64>>> {
    if references.len() != vectors.len() {
        return Err(Error::DimensionMismatch {
            references: references.len(),
            vectors: vectors.len(),
        });
    }

    Ok(references
        .iter()
        .zip(vectors)
        .map(|(reference, vector)| rotate(&RtnBasis::from_state(reference), vector))
        .collect())
}

fn unit_or_zero(vector: &Vector3<f64>) -> Vector3<f64> {
    let norm = vector.norm();
    if norm != 0.0 {
        vector / norm
    } else {
        Vector3::zeros()
    }
}
