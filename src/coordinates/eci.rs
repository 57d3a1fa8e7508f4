use nalgebra::Vector3;

/// A position and velocity in ECI frame.
#[derive(Clone, PartialEq, Debug)]
pub struct StateVector {
    /// Position in km.
    pub position: Vector3<f64>,
    /// Velocity in km/s.
    pub velocity: Vector3<f64>,
}

impl StateVector {
    /// Creates a new `StateVector`.
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self { position, velocity }
    }

    /// Returns the distance from the frame origin in km.
    pub fn radius(&self) -> f64 {
        self.position.norm()
    }

    /// Returns the speed in km/s.
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Returns the specific angular momentum vector `r × v`.
    pub fn angular_momentum(&self) -> Vector3<f64> {
        self.position.cross(&self.velocity)
    }
}

impl From<([f64; 3], [f64; 3])> for StateVector {
    fn from((position, velocity): ([f64; 3], [f64; 3])) -> Self {
        Self::new(Vector3::from(position), Vector3::from(velocity))
    }
}
