use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

mod eci;
mod rtn;

pub use eci::StateVector;
pub use rtn::{RtnBasis, build_basis, rotate, rotate_batch};

/// Reference frame in which error components are expressed.
#[derive(
    Clone, Copy, PartialEq, Eq, Default, Debug, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frame {
    /// Earth-centered inertial.
    #[default]
    Eci,
    /// Radial, transverse, normal.
    Rtn,
}

impl Frame {
    /// Returns the labels of the three components, in order.
    pub fn component_labels(&self) -> [&'static str; 3] {
        match self {
            Self::Eci => ["X", "Y", "Z"],
            Self::Rtn => ["Radial", "Transverse", "Normal"],
        }
    }
}
