//! Finite-strain kinematics and the incompressible Mooney-Rivlin law.
//!
//! Tensors are nalgebra 3x3 matrices. Symmetric second-order tensors are
//! also carried in Voigt form `[11, 22, 33, 12, 23, 13]` and fourth-order
//! tangents as 6x6 matrices mapping engineering strain to stress.

pub mod error;
pub mod kinematics;
pub mod mooney_rivlin;
pub mod voigt;

pub use error::{MaterialError, MaterialResult};
pub use kinematics::{Kinematics, deformation_gradient};
pub use mooney_rivlin::{MooneyRivlin, StressParts, uniaxial_true_stress};
