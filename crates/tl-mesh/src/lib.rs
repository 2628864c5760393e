//! Finite-element substrate for the block problem.
//!
//! Provides a structured hexahedral block mesh, the six box-face regions,
//! tensor-product Lagrange fields over the block, Gauss–Legendre quadrature
//! and the reference-to-physical mapping that yields shape-function
//! gradients in the undeformed configuration.

pub mod basis;
pub mod block;
pub mod dofs;
pub mod error;
pub mod field;
pub mod mapping;
pub mod quadrature;
pub mod region;
mod validate;

pub use basis::{HexBasis, LagrangeBasis1d};
pub use block::{BlockMesh, BlockMeshBuilder};
pub use dofs::DofLayout;
pub use error::{MeshError, MeshResult};
pub use field::LagrangeField;
pub use mapping::{PointData, cell_point_data, vertex_jacobian};
pub use quadrature::{QuadratureRule, gauss_legendre};
pub use region::BoxFace;
