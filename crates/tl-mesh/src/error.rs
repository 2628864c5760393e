//! Mesh-specific error types.

use tl_core::TlError;

pub type MeshResult<T> = Result<T, MeshError>;

/// Mesh construction and field/quadrature setup errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A node count along an axis is too small to form a cell.
    InvalidShape { axis: usize, count: usize },

    /// A block dimension is non-positive or not finite.
    InvalidDimension { axis: usize, value: f64 },

    /// A block centre coordinate is not finite.
    InvalidCentre { axis: usize, value: f64 },

    /// No Gauss–Legendre rule with this many points.
    UnsupportedQuadrature { points: usize },

    /// The reference-to-physical map is not orientation preserving.
    DegenerateCell { cell: usize, det: f64 },

    /// Cell index past the end of the mesh.
    CellOutOfBounds { cell: usize, n_cells: usize },

    /// Shared numeric error.
    Core(TlError),
}

impl std::fmt::Display for MeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshError::InvalidShape { axis, count } => {
                write!(
                    f,
                    "Block shape along axis {} has {} nodes (at least 2 required)",
                    axis, count
                )
            }
            MeshError::InvalidDimension { axis, value } => {
                write!(f, "Block dimension along axis {} is invalid: {}", axis, value)
            }
            MeshError::InvalidCentre { axis, value } => {
                write!(f, "Block centre along axis {} is not finite: {}", axis, value)
            }
            MeshError::UnsupportedQuadrature { points } => {
                write!(f, "No Gauss-Legendre rule with {} points per axis", points)
            }
            MeshError::DegenerateCell { cell, det } => {
                write!(f, "Cell {} has non-positive mapping determinant {}", cell, det)
            }
            MeshError::CellOutOfBounds { cell, n_cells } => {
                write!(f, "Cell {} out of bounds ({} cells)", cell, n_cells)
            }
            MeshError::Core(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for MeshError {}

impl From<TlError> for MeshError {
    fn from(err: TlError) -> Self {
        MeshError::Core(err)
    }
}
