//! Error types for solver operations.

use thiserror::Error;
use tl_material::MaterialError;
use tl_mesh::MeshError;

/// Why a Newton solve gave up.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DivergenceCause {
    #[error("maximum iterations reached")]
    MaxIterations,

    #[error("line search step {step:.3e} fell below the minimum")]
    LineSearch { step: f64 },

    #[error("element inversion in cell {cell} (det F = {jacobian})")]
    Inversion { cell: usize, jacobian: f64 },

    #[error("linear solve failed: {what}")]
    LinearSolve { what: String },

    #[error("non-finite residual")]
    NonFinite,
}

/// Errors that can occur while setting up or solving the mixed problem.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Element inversion in cell {cell}: det F = {jacobian}")]
    ElementInversion { cell: usize, jacobian: f64 },

    #[error(
        "Newton divergence after {iterations} iterations (residual {residual_norm:.3e}): {cause}"
    )]
    NewtonDivergence {
        iterations: usize,
        residual_norm: f64,
        cause: DivergenceCause,
    },

    #[error("Linear solve failed: {what}")]
    LinearSolve { what: String },

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Material error: {0}")]
    Material(#[from] MaterialError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    /// Divergence cause for an error raised inside a Newton iteration.
    pub(crate) fn as_divergence_cause(&self) -> Option<DivergenceCause> {
        match self {
            SolverError::ElementInversion { cell, jacobian } => Some(DivergenceCause::Inversion {
                cell: *cell,
                jacobian: *jacobian,
            }),
            SolverError::LinearSolve { what } => {
                Some(DivergenceCause::LinearSolve { what: what.clone() })
            }
            _ => None,
        }
    }
}
