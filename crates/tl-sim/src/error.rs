//! Error types for load stepping.

use thiserror::Error;
use tl_solver::SolverError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Step {step} (t = {time}) failed: {source}")]
    StepFailed {
        step: usize,
        time: f64,
        #[source]
        source: SolverError,
    },

    #[error("Post-processing failed: {what}")]
    PostProcess { what: String },

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// Index of the step that failed, if the error came from a step.
    pub fn failed_step(&self) -> Option<usize> {
        match self {
            SimError::StepFailed { step, .. } => Some(*step),
            _ => None,
        }
    }
}
