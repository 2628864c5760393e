//! Error types for constitutive evaluations.

use thiserror::Error;
use tl_core::TlError;

/// Errors raised while evaluating kinematics or the material law.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaterialError {
    #[error("Element inversion: det F = {jacobian}")]
    ElementInversion { jacobian: f64 },

    #[error("Invalid material parameter: {what}")]
    InvalidParameter { what: &'static str },

    #[error("Numeric error: {0}")]
    Core(#[from] TlError),
}

pub type MaterialResult<T> = Result<T, MaterialError>;
