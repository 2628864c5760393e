//! Error types for the tl-app service layer.

use std::path::PathBuf;

/// Application error shared by the command line and the library entry
/// points. Backend errors are flattened to their messages.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file: {path}")]
    ConfigFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Mesh error: {0}")]
    Mesh(String),

    #[error("Material error: {0}")]
    Material(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tl-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<tl_mesh::MeshError> for AppError {
    fn from(err: tl_mesh::MeshError) -> Self {
        AppError::Mesh(err.to_string())
    }
}

impl From<tl_material::MaterialError> for AppError {
    fn from(err: tl_material::MaterialError) -> Self {
        AppError::Material(err.to_string())
    }
}

impl From<tl_solver::SolverError> for AppError {
    fn from(err: tl_solver::SolverError) -> Self {
        AppError::Solver(err.to_string())
    }
}

impl From<tl_sim::SimError> for AppError {
    fn from(err: tl_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<tl_results::ResultsError> for AppError {
    fn from(err: tl_results::ResultsError) -> Self {
        match err {
            tl_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}
