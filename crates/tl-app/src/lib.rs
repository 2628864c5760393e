//! Application service layer for the stretched-block solver.
//!
//! Turns a [`RunConfig`] into a compiled problem, runs the load history,
//! and stores or reloads the results. The command line is a thin shell
//! over this crate.

pub mod compile;
pub mod config;
pub mod error;
pub mod progress;
pub mod run_service;

pub use compile::{CompiledProblem, compile};
pub use config::{
    LinearSolverKind, MaterialConfig, NewtonSettings, RunConfig, TimeConfig, parse_count_triple,
    parse_real_triple, parse_time_triple,
};
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage, StepProgress};
pub use run_service::{
    RUN_LABEL, RunOptions, RunOutcome, RunTimingSummary, SOLVER_VERSION, StoredRun, list_runs,
    load_run, run, run_with_progress,
};
