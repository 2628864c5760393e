//! tl-sim: quasi-static load stepping for the mixed u/p problem.
//!
//! A [`TimeStepper`] produces the load instants, [`run_sim`] solves one
//! equilibrium problem per instant (warm-started from the previous
//! converged state) and hands every converged state to a [`StepHook`].
//! [`Recorder`] is the hook that recovers stresses and fills a
//! [`Diagnostics`] accumulator owned by the caller.

pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod postprocess;
pub mod stepper;

pub use diagnostics::{ComparisonRow, DiagnosticRecord, Diagnostics};
pub use driver::{RunSummary, SimOptions, StepContext, StepHook, run_sim};
pub use error::{SimError, SimResult};
pub use postprocess::{CellFields, PostProcessor, Recorder};
pub use stepper::TimeStepper;
