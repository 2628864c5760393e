//! Nonlinear solver for the mixed displacement/pressure problem.
//!
//! The unknowns are nodal displacements `u` and pressures `p` stacked into
//! one vector. Each Newton iteration assembles the coupled residual and the
//! full tangent over the block, eliminates the essential constraints and
//! solves the saddle-point system with a dense factorization.

pub mod assembly;
pub mod bc;
pub mod error;
pub mod jacobian;
pub mod linsolve;
pub mod newton;
pub mod problem;
pub mod solve;
pub mod terms;

pub use assembly::{TermMode, assemble_residual, assemble_tangent, evaluate_term};
pub use bc::{BcEnforcer, BcValue, EssentialBc, Prescribed};
pub use error::{DivergenceCause, SolverError, SolverResult};
pub use linsolve::{DenseLu, FullPivLu, LinearSolver};
pub use newton::{IterationRecord, NewtonConfig, NewtonReport, NewtonStatus, newton_solve};
pub use problem::{MixedProblem, PointState};
pub use solve::solve_step;
pub use terms::{Equation, Equations, Term, TestField};
