//! One load step of the mixed problem.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use crate::assembly::{assemble_residual, assemble_tangent};
use crate::bc::BcEnforcer;
use crate::error::SolverResult;
use crate::linsolve::LinearSolver;
use crate::newton::{NewtonConfig, NewtonReport, newton_solve};
use crate::problem::MixedProblem;

/// Solves the problem at `time` starting from the converged state `x0`.
///
/// The initial guess comes from one linearized solve at `x0` that carries
/// the change of the prescribed values into the free DOFs. If that guess
/// inverts an element, the prescribed values are written into `x0` alone.
/// Either way every iterate satisfies the essential conditions and the
/// Newton increments vanish on constrained DOFs.
pub fn solve_step(
    problem: &MixedProblem,
    bcs: &BcEnforcer,
    x0: &DVector<f64>,
    time: f64,
    solver: &dyn LinearSolver,
    config: &NewtonConfig,
    parallel: bool,
) -> SolverResult<NewtonReport> {
    let x = match predict(problem, bcs, x0, time, solver, parallel) {
        Ok(Some(x)) => x,
        Ok(None) => {
            let mut x = x0.clone();
            bcs.apply_to_state(&mut x, time);
            x
        }
        Err(e) if e.as_divergence_cause().is_some() => {
            warn!(time, error = %e, "predictor failed, starting from the previous state");
            let mut x = x0.clone();
            bcs.apply_to_state(&mut x, time);
            x
        }
        Err(e) => return Err(e),
    };
    debug!(time, constrained = bcs.n_constrained(), "solving step");

    let residual_fn = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
        let mut r = assemble_residual(problem, x, parallel)?;
        bcs.zero_residual(&mut r);
        Ok(r)
    };
    let jacobian_fn = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
        let mut k = assemble_tangent(problem, x, parallel)?;
        bcs.eliminate(&mut k);
        Ok(k)
    };

    newton_solve(x, residual_fn, jacobian_fn, solver, config)
}

/// Tangent predictor with inhomogeneous elimination.
///
/// Solves `K(x0) dx = -R(x0) - K[:, c] delta` on the free DOFs with
/// `dx_c = delta`, where `delta` is the change of the prescribed values.
/// Returns `None` when nothing changes or the predicted state inverts an
/// element.
fn predict(
    problem: &MixedProblem,
    bcs: &BcEnforcer,
    x0: &DVector<f64>,
    time: f64,
    solver: &dyn LinearSolver,
    parallel: bool,
) -> SolverResult<Option<DVector<f64>>> {
    let delta = bcs.increment(x0, time);
    if delta.iter().all(|d| *d == 0.0) {
        return Ok(None);
    }

    let mut r = assemble_residual(problem, x0, parallel)?;
    let mut k = assemble_tangent(problem, x0, parallel)?;
    r += &k * &delta;
    bcs.zero_residual(&mut r);
    bcs.eliminate(&mut k);
    let rhs = &delta - r;
    let x = x0 + solver.solve(&k, &rhs)?;

    match assemble_residual(problem, &x, parallel) {
        Ok(_) => Ok(Some(x)),
        Err(e) if e.as_divergence_cause().is_some() => {
            warn!(time, error = %e, "predicted state is inadmissible");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
