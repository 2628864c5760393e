//! Full Newton iteration with backtracking line search.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use crate::error::{DivergenceCause, SolverError, SolverResult};
use crate::linsolve::LinearSolver;

/// Newton solver configuration.
#[derive(Debug, Clone)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance for residual norm
    pub abs_tol: f64,
    /// Relative tolerance for residual norm (against the initial residual)
    pub rel_tol: f64,
    /// Relative increment size treated as converged
    pub step_tol: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Smallest accepted step length
    pub line_search_min: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            abs_tol: 1e-10,
            rel_tol: 1e-10,
            step_tol: 1e-12,
            line_search_beta: 0.5,
            line_search_min: 1e-5,
        }
    }
}

/// Lifecycle of a single Newton solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewtonStatus {
    Init,
    Iterating,
    Converged,
    Diverged,
}

/// Residual norm and accepted step length of one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationRecord {
    pub iteration: usize,
    pub residual_norm: f64,
    pub step_length: f64,
}

/// Outcome of a converged Newton solve. A solve that ends in
/// [`NewtonStatus::Diverged`] returns [`SolverError::NewtonDivergence`]
/// instead.
#[derive(Debug, Clone)]
pub struct NewtonReport {
    pub x: DVector<f64>,
    pub status: NewtonStatus,
    pub iterations: usize,
    pub residual_norm: f64,
    pub initial_residual_norm: f64,
    pub history: Vec<IterationRecord>,
}

fn diverged(iterations: usize, residual_norm: f64, cause: DivergenceCause) -> SolverError {
    SolverError::NewtonDivergence {
        iterations,
        residual_norm,
        cause,
    }
}

/// Solves `residual_fn(x) = 0` starting from `x0`.
///
/// The tangent is recomputed at every iterate. A trial point whose residual
/// fails with an element inversion, is non-finite, or does not reduce the
/// residual norm is backtracked; the accepted iterate is always admissible.
pub fn newton_solve<F, J>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    solver: &dyn LinearSolver,
    config: &NewtonConfig,
) -> SolverResult<NewtonReport>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
    J: Fn(&DVector<f64>) -> SolverResult<DMatrix<f64>>,
{
    let mut status = NewtonStatus::Init;
    let mut x = x0;
    let mut r = match residual_fn(&x) {
        Ok(r) => r,
        Err(e) => match e.as_divergence_cause() {
            Some(cause) => return Err(diverged(0, f64::NAN, cause)),
            None => return Err(e),
        },
    };
    let mut r_norm = r.norm();
    if !r_norm.is_finite() {
        return Err(diverged(0, r_norm, DivergenceCause::NonFinite));
    }
    let r0_norm = r_norm;
    let mut history = Vec::new();
    debug!(?status, residual = r0_norm, "newton start");

    // An initial guess that already solves the system takes zero steps.
    status = if r0_norm < config.abs_tol {
        NewtonStatus::Converged
    } else {
        NewtonStatus::Iterating
    };

    let mut iterations = 0;
    while status == NewtonStatus::Iterating {
        if iterations == config.max_iterations {
            status = NewtonStatus::Diverged;
            break;
        }
        let iter = iterations + 1;

        let jac = jacobian_fn(&x).map_err(|e| match e.as_divergence_cause() {
            Some(cause) => diverged(iterations, r_norm, cause),
            None => e,
        })?;

        let dx = solver.solve(&jac, &(-&r)).map_err(|e| match e.as_divergence_cause() {
            Some(cause) => diverged(iterations, r_norm, cause),
            None => e,
        })?;

        // Line search
        let mut alpha = 1.0;
        let accepted = loop {
            let trial = &x + &dx * alpha;
            match residual_fn(&trial) {
                Ok(r_trial) => {
                    let n = r_trial.norm();
                    if n.is_finite() && n < r_norm {
                        break Some((trial, r_trial, n));
                    }
                    warn!(iteration = iter, alpha, residual = n, "line search backtracking");
                }
                Err(SolverError::ElementInversion { cell, jacobian }) => {
                    warn!(iteration = iter, alpha, cell, jacobian, "trial step inverts an element");
                }
                Err(e) => return Err(e),
            }
            alpha *= config.line_search_beta;
            if alpha < config.line_search_min {
                break None;
            }
        };
        iterations = iter;

        let Some((x_new, r_new, r_new_norm)) = accepted else {
            // At the round-off floor a vanishing increment means the
            // previous iterate is already the solution.
            if dx.norm() <= config.step_tol * x.norm().max(1.0) {
                status = NewtonStatus::Converged;
                debug!(?status, iteration = iter, residual = r_norm, "newton stalled at round-off");
                break;
            }
            status = NewtonStatus::Diverged;
            debug!(?status, iteration = iter, "line search failed");
            return Err(diverged(iter, r_norm, DivergenceCause::LineSearch { step: alpha }));
        };

        x = x_new;
        r = r_new;
        r_norm = r_new_norm;
        history.push(IterationRecord {
            iteration: iter,
            residual_norm: r_norm,
            step_length: alpha,
        });
        debug!(?status, iteration = iter, residual = r_norm, step = alpha, "newton iteration");

        let small_step = alpha * dx.norm() <= config.step_tol * x.norm().max(1.0);
        if r_norm < config.abs_tol || r_norm < config.rel_tol * r0_norm || small_step {
            status = NewtonStatus::Converged;
        }
    }

    match status {
        NewtonStatus::Converged => {
            debug!(?status, iterations, residual = r_norm, "newton converged");
            Ok(NewtonReport {
                x,
                status,
                iterations,
                residual_norm: r_norm,
                initial_residual_norm: r0_norm,
                history,
            })
        }
        _ => {
            debug!(?status, residual = r_norm, "newton hit the iteration cap");
            Err(diverged(iterations, r_norm, DivergenceCause::MaxIterations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linsolve::DenseLu;

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0, x > 0
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let x0 = DVector::from_element(1, 3.0);
        let report = newton_solve(x0, residual, jacobian, &DenseLu, &NewtonConfig::default())
            .unwrap();

        assert_eq!(report.status, NewtonStatus::Converged);
        assert!((report.x[0] - 2.0).abs() < 1e-10);
        assert!(report.iterations < 10);
        assert_eq!(report.history.len(), report.iterations);
    }

    #[test]
    fn solved_guess_takes_zero_steps() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> { Ok(x.clone()) };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::identity(x.len(), x.len()))
        };
        let report = newton_solve(
            DVector::zeros(3),
            residual,
            jacobian,
            &DenseLu,
            &NewtonConfig::default(),
        )
        .unwrap();
        assert_eq!(report.iterations, 0);
        assert!(report.history.is_empty());
    }

    #[test]
    fn inverted_trial_points_are_backtracked() {
        // ln(x) = 0 with x <= 0.5 reported as an inverted element
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            if x[0] <= 0.5 {
                return Err(SolverError::ElementInversion {
                    cell: 0,
                    jacobian: x[0],
                });
            }
            Ok(DVector::from_element(1, x[0].ln()))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 1.0 / x[0]))
        };
        // Newton on ln(x) from x = 4 jumps to 4 - 4 ln 4 < 0
        let report = newton_solve(
            DVector::from_element(1, 4.0),
            residual,
            jacobian,
            &DenseLu,
            &NewtonConfig::default(),
        )
        .unwrap();
        assert!((report.x[0] - 1.0).abs() < 1e-8);
        assert!(report.history[0].step_length < 1.0);
    }

    #[test]
    fn iteration_cap_diverges() {
        // Residual whose norm decreases but never below tolerance in 3 steps
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0].atan()))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 1.0 / (1.0 + x[0] * x[0])))
        };
        let config = NewtonConfig {
            max_iterations: 3,
            ..NewtonConfig::default()
        };
        let err =
            newton_solve(DVector::from_element(1, 1.3), residual, jacobian, &DenseLu, &config)
                .unwrap_err();
        assert!(matches!(
            err,
            SolverError::NewtonDivergence {
                iterations: 3,
                cause: DivergenceCause::MaxIterations,
                ..
            }
        ));
    }

    #[test]
    fn empty_iteration_budget_diverges_unless_already_solved() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> { Ok(x.clone()) };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::identity(x.len(), x.len()))
        };
        let config = NewtonConfig {
            max_iterations: 0,
            ..NewtonConfig::default()
        };
        let err = newton_solve(DVector::from_element(2, 1.0), residual, jacobian, &DenseLu, &config)
            .unwrap_err();
        assert!(matches!(
            err,
            SolverError::NewtonDivergence {
                iterations: 0,
                cause: DivergenceCause::MaxIterations,
                ..
            }
        ));
        let report = newton_solve(DVector::zeros(2), residual, jacobian, &DenseLu, &config).unwrap();
        assert_eq!(report.status, NewtonStatus::Converged);
    }

    #[test]
    fn inverted_initial_guess_diverges_immediately() {
        let residual = |_: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Err(SolverError::ElementInversion {
                cell: 2,
                jacobian: -1.0,
            })
        };
        let jacobian = |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> { Ok(DMatrix::zeros(1, 1)) };
        let err = newton_solve(
            DVector::zeros(1),
            residual,
            jacobian,
            &DenseLu,
            &NewtonConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SolverError::NewtonDivergence {
                iterations: 0,
                cause: DivergenceCause::Inversion { cell: 2, .. },
                ..
            }
        ));
    }

    #[test]
    fn singular_tangent_is_a_divergence_cause() {
        let residual = |_: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, 1.0))
        };
        let jacobian = |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> { Ok(DMatrix::zeros(1, 1)) };
        let err = newton_solve(
            DVector::zeros(1),
            residual,
            jacobian,
            &DenseLu,
            &NewtonConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SolverError::NewtonDivergence {
                cause: DivergenceCause::LinearSolve { .. },
                ..
            }
        ));
    }
}
