//! Dense direct solvers for the linearized saddle-point system.

use nalgebra::{DMatrix, DVector};
use tl_core::timing::{Timer, solver_timing};

use crate::error::{SolverError, SolverResult};

/// Solves `A x = b` for a square, possibly indefinite matrix.
pub trait LinearSolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> SolverResult<DVector<f64>>;
}

/// LU with partial pivoting.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseLu;

/// LU with full pivoting. Slower, more robust on badly scaled systems.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullPivLu;

fn check_dims(a: &DMatrix<f64>, b: &DVector<f64>) -> SolverResult<()> {
    if !a.is_square() || a.nrows() != b.len() {
        return Err(SolverError::LinearSolve {
            what: format!(
                "dimension mismatch: matrix {}x{}, rhs {}",
                a.nrows(),
                a.ncols(),
                b.len()
            ),
        });
    }
    Ok(())
}

fn check_solution(x: DVector<f64>) -> SolverResult<DVector<f64>> {
    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(SolverError::LinearSolve {
            what: "non-finite solution".to_string(),
        })
    }
}

impl LinearSolver for DenseLu {
    fn name(&self) -> &'static str {
        "dense-lu"
    }

    fn solve(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> SolverResult<DVector<f64>> {
        check_dims(a, b)?;
        let timer = Timer::start();
        let x = a.clone().lu().solve(b).ok_or_else(|| SolverError::LinearSolve {
            what: "singular matrix".to_string(),
        });
        timer.stop_into(&solver_timing::LINEAR_SOLVE);
        check_solution(x?)
    }
}

impl LinearSolver for FullPivLu {
    fn name(&self) -> &'static str {
        "full-piv-lu"
    }

    fn solve(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> SolverResult<DVector<f64>> {
        check_dims(a, b)?;
        let timer = Timer::start();
        let x = a
            .clone()
            .full_piv_lu()
            .solve(b)
            .ok_or_else(|| SolverError::LinearSolve {
                what: "singular matrix".to_string(),
            });
        timer.stop_into(&solver_timing::LINEAR_SOLVE);
        check_solution(x?)
    }
}
