//! Finite-difference Jacobians for checking assembled tangents.

use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};

/// Central differences: column `j` is `(f(x + h e_j) - f(x - h e_j)) / 2h`.
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let m = f(x)?.len();
    let mut jac = DMatrix::zeros(m, x.len());

    for j in 0..x.len() {
        let h = epsilon * x[j].abs().max(1.0);

        let mut x_plus = x.clone();
        x_plus[j] += h;
        let mut x_minus = x.clone();
        x_minus[j] -= h;

        let column = (f(&x_plus)? - f(&x_minus)?) / (2.0 * h);
        jac.set_column(j, &column);
    }

    Ok(jac)
}
