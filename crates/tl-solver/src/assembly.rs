//! Element residual and tangent assembly.
//!
//! Cells are evaluated independently, optionally on the rayon pool, and the
//! per-cell contributions are summed into the global storage sequentially
//! in cell order, so the serial and parallel paths give identical bits.

use nalgebra::{DMatrix, DVector, Matrix3, Matrix6xX, Vector3, Vector6};
use rayon::prelude::*;
use tl_core::timing::{Timer, solver_timing};
use tl_material::voigt::{from_voigt, to_voigt};

use crate::error::{SolverError, SolverResult};
use crate::problem::MixedProblem;
use crate::terms::{Term, TestField};

/// Local contribution of one cell: `[u dofs..., p dofs...]`.
struct ElementContribution {
    dofs: Vec<usize>,
    residual: DVector<f64>,
    tangent: Option<DMatrix<f64>>,
}

/// Nonlinear strain-displacement matrix: `δE = B δu` with engineering shear.
fn strain_displacement(f: &Matrix3<f64>, grads: &[Vector3<f64>]) -> Matrix6xX<f64> {
    let mut b = Matrix6xX::zeros(3 * grads.len());
    for (a, g) in grads.iter().enumerate() {
        for i in 0..3 {
            let col = 3 * a + i;
            b[(0, col)] = f[(i, 0)] * g[0];
            b[(1, col)] = f[(i, 1)] * g[1];
            b[(2, col)] = f[(i, 2)] * g[2];
            b[(3, col)] = f[(i, 0)] * g[1] + f[(i, 1)] * g[0];
            b[(4, col)] = f[(i, 1)] * g[2] + f[(i, 2)] * g[1];
            b[(5, col)] = f[(i, 0)] * g[2] + f[(i, 2)] * g[0];
        }
    }
    b
}

fn element(
    problem: &MixedProblem,
    cell: usize,
    x: &[f64],
    with_tangent: bool,
) -> SolverResult<ElementContribution> {
    let cache = problem.cell(cell);
    let states = problem.point_states(cell, x)?;
    let balance = problem.equations().balance();
    let volume = problem.equations().volume();

    let nu = cache.u_dofs.len();
    let np = cache.p_dofs.len();
    let mut residual = DVector::zeros(nu + np);
    let mut tangent = with_tangent.then(|| DMatrix::zeros(nu + np, nu + np));

    for ((state, point), n_p) in states.iter().zip(&cache.points).zip(&cache.p_values) {
        let kin = &state.kin;
        let dv = state.dv;
        let b = strain_displacement(&kin.f, &point.grads);
        let s = balance.stress(kin, state.p);
        let g = volume.volume_density(kin);

        let r_u = b.transpose() * s * dv;
        let mut r_block = residual.rows_mut(0, nu);
        r_block += &r_u;
        for (q, nq) in n_p.iter().enumerate() {
            residual[nu + q] += nq * g * dv;
        }

        let Some(k) = tangent.as_mut() else {
            continue;
        };

        // Material part
        let d = balance.tangent(kin, state.p);
        let k_mat = b.transpose() * d * &b * dv;
        let mut k_block = k.view_mut((0, 0), (nu, nu));
        k_block += &k_mat;

        // Geometric part
        let s_mat = from_voigt(&s);
        let n_nodes = point.grads.len();
        for a in 0..n_nodes {
            let sg = s_mat * point.grads[a];
            for c in 0..n_nodes {
                let value = sg.dot(&point.grads[c]) * dv;
                for i in 0..3 {
                    k[(3 * a + i, 3 * c + i)] += value;
                }
            }
        }

        // Coupling blocks
        let bt_dsdp = b.transpose() * balance.pressure_sensitivity(kin);
        let bt_dgde = b.transpose() * volume.volume_density_derivative(kin);
        for (q, nq) in n_p.iter().enumerate() {
            for row in 0..nu {
                k[(row, nu + q)] += bt_dsdp[row] * nq * dv;
                k[(nu + q, row)] += bt_dgde[row] * nq * dv;
            }
        }
    }

    let mut dofs = cache.u_dofs.clone();
    dofs.extend_from_slice(&cache.p_dofs);
    Ok(ElementContribution {
        dofs,
        residual,
        tangent,
    })
}

fn contributions(
    problem: &MixedProblem,
    x: &[f64],
    with_tangent: bool,
    parallel: bool,
) -> SolverResult<Vec<ElementContribution>> {
    let results: Vec<SolverResult<ElementContribution>> = if parallel {
        (0..problem.n_cells())
            .into_par_iter()
            .map(|cell| element(problem, cell, x, with_tangent))
            .collect()
    } else {
        (0..problem.n_cells())
            .map(|cell| element(problem, cell, x, with_tangent))
            .collect()
    };
    // First failure in cell order
    results.into_iter().collect()
}

/// Global residual `[R_u; R_p]` at state `x`.
pub fn assemble_residual(
    problem: &MixedProblem,
    x: &DVector<f64>,
    parallel: bool,
) -> SolverResult<DVector<f64>> {
    problem.check_state_len(x.len())?;
    let timer = Timer::start();
    let parts = contributions(problem, x.as_slice(), false, parallel);
    timer.stop_into(&solver_timing::RESIDUAL);

    let mut r = DVector::zeros(problem.n_dofs());
    for part in parts? {
        for (local, &global) in part.dofs.iter().enumerate() {
            r[global] += part.residual[local];
        }
    }
    Ok(r)
}

/// Global tangent `[[K_uu, K_up], [K_pu, 0]]` at state `x`.
pub fn assemble_tangent(
    problem: &MixedProblem,
    x: &DVector<f64>,
    parallel: bool,
) -> SolverResult<DMatrix<f64>> {
    problem.check_state_len(x.len())?;
    let timer = Timer::start();
    let parts = contributions(problem, x.as_slice(), true, parallel);
    timer.stop_into(&solver_timing::TANGENT);

    let n = problem.n_dofs();
    let mut k = DMatrix::zeros(n, n);
    for part in parts? {
        let Some(local) = part.tangent else {
            continue;
        };
        for (li, &gi) in part.dofs.iter().enumerate() {
            for (lj, &gj) in part.dofs.iter().enumerate() {
                k[(gi, gj)] += local[(li, lj)];
            }
        }
    }
    Ok(k)
}

/// Quantity evaluated by [`evaluate_term`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermMode {
    /// Second Piola-Kirchhoff stress of the term.
    Stress,
    /// Green-Lagrange strain (tensor components).
    Strain,
}

/// Cell averages of a term's stress or of the strain, in Voigt order.
pub fn evaluate_term(
    problem: &MixedProblem,
    term: &Term,
    mode: TermMode,
    x: &DVector<f64>,
) -> SolverResult<Vec<Vector6<f64>>> {
    problem.check_state_len(x.len())?;
    if mode == TermMode::Stress && term.test_field() != TestField::Displacement {
        return Err(SolverError::ProblemSetup {
            what: format!("term '{}' has no stress mode", term.name()),
        });
    }
    (0..problem.n_cells())
        .map(|cell| {
            let states = problem.point_states(cell, x.as_slice())?;
            let mut sum = Vector6::zeros();
            let mut volume = 0.0;
            for state in &states {
                let value = match mode {
                    TermMode::Stress => term.stress(&state.kin, state.p),
                    TermMode::Strain => to_voigt(&state.kin.green_lagrange()),
                };
                sum += value * state.dv;
                volume += state.dv;
            }
            Ok(sum / volume)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jacobian::central_difference_jacobian;
    use crate::terms::Equations;
    use tl_mesh::BlockMeshBuilder;

    fn problem(order: usize, shape: [usize; 3]) -> MixedProblem {
        let mesh = BlockMeshBuilder::new().shape(shape).build().unwrap();
        MixedProblem::new(mesh, order, Equations::mooney_rivlin_up(40.0, 20.0)).unwrap()
    }

    /// Smooth non-homogeneous state with a non-zero pressure.
    fn perturbed_state(pb: &MixedProblem) -> DVector<f64> {
        let mut x = DVector::zeros(pb.n_dofs());
        let u = pb.u_field();
        for node in 0..u.n_nodes() {
            let [px, py, pz] = u.node_coords(node);
            x[u.dof(node, 0)] = 0.3 * px + 0.05 * py * pz;
            x[u.dof(node, 1)] = -0.1 * py + 0.04 * px * px;
            x[u.dof(node, 2)] = -0.08 * pz + 0.03 * px * py;
        }
        let layout = pb.layout();
        for i in 0..layout.n_p {
            x[layout.p_dof(i)] = 5.0 + 0.5 * i as f64;
        }
        x
    }

    #[test]
    fn zero_state_has_zero_residual() {
        let pb = problem(1, [3, 3, 3]);
        let x = DVector::zeros(pb.n_dofs());
        let r = assemble_residual(&pb, &x, false).unwrap();
        assert!(r.norm() < 1e-14);
    }

    #[test]
    fn tangent_matches_central_differences() {
        for order in [1, 2] {
            let pb = problem(order, [2, 2, 3]);
            let x = perturbed_state(&pb);
            let k = assemble_tangent(&pb, &x, false).unwrap();
            let fd = central_difference_jacobian(
                &x,
                |y: &DVector<f64>| assemble_residual(&pb, y, false),
                1e-6,
            )
            .unwrap();
            let err = (&k - &fd).abs().max();
            assert!(err < 1e-5 * k.abs().max(), "order {}: max error {}", order, err);
        }
    }

    #[test]
    fn pressure_block_is_empty() {
        let pb = problem(1, [3, 3, 3]);
        let x = perturbed_state(&pb);
        let k = assemble_tangent(&pb, &x, true).unwrap();
        let n_u = pb.layout().n_u;
        let kpp = k.view((n_u, n_u), (pb.layout().n_p, pb.layout().n_p));
        assert_eq!(kpp.abs().max(), 0.0);
    }

    #[test]
    fn parallel_assembly_is_bit_identical() {
        let pb = problem(1, [4, 4, 4]);
        let x = perturbed_state(&pb);
        assert_eq!(
            assemble_residual(&pb, &x, false).unwrap(),
            assemble_residual(&pb, &x, true).unwrap()
        );
        assert_eq!(
            assemble_tangent(&pb, &x, false).unwrap(),
            assemble_tangent(&pb, &x, true).unwrap()
        );
    }

    #[test]
    fn strain_mode_recovers_homogeneous_stretch() {
        let pb = problem(1, [3, 3, 3]);
        let mut x = DVector::zeros(pb.n_dofs());
        let u = pb.u_field();
        for node in 0..u.n_nodes() {
            x[u.dof(node, 0)] = 0.5 * u.node_coords(node)[0];
        }
        let strains = evaluate_term(&pb, &Term::PressureCoupling, TermMode::Strain, &x).unwrap();
        for e in strains {
            // E_11 = (1.5^2 - 1) / 2
            assert!((e[0] - 0.625).abs() < 1e-13);
            assert!(e.rows(1, 5).norm() < 1e-13);
        }
        assert!(evaluate_term(&pb, &Term::VolumeIntegral, TermMode::Stress, &x).is_err());
    }

    #[test]
    fn wrong_state_length_is_rejected() {
        let pb = problem(1, [2, 2, 2]);
        let x = DVector::zeros(3);
        assert!(assemble_residual(&pb, &x, false).is_err());
    }
}
