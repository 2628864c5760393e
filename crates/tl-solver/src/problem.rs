//! Mixed u/p problem definition over a block mesh.

use tl_material::{Kinematics, MaterialError, deformation_gradient};
use tl_mesh::{BlockMesh, DofLayout, LagrangeField, PointData, QuadratureRule, cell_point_data};

use crate::error::{SolverError, SolverResult};
use crate::terms::Equations;

/// Per-cell data fixed by the reference configuration.
#[derive(Debug, Clone)]
pub(crate) struct CellCache {
    /// Global displacement DOFs, node-major.
    pub u_dofs: Vec<usize>,
    /// Global pressure DOFs (offset by `n_u`).
    pub p_dofs: Vec<usize>,
    /// Displacement shape data at the quadrature points.
    pub points: Vec<PointData>,
    /// Pressure shape values at the quadrature points.
    pub p_values: Vec<Vec<f64>>,
}

/// Kinematic state and interpolated pressure at one quadrature point.
#[derive(Debug, Clone)]
pub struct PointState {
    pub kin: Kinematics,
    pub p: f64,
    pub dv: f64,
}

/// Displacement field of order `k` paired with a pressure field of order
/// `k - 1`, integrated with the rule exact for degree `2k`.
#[derive(Debug, Clone)]
pub struct MixedProblem {
    mesh: BlockMesh,
    u: LagrangeField,
    p: LagrangeField,
    layout: DofLayout,
    rule: QuadratureRule,
    equations: Equations,
    cells: Vec<CellCache>,
}

impl MixedProblem {
    pub fn new(mesh: BlockMesh, order: usize, equations: Equations) -> SolverResult<Self> {
        if order == 0 {
            return Err(SolverError::ProblemSetup {
                what: "displacement order must be at least 1".to_string(),
            });
        }
        let u = LagrangeField::new("u", &mesh, order, 3)?;
        let p = LagrangeField::new("p", &mesh, order - 1, 1)?;
        let layout = DofLayout::new(&u, &p);
        let rule = QuadratureRule::hex(2 * order)?;

        let mut cells = Vec::with_capacity(mesh.n_cells());
        for cell in 0..mesh.n_cells() {
            let points = cell_point_data(&mesh, cell, u.basis(), &rule)?;
            let p_values = rule.points.iter().map(|xi| p.basis().values(*xi)).collect();
            cells.push(CellCache {
                u_dofs: u.cell_dofs(cell),
                p_dofs: p
                    .cell_dofs(cell)
                    .into_iter()
                    .map(|d| layout.p_dof(d))
                    .collect(),
                points,
                p_values,
            });
        }

        Ok(Self {
            mesh,
            u,
            p,
            layout,
            rule,
            equations,
            cells,
        })
    }

    pub fn mesh(&self) -> &BlockMesh {
        &self.mesh
    }

    pub fn u_field(&self) -> &LagrangeField {
        &self.u
    }

    pub fn p_field(&self) -> &LagrangeField {
        &self.p
    }

    pub fn layout(&self) -> DofLayout {
        self.layout
    }

    pub fn rule(&self) -> &QuadratureRule {
        &self.rule
    }

    pub fn equations(&self) -> &Equations {
        &self.equations
    }

    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn n_dofs(&self) -> usize {
        self.layout.n_total()
    }

    pub(crate) fn cell(&self, cell: usize) -> &CellCache {
        &self.cells[cell]
    }

    /// Rejects a state vector that does not match the DOF layout.
    pub fn check_state_len(&self, len: usize) -> SolverResult<()> {
        if len != self.n_dofs() {
            return Err(SolverError::ProblemSetup {
                what: format!("state has {} entries, expected {}", len, self.n_dofs()),
            });
        }
        Ok(())
    }

    /// Kinematics and pressure at every quadrature point of a cell.
    ///
    /// Fails with [`SolverError::ElementInversion`] on `det F <= 0`.
    pub fn point_states(&self, cell: usize, x: &[f64]) -> SolverResult<Vec<PointState>> {
        self.check_state_len(x.len())?;
        let cache = self.cells.get(cell).ok_or_else(|| SolverError::ProblemSetup {
            what: format!("cell {} out of range ({} cells)", cell, self.cells.len()),
        })?;
        let u_local: Vec<f64> = cache.u_dofs.iter().map(|&d| x[d]).collect();
        let p_local: Vec<f64> = cache.p_dofs.iter().map(|&d| x[d]).collect();

        cache
            .points
            .iter()
            .zip(cache.p_values.iter())
            .map(|(point, n_p)| {
                let f = deformation_gradient(&point.grads, &u_local);
                let kin = Kinematics::from_deformation_gradient(f).map_err(|e| match e {
                    MaterialError::ElementInversion { jacobian } => {
                        SolverError::ElementInversion { cell, jacobian }
                    }
                    other => other.into(),
                })?;
                let p = n_p.iter().zip(p_local.iter()).map(|(n, v)| n * v).sum();
                Ok(PointState {
                    kin,
                    p,
                    dv: point.dv,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_mesh::BlockMeshBuilder;

    fn problem(order: usize) -> MixedProblem {
        let mesh = BlockMeshBuilder::new().shape([3, 3, 3]).build().unwrap();
        MixedProblem::new(mesh, order, Equations::mooney_rivlin_up(40.0, 20.0)).unwrap()
    }

    #[test]
    fn q1_p0_sizes() {
        let pb = problem(1);
        assert_eq!(pb.layout().n_u, 81);
        assert_eq!(pb.layout().n_p, 8);
        assert_eq!(pb.rule().len(), 8);
        assert_eq!(pb.cell(7).p_dofs, vec![81 + 7]);
    }

    #[test]
    fn q2_q1_sizes() {
        let pb = problem(2);
        assert_eq!(pb.layout().n_u, 3 * 125);
        assert_eq!(pb.layout().n_p, 27);
        assert_eq!(pb.rule().len(), 27);
    }

    #[test]
    fn zero_state_is_undeformed() {
        let pb = problem(1);
        let x = vec![0.0; pb.n_dofs()];
        for state in pb.point_states(3, &x).unwrap() {
            assert_eq!(state.kin.j, 1.0);
            assert_eq!(state.p, 0.0);
        }
    }

    #[test]
    fn inversion_carries_cell_index() {
        let pb = problem(1);
        let mut x = vec![0.0; pb.n_dofs()];
        // Collapse every node onto x = 0 and then beyond it
        for node in 0..pb.u_field().n_nodes() {
            let xc = pb.u_field().node_coords(node)[0];
            x[pb.u_field().dof(node, 0)] = -2.0 * xc;
        }
        let err = pb.point_states(0, &x).unwrap_err();
        assert!(matches!(err, SolverError::ElementInversion { cell: 0, .. }));
    }

    #[test]
    fn short_state_is_a_setup_error() {
        let pb = problem(1);
        let x = vec![0.0; pb.n_dofs() - 1];
        let err = pb.point_states(0, &x).unwrap_err();
        assert!(matches!(err, SolverError::ProblemSetup { .. }));
    }

    #[test]
    fn zero_order_is_rejected() {
        let mesh = BlockMeshBuilder::new().build().unwrap();
        let err = MixedProblem::new(mesh, 0, Equations::mooney_rivlin_up(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, SolverError::ProblemSetup { .. }));
    }
}
