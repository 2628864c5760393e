//! Reference-to-physical mapping of the trilinear block cells.

use nalgebra::{Matrix3, Vector3};

use crate::basis::HexBasis;
use crate::block::BlockMesh;
use crate::error::{MeshError, MeshResult};
use crate::quadrature::QuadratureRule;

/// Shape-function data at one quadrature point of a cell.
#[derive(Debug, Clone)]
pub struct PointData {
    /// Quadrature weight times the mapping determinant.
    pub dv: f64,
    /// Shape-function values.
    pub values: Vec<f64>,
    /// Shape-function gradients in the reference (undeformed) configuration.
    pub grads: Vec<Vector3<f64>>,
}

/// `dX/dξ` of the trilinear map through the eight cell vertices.
pub fn vertex_jacobian(vertices: &[[f64; 3]; 8], xi: [f64; 3]) -> Matrix3<f64> {
    let geometry = HexBasis::new(1);
    let mut jac = Matrix3::zeros();
    for (x, g) in vertices.iter().zip(geometry.reference_gradients(xi)) {
        jac += Vector3::new(x[0], x[1], x[2]) * g.transpose();
    }
    jac
}

/// Evaluates `basis` at every point of `rule` inside `cell`.
pub fn cell_point_data(
    mesh: &BlockMesh,
    cell: usize,
    basis: &HexBasis,
    rule: &QuadratureRule,
) -> MeshResult<Vec<PointData>> {
    let vertices = mesh.cell_vertex_coords(cell)?;
    let mut out = Vec::with_capacity(rule.len());
    for (xi, weight) in rule.iter() {
        let jac = vertex_jacobian(&vertices, *xi);
        let det = jac.determinant();
        if !(det > 0.0) {
            return Err(MeshError::DegenerateCell { cell, det });
        }
        let inv_t = jac
            .try_inverse()
            .ok_or(MeshError::DegenerateCell { cell, det })?
            .transpose();
        let grads = basis
            .reference_gradients(*xi)
            .into_iter()
            .map(|g| inv_t * g)
            .collect();
        out.push(PointData {
            dv: det * weight,
            values: basis.values(*xi),
            grads,
        });
    }
    Ok(out)
}
