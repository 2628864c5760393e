//! Tensor-product Lagrange fields over a block mesh.

use crate::basis::HexBasis;
use crate::block::BlockMesh;
use crate::error::{MeshError, MeshResult};
use crate::region::BoxFace;

/// A scalar or vector Lagrange field of order `k` on the block.
///
/// For `k >= 1` the field is continuous and its nodes form a refined lattice
/// with `k * (n - 1) + 1` points per axis. For `k = 0` the field is
/// piecewise constant with one node per cell.
///
/// DOFs are numbered node-major: `node * n_components + component`.
#[derive(Debug, Clone)]
pub struct LagrangeField {
    name: String,
    order: usize,
    n_components: usize,
    lattice: [usize; 3],
    cell_shape: [usize; 3],
    min: [f64; 3],
    spacing: [f64; 3],
    basis: HexBasis,
}

impl LagrangeField {
    pub fn new(
        name: impl Into<String>,
        mesh: &BlockMesh,
        order: usize,
        n_components: usize,
    ) -> MeshResult<Self> {
        if n_components == 0 {
            return Err(MeshError::Core(tl_core::TlError::InvalidArg {
                what: "field must have at least one component",
            }));
        }
        let cell_shape = mesh.cell_shape();
        let (min, _) = mesh.bounding_box();
        let dims = mesh.dims();
        let mut lattice = [0; 3];
        let mut spacing = [0.0; 3];
        for axis in 0..3 {
            if order == 0 {
                lattice[axis] = cell_shape[axis];
                spacing[axis] = dims[axis] / cell_shape[axis] as f64;
            } else {
                lattice[axis] = order * cell_shape[axis] + 1;
                spacing[axis] = dims[axis] / (order * cell_shape[axis]) as f64;
            }
        }
        Ok(Self {
            name: name.into(),
            order,
            n_components,
            lattice,
            cell_shape,
            min,
            spacing,
            basis: HexBasis::new(order),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn n_components(&self) -> usize {
        self.n_components
    }

    pub fn is_continuous(&self) -> bool {
        self.order > 0
    }

    pub fn basis(&self) -> &HexBasis {
        &self.basis
    }

    pub fn n_nodes(&self) -> usize {
        self.lattice.iter().product()
    }

    pub fn n_dofs(&self) -> usize {
        self.n_nodes() * self.n_components
    }

    pub fn nodes_per_cell(&self) -> usize {
        self.basis.n_functions()
    }

    #[inline]
    pub fn dof(&self, node: usize, component: usize) -> usize {
        node * self.n_components + component
    }

    fn node_index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.lattice[0] * (j + self.lattice[1] * k)
    }

    /// Global node indices of a cell, in the local order of [`HexBasis`].
    pub fn cell_nodes(&self, cell: usize) -> Vec<usize> {
        let [cx, cy, _] = self.cell_shape;
        let (ci, cj, ck) = (cell % cx, (cell / cx) % cy, cell / (cx * cy));
        if self.order == 0 {
            return vec![cell];
        }
        let k = self.order;
        let mut nodes = Vec::with_capacity(self.nodes_per_cell());
        for c in 0..=k {
            for b in 0..=k {
                for a in 0..=k {
                    nodes.push(self.node_index(k * ci + a, k * cj + b, k * ck + c));
                }
            }
        }
        nodes
    }

    /// Global DOF indices of a cell, node-major within the cell.
    pub fn cell_dofs(&self, cell: usize) -> Vec<usize> {
        self.cell_nodes(cell)
            .into_iter()
            .flat_map(|node| (0..self.n_components).map(move |c| (node, c)))
            .map(|(node, c)| self.dof(node, c))
            .collect()
    }

    /// Reference coordinates of a node.
    pub fn node_coords(&self, node: usize) -> [f64; 3] {
        let i = node % self.lattice[0];
        let j = (node / self.lattice[0]) % self.lattice[1];
        let k = node / (self.lattice[0] * self.lattice[1]);
        let offset = if self.order == 0 { 0.5 } else { 0.0 };
        [
            self.min[0] + (i as f64 + offset) * self.spacing[0],
            self.min[1] + (j as f64 + offset) * self.spacing[1],
            self.min[2] + (k as f64 + offset) * self.spacing[2],
        ]
    }

    /// Nodes lying on a face of the block. Empty for piecewise constants.
    pub fn nodes_on(&self, face: BoxFace) -> Vec<usize> {
        if self.order == 0 {
            return Vec::new();
        }
        let axis = face.axis();
        let target = if face.is_max() {
            self.lattice[axis] - 1
        } else {
            0
        };
        (0..self.n_nodes())
            .filter(|&node| {
                let ijk = [
                    node % self.lattice[0],
                    (node / self.lattice[0]) % self.lattice[1],
                    node / (self.lattice[0] * self.lattice[1]),
                ];
                ijk[axis] == target
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockMeshBuilder;

    fn mesh() -> BlockMesh {
        BlockMeshBuilder::new().shape([3, 2, 2]).build().unwrap()
    }

    #[test]
    fn linear_field_matches_mesh_vertices() {
        let mesh = mesh();
        let u = LagrangeField::new("u", &mesh, 1, 3).unwrap();
        assert_eq!(u.n_nodes(), mesh.n_nodes());
        assert_eq!(u.n_dofs(), 3 * mesh.n_nodes());
        for cell in 0..mesh.n_cells() {
            assert_eq!(u.cell_nodes(cell), mesh.cells()[cell].to_vec());
        }
        for node in 0..u.n_nodes() {
            assert_eq!(u.node_coords(node), mesh.coords()[node]);
        }
    }

    #[test]
    fn quadratic_field_refines_lattice() {
        let mesh = mesh();
        let u = LagrangeField::new("u", &mesh, 2, 3).unwrap();
        assert_eq!(u.n_nodes(), 5 * 3 * 3);
        assert_eq!(u.nodes_per_cell(), 27);
        let nodes = u.cell_nodes(1);
        assert_eq!(u.node_coords(nodes[0]), [0.5, 0.0, 0.0]);
        assert_eq!(u.node_coords(nodes[26]), [1.0, 1.0, 1.0]);
        assert_eq!(u.node_coords(nodes[1]), [0.75, 0.0, 0.0]);
    }

    #[test]
    fn piecewise_constant_has_one_node_per_cell() {
        let mesh = mesh();
        let p = LagrangeField::new("p", &mesh, 0, 1).unwrap();
        assert!(!p.is_continuous());
        assert_eq!(p.n_nodes(), mesh.n_cells());
        assert_eq!(p.cell_nodes(1), vec![1]);
        assert_eq!(p.node_coords(1), [0.75, 0.5, 0.5]);
        assert!(p.nodes_on(BoxFace::Left).is_empty());
    }

    #[test]
    fn face_nodes_use_lattice_index() {
        let mesh = mesh();
        let u = LagrangeField::new("u", &mesh, 1, 3).unwrap();
        let right = u.nodes_on(BoxFace::Right);
        assert_eq!(right.len(), 4);
        for node in right {
            assert_eq!(u.node_coords(node)[0], 1.0);
        }
        assert_eq!(u.nodes_on(BoxFace::Bottom).len(), 6);
    }

    #[test]
    fn cell_dofs_are_node_major() {
        let mesh = mesh();
        let u = LagrangeField::new("u", &mesh, 1, 3).unwrap();
        let dofs = u.cell_dofs(0);
        assert_eq!(&dofs[..6], &[0, 1, 2, 3, 4, 5]);
        assert_eq!(dofs.len(), 24);
    }

    #[test]
    fn zero_components_is_rejected() {
        assert!(LagrangeField::new("x", &mesh(), 1, 0).is_err());
    }
}
