//! Structured hexahedral block mesh.

use crate::error::{MeshError, MeshResult};
use crate::validate;

/// Axis-aligned block discretized into a lattice of 8-node hexahedra.
///
/// Vertices are numbered lexicographically, `x` fastest:
/// `i + nx * (j + ny * k)`. Cells follow the same rule over the cell
/// lattice. The local vertex `a + 2b + 4c` of a cell sits at offset
/// `(a, b, c)` from its minimum corner.
#[derive(Debug, Clone)]
pub struct BlockMesh {
    dims: [f64; 3],
    shape: [usize; 3],
    centre: [f64; 3],
    coords: Vec<[f64; 3]>,
    cells: Vec<[usize; 8]>,
}

/// Builder for a block mesh.
///
/// Defaults to a unit cube with 4 nodes per axis centred at (0.5, 0.5, 0.5).
#[derive(Debug, Clone)]
pub struct BlockMeshBuilder {
    dims: [f64; 3],
    shape: [usize; 3],
    centre: Option<[f64; 3]>,
}

impl Default for BlockMeshBuilder {
    fn default() -> Self {
        Self {
            dims: [1.0; 3],
            shape: [4; 3],
            centre: None,
        }
    }
}

impl BlockMeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edge lengths of the block.
    pub fn dims(mut self, dims: [f64; 3]) -> Self {
        self.dims = dims;
        self
    }

    /// Node counts per axis.
    pub fn shape(mut self, shape: [usize; 3]) -> Self {
        self.shape = shape;
        self
    }

    /// Block centre. When unset the block spans `[0, dims]`.
    pub fn centre(mut self, centre: [f64; 3]) -> Self {
        self.centre = Some(centre);
        self
    }

    pub fn build(self) -> MeshResult<BlockMesh> {
        let centre = self
            .centre
            .unwrap_or([0.5 * self.dims[0], 0.5 * self.dims[1], 0.5 * self.dims[2]]);
        BlockMesh::new(self.dims, self.shape, centre)
    }
}

impl BlockMesh {
    /// Generate the block spanning `centre ± dims/2` with `shape` nodes per axis.
    pub fn new(dims: [f64; 3], shape: [usize; 3], centre: [f64; 3]) -> MeshResult<Self> {
        validate::validate_block(&dims, &shape, &centre)?;

        let [nx, ny, nz] = shape;
        let min = [
            centre[0] - 0.5 * dims[0],
            centre[1] - 0.5 * dims[1],
            centre[2] - 0.5 * dims[2],
        ];
        let spacing = [
            dims[0] / (nx - 1) as f64,
            dims[1] / (ny - 1) as f64,
            dims[2] / (nz - 1) as f64,
        ];

        let mut coords = Vec::with_capacity(nx * ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    coords.push([
                        min[0] + i as f64 * spacing[0],
                        min[1] + j as f64 * spacing[1],
                        min[2] + k as f64 * spacing[2],
                    ]);
                }
            }
        }

        let vertex = |i: usize, j: usize, k: usize| i + nx * (j + ny * k);
        let mut cells = Vec::with_capacity((nx - 1) * (ny - 1) * (nz - 1));
        for k in 0..nz - 1 {
            for j in 0..ny - 1 {
                for i in 0..nx - 1 {
                    let mut cell = [0; 8];
                    for (local, slot) in cell.iter_mut().enumerate() {
                        let (a, b, c) = (local & 1, (local >> 1) & 1, (local >> 2) & 1);
                        *slot = vertex(i + a, j + b, k + c);
                    }
                    cells.push(cell);
                }
            }
        }

        Ok(Self {
            dims,
            shape,
            centre,
            coords,
            cells,
        })
    }

    pub fn dims(&self) -> [f64; 3] {
        self.dims
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn centre(&self) -> [f64; 3] {
        self.centre
    }

    /// Number of cells along each axis.
    pub fn cell_shape(&self) -> [usize; 3] {
        [self.shape[0] - 1, self.shape[1] - 1, self.shape[2] - 1]
    }

    pub fn n_nodes(&self) -> usize {
        self.coords.len()
    }

    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn coords(&self) -> &[[f64; 3]] {
        &self.coords
    }

    pub fn cells(&self) -> &[[usize; 8]] {
        &self.cells
    }

    /// Lattice position `(i, j, k)` of a cell.
    pub fn cell_ijk(&self, cell: usize) -> [usize; 3] {
        let [cx, cy, _] = self.cell_shape();
        [cell % cx, (cell / cx) % cy, cell / (cx * cy)]
    }

    /// Vertex coordinates of a cell in local vertex order.
    pub fn cell_vertex_coords(&self, cell: usize) -> MeshResult<[[f64; 3]; 8]> {
        let vertices = self.cells.get(cell).ok_or(MeshError::CellOutOfBounds {
            cell,
            n_cells: self.cells.len(),
        })?;
        let mut out = [[0.0; 3]; 8];
        for (slot, &v) in out.iter_mut().zip(vertices.iter()) {
            *slot = self.coords[v];
        }
        Ok(out)
    }

    /// Minimum and maximum corners.
    pub fn bounding_box(&self) -> ([f64; 3], [f64; 3]) {
        let mut lo = [0.0; 3];
        let mut hi = [0.0; 3];
        for axis in 0..3 {
            lo[axis] = self.centre[axis] - 0.5 * self.dims[axis];
            hi[axis] = self.centre[axis] + 0.5 * self.dims[axis];
        }
        (lo, hi)
    }

    /// Total reference volume.
    pub fn volume(&self) -> f64 {
        self.dims.iter().product()
    }
}
