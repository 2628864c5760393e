//! Tensor-product Lagrange shape functions on the reference hexahedron.

use nalgebra::Vector3;

/// 1D Lagrange polynomials on equispaced nodes of `[-1, 1]`.
///
/// Order 0 is the constant function on the single node `0`.
#[derive(Debug, Clone)]
pub struct LagrangeBasis1d {
    nodes: Vec<f64>,
}

impl LagrangeBasis1d {
    pub fn new(order: usize) -> Self {
        let nodes = if order == 0 {
            vec![0.0]
        } else {
            (0..=order)
                .map(|a| -1.0 + 2.0 * a as f64 / order as f64)
                .collect()
        };
        Self { nodes }
    }

    pub fn order(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Values of all polynomials at `xi`.
    pub fn values(&self, xi: f64) -> Vec<f64> {
        let n = self.nodes.len();
        (0..n)
            .map(|a| {
                let mut v = 1.0;
                for m in 0..n {
                    if m != a {
                        v *= (xi - self.nodes[m]) / (self.nodes[a] - self.nodes[m]);
                    }
                }
                v
            })
            .collect()
    }

    /// First derivatives of all polynomials at `xi`.
    pub fn derivatives(&self, xi: f64) -> Vec<f64> {
        let n = self.nodes.len();
        (0..n)
            .map(|a| {
                let mut sum = 0.0;
                for m in 0..n {
                    if m == a {
                        continue;
                    }
                    let mut term = 1.0 / (self.nodes[a] - self.nodes[m]);
                    for l in 0..n {
                        if l != a && l != m {
                            term *= (xi - self.nodes[l]) / (self.nodes[a] - self.nodes[l]);
                        }
                    }
                    sum += term;
                }
                sum
            })
            .collect()
    }
}

/// Shape functions of the `(k+1)^3`-node Lagrange hexahedron.
///
/// Local function `a + (k+1) * (b + (k+1) * c)` is the product of the 1D
/// polynomials `a`, `b` and `c` along `ξ`, `η` and `ζ`.
#[derive(Debug, Clone)]
pub struct HexBasis {
    line: LagrangeBasis1d,
}

impl HexBasis {
    pub fn new(order: usize) -> Self {
        Self {
            line: LagrangeBasis1d::new(order),
        }
    }

    pub fn order(&self) -> usize {
        self.line.order()
    }

    pub fn n_functions(&self) -> usize {
        let n1 = self.line.nodes().len();
        n1 * n1 * n1
    }

    /// Reference coordinates of the local nodes.
    pub fn local_nodes(&self) -> Vec<[f64; 3]> {
        let nodes = self.line.nodes();
        let mut out = Vec::with_capacity(self.n_functions());
        for &z in nodes {
            for &y in nodes {
                for &x in nodes {
                    out.push([x, y, z]);
                }
            }
        }
        out
    }

    /// Values at a reference point.
    pub fn values(&self, xi: [f64; 3]) -> Vec<f64> {
        let (vx, vy, vz) = (
            self.line.values(xi[0]),
            self.line.values(xi[1]),
            self.line.values(xi[2]),
        );
        let mut out = Vec::with_capacity(self.n_functions());
        for z in &vz {
            for y in &vy {
                for x in &vx {
                    out.push(x * y * z);
                }
            }
        }
        out
    }

    /// Gradients with respect to the reference coordinates.
    pub fn reference_gradients(&self, xi: [f64; 3]) -> Vec<Vector3<f64>> {
        let (vx, vy, vz) = (
            self.line.values(xi[0]),
            self.line.values(xi[1]),
            self.line.values(xi[2]),
        );
        let (dx, dy, dz) = (
            self.line.derivatives(xi[0]),
            self.line.derivatives(xi[1]),
            self.line.derivatives(xi[2]),
        );
        let n1 = vx.len();
        let mut out = Vec::with_capacity(self.n_functions());
        for c in 0..n1 {
            for b in 0..n1 {
                for a in 0..n1 {
                    out.push(Vector3::new(
                        dx[a] * vy[b] * vz[c],
                        vx[a] * dy[b] * vz[c],
                        vx[a] * vy[b] * dz[c],
                    ));
                }
            }
        }
        out
    }
}
