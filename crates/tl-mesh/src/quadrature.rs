//! Gauss-Legendre quadrature on the reference hexahedron `[-1, 1]^3`.

use crate::error::{MeshError, MeshResult};

/// Points and weights of the `n`-point Gauss-Legendre rule on `[-1, 1]`.
///
/// Exact for polynomials up to degree `2n - 1`. Supports 1 to 6 points.
pub fn gauss_legendre(n: usize) -> MeshResult<(Vec<f64>, Vec<f64>)> {
    let (points, weights): (&[f64], &[f64]) = match n {
        1 => (&[0.0], &[2.0]),
        2 => (
            &[-0.577_350_269_189_625_8, 0.577_350_269_189_625_8],
            &[1.0, 1.0],
        ),
        3 => (
            &[-0.774_596_669_241_483_4, 0.0, 0.774_596_669_241_483_4],
            &[
                0.555_555_555_555_555_6,
                0.888_888_888_888_888_9,
                0.555_555_555_555_555_6,
            ],
        ),
        4 => (
            &[
                -0.861_136_311_594_052_6,
                -0.339_981_043_584_856_3,
                0.339_981_043_584_856_3,
                0.861_136_311_594_052_6,
            ],
            &[
                0.347_854_845_137_453_9,
                0.652_145_154_862_546_1,
                0.652_145_154_862_546_1,
                0.347_854_845_137_453_9,
            ],
        ),
        5 => (
            &[
                -0.906_179_845_938_664,
                -0.538_469_310_105_683_1,
                0.0,
                0.538_469_310_105_683_1,
                0.906_179_845_938_664,
            ],
            &[
                0.236_926_885_056_189_1,
                0.478_628_670_499_366_5,
                0.568_888_888_888_888_9,
                0.478_628_670_499_366_5,
                0.236_926_885_056_189_1,
            ],
        ),
        6 => (
            &[
                -0.932_469_514_203_152,
                -0.661_209_386_466_264_5,
                -0.238_619_186_083_196_9,
                0.238_619_186_083_196_9,
                0.661_209_386_466_264_5,
                0.932_469_514_203_152,
            ],
            &[
                0.171_324_492_379_170_3,
                0.360_761_573_048_138_6,
                0.467_913_934_572_691,
                0.467_913_934_572_691,
                0.360_761_573_048_138_6,
                0.171_324_492_379_170_3,
            ],
        ),
        _ => return Err(MeshError::UnsupportedQuadrature { points: n }),
    };
    Ok((points.to_vec(), weights.to_vec()))
}

/// Tensor-product quadrature rule on the reference hexahedron.
#[derive(Debug, Clone)]
pub struct QuadratureRule {
    pub points: Vec<[f64; 3]>,
    pub weights: Vec<f64>,
}

impl QuadratureRule {
    /// Tensor rule with `n` points per axis.
    pub fn tensor(n: usize) -> MeshResult<Self> {
        let (p, w) = gauss_legendre(n)?;
        let mut points = Vec::with_capacity(n * n * n);
        let mut weights = Vec::with_capacity(n * n * n);
        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    points.push([p[i], p[j], p[k]]);
                    weights.push(w[i] * w[j] * w[k]);
                }
            }
        }
        Ok(Self { points, weights })
    }

    /// Rule integrating polynomials of degree `order` per axis exactly.
    pub fn hex(order: usize) -> MeshResult<Self> {
        Self::tensor(order / 2 + 1)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[f64; 3], f64)> {
        self.points.iter().zip(self.weights.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn weights_sum_to_interval_length() {
        for n in 1..=6 {
            let (_, w) = gauss_legendre(n).unwrap();
            assert_relative_eq!(w.iter().sum::<f64>(), 2.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn integrates_monomials_exactly() {
        for n in 1..=6 {
            let (p, w) = gauss_legendre(n).unwrap();
            for degree in 0..2 * n {
                let approx: f64 = p
                    .iter()
                    .zip(w.iter())
                    .map(|(x, wi)| wi * x.powi(degree as i32))
                    .sum();
                let exact = if degree % 2 == 1 {
                    0.0
                } else {
                    2.0 / (degree as f64 + 1.0)
                };
                assert_relative_eq!(approx, exact, epsilon = 1e-13);
            }
        }
    }

    #[test]
    fn hex_rule_sizes() {
        assert_eq!(QuadratureRule::hex(0).unwrap().len(), 1);
        assert_eq!(QuadratureRule::hex(1).unwrap().len(), 1);
        assert_eq!(QuadratureRule::hex(2).unwrap().len(), 8);
        assert_eq!(QuadratureRule::hex(4).unwrap().len(), 27);
        let rule = QuadratureRule::hex(2).unwrap();
        assert_relative_eq!(rule.weights.iter().sum::<f64>(), 8.0, epsilon = 1e-14);
    }

    #[test]
    fn too_many_points_is_rejected() {
        assert_eq!(
            gauss_legendre(7).unwrap_err(),
            MeshError::UnsupportedQuadrature { points: 7 }
        );
    }
}
