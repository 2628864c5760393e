//! Voigt notation for symmetric tensors.
//!
//! Index order is `[11, 22, 33, 12, 23, 13]`. Stresses use tensor
//! components, strains use engineering shear (`2 E_12`), so that
//! `S = D * E` holds with `D[I][J] = D_ijkl`.

use nalgebra::{Matrix3, Matrix6, Vector6};

/// Tensor index pairs of the six Voigt slots.
pub const PAIRS: [(usize, usize); 6] = [(0, 0), (1, 1), (2, 2), (0, 1), (1, 2), (0, 2)];

/// Symmetric tensor to Voigt vector (tensor components).
pub fn to_voigt(t: &Matrix3<f64>) -> Vector6<f64> {
    Vector6::from_fn(|i, _| {
        let (a, b) = PAIRS[i];
        t[(a, b)]
    })
}

/// Voigt vector (tensor components) back to a symmetric tensor.
pub fn from_voigt(v: &Vector6<f64>) -> Matrix3<f64> {
    let mut t = Matrix3::zeros();
    for (i, &(a, b)) in PAIRS.iter().enumerate() {
        t[(a, b)] = v[i];
        t[(b, a)] = v[i];
    }
    t
}

/// Dyadic product `A ⊗ B` of two symmetric tensors.
pub fn outer(a: &Matrix3<f64>, b: &Matrix3<f64>) -> Matrix6<f64> {
    to_voigt(a) * to_voigt(b).transpose()
}

/// `𝕀_A` with components `½ (A_ik A_jl + A_il A_jk)`.
///
/// `-𝕀_{C⁻¹}` is the derivative of `C⁻¹` with respect to `C`.
pub fn sym_product(a: &Matrix3<f64>) -> Matrix6<f64> {
    Matrix6::from_fn(|r, c| {
        let (i, j) = PAIRS[r];
        let (k, l) = PAIRS[c];
        0.5 * (a[(i, k)] * a[(j, l)] + a[(i, l)] * a[(j, k)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> Matrix3<f64> {
        Matrix3::new(2.0, 0.3, -0.1, 0.3, 1.5, 0.2, -0.1, 0.2, 0.9)
    }

    #[test]
    fn voigt_round_trip() {
        let t = sample();
        assert_relative_eq!(from_voigt(&to_voigt(&t)), t);
    }

    #[test]
    fn sym_product_of_identity_halves_shear_slots() {
        let d = sym_product(&Matrix3::identity());
        let expected = Matrix6::from_diagonal(&Vector6::new(1.0, 1.0, 1.0, 0.5, 0.5, 0.5));
        assert_relative_eq!(d, expected, epsilon = 1e-15);
    }

    #[test]
    fn outer_product_contracts_like_a_dyad() {
        let a = sample();
        let b = Matrix3::new(0.1, 0.05, 0.0, 0.05, -0.2, 0.03, 0.0, 0.03, 0.4);
        let d = outer(&a, &b);
        assert_relative_eq!(d * to_voigt(&Matrix3::identity()), to_voigt(&a) * b.trace(), epsilon = 1e-14);
    }

    #[test]
    fn sym_product_is_major_symmetric() {
        let d = sym_product(&sample());
        assert_relative_eq!(d, d.transpose(), epsilon = 1e-14);
    }
}
