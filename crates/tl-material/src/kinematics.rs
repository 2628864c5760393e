//! Total-Lagrangian kinematics at an integration point.

use nalgebra::{Matrix3, Matrix6, Vector3, Vector6};

use crate::error::{MaterialError, MaterialResult};
use crate::voigt::{outer, sym_product, to_voigt};

/// Deformation gradient `F = I + Σ_a u_a ⊗ ∇₀N_a`.
///
/// `u` holds the cell's nodal displacements node-major (`3 * a + i`),
/// `grads` the reference shape-function gradients at the point.
pub fn deformation_gradient(grads: &[Vector3<f64>], u: &[f64]) -> Matrix3<f64> {
    debug_assert_eq!(u.len(), 3 * grads.len());
    let mut f = Matrix3::identity();
    for (a, g) in grads.iter().enumerate() {
        let ua = Vector3::new(u[3 * a], u[3 * a + 1], u[3 * a + 2]);
        f += ua * g.transpose();
    }
    f
}

/// Strain measures and isochoric invariants derived from `F`.
#[derive(Debug, Clone)]
pub struct Kinematics {
    pub f: Matrix3<f64>,
    /// Right Cauchy-Green tensor `FᵀF`.
    pub c: Matrix3<f64>,
    pub c_inv: Matrix3<f64>,
    /// `det F`
    pub j: f64,
    /// `tr C`
    pub i1: f64,
    /// `½ (I1² - tr C²)`
    pub i2: f64,
}

impl Kinematics {
    /// Fails with [`MaterialError::ElementInversion`] when `det F <= 0`.
    pub fn from_deformation_gradient(f: Matrix3<f64>) -> MaterialResult<Self> {
        let j = f.determinant();
        if !(j > 0.0) || !j.is_finite() {
            return Err(MaterialError::ElementInversion { jacobian: j });
        }
        let c = f.transpose() * f;
        let c_inv = c
            .try_inverse()
            .ok_or(MaterialError::ElementInversion { jacobian: j })?;
        let i1 = c.trace();
        let i2 = 0.5 * (i1 * i1 - (c * c).trace());
        Ok(Self {
            f,
            c,
            c_inv,
            j,
            i1,
            i2,
        })
    }

    /// Green-Lagrange strain `E = ½ (C - I)`.
    pub fn green_lagrange(&self) -> Matrix3<f64> {
        0.5 * (self.c - Matrix3::identity())
    }

    /// `Ī1 = J^{-2/3} I1`
    pub fn i1_bar(&self) -> f64 {
        self.j.powf(-2.0 / 3.0) * self.i1
    }

    /// `Ī2 = J^{-4/3} I2`
    pub fn i2_bar(&self) -> f64 {
        self.j.powf(-4.0 / 3.0) * self.i2
    }

    /// `∂Ī1/∂C = J^{-2/3} (I - I1/3 C⁻¹)`
    pub fn d_i1_bar(&self) -> Vector6<f64> {
        let t = Matrix3::identity() - self.c_inv * (self.i1 / 3.0);
        to_voigt(&t) * self.j.powf(-2.0 / 3.0)
    }

    /// `∂Ī2/∂C = J^{-4/3} (I1 I - C - 2/3 I2 C⁻¹)`
    pub fn d_i2_bar(&self) -> Vector6<f64> {
        to_voigt(&self.i2_core()) * self.j.powf(-4.0 / 3.0)
    }

    fn i2_core(&self) -> Matrix3<f64> {
        Matrix3::identity() * self.i1 - self.c - self.c_inv * (2.0 / 3.0 * self.i2)
    }

    /// Second derivative `∂²Ī1/∂C∂C`.
    pub fn dd_i1_bar(&self) -> Matrix6<f64> {
        let id = Matrix3::identity();
        let ci = &self.c_inv;
        let d = -(outer(&id, ci) + outer(ci, &id)) / 3.0
            + outer(ci, ci) * (self.i1 / 9.0)
            + sym_product(ci) * (self.i1 / 3.0);
        d * self.j.powf(-2.0 / 3.0)
    }

    /// Second derivative `∂²Ī2/∂C∂C`.
    pub fn dd_i2_bar(&self) -> Matrix6<f64> {
        let id = Matrix3::identity();
        let ci = &self.c_inv;
        let a = id * self.i1 - self.c;
        let d = outer(&self.i2_core(), ci) * (-2.0 / 3.0) + outer(&id, &id)
            - sym_product(&id)
            - outer(ci, &a) * (2.0 / 3.0)
            + sym_product(ci) * (2.0 / 3.0 * self.i2);
        d * self.j.powf(-4.0 / 3.0)
    }

    /// `∂J/∂E = J C⁻¹`
    pub fn d_j(&self) -> Vector6<f64> {
        to_voigt(&self.c_inv) * self.j
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voigt::PAIRS;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn kin_from_c(c: Matrix3<f64>) -> Kinematics {
        let eig = c.symmetric_eigen();
        let sqrt = eig.eigenvalues.map(f64::sqrt);
        let u = eig.eigenvectors * Matrix3::from_diagonal(&sqrt) * eig.eigenvectors.transpose();
        Kinematics::from_deformation_gradient(u).unwrap()
    }

    fn perturbed(c: &Matrix3<f64>, slot: usize, h: f64) -> Matrix3<f64> {
        let (a, b) = PAIRS[slot];
        let mut out = *c;
        out[(a, b)] += h;
        if a != b {
            out[(b, a)] += h;
        }
        out
    }

    fn sample_f() -> Matrix3<f64> {
        Matrix3::new(1.3, 0.1, -0.05, 0.02, 0.9, 0.12, 0.04, -0.08, 1.1)
    }

    #[test]
    fn identity_has_unit_jacobian_and_invariants() {
        let kin = Kinematics::from_deformation_gradient(Matrix3::identity()).unwrap();
        assert_eq!(kin.j, 1.0);
        assert_relative_eq!(kin.i1_bar(), 3.0);
        assert_relative_eq!(kin.i2_bar(), 3.0);
        assert_relative_eq!(kin.green_lagrange(), Matrix3::zeros());
        assert_relative_eq!(kin.d_i1_bar(), Vector6::zeros(), epsilon = 1e-15);
        assert_relative_eq!(kin.d_i2_bar(), Vector6::zeros(), epsilon = 1e-15);
    }

    #[test]
    fn inversion_is_rejected() {
        let f = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, -0.5));
        let err = Kinematics::from_deformation_gradient(f).unwrap_err();
        assert_eq!(err, MaterialError::ElementInversion { jacobian: -0.5 });
        assert!(Kinematics::from_deformation_gradient(Matrix3::zeros()).is_err());
    }

    #[test]
    fn deformation_gradient_of_homogeneous_stretch() {
        // Two-node 1D-like check: u = 0.5 x gives F_00 = 1.5
        let grads = [Vector3::new(-1.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)];
        let u = [0.0, 0.0, 0.0, 0.5, 0.0, 0.0];
        let f = deformation_gradient(&grads, &u);
        assert_relative_eq!(f, Matrix3::from_diagonal(&Vector3::new(1.5, 1.0, 1.0)));
    }

    #[test]
    fn first_derivatives_match_finite_differences() {
        let kin = Kinematics::from_deformation_gradient(sample_f()).unwrap();
        let h = 1e-6;
        let d1 = kin.d_i1_bar();
        let d2 = kin.d_i2_bar();
        for slot in 0..6 {
            let plus = kin_from_c(perturbed(&kin.c, slot, h));
            let minus = kin_from_c(perturbed(&kin.c, slot, -h));
            let scale = if slot < 3 { 1.0 } else { 0.5 };
            let fd1 = (plus.i1_bar() - minus.i1_bar()) / (2.0 * h) * scale;
            let fd2 = (plus.i2_bar() - minus.i2_bar()) / (2.0 * h) * scale;
            assert_relative_eq!(d1[slot], fd1, epsilon = 1e-7);
            assert_relative_eq!(d2[slot], fd2, epsilon = 1e-7);
        }
    }

    #[test]
    fn second_derivatives_match_finite_differences() {
        let kin = Kinematics::from_deformation_gradient(sample_f()).unwrap();
        let h = 1e-6;
        let dd1 = kin.dd_i1_bar();
        let dd2 = kin.dd_i2_bar();
        for col in 0..6 {
            let plus = kin_from_c(perturbed(&kin.c, col, h));
            let minus = kin_from_c(perturbed(&kin.c, col, -h));
            let scale = if col < 3 { 1.0 } else { 0.5 };
            let fd1 = (plus.d_i1_bar() - minus.d_i1_bar()) / (2.0 * h) * scale;
            let fd2 = (plus.d_i2_bar() - minus.d_i2_bar()) / (2.0 * h) * scale;
            for row in 0..6 {
                assert_relative_eq!(dd1[(row, col)], fd1[row], epsilon = 1e-6);
                assert_relative_eq!(dd2[(row, col)], fd2[row], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn hessians_are_major_symmetric() {
        let kin = Kinematics::from_deformation_gradient(sample_f()).unwrap();
        assert_relative_eq!(kin.dd_i1_bar(), kin.dd_i1_bar().transpose(), epsilon = 1e-12);
        assert_relative_eq!(kin.dd_i2_bar(), kin.dd_i2_bar().transpose(), epsilon = 1e-12);
    }

    fn rotation(angle: f64, axis: Vector3<f64>) -> Matrix3<f64> {
        nalgebra::Rotation3::from_axis_angle(&nalgebra::Unit::new_normalize(axis), angle)
            .into_inner()
    }

    proptest! {
        #[test]
        fn invariants_are_objective(
            angle in -3.0_f64..3.0,
            ax in -1.0_f64..1.0,
            ay in -1.0_f64..1.0,
            stretch in 0.5_f64..2.0,
        ) {
            prop_assume!(ax.abs() + ay.abs() > 1e-3);
            let f = Matrix3::from_diagonal(&Vector3::new(stretch, 1.0, 1.0 / stretch)) + sample_f() * 0.1;
            let q = rotation(angle, Vector3::new(ax, ay, 0.5));
            let a = Kinematics::from_deformation_gradient(f).unwrap();
            let b = Kinematics::from_deformation_gradient(q * f).unwrap();
            prop_assert!((a.j - b.j).abs() < 1e-10);
            prop_assert!((a.i1_bar() - b.i1_bar()).abs() < 1e-10);
            prop_assert!((a.i2_bar() - b.i2_bar()).abs() < 1e-10);
        }

        #[test]
        fn isochoric_invariants_ignore_volume_change(scale in 0.5_f64..2.0) {
            let f = sample_f();
            let a = Kinematics::from_deformation_gradient(f).unwrap();
            let b = Kinematics::from_deformation_gradient(f * scale).unwrap();
            prop_assert!((a.i1_bar() - b.i1_bar()).abs() < 1e-10);
            prop_assert!((a.i2_bar() - b.i2_bar()).abs() < 1e-10);
        }
    }
}
