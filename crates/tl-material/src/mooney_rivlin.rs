//! Incompressible Mooney-Rivlin law in the mixed u/p form.
//!
//! `W = μ/2 (Ī1 - 3) + κ/2 (Ī2 - 3) - p (J - 1)` with `μ = 2 C10` and
//! `κ = 2 C01`. Stresses are second Piola-Kirchhoff in Voigt form, tangents
//! are `D = ∂S/∂E`.

use nalgebra::{Matrix6, Vector6};
use tl_core::units::Pressure;
use uom::si::pressure::pascal;

use crate::error::{MaterialError, MaterialResult};
use crate::kinematics::Kinematics;
use crate::voigt::{outer, sym_product, to_voigt};

/// Isochoric neo-Hookean stress `μ ∂Ī1/∂C`.
pub fn neo_hookean_stress(mu: f64, kin: &Kinematics) -> Vector6<f64> {
    kin.d_i1_bar() * mu
}

pub fn neo_hookean_tangent(mu: f64, kin: &Kinematics) -> Matrix6<f64> {
    kin.dd_i1_bar() * (2.0 * mu)
}

/// Isochoric second-invariant stress `κ ∂Ī2/∂C`.
pub fn mooney_rivlin_stress(kappa: f64, kin: &Kinematics) -> Vector6<f64> {
    kin.d_i2_bar() * kappa
}

pub fn mooney_rivlin_tangent(kappa: f64, kin: &Kinematics) -> Matrix6<f64> {
    kin.dd_i2_bar() * (2.0 * kappa)
}

/// Pressure stress `-p J C⁻¹`.
pub fn pressure_stress(p: f64, kin: &Kinematics) -> Vector6<f64> {
    to_voigt(&kin.c_inv) * (-p * kin.j)
}

/// `-p J (C⁻¹ ⊗ C⁻¹ - 2 𝕀_{C⁻¹})`
pub fn pressure_tangent(p: f64, kin: &Kinematics) -> Matrix6<f64> {
    let ci = &kin.c_inv;
    (outer(ci, ci) - sym_product(ci) * 2.0) * (-p * kin.j)
}

/// `∂S/∂p = -J C⁻¹`
pub fn pressure_sensitivity(kin: &Kinematics) -> Vector6<f64> {
    -kin.d_j()
}

/// Three additive contributions to the second Piola-Kirchhoff stress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressParts {
    pub s10: Vector6<f64>,
    pub s01: Vector6<f64>,
    pub pressure: Vector6<f64>,
}

impl StressParts {
    pub fn total(&self) -> Vector6<f64> {
        self.s10 + self.s01 + self.pressure
    }
}

/// Mooney-Rivlin parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MooneyRivlin {
    pub mu: f64,
    pub kappa: f64,
}

impl MooneyRivlin {
    pub fn new(mu: f64, kappa: f64) -> MaterialResult<Self> {
        tl_core::ensure_finite(mu, "mu")?;
        tl_core::ensure_finite(kappa, "kappa")?;
        if mu < 0.0 || kappa < 0.0 {
            return Err(MaterialError::InvalidParameter {
                what: "mu and kappa must be non-negative",
            });
        }
        if mu + kappa <= 0.0 {
            return Err(MaterialError::InvalidParameter {
                what: "mu + kappa must be positive",
            });
        }
        Ok(Self { mu, kappa })
    }

    /// From the classical coefficients `C10`, `C01`.
    pub fn from_coefficients(c10: Pressure, c01: Pressure) -> MaterialResult<Self> {
        Self::new(2.0 * c10.get::<pascal>(), 2.0 * c01.get::<pascal>())
    }

    pub fn c10(&self) -> f64 {
        0.5 * self.mu
    }

    pub fn c01(&self) -> f64 {
        0.5 * self.kappa
    }

    /// Isochoric strain energy density.
    pub fn strain_energy(&self, kin: &Kinematics) -> f64 {
        0.5 * self.mu * (kin.i1_bar() - 3.0) + 0.5 * self.kappa * (kin.i2_bar() - 3.0)
    }

    pub fn stress_parts(&self, kin: &Kinematics, p: f64) -> StressParts {
        StressParts {
            s10: neo_hookean_stress(self.mu, kin),
            s01: mooney_rivlin_stress(self.kappa, kin),
            pressure: pressure_stress(p, kin),
        }
    }

    pub fn stress(&self, kin: &Kinematics, p: f64) -> Vector6<f64> {
        self.stress_parts(kin, p).total()
    }

    pub fn tangent(&self, kin: &Kinematics, p: f64) -> Matrix6<f64> {
        neo_hookean_tangent(self.mu, kin)
            + mooney_rivlin_tangent(self.kappa, kin)
            + pressure_tangent(p, kin)
    }
}

/// True axial stress of an ideal incompressible bar at stretch `λ`:
/// `σ = 2 (C10 + C01/λ) (λ² - 1/λ)`.
pub fn uniaxial_true_stress(c10: f64, c01: f64, stretch: f64) -> f64 {
    2.0 * (c10 + c01 / stretch) * (stretch * stretch - 1.0 / stretch)
}
