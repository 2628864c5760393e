//! Typed weak-form terms and the equations they compose.
//!
//! The balance equation is tested with the virtual displacement `v`, the
//! volume equation with the virtual pressure `q`. Terms are combined with
//! `+` and `-`:
//!
//! ```
//! use tl_solver::{Equation, Term};
//!
//! let balance: Equation = Term::NeoHookeanBalance { mu: 40.0 }
//!     + Term::MooneyRivlinBalance { kappa: 20.0 }
//!     + Term::PressureCoupling;
//! let volume: Equation = Term::VolumeConstraint - Term::VolumeIntegral;
//! assert_eq!(balance.terms().len(), 3);
//! assert_eq!(volume.terms()[1].0, -1.0);
//! ```

use std::fmt;
use std::ops::{Add, Neg, Sub};

use nalgebra::{Matrix6, Vector6};
use tl_material::Kinematics;
use tl_material::mooney_rivlin::{
    mooney_rivlin_stress, mooney_rivlin_tangent, neo_hookean_stress, neo_hookean_tangent,
    pressure_sensitivity, pressure_stress, pressure_tangent,
};

use crate::error::{SolverError, SolverResult};

/// Test function a term is paired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestField {
    Displacement,
    Pressure,
}

/// One integrand of the mixed total-Lagrangian formulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Term {
    /// `∫ S_10 : δE dV` with `S_10 = μ ∂Ī1/∂C`.
    NeoHookeanBalance { mu: f64 },
    /// `∫ S_01 : δE dV` with `S_01 = κ ∂Ī2/∂C`.
    MooneyRivlinBalance { kappa: f64 },
    /// `∫ -p J C⁻¹ : δE dV`
    PressureCoupling,
    /// `∫ q J dV`
    VolumeConstraint,
    /// `∫ q dV`
    VolumeIntegral,
}

impl Term {
    pub fn name(&self) -> &'static str {
        match self {
            Term::NeoHookeanBalance { .. } => "neo_hookean_balance",
            Term::MooneyRivlinBalance { .. } => "mooney_rivlin_balance",
            Term::PressureCoupling => "pressure_coupling",
            Term::VolumeConstraint => "volume_constraint",
            Term::VolumeIntegral => "volume_integral",
        }
    }

    pub fn test_field(&self) -> TestField {
        match self {
            Term::NeoHookeanBalance { .. }
            | Term::MooneyRivlinBalance { .. }
            | Term::PressureCoupling => TestField::Displacement,
            Term::VolumeConstraint | Term::VolumeIntegral => TestField::Pressure,
        }
    }

    /// Second Piola-Kirchhoff stress contributed at a point.
    ///
    /// Zero for terms tested with `q`.
    pub fn stress(&self, kin: &Kinematics, p: f64) -> Vector6<f64> {
        match *self {
            Term::NeoHookeanBalance { mu } => neo_hookean_stress(mu, kin),
            Term::MooneyRivlinBalance { kappa } => mooney_rivlin_stress(kappa, kin),
            Term::PressureCoupling => pressure_stress(p, kin),
            Term::VolumeConstraint | Term::VolumeIntegral => Vector6::zeros(),
        }
    }

    /// Material tangent `∂S/∂E` at a point.
    pub fn tangent(&self, kin: &Kinematics, p: f64) -> Matrix6<f64> {
        match *self {
            Term::NeoHookeanBalance { mu } => neo_hookean_tangent(mu, kin),
            Term::MooneyRivlinBalance { kappa } => mooney_rivlin_tangent(kappa, kin),
            Term::PressureCoupling => pressure_tangent(p, kin),
            Term::VolumeConstraint | Term::VolumeIntegral => Matrix6::zeros(),
        }
    }

    /// `∂S/∂p`, non-zero only for the pressure coupling.
    pub fn pressure_sensitivity(&self, kin: &Kinematics) -> Vector6<f64> {
        match self {
            Term::PressureCoupling => pressure_sensitivity(kin),
            _ => Vector6::zeros(),
        }
    }

    /// Scalar integrand multiplying `q`.
    pub fn volume_density(&self, kin: &Kinematics) -> f64 {
        match self {
            Term::VolumeConstraint => kin.j,
            Term::VolumeIntegral => 1.0,
            _ => 0.0,
        }
    }

    /// Derivative of [`Term::volume_density`] with respect to `E`.
    pub fn volume_density_derivative(&self, kin: &Kinematics) -> Vector6<f64> {
        match self {
            Term::VolumeConstraint => kin.d_j(),
            _ => Vector6::zeros(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::NeoHookeanBalance { mu } => write!(f, "{}(mu={})", self.name(), mu),
            Term::MooneyRivlinBalance { kappa } => write!(f, "{}(kappa={})", self.name(), kappa),
            _ => f.write_str(self.name()),
        }
    }
}

/// Signed sum of terms.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Equation {
    name: String,
    terms: Vec<(f64, Term)>,
}

impl Equation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            terms: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn terms(&self) -> &[(f64, Term)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Test field shared by all terms, or `None` if they disagree.
    pub fn test_field(&self) -> Option<TestField> {
        let first = self.terms.first()?.1.test_field();
        self.terms
            .iter()
            .all(|(_, t)| t.test_field() == first)
            .then_some(first)
    }

    pub fn stress(&self, kin: &Kinematics, p: f64) -> Vector6<f64> {
        self.terms
            .iter()
            .fold(Vector6::zeros(), |acc, (sign, t)| acc + t.stress(kin, p) * *sign)
    }

    pub fn tangent(&self, kin: &Kinematics, p: f64) -> Matrix6<f64> {
        self.terms
            .iter()
            .fold(Matrix6::zeros(), |acc, (sign, t)| acc + t.tangent(kin, p) * *sign)
    }

    pub fn pressure_sensitivity(&self, kin: &Kinematics) -> Vector6<f64> {
        self.terms.iter().fold(Vector6::zeros(), |acc, (sign, t)| {
            acc + t.pressure_sensitivity(kin) * *sign
        })
    }

    pub fn volume_density(&self, kin: &Kinematics) -> f64 {
        self.terms
            .iter()
            .map(|(sign, t)| sign * t.volume_density(kin))
            .sum()
    }

    pub fn volume_density_derivative(&self, kin: &Kinematics) -> Vector6<f64> {
        self.terms.iter().fold(Vector6::zeros(), |acc, (sign, t)| {
            acc + t.volume_density_derivative(kin) * *sign
        })
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.name)?;
        for (i, (sign, term)) in self.terms.iter().enumerate() {
            let op = if *sign < 0.0 { "-" } else if i == 0 { "" } else { "+" };
            if op.is_empty() {
                write!(f, " {}", term)?;
            } else {
                write!(f, " {} {}", op, term)?;
            }
        }
        Ok(())
    }
}

impl From<Term> for Equation {
    fn from(term: Term) -> Self {
        Equation {
            name: String::new(),
            terms: vec![(1.0, term)],
        }
    }
}

impl Neg for Term {
    type Output = Equation;

    fn neg(self) -> Equation {
        Equation {
            name: String::new(),
            terms: vec![(-1.0, self)],
        }
    }
}

impl Add<Term> for Term {
    type Output = Equation;

    fn add(self, rhs: Term) -> Equation {
        Equation::from(self) + rhs
    }
}

impl Sub<Term> for Term {
    type Output = Equation;

    fn sub(self, rhs: Term) -> Equation {
        Equation::from(self) - rhs
    }
}

impl Add<Term> for Equation {
    type Output = Equation;

    fn add(mut self, rhs: Term) -> Equation {
        self.terms.push((1.0, rhs));
        self
    }
}

impl Sub<Term> for Equation {
    type Output = Equation;

    fn sub(mut self, rhs: Term) -> Equation {
        self.terms.push((-1.0, rhs));
        self
    }
}

/// The balance and volume equations of the u/p problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Equations {
    balance: Equation,
    volume: Equation,
}

impl Equations {
    /// Checks that `balance` is tested with `v` and `volume` with `q`.
    pub fn new(balance: Equation, volume: Equation) -> SolverResult<Self> {
        if balance.test_field() != Some(TestField::Displacement) {
            return Err(SolverError::ProblemSetup {
                what: format!("equation '{}' must only contain displacement-tested terms", balance.name()),
            });
        }
        if volume.test_field() != Some(TestField::Pressure) {
            return Err(SolverError::ProblemSetup {
                what: format!("equation '{}' must only contain pressure-tested terms", volume.name()),
            });
        }
        Ok(Self { balance, volume })
    }

    /// `balance = NeoHookean + MooneyRivlin + PressureCoupling`,
    /// `volume = VolumeConstraint - VolumeIntegral`.
    pub fn mooney_rivlin_up(mu: f64, kappa: f64) -> Self {
        let balance = (Term::NeoHookeanBalance { mu }
            + Term::MooneyRivlinBalance { kappa }
            + Term::PressureCoupling)
            .named("balance");
        let volume = (Term::VolumeConstraint - Term::VolumeIntegral).named("volume");
        Self { balance, volume }
    }

    pub fn balance(&self) -> &Equation {
        &self.balance
    }

    pub fn volume(&self) -> &Equation {
        &self.volume
    }

    /// Terms of both equations, balance first.
    pub fn iter_terms(&self) -> impl Iterator<Item = &Term> {
        self.balance
            .terms()
            .iter()
            .chain(self.volume.terms().iter())
            .map(|(_, t)| t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix3, Vector3};
    use tl_material::MooneyRivlin;

    fn kin() -> Kinematics {
        Kinematics::from_deformation_gradient(Matrix3::from_diagonal(&Vector3::new(
            1.4, 0.9, 0.85,
        )))
        .unwrap()
    }

    #[test]
    fn composed_balance_matches_material_law() {
        let eqs = Equations::mooney_rivlin_up(40.0, 20.0);
        let k = kin();
        let material = MooneyRivlin::new(40.0, 20.0).unwrap();
        let diff = eqs.balance().stress(&k, 2.5) - material.stress(&k, 2.5);
        assert!(diff.norm() < 1e-12);
        let diff = eqs.balance().tangent(&k, 2.5) - material.tangent(&k, 2.5);
        assert!(diff.norm() < 1e-12);
    }

    #[test]
    fn volume_equation_measures_volume_change() {
        let eqs = Equations::mooney_rivlin_up(40.0, 20.0);
        let k = kin();
        assert!((eqs.volume().volume_density(&k) - (k.j - 1.0)).abs() < 1e-15);
        assert_eq!(eqs.volume().stress(&k, 1.0), Vector6::zeros());
    }

    #[test]
    fn mixed_equation_is_rejected() {
        let bad = (Term::NeoHookeanBalance { mu: 1.0 } + Term::VolumeIntegral).named("bad");
        let volume = Term::VolumeConstraint - Term::VolumeIntegral;
        let err = Equations::new(bad, volume).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn display_lists_signed_terms() {
        let eqs = Equations::mooney_rivlin_up(40.0, 20.0);
        assert_eq!(
            eqs.volume().to_string(),
            "volume: volume_constraint - volume_integral"
        );
        assert!(eqs.balance().to_string().starts_with("balance: neo_hookean_balance(mu=40)"));
    }

    #[test]
    fn negation_flips_sign() {
        let eq = -Term::VolumeIntegral;
        assert_eq!(eq.terms(), &[(-1.0, Term::VolumeIntegral)]);
        assert_eq!(eq.test_field(), Some(TestField::Pressure));
    }
}
