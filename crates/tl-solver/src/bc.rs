//! Essential boundary conditions applied by elimination.

use std::fmt;
use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use tl_mesh::{BoxFace, LagrangeField};

use crate::error::{SolverError, SolverResult};

/// Prescribed value as a function of time and reference coordinates.
pub trait BcValue: Send + Sync {
    fn value(&self, time: f64, coords: [f64; 3]) -> f64;
}

impl<F> BcValue for F
where
    F: Fn(f64, [f64; 3]) -> f64 + Send + Sync,
{
    fn value(&self, time: f64, coords: [f64; 3]) -> f64 {
        self(time, coords)
    }
}

/// Value imposed on a constrained component.
#[derive(Clone)]
pub enum Prescribed {
    Fixed(f64),
    Function(Arc<dyn BcValue>),
}

impl Prescribed {
    pub fn eval(&self, time: f64, coords: [f64; 3]) -> f64 {
        match self {
            Prescribed::Fixed(v) => *v,
            Prescribed::Function(f) => f.value(time, coords),
        }
    }
}

impl fmt::Debug for Prescribed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prescribed::Fixed(v) => write!(f, "Fixed({})", v),
            Prescribed::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Constraint of one displacement component on a box face.
#[derive(Debug, Clone)]
pub struct EssentialBc {
    pub name: String,
    pub face: BoxFace,
    pub component: usize,
    pub value: Prescribed,
}

impl EssentialBc {
    pub fn fixed(name: impl Into<String>, face: BoxFace, component: usize, value: f64) -> Self {
        Self {
            name: name.into(),
            face,
            component,
            value: Prescribed::Fixed(value),
        }
    }

    pub fn function<F>(name: impl Into<String>, face: BoxFace, component: usize, f: F) -> Self
    where
        F: Fn(f64, [f64; 3]) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            face,
            component,
            value: Prescribed::Function(Arc::new(f)),
        }
    }

    /// Symmetry planes `u_x = 0` on Left, `u_y = 0` on Near, `u_z = 0` on
    /// Bottom and the ramp `u_x = t · x` on Right.
    pub fn uniaxial_stretch() -> Vec<Self> {
        vec![
            EssentialBc::fixed("x_sym", BoxFace::Left, 0, 0.0),
            EssentialBc::fixed("y_sym", BoxFace::Near, 1, 0.0),
            EssentialBc::fixed("z_sym", BoxFace::Bottom, 2, 0.0),
            EssentialBc::function("displacement", BoxFace::Right, 0, |t, x: [f64; 3]| t * x[0]),
        ]
    }
}

#[derive(Debug, Clone)]
struct ConstrainedDof {
    dof: usize,
    coords: [f64; 3],
    bc: usize,
}

/// Resolves essential conditions to displacement DOFs and enforces them.
///
/// The state carries the prescribed values, so Newton increments on
/// constrained DOFs are zero: their residual rows are zeroed, and their
/// tangent rows and columns are replaced by the identity.
#[derive(Debug, Clone)]
pub struct BcEnforcer {
    bcs: Vec<EssentialBc>,
    constrained: Vec<ConstrainedDof>,
    mask: Vec<bool>,
}

impl BcEnforcer {
    /// Later conditions win where two constrain the same DOF.
    pub fn new(u: &LagrangeField, n_total: usize, bcs: Vec<EssentialBc>) -> SolverResult<Self> {
        validate_constraints(&bcs, u.n_components())?;

        let mut owner: Vec<Option<(usize, [f64; 3])>> = vec![None; n_total];
        for (index, bc) in bcs.iter().enumerate() {
            let nodes = u.nodes_on(bc.face);
            if nodes.is_empty() {
                return Err(SolverError::ProblemSetup {
                    what: format!("condition '{}' selects no nodes on {}", bc.name, bc.face),
                });
            }
            for node in nodes {
                owner[u.dof(node, bc.component)] = Some((index, u.node_coords(node)));
            }
        }

        let mut mask = vec![false; n_total];
        let mut constrained = Vec::new();
        for (dof, slot) in owner.into_iter().enumerate() {
            if let Some((bc, coords)) = slot {
                mask[dof] = true;
                constrained.push(ConstrainedDof { dof, coords, bc });
            }
        }

        Ok(Self {
            bcs,
            constrained,
            mask,
        })
    }

    pub fn conditions(&self) -> &[EssentialBc] {
        &self.bcs
    }

    pub fn n_constrained(&self) -> usize {
        self.constrained.len()
    }

    pub fn is_constrained(&self, dof: usize) -> bool {
        self.mask.get(dof).copied().unwrap_or(false)
    }

    pub fn constrained_dofs(&self) -> impl Iterator<Item = usize> + '_ {
        self.constrained.iter().map(|c| c.dof)
    }

    /// Writes the values prescribed at `time` into the state.
    pub fn apply_to_state(&self, x: &mut DVector<f64>, time: f64) {
        for c in &self.constrained {
            x[c.dof] = self.bcs[c.bc].value.eval(time, c.coords);
        }
    }

    /// Change of the prescribed values from the state `x` to `time`, zero on
    /// free DOFs.
    pub fn increment(&self, x: &DVector<f64>, time: f64) -> DVector<f64> {
        let mut delta = DVector::zeros(x.len());
        for c in &self.constrained {
            delta[c.dof] = self.bcs[c.bc].value.eval(time, c.coords) - x[c.dof];
        }
        delta
    }

    pub fn zero_residual(&self, r: &mut DVector<f64>) {
        for c in &self.constrained {
            r[c.dof] = 0.0;
        }
    }

    /// Row and column elimination with a unit diagonal.
    pub fn eliminate(&self, k: &mut DMatrix<f64>) {
        for c in &self.constrained {
            k.row_mut(c.dof).fill(0.0);
            k.column_mut(c.dof).fill(0.0);
            k[(c.dof, c.dof)] = 1.0;
        }
    }
}

/// Best-effort rigid-body check: every displacement component must be
/// constrained somewhere.
pub fn validate_constraints(bcs: &[EssentialBc], n_components: usize) -> SolverResult<()> {
    for bc in bcs {
        if bc.component >= n_components {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "condition '{}' constrains component {} of a {}-component field",
                    bc.name, bc.component, n_components
                ),
            });
        }
        if let Prescribed::Fixed(v) = bc.value {
            if !v.is_finite() {
                return Err(SolverError::ProblemSetup {
                    what: format!("condition '{}' has non-finite value", bc.name),
                });
            }
        }
    }
    for component in 0..n_components {
        if !bcs.iter().any(|bc| bc.component == component) {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "displacement component {} is unconstrained (rigid-body mode)",
                    component
                ),
            });
        }
    }
    Ok(())
}
