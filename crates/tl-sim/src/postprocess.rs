//! Stress recovery after each converged step.

use nalgebra::{DVector, Vector6};
use tracing::info;
use tl_core::timing::{Timer, solver_timing};
use tl_material::uniaxial_true_stress;
use tl_solver::{MixedProblem, Term, TermMode, evaluate_term};

use crate::diagnostics::{DiagnosticRecord, Diagnostics};
use crate::driver::{StepContext, StepHook};
use crate::error::{SimError, SimResult};

/// Cell-averaged fields of one converged state, indexed by cell.
#[derive(Clone, Debug, Default)]
pub struct CellFields {
    /// Green-Lagrange strain
    pub strain: Vec<Vector6<f64>>,
    /// `S_10` part of the 2nd Piola-Kirchhoff stress
    pub stress_10: Vec<Vector6<f64>>,
    /// `S_01` part
    pub stress_01: Vec<Vector6<f64>>,
    /// Pressure part `-p J C⁻¹`
    pub stress_p: Vec<Vector6<f64>>,
    pub stress: Vec<Vector6<f64>>,
}

/// Turns a converged state into a [`DiagnosticRecord`].
#[derive(Clone, Debug)]
pub struct PostProcessor {
    c10: f64,
    c01: f64,
    /// Undeformed block length along x
    length: f64,
    /// Cell whose averaged stress is reported
    cell: usize,
}

impl PostProcessor {
    /// Reads the material constants back from the balance equation.
    pub fn from_problem(problem: &MixedProblem) -> SimResult<Self> {
        let mut c10 = 0.0;
        let mut c01 = 0.0;
        for (coef, term) in problem.equations().balance().terms() {
            match term {
                Term::NeoHookeanBalance { mu } => c10 += 0.5 * coef * mu,
                Term::MooneyRivlinBalance { kappa } => c01 += 0.5 * coef * kappa,
                _ => {}
            }
        }
        let length = problem.mesh().dims()[0];
        Self::new(c10, c01, length)
    }

    pub fn new(c10: f64, c01: f64, length: f64) -> SimResult<Self> {
        if !(length > 0.0 && length.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "block length must be positive",
            });
        }
        Ok(Self {
            c10,
            c01,
            length,
            cell: 0,
        })
    }

    /// Reports the stress of `cell` instead of cell 0.
    pub fn with_cell(mut self, cell: usize) -> Self {
        self.cell = cell;
        self
    }

    pub fn c10(&self) -> f64 {
        self.c10
    }

    pub fn c01(&self) -> f64 {
        self.c01
    }

    /// Strain and per-term stresses of every cell.
    pub fn cell_fields(&self, problem: &MixedProblem, x: &DVector<f64>) -> SimResult<CellFields> {
        let balance = problem.equations().balance();
        let n_cells = problem.n_cells();
        let mut fields = CellFields {
            strain: Vec::new(),
            stress_10: vec![Vector6::zeros(); n_cells],
            stress_01: vec![Vector6::zeros(); n_cells],
            stress_p: vec![Vector6::zeros(); n_cells],
            stress: vec![Vector6::zeros(); n_cells],
        };

        for (coef, term) in balance.terms() {
            let values = evaluate_term(problem, term, TermMode::Stress, x)?;
            let slot = match term {
                Term::NeoHookeanBalance { .. } => &mut fields.stress_10,
                Term::MooneyRivlinBalance { .. } => &mut fields.stress_01,
                _ => &mut fields.stress_p,
            };
            for ((part, total), value) in slot.iter_mut().zip(fields.stress.iter_mut()).zip(values) {
                *part += value * *coef;
                *total += value * *coef;
            }
        }

        let strain_term = balance.terms().first().map(|(_, t)| *t).ok_or_else(|| {
            SimError::PostProcess {
                what: "balance equation has no terms".to_string(),
            }
        })?;
        fields.strain = evaluate_term(problem, &strain_term, TermMode::Strain, x)?;
        Ok(fields)
    }

    /// Largest `u_x` over all displacement nodes.
    pub fn max_axial_displacement(&self, problem: &MixedProblem, x: &DVector<f64>) -> f64 {
        let u = problem.u_field();
        (0..u.n_nodes())
            .map(|node| x[u.dof(node, 0)])
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Extremes of `det F` over every integration point.
    pub fn jacobian_range(&self, problem: &MixedProblem, x: &DVector<f64>) -> SimResult<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for cell in 0..problem.n_cells() {
            for state in problem.point_states(cell, x.as_slice())? {
                lo = lo.min(state.kin.j);
                hi = hi.max(state.kin.j);
            }
        }
        Ok((lo, hi))
    }

    pub fn process(&self, ctx: &StepContext<'_>) -> SimResult<(DiagnosticRecord, CellFields)> {
        let timer = Timer::start();
        let problem = ctx.problem;
        let x = ctx.state();
        if self.cell >= problem.n_cells() {
            return Err(SimError::PostProcess {
                what: format!(
                    "reported cell {} out of range ({} cells)",
                    self.cell,
                    problem.n_cells()
                ),
            });
        }

        let fields = self.cell_fields(problem, x)?;
        let max_ux = self.max_axial_displacement(problem, x);
        let (min_j, max_j) = self.jacobian_range(problem, x)?;

        let stretch = 1.0 + max_ux / self.length;
        let s_xx = fields.stress[self.cell][0];
        let record = DiagnosticRecord {
            step: ctx.step,
            time: ctx.time,
            max_ux,
            stretch,
            s_xx,
            true_stress: s_xx * stretch * stretch,
            analytic_stress: uniaxial_true_stress(self.c10, self.c01, stretch),
            iterations: ctx.report.iterations,
            residual_norm: ctx.report.residual_norm,
            min_j,
            max_j,
        };
        timer.stop_into(&solver_timing::POST_PROCESS);
        Ok((record, fields))
    }
}

/// Step hook that fills a caller-owned [`Diagnostics`].
pub struct Recorder<'a> {
    post: PostProcessor,
    diagnostics: &'a mut Diagnostics,
    last_fields: Option<CellFields>,
}

impl<'a> Recorder<'a> {
    pub fn new(post: PostProcessor, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            post,
            diagnostics,
            last_fields: None,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        self.diagnostics
    }

    /// Cell fields of the latest recorded step.
    pub fn last_fields(&self) -> Option<&CellFields> {
        self.last_fields.as_ref()
    }

    pub fn into_last_fields(self) -> Option<CellFields> {
        self.last_fields
    }
}

impl StepHook for Recorder<'_> {
    fn after_step(&mut self, ctx: &StepContext<'_>) -> SimResult<()> {
        let (record, fields) = self.post.process(ctx)?;
        info!(
            step = record.step,
            time = record.time,
            stretch = record.stretch,
            true_stress = record.true_stress,
            analytic = record.analytic_stress,
            "stress"
        );
        self.diagnostics.push(record);
        self.last_fields = Some(fields);
        Ok(())
    }
}
