//! Quasi-static driver: one nonlinear solve per load instant.

use nalgebra::DVector;
use tracing::{info, warn};
use tl_solver::{BcEnforcer, LinearSolver, MixedProblem, NewtonConfig, NewtonReport, solve_step};

use crate::error::{SimError, SimResult};
use crate::stepper::TimeStepper;

/// Options for a load-stepping run.
#[derive(Clone, Debug)]
pub struct SimOptions {
    pub t0: f64,
    pub t1: f64,
    /// Number of instants, both ends included
    pub n_steps: usize,
    pub newton: NewtonConfig,
    /// Evaluate cells on the rayon pool
    pub parallel: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            t0: 0.0,
            t1: 10.0,
            n_steps: 11,
            newton: NewtonConfig::default(),
            parallel: true,
        }
    }
}

impl SimOptions {
    pub fn stepper(&self) -> SimResult<TimeStepper> {
        TimeStepper::new(self.t0, self.t1, self.n_steps)
    }
}

/// Converged state of one step, as seen by a [`StepHook`].
pub struct StepContext<'a> {
    pub step: usize,
    pub time: f64,
    pub problem: &'a MixedProblem,
    pub report: &'a NewtonReport,
}

impl StepContext<'_> {
    pub fn state(&self) -> &DVector<f64> {
        &self.report.x
    }
}

/// Called after every converged step.
pub trait StepHook {
    fn after_step(&mut self, ctx: &StepContext<'_>) -> SimResult<()>;
}

impl<F> StepHook for F
where
    F: FnMut(&StepContext<'_>) -> SimResult<()>,
{
    fn after_step(&mut self, ctx: &StepContext<'_>) -> SimResult<()> {
        self(ctx)
    }
}

/// Totals of a completed run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub steps: usize,
    pub total_iterations: usize,
    pub final_state: DVector<f64>,
}

/// Runs every load instant in order.
///
/// Each solve starts from the previous converged state. The first failing
/// step stops the run with [`SimError::StepFailed`]; whatever the hook
/// recorded for earlier steps stays with the hook.
pub fn run_sim(
    problem: &MixedProblem,
    bcs: &BcEnforcer,
    solver: &dyn LinearSolver,
    opts: &SimOptions,
    hook: &mut dyn StepHook,
) -> SimResult<RunSummary> {
    let stepper = opts.stepper()?;
    info!(
        n_steps = stepper.n_steps(),
        t0 = stepper.t0(),
        t1 = stepper.t1(),
        n_dofs = problem.n_dofs(),
        solver = solver.name(),
        "starting run"
    );

    let mut x = DVector::zeros(problem.n_dofs());
    let mut total_iterations = 0;
    let mut steps = 0;

    for (step, time) in stepper {
        let report = solve_step(problem, bcs, &x, time, solver, &opts.newton, opts.parallel)
            .map_err(|source| {
                warn!(step, time, error = %source, "step failed");
                SimError::StepFailed { step, time, source }
            })?;
        info!(
            step,
            time,
            iterations = report.iterations,
            residual = report.residual_norm,
            "step converged"
        );
        total_iterations += report.iterations;
        steps += 1;

        hook.after_step(&StepContext {
            step,
            time,
            problem,
            report: &report,
        })?;
        x = report.x;
    }

    Ok(RunSummary {
        steps,
        total_iterations,
        final_state: x,
    })
}
