//! Run execution and persistence service.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tl_core::timing::solver_timing;
use tl_results::{
    ComparisonRecord, RunManifest, RunOutcomeSummary, RunStore, StepRecord, compute_run_id,
};
use tl_sim::{
    CellFields, DiagnosticRecord, Diagnostics, PostProcessor, Recorder, SimError, StepContext,
    StepHook, run_sim,
};
use tracing::{info, warn};

use crate::compile::compile;
use crate::config::RunConfig;
use crate::error::{AppError, AppResult};
use crate::progress::{RunProgressEvent, RunStage, StepProgress};

/// Version recorded in manifests and mixed into run ids.
pub const SOLVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Label stored with every run.
pub const RUN_LABEL: &str = "mooney_rivlin_uniaxial_up";

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Run store root; nothing is written when unset
    pub output_dir: Option<PathBuf>,
    pub solver_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            solver_version: SOLVER_VERSION.to_string(),
        }
    }
}

/// Wall-clock split of a run plus the solver counters.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub compile_time_s: f64,
    pub solve_time_s: f64,
    pub save_time_s: f64,
    pub total_time_s: f64,
    pub residual_time_s: f64,
    pub residual_eval_count: u64,
    pub tangent_time_s: f64,
    pub tangent_eval_count: u64,
    pub linear_solve_time_s: f64,
    pub linear_solve_count: u64,
    pub post_process_time_s: f64,
}

/// Result of a run. A failed step leaves the diagnostics of every earlier
/// step in place and the failure in `error`.
#[derive(Debug)]
pub struct RunOutcome {
    pub run_id: String,
    pub diagnostics: Diagnostics,
    /// Cell fields of the last converged step
    pub final_fields: Option<CellFields>,
    pub error: Option<SimError>,
    /// Run directory when the run was stored
    pub saved_to: Option<PathBuf>,
    pub timing: RunTimingSummary,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn summary(&self) -> RunOutcomeSummary {
        match &self.error {
            None => RunOutcomeSummary::Completed {
                steps: self.diagnostics.len(),
                total_iterations: self.diagnostics.total_iterations(),
                max_relative_error: self.diagnostics.max_relative_error(),
            },
            Some(err) => RunOutcomeSummary::Failed {
                steps: self.diagnostics.len(),
                failed_step: err.failed_step(),
                message: err.to_string(),
            },
        }
    }

    /// Diagnostics of a completed run, or the failure.
    pub fn into_result(self) -> AppResult<Diagnostics> {
        match self.error {
            None => Ok(self.diagnostics),
            Some(err) => Err(err.into()),
        }
    }
}

pub fn step_record(record: &DiagnosticRecord) -> StepRecord {
    StepRecord {
        step: record.step,
        time: record.time,
        max_ux: record.max_ux,
        stretch: record.stretch,
        s_xx: record.s_xx,
        true_stress: record.true_stress,
        analytic_stress: record.analytic_stress,
        iterations: record.iterations,
        residual_norm: record.residual_norm,
        min_j: record.min_j,
        max_j: record.max_j,
    }
}

type ProgressCallback<'a> = Option<&'a mut dyn FnMut(RunProgressEvent)>;

fn emit_progress(
    progress_cb: &mut ProgressCallback<'_>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Records every step and forwards a progress event for it.
struct ProgressHook<'a, 'cb> {
    recorder: Recorder<'a>,
    progress_cb: &'a mut ProgressCallback<'cb>,
    n_steps: usize,
    started: Instant,
}

impl StepHook for ProgressHook<'_, '_> {
    fn after_step(&mut self, ctx: &StepContext<'_>) -> tl_sim::SimResult<()> {
        self.recorder.after_step(ctx)?;
        let Some(cb) = self.progress_cb.as_deref_mut() else {
            return Ok(());
        };
        let stretch = self
            .recorder
            .diagnostics()
            .last()
            .map_or(1.0, |r| r.stretch);
        cb(RunProgressEvent {
            stage: RunStage::Solving,
            elapsed_wall_s: self.started.elapsed().as_secs_f64(),
            message: None,
            step: Some(StepProgress {
                step: ctx.step,
                n_steps: self.n_steps,
                time: ctx.time,
                stretch,
                iterations: ctx.report.iterations,
                fraction_complete: (ctx.step + 1) as f64 / self.n_steps as f64,
            }),
        });
        Ok(())
    }
}

/// Solves the configured problem over its load history.
pub fn run(config: &RunConfig, options: &RunOptions) -> AppResult<RunOutcome> {
    run_with_progress(config, options, None)
}

/// Like [`run`], streaming stage and per-step progress events.
///
/// Configuration and setup errors are returned as `Err`; a failing load
/// step is reported inside the [`RunOutcome`].
pub fn run_with_progress(
    config: &RunConfig,
    options: &RunOptions,
    mut progress_cb: ProgressCallback<'_>,
) -> AppResult<RunOutcome> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();
    solver_timing::reset_all();

    emit_progress(&mut progress_cb, RunStage::Validating, started, None);
    config.validate()?;
    let run_id = compute_run_id(config, &options.solver_version)?;
    info!(run_id = %run_id, order = config.order, shape = ?config.shape, "run requested");

    emit_progress(&mut progress_cb, RunStage::Compiling, started, None);
    let compile_start = Instant::now();
    let compiled = compile(config)?;
    timing.compile_time_s = compile_start.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        RunStage::Solving,
        started,
        Some(format!("{} unknowns", compiled.problem.n_dofs())),
    );
    let solve_start = Instant::now();
    let solver = config.linear_solver.build();
    let post = PostProcessor::from_problem(&compiled.problem)?;
    let mut diagnostics = Diagnostics::new();
    let (result, final_fields) = {
        let mut hook = ProgressHook {
            recorder: Recorder::new(post, &mut diagnostics),
            progress_cb: &mut progress_cb,
            n_steps: config.time.n_steps,
            started,
        };
        let result = run_sim(
            &compiled.problem,
            &compiled.bcs,
            solver.as_ref(),
            &config.sim_options(),
            &mut hook,
        );
        (result, hook.recorder.into_last_fields())
    };
    timing.solve_time_s = solve_start.elapsed().as_secs_f64();

    let error = match result {
        Ok(summary) => {
            info!(
                steps = summary.steps,
                iterations = summary.total_iterations,
                max_relative_error = ?diagnostics.max_relative_error(),
                "run completed"
            );
            None
        }
        Err(err) => {
            warn!(error = %err, completed_steps = diagnostics.len(), "run stopped");
            Some(err)
        }
    };

    let mut outcome = RunOutcome {
        run_id,
        diagnostics,
        final_fields,
        error,
        saved_to: None,
        timing,
    };

    if let Some(dir) = &options.output_dir {
        emit_progress(&mut progress_cb, RunStage::SavingResults, started, None);
        let save_start = Instant::now();
        outcome.saved_to = Some(save_outcome(dir, config, options, &outcome)?);
        outcome.timing.save_time_s = save_start.elapsed().as_secs_f64();
    }

    let counters = solver_timing::summary();
    outcome.timing.residual_time_s = counters.residual_s;
    outcome.timing.residual_eval_count = counters.residual_count;
    outcome.timing.tangent_time_s = counters.tangent_s;
    outcome.timing.tangent_eval_count = counters.tangent_count;
    outcome.timing.linear_solve_time_s = counters.linear_solve_s;
    outcome.timing.linear_solve_count = counters.linear_solve_count;
    outcome.timing.post_process_time_s = counters.post_process_s;
    outcome.timing.total_time_s = started.elapsed().as_secs_f64();

    let stage = if outcome.is_success() {
        RunStage::Completed
    } else {
        RunStage::Failed
    };
    emit_progress(&mut progress_cb, stage, started, None);
    Ok(outcome)
}

fn save_outcome(
    dir: &Path,
    config: &RunConfig,
    options: &RunOptions,
    outcome: &RunOutcome,
) -> AppResult<PathBuf> {
    let store = RunStore::new(dir.to_path_buf())?;
    let config_json =
        serde_json::to_value(config).map_err(|e| AppError::Results(e.to_string()))?;
    let manifest = RunManifest::new(
        outcome.run_id.clone(),
        RUN_LABEL,
        options.solver_version.clone(),
        config_json,
        outcome.summary(),
    );
    let steps: Vec<StepRecord> = outcome.diagnostics.records().iter().map(step_record).collect();
    let run_dir = store.save_run(&manifest, &steps)?;
    info!(path = %run_dir.display(), "run stored");
    Ok(run_dir)
}

/// A run read back from a store.
#[derive(Debug, Clone)]
pub struct StoredRun {
    pub manifest: RunManifest,
    pub steps: Vec<StepRecord>,
    pub comparison: Vec<ComparisonRecord>,
}

pub fn load_run(store_dir: &Path, run_id: &str) -> AppResult<StoredRun> {
    let store = RunStore::new(store_dir.to_path_buf())?;
    Ok(StoredRun {
        manifest: store.load_manifest(run_id)?,
        steps: store.load_steps(run_id)?,
        comparison: store.load_comparison(run_id)?,
    })
}

pub fn list_runs(store_dir: &Path) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::new(store_dir.to_path_buf())?;
    Ok(store.list_runs()?)
}
