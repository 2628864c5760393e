use clap::{ArgAction, Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tl_app::{
    AppError, AppResult, LinearSolverKind, RunConfig, RunOptions, RunOutcome, RunProgressEvent,
    RunStage, parse_count_triple, parse_real_triple, parse_time_triple, run_service,
};
use tl_core::timing;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tl-cli")]
#[command(
    about = "Total-Lagrangian mixed u/p solver for an incompressible Mooney-Rivlin block in uniaxial stretch",
    long_about = None
)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the load history and compare with the analytic curve
    Run {
        #[command(flatten)]
        problem: ProblemArgs,
        /// Print the FEM/analytic comparison table
        #[arg(short, long)]
        plot: bool,
        /// Store the run (manifest, steps, comparison) under this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the assembly and linear-solve timing breakdown
        #[arg(long)]
        timing: bool,
    },
    /// Check a configuration without solving
    Validate {
        #[command(flatten)]
        problem: ProblemArgs,
    },
    /// List stored runs
    Runs {
        /// Run store directory
        store: PathBuf,
    },
    /// Show a stored run
    ShowRun {
        /// Run store directory
        store: PathBuf,
        /// Run ID to display
        run_id: String,
    },
}

#[derive(Args)]
struct ProblemArgs {
    /// YAML or JSON configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Displacement approximation order (pressure uses order - 1)
    #[arg(long)]
    order: Option<usize>,
    /// Block dimensions, "x,y,z" or three values
    #[arg(short, long, num_args = 1..=3, value_delimiter = ',', allow_negative_numbers = true)]
    dims: Vec<String>,
    /// Vertices per axis, "nx,ny,nz" or three values
    #[arg(short, long, num_args = 1..=3, value_delimiter = ',')]
    shape: Vec<String>,
    /// Block centre, "x,y,z" or three values (default: half of dims)
    #[arg(long, num_args = 1..=3, value_delimiter = ',', allow_negative_numbers = true)]
    centre: Vec<String>,
    /// Time stepping "t0,t1,n_steps" or three values (n_steps counts instants, both ends included)
    #[arg(short = 't', long = "ts", num_args = 1..=3, value_delimiter = ',', allow_negative_numbers = true)]
    ts: Vec<String>,
    /// Assemble on a single thread
    #[arg(long)]
    serial: bool,
    /// Use full-pivoting LU for the Newton systems
    #[arg(long)]
    full_pivot: bool,
}

/// Rejoins values split by clap so the config parsers see `"a,b,c"`.
fn joined(values: &[String]) -> Option<String> {
    (!values.is_empty()).then(|| values.join(","))
}

impl ProblemArgs {
    /// Defaults, then the config file, then the flags.
    fn resolve(&self) -> AppResult<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        if let Some(order) = self.order {
            config.order = order;
        }
        if let Some(dims) = joined(&self.dims) {
            config.dims = parse_real_triple(&dims)?;
        }
        if let Some(shape) = joined(&self.shape) {
            config.shape = parse_count_triple(&shape)?;
        }
        if let Some(centre) = joined(&self.centre) {
            config.centre = Some(parse_real_triple(&centre)?);
        }
        if let Some(ts) = joined(&self.ts) {
            config.time = parse_time_triple(&ts)?;
        }
        if self.serial {
            config.parallel = false;
        }
        if self.full_pivot {
            config.linear_solver = LinearSolverKind::FullPivLu;
        }
        Ok(config)
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            problem,
            plot,
            output,
            timing,
        } => cmd_run(&problem, plot, output, timing),
        Commands::Validate { problem } => cmd_validate(&problem),
        Commands::Runs { store } => cmd_runs(&store),
        Commands::ShowRun { store, run_id } => cmd_show_run(&store, &run_id),
    }
}

fn cmd_validate(problem: &ProblemArgs) -> AppResult<()> {
    let config = problem.resolve()?;
    let problems = config.problems();
    if problems.is_empty() {
        println!("✓ Configuration is valid");
        print_config(&config);
        return Ok(());
    }
    println!("Configuration has {} problem(s):", problems.len());
    for p in &problems {
        println!("  - {}", p);
    }
    Err(AppError::InvalidInput(problems.join("; ")))
}

fn print_config(config: &RunConfig) {
    println!("  order:  {} (pressure {})", config.order, config.order.saturating_sub(1));
    println!("  dims:   {:?}", config.dims);
    println!("  shape:  {:?}", config.shape);
    match config.centre {
        Some(c) => println!("  centre: {:?}", c),
        None => println!("  centre: {:?}", config.dims.map(|d| 0.5 * d)),
    }
    println!(
        "  time:   {} .. {} ({} instants)",
        config.time.t0, config.time.t1, config.time.n_steps
    );
    println!(
        "  material: C10 = {}, C01 = {}",
        config.material.c10, config.material.c01
    );
}

fn cmd_run(
    problem: &ProblemArgs,
    plot: bool,
    output: Option<PathBuf>,
    timing_enabled: bool,
) -> AppResult<()> {
    if timing_enabled {
        timing::enable_timing();
    }
    let mut config = problem.resolve()?;
    config.plot |= plot;
    println!("Running uniaxial stretch:");
    print_config(&config);

    let options = RunOptions {
        output_dir: output,
        ..RunOptions::default()
    };

    let mut last_emit = Instant::now();
    let outcome = run_service::run_with_progress(
        &config,
        &options,
        Some(&mut |event| {
            let boundary = event.step.is_none();
            if boundary || last_emit.elapsed().as_millis() >= 100 {
                render_cli_progress(&event);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    print_steps(&outcome);
    if config.plot {
        print_comparison(&outcome);
    }
    print_timing_summary(&outcome.timing);
    timing::solver_timing::summary().print();

    if let Some(dir) = &outcome.saved_to {
        println!("  Stored in: {}", dir.display());
    }
    match outcome.error {
        None => {
            println!("✓ Run completed: {}", outcome.run_id);
            Ok(())
        }
        Some(err) => {
            println!(
                "✗ Run stopped after {} converged step(s)",
                outcome.diagnostics.len()
            );
            Err(err.into())
        }
    }
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.step) {
        (RunStage::Solving, Some(s)) => {
            let width = 28usize;
            let filled = ((s.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  step={}/{}  t={:.3}  stretch={:.3}  iters={}  elapsed={:.1}s",
                bar,
                s.fraction_complete * 100.0,
                s.step + 1,
                s.n_steps,
                s.time,
                s.stretch,
                s.iterations,
                event.elapsed_wall_s
            );
        }
        _ => {
            let mut line = format!(
                "\r{}  elapsed={:.2}s",
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
        }
    }
    let _ = io::stdout().flush();
}

fn print_steps(outcome: &RunOutcome) {
    println!(
        "\n{:>4} {:>8} {:>9} {:>14} {:>6} {:>12}",
        "step", "time", "stretch", "true stress", "iters", "|J - 1|"
    );
    for r in outcome.diagnostics.records() {
        let j_dev = (r.min_j - 1.0).abs().max((r.max_j - 1.0).abs());
        println!(
            "{:>4} {:>8.3} {:>9.4} {:>14.6e} {:>6} {:>12.3e}",
            r.step, r.time, r.stretch, r.true_stress, r.iterations, j_dev
        );
    }
}

fn print_comparison(outcome: &RunOutcome) {
    println!(
        "\n{:>9} {:>14} {:>14} {:>12}",
        "stretch", "FEM", "analytic", "difference"
    );
    for row in outcome.diagnostics.comparison() {
        println!(
            "{:>9.4} {:>14.6e} {:>14.6e} {:>12.3e}",
            row.stretch, row.fem, row.analytic, row.difference
        );
    }
    if let Some(err) = outcome.diagnostics.max_relative_error() {
        println!("  max relative error: {:.3e}", err);
    }
}

fn print_timing_summary(summary: &tl_app::RunTimingSummary) {
    print!("{}", timing_summary_text(summary, timing::is_enabled()));
}

/// Evaluation counts are only shown when the counters were recording.
fn timing_summary_text(summary: &tl_app::RunTimingSummary, counters: bool) -> String {
    let total = summary.total_time_s.max(1.0e-12);
    let mut out = String::from("\nTiming summary:\n");
    out += &format!(
        "  Compile: {:.3}s ({:.1}%)\n",
        summary.compile_time_s,
        100.0 * summary.compile_time_s / total
    );
    out += &format!(
        "  Solve:   {:.3}s ({:.1}%)\n",
        summary.solve_time_s,
        100.0 * summary.solve_time_s / total
    );
    if summary.save_time_s > 0.0 {
        out += &format!("  Save:    {:.3}s\n", summary.save_time_s);
    }
    out += &format!("  Total:   {:.3}s\n", summary.total_time_s);
    if counters {
        out += &format!(
            "  Residual evaluations: {}, tangent evaluations: {}, linear solves: {}\n",
            summary.residual_eval_count, summary.tangent_eval_count, summary.linear_solve_count
        );
    }
    out
}

fn cmd_runs(store: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(store)?;

    if runs.is_empty() {
        println!("No stored runs in {}", store.display());
    } else {
        println!("Stored runs in {}:", store.display());
        for manifest in runs {
            let status = if manifest.outcome.is_completed() {
                "completed"
            } else {
                "failed"
            };
            println!(
                "  {} ({}, {} steps, {})",
                manifest.run_id,
                manifest.timestamp,
                manifest.outcome.steps(),
                status
            );
        }
    }
    Ok(())
}

fn cmd_show_run(store: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);
    let stored = run_service::load_run(store, run_id)?;

    println!("\nRun Summary:");
    println!("  Label:     {}", stored.manifest.label);
    println!("  Timestamp: {}", stored.manifest.timestamp);
    println!("  Version:   {}", stored.manifest.solver_version);
    println!("  Outcome:   {:?}", stored.manifest.outcome);
    println!("  Steps:     {}", stored.steps.len());

    println!(
        "\n{:>9} {:>14} {:>14} {:>12}",
        "stretch", "FEM", "analytic", "difference"
    );
    for row in &stored.comparison {
        println!(
            "{:>9.4} {:>14.6e} {:>14.6e} {:>12.3e}",
            row.stretch, row.fem, row.analytic, row.difference
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(args: &[&str]) -> RunConfig {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Validate { problem } => problem.resolve().unwrap(),
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn triples_accept_commas_or_separate_values() {
        let spaced = problem(&["tl-cli", "validate", "--dims", "2", "1", "3", "--ts", "0", "5", "6"]);
        let commas = problem(&["tl-cli", "validate", "--dims", "2,1,3", "--ts", "0,5,6"]);
        assert_eq!(spaced.dims, [2.0, 1.0, 3.0]);
        assert_eq!(spaced.dims, commas.dims);
        assert_eq!(spaced.time, commas.time);
        assert_eq!(spaced.time.n_steps, 6);

        let shaped = problem(&["tl-cli", "validate", "-s", "3", "4", "5", "--centre", "0", "-1", "0"]);
        assert_eq!(shaped.shape, [3, 4, 5]);
        assert_eq!(shaped.centre, Some([0.0, -1.0, 0.0]));
    }

    #[test]
    fn two_values_are_rejected() {
        let cli = Cli::try_parse_from(["tl-cli", "validate", "--dims", "2", "1"]).unwrap();
        let Commands::Validate { problem } = cli.command else {
            panic!("expected validate");
        };
        assert!(matches!(problem.resolve(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn counters_are_hidden_when_timing_is_off() {
        let summary = tl_app::RunTimingSummary {
            total_time_s: 1.0,
            residual_eval_count: 12,
            ..Default::default()
        };
        assert!(!timing_summary_text(&summary, false).contains("Residual evaluations"));
        assert!(timing_summary_text(&summary, true).contains("Residual evaluations: 12"));
    }
}
