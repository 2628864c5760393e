use tl_app::{
    AppError, NewtonSettings, RunConfig, RunOptions, RunStage, TimeConfig, load_run, list_runs,
    run, run_with_progress,
};

fn small_config() -> RunConfig {
    RunConfig {
        shape: [3, 3, 3],
        time: TimeConfig {
            t0: 0.0,
            t1: 2.0,
            n_steps: 5,
        },
        ..RunConfig::default()
    }
}

#[test]
fn default_run_matches_the_analytic_curve() {
    let outcome = run(&RunConfig::default(), &RunOptions::default()).unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.diagnostics.len(), 11);
    assert!(outcome.diagnostics.max_relative_error().unwrap() < 1e-2);
    assert!(outcome.diagnostics.is_monotonic());
    assert!(outcome.saved_to.is_none());
    let fields = outcome.final_fields.unwrap();
    assert_eq!(fields.stress.len(), 27);
}

#[test]
fn quadratic_run_on_the_default_mesh_completes() {
    let config = RunConfig {
        order: 2,
        ..RunConfig::default()
    };
    let outcome = run(&config, &RunOptions::default()).unwrap();
    assert!(outcome.is_success(), "{:?}", outcome.error);
    assert_eq!(outcome.diagnostics.len(), 11);
    assert!(outcome.diagnostics.max_relative_error().unwrap() < 1e-2);
    for record in outcome.diagnostics.records() {
        assert!(record.iterations < 20);
        assert!((record.min_j - 1.0).abs() < 1e-6);
    }
}

#[test]
fn run_is_stored_and_read_back() {
    let dir = std::env::temp_dir().join("tl_app_run_persistence");
    let _ = std::fs::remove_dir_all(&dir);
    let options = RunOptions {
        output_dir: Some(dir.clone()),
        ..RunOptions::default()
    };

    let outcome = run(&small_config(), &options).unwrap();
    assert!(outcome.saved_to.as_ref().unwrap().join("steps.jsonl").exists());

    let stored = load_run(&dir, &outcome.run_id).unwrap();
    assert!(stored.manifest.outcome.is_completed());
    assert_eq!(stored.steps.len(), 5);
    assert_eq!(stored.comparison.len(), 5);
    assert_eq!(stored.steps[4].time, 2.0);
    assert_eq!(stored.manifest.config["shape"][0], 3);

    let runs = list_runs(&dir).unwrap();
    assert!(runs.iter().any(|m| m.run_id == outcome.run_id));

    // Same configuration, same id
    let again = run(&small_config(), &RunOptions::default()).unwrap();
    assert_eq!(again.run_id, outcome.run_id);

    assert!(matches!(load_run(&dir, "missing"), Err(AppError::RunNotFound(_))));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn failed_step_keeps_partial_diagnostics() {
    let config = RunConfig {
        newton: NewtonSettings {
            max_iterations: 1,
            ..NewtonSettings::default()
        },
        ..small_config()
    };
    let outcome = run(&config, &RunOptions::default()).unwrap();
    assert!(!outcome.is_success());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.error.as_ref().unwrap().failed_step(), Some(1));
    assert!(!outcome.summary().is_completed());
    assert!(outcome.into_result().is_err());
}

#[test]
fn invalid_config_fails_before_solving() {
    let config = RunConfig {
        order: 0,
        ..RunConfig::default()
    };
    assert!(matches!(
        run(&config, &RunOptions::default()),
        Err(AppError::InvalidInput(_))
    ));
}

#[test]
fn progress_events_cover_every_step() {
    let mut stages = Vec::new();
    let mut steps = Vec::new();
    let mut cb = |event: tl_app::RunProgressEvent| {
        if let Some(step) = &event.step {
            steps.push(step.step);
        }
        stages.push(event.stage);
    };
    let outcome = run_with_progress(&small_config(), &RunOptions::default(), Some(&mut cb)).unwrap();
    assert!(outcome.is_success());
    assert_eq!(steps, vec![0, 1, 2, 3, 4]);
    assert_eq!(stages.first(), Some(&RunStage::Validating));
    assert_eq!(stages.last(), Some(&RunStage::Completed));
}
