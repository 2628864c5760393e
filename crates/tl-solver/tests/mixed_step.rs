//! Single load steps through the public solver API.

use nalgebra::DVector;
use tl_mesh::{BlockMeshBuilder, BoxFace};
use tl_solver::{
    BcEnforcer, DenseLu, EssentialBc, Equations, FullPivLu, MixedProblem, NewtonConfig,
    SolverError, TermMode, evaluate_term, solve_step,
};

#[test]
fn quadratic_displacement_linear_pressure_step() {
    let mesh = BlockMeshBuilder::new().shape([2, 2, 2]).build().unwrap();
    let problem = MixedProblem::new(mesh, 2, Equations::mooney_rivlin_up(40.0, 20.0)).unwrap();
    let bcs = BcEnforcer::new(
        problem.u_field(),
        problem.n_dofs(),
        EssentialBc::uniaxial_stretch(),
    )
    .unwrap();

    let x0 = DVector::zeros(problem.n_dofs());
    let report = solve_step(
        &problem,
        &bcs,
        &x0,
        0.5,
        &FullPivLu,
        &NewtonConfig::default(),
        true,
    )
    .unwrap();
    assert!(report.iterations < 20);
    assert!(report.residual_norm < 1e-8);

    // Constant pressure over the block
    let layout = problem.layout();
    let p = layout.p_part(report.x.as_slice());
    for value in p {
        assert!((value - p[0]).abs() < 1e-8);
    }

    let strain = evaluate_term(
        &problem,
        &problem.equations().balance().terms()[0].1,
        TermMode::Strain,
        &report.x,
    )
    .unwrap();
    assert!((strain[0][0] - 0.5 * (1.5f64.powi(2) - 1.0)).abs() < 1e-8);
}

#[test]
fn unconstrained_rigid_mode_is_a_setup_error() {
    let mesh = BlockMeshBuilder::new().shape([2, 2, 2]).build().unwrap();
    let problem = MixedProblem::new(mesh, 1, Equations::mooney_rivlin_up(40.0, 20.0)).unwrap();
    let bcs = vec![
        EssentialBc::fixed("x_sym", BoxFace::Left, 0, 0.0),
        EssentialBc::fixed("z_sym", BoxFace::Bottom, 2, 0.0),
    ];
    let err = BcEnforcer::new(problem.u_field(), problem.n_dofs(), bcs).unwrap_err();
    assert!(matches!(err, SolverError::ProblemSetup { .. }));
}

#[test]
fn custom_time_function_drives_the_load() {
    let mesh = BlockMeshBuilder::new().shape([2, 2, 2]).build().unwrap();
    let problem = MixedProblem::new(mesh, 1, Equations::mooney_rivlin_up(40.0, 20.0)).unwrap();
    let bcs = vec![
        EssentialBc::fixed("x_sym", BoxFace::Left, 0, 0.0),
        EssentialBc::fixed("y_sym", BoxFace::Near, 1, 0.0),
        EssentialBc::fixed("z_sym", BoxFace::Bottom, 2, 0.0),
        EssentialBc::function("pull", BoxFace::Right, 0, |t, _x: [f64; 3]| 0.1 * t),
    ];
    let enforcer = BcEnforcer::new(problem.u_field(), problem.n_dofs(), bcs).unwrap();
    let x0 = DVector::zeros(problem.n_dofs());
    let report = solve_step(
        &problem,
        &enforcer,
        &x0,
        3.0,
        &DenseLu,
        &NewtonConfig::default(),
        false,
    )
    .unwrap();
    let u = problem.u_field();
    let max_ux = (0..u.n_nodes())
        .map(|n| report.x[u.dof(n, 0)])
        .fold(f64::MIN, f64::max);
    assert!((max_ux - 0.3).abs() < 1e-12);
}
