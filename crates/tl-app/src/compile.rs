//! Builds the solver-side problem from a validated configuration.

use tl_core::units::Length;
use tl_material::MooneyRivlin;
use tl_mesh::BlockMeshBuilder;
use tl_solver::{BcEnforcer, EssentialBc, Equations, MixedProblem};
use tracing::debug;
use uom::si::length::meter;

use crate::config::RunConfig;
use crate::error::AppResult;

/// Problem, constraints and material of one run.
#[derive(Debug)]
pub struct CompiledProblem {
    pub problem: MixedProblem,
    pub bcs: BcEnforcer,
    pub material: MooneyRivlin,
}

/// Mesh, mixed fields, Mooney-Rivlin equations and the uniaxial-stretch
/// constraints for `config`.
pub fn compile(config: &RunConfig) -> AppResult<CompiledProblem> {
    config.validate()?;

    let (c10, c01) = config.material.coefficients();
    let material = MooneyRivlin::from_coefficients(c10, c01)?;

    let dims = config.block_dims().map(|d: Length| d.get::<meter>());
    let mut builder = BlockMeshBuilder::new().dims(dims).shape(config.shape);
    if let Some(centre) = config.centre {
        builder = builder.centre(centre);
    }
    let mesh = builder.build()?;

    let equations = Equations::mooney_rivlin_up(material.mu, material.kappa);
    let problem = MixedProblem::new(mesh, config.order, equations)?;
    let bcs = BcEnforcer::new(
        problem.u_field(),
        problem.n_dofs(),
        EssentialBc::uniaxial_stretch(),
    )?;
    debug!(
        n_cells = problem.n_cells(),
        n_u = problem.layout().n_u,
        n_p = problem.layout().n_p,
        constrained = bcs.n_constrained(),
        "compiled problem"
    );

    Ok(CompiledProblem {
        problem,
        bcs,
        material,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn default_config_gives_q1_p0() {
        let compiled = compile(&RunConfig::default()).unwrap();
        assert_eq!(compiled.problem.layout().n_u, 3 * 64);
        assert_eq!(compiled.problem.layout().n_p, 27);
        assert_eq!(compiled.material.c10(), 20.0);
        assert_eq!(compiled.material.c01(), 10.0);
    }

    #[test]
    fn second_order_gives_q2_q1() {
        let config = RunConfig {
            order: 2,
            shape: [3, 3, 3],
            ..RunConfig::default()
        };
        let compiled = compile(&config).unwrap();
        assert_eq!(compiled.problem.layout().n_u, 3 * 125);
        assert_eq!(compiled.problem.layout().n_p, 27);
    }

    #[test]
    fn invalid_config_is_rejected_before_meshing() {
        let config = RunConfig {
            shape: [4, 1, 4],
            ..RunConfig::default()
        };
        assert!(matches!(compile(&config), Err(AppError::InvalidInput(_))));
    }
}
