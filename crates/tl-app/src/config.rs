//! Run configuration: defaults, file loading, validation and the
//! comma-separated triples accepted on the command line.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tl_core::units::{Length, Pressure, m, pa};
use tl_sim::SimOptions;
use tl_solver::{DenseLu, FullPivLu, LinearSolver, NewtonConfig};

use crate::error::{AppError, AppResult};

/// Load interval and number of instants (both ends included).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub t0: f64,
    pub t1: f64,
    pub n_steps: usize,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            t0: 0.0,
            t1: 10.0,
            n_steps: 11,
        }
    }
}

/// Mooney-Rivlin coefficients in pascal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub c10: f64,
    pub c01: f64,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            c10: 20.0,
            c01: 10.0,
        }
    }
}

impl MaterialConfig {
    pub fn coefficients(&self) -> (Pressure, Pressure) {
        (pa(self.c10), pa(self.c01))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonSettings {
    pub max_iterations: usize,
    pub abs_tol: f64,
    pub rel_tol: f64,
    pub step_tol: f64,
    pub line_search_beta: f64,
    pub line_search_min: f64,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        let c = NewtonConfig::default();
        Self {
            max_iterations: c.max_iterations,
            abs_tol: c.abs_tol,
            rel_tol: c.rel_tol,
            step_tol: c.step_tol,
            line_search_beta: c.line_search_beta,
            line_search_min: c.line_search_min,
        }
    }
}

impl From<NewtonSettings> for NewtonConfig {
    fn from(s: NewtonSettings) -> Self {
        NewtonConfig {
            max_iterations: s.max_iterations,
            abs_tol: s.abs_tol,
            rel_tol: s.rel_tol,
            step_tol: s.step_tol,
            line_search_beta: s.line_search_beta,
            line_search_min: s.line_search_min,
        }
    }
}

/// Dense factorization used for the Newton systems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearSolverKind {
    #[default]
    DenseLu,
    FullPivLu,
}

impl LinearSolverKind {
    pub fn build(self) -> Box<dyn LinearSolver> {
        match self {
            LinearSolverKind::DenseLu => Box::new(DenseLu),
            LinearSolverKind::FullPivLu => Box::new(FullPivLu),
        }
    }
}

/// Everything a run depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Displacement approximation order; pressure uses `order - 1`
    pub order: usize,
    pub dims: [f64; 3],
    /// Vertices per axis
    pub shape: [usize; 3],
    /// Block centre; `None` puts the block in `[0, dims]`
    pub centre: Option<[f64; 3]>,
    pub time: TimeConfig,
    pub material: MaterialConfig,
    pub newton: NewtonSettings,
    pub linear_solver: LinearSolverKind,
    pub parallel: bool,
    /// Print the FEM/analytic comparison
    pub plot: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            order: 1,
            dims: [1.0, 1.0, 1.0],
            shape: [4, 4, 4],
            centre: None,
            time: TimeConfig::default(),
            material: MaterialConfig::default(),
            newton: NewtonSettings::default(),
            linear_solver: LinearSolverKind::default(),
            parallel: true,
            plot: false,
        }
    }
}

/// Largest order whose `2 * order` rule the quadrature tables cover.
const MAX_ORDER: usize = 5;

impl RunConfig {
    /// Loads YAML (`.yaml`, `.yml`) or JSON (`.json`); missing keys keep
    /// their defaults.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigFileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let parse_err = |message: String| AppError::ConfigParse {
            path: path.to_path_buf(),
            message,
        };
        match extension(path).as_deref() {
            Some("json") => serde_json::from_str(&content).map_err(|e| parse_err(e.to_string())),
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&content).map_err(|e| parse_err(e.to_string()))
            }
            _ => Err(parse_err(
                "unknown extension (expected .yaml, .yml or .json)".to_string(),
            )),
        }
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        let content = match extension(path).as_deref() {
            Some("json") => serde_json::to_string_pretty(self)
                .map_err(|e| AppError::InvalidInput(e.to_string()))?,
            _ => serde_yaml::to_string(self).map_err(|e| AppError::InvalidInput(e.to_string()))?,
        };
        std::fs::write(path, content).map_err(|e| AppError::ConfigFileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Every problem with the configuration, empty when it is usable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.order == 0 || self.order > MAX_ORDER {
            problems.push(format!("order must be in 1..={MAX_ORDER}, got {}", self.order));
        }
        for (axis, &n) in self.shape.iter().enumerate() {
            if n < 2 {
                problems.push(format!("shape[{axis}] must be at least 2, got {n}"));
            }
        }
        for (axis, &d) in self.dims.iter().enumerate() {
            if !(d.is_finite() && d > 0.0) {
                problems.push(format!("dims[{axis}] must be positive, got {d}"));
            }
        }
        if let Some(centre) = self.centre
            && centre.iter().any(|c| !c.is_finite())
        {
            problems.push("centre must be finite".to_string());
        }
        let TimeConfig { t0, t1, n_steps } = self.time;
        if !(t0.is_finite() && t1.is_finite()) {
            problems.push("time bounds must be finite".to_string());
        } else if t1 < t0 {
            problems.push(format!("t1 ({t1}) must not precede t0 ({t0})"));
        }
        if n_steps == 0 {
            problems.push("n_steps must be at least 1".to_string());
        }
        let MaterialConfig { c10, c01 } = self.material;
        if !(c10.is_finite() && c01.is_finite()) || c10 < 0.0 || c01 < 0.0 {
            problems.push("c10 and c01 must be finite and non-negative".to_string());
        } else if c10 + c01 <= 0.0 {
            problems.push("c10 + c01 must be positive".to_string());
        }
        if self.newton.max_iterations == 0 {
            problems.push("newton.max_iterations must be positive".to_string());
        }
        if !(self.newton.line_search_beta > 0.0 && self.newton.line_search_beta < 1.0) {
            problems.push("newton.line_search_beta must lie in (0, 1)".to_string());
        }
        problems
    }

    pub fn validate(&self) -> AppResult<()> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidInput(problems.join("; ")))
        }
    }

    pub fn block_dims(&self) -> [Length; 3] {
        self.dims.map(m)
    }

    pub fn sim_options(&self) -> SimOptions {
        SimOptions {
            t0: self.time.t0,
            t1: self.time.t1,
            n_steps: self.time.n_steps,
            newton: self.newton.into(),
            parallel: self.parallel,
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn split_triple(s: &str, what: &str) -> AppResult<[String; 3]> {
    let parts: Vec<String> = s.split(',').map(|p| p.trim().to_string()).collect();
    match <[String; 3]>::try_from(parts) {
        Ok(parts) => Ok(parts),
        Err(parts) => Err(AppError::InvalidInput(format!(
            "{what} needs three comma-separated values, got {} in '{s}'",
            parts.len()
        ))),
    }
}

fn parse_value<T: std::str::FromStr>(s: &str, what: &str) -> AppResult<T> {
    s.parse()
        .map_err(|_| AppError::InvalidInput(format!("cannot parse {what} value '{s}'")))
}

/// Parses `"t0,t1,n_steps"`.
pub fn parse_time_triple(s: &str) -> AppResult<TimeConfig> {
    let [t0, t1, n] = split_triple(s, "time")?;
    Ok(TimeConfig {
        t0: parse_value(&t0, "t0")?,
        t1: parse_value(&t1, "t1")?,
        n_steps: parse_value(&n, "n_steps")?,
    })
}

/// Parses `"x,y,z"` into reals.
pub fn parse_real_triple(s: &str) -> AppResult<[f64; 3]> {
    let [x, y, z] = split_triple(s, "triple")?;
    Ok([parse_value(&x, "x")?, parse_value(&y, "y")?, parse_value(&z, "z")?])
}

/// Parses `"nx,ny,nz"` into counts.
pub fn parse_count_triple(s: &str) -> AppResult<[usize; 3]> {
    let [x, y, z] = split_triple(s, "triple")?;
    Ok([parse_value(&x, "x")?, parse_value(&y, "y")?, parse_value(&z, "z")?])
}
