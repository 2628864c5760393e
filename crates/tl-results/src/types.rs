//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub label: String,
    /// RFC 3339, UTC
    pub timestamp: String,
    pub solver_version: String,
    /// Configuration the run was made with
    pub config: serde_json::Value,
    pub outcome: RunOutcomeSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcomeSummary {
    Completed {
        steps: usize,
        total_iterations: usize,
        max_relative_error: Option<f64>,
    },
    Failed {
        steps: usize,
        failed_step: Option<usize>,
        message: String,
    },
}

impl RunOutcomeSummary {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcomeSummary::Completed { .. })
    }

    pub fn steps(&self) -> usize {
        match self {
            RunOutcomeSummary::Completed { steps, .. } | RunOutcomeSummary::Failed { steps, .. } => {
                *steps
            }
        }
    }
}

/// One converged load step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepRecord {
    pub step: usize,
    pub time: f64,
    pub max_ux: f64,
    pub stretch: f64,
    pub s_xx: f64,
    pub true_stress: f64,
    pub analytic_stress: f64,
    pub iterations: usize,
    pub residual_norm: f64,
    pub min_j: f64,
    pub max_j: f64,
}

/// One row of `comparison.csv`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ComparisonRecord {
    pub stretch: f64,
    pub fem: f64,
    pub analytic: f64,
    pub difference: f64,
}

impl From<&StepRecord> for ComparisonRecord {
    fn from(step: &StepRecord) -> Self {
        Self {
            stretch: step.stretch,
            fem: step.true_stress,
            analytic: step.analytic_stress,
            difference: step.true_stress - step.analytic_stress,
        }
    }
}

impl RunManifest {
    /// Manifest stamped with the current UTC time.
    pub fn new(
        run_id: RunId,
        label: impl Into<String>,
        solver_version: impl Into<String>,
        config: serde_json::Value,
        outcome: RunOutcomeSummary,
    ) -> Self {
        Self {
            run_id,
            label: label.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            solver_version: solver_version.into(),
            config,
            outcome,
        }
    }
}
