//! Per-step diagnostics and the analytic comparison.

use tl_core::relative_error;

/// What one converged step reports.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticRecord {
    pub step: usize,
    pub time: f64,
    /// Largest axial displacement over all displacement nodes
    pub max_ux: f64,
    /// `1 + max_ux / L_x`
    pub stretch: f64,
    /// Cell-averaged axial 2nd Piola-Kirchhoff stress of the reported cell
    pub s_xx: f64,
    /// `s_xx * stretch²`
    pub true_stress: f64,
    pub analytic_stress: f64,
    pub iterations: usize,
    pub residual_norm: f64,
    /// Extremes of `det F` over every integration point
    pub min_j: f64,
    pub max_j: f64,
}

impl DiagnosticRecord {
    pub fn difference(&self) -> f64 {
        self.true_stress - self.analytic_stress
    }

    pub fn relative_error(&self) -> f64 {
        relative_error(self.true_stress, self.analytic_stress)
    }
}

/// One line of the FEM/analytic table.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonRow {
    pub stretch: f64,
    pub fem: f64,
    pub analytic: f64,
    pub difference: f64,
}

/// Append-only record of a run, one entry per converged step.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    records: Vec<DiagnosticRecord>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DiagnosticRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[DiagnosticRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&DiagnosticRecord> {
        self.records.last()
    }

    /// `(stretch, true stress)` in step order.
    pub fn stretch_stress_pairs(&self) -> Vec<(f64, f64)> {
        self.records
            .iter()
            .map(|r| (r.stretch, r.true_stress))
            .collect()
    }

    /// Worst relative deviation from the analytic curve.
    ///
    /// Entries with zero analytic stress contribute their absolute error.
    pub fn max_relative_error(&self) -> Option<f64> {
        self.records
            .iter()
            .map(DiagnosticRecord::relative_error)
            .reduce(f64::max)
    }

    /// True stress never decreases from one step to the next.
    pub fn is_monotonic(&self) -> bool {
        self.records
            .windows(2)
            .all(|w| w[1].true_stress >= w[0].true_stress)
    }

    pub fn total_iterations(&self) -> usize {
        self.records.iter().map(|r| r.iterations).sum()
    }

    pub fn comparison(&self) -> Vec<ComparisonRow> {
        self.records
            .iter()
            .map(|r| ComparisonRow {
                stretch: r.stretch,
                fem: r.true_stress,
                analytic: r.analytic_stress,
                difference: r.difference(),
            })
            .collect()
    }
}

impl Extend<DiagnosticRecord> for Diagnostics {
    fn extend<T: IntoIterator<Item = DiagnosticRecord>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}
