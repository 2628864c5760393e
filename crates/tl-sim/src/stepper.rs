//! Load instants of a quasi-static run.

use crate::error::{SimError, SimResult};

/// Equally spaced instants from `t0` to `t1`, both included.
///
/// `n_steps` counts instants, so `(0, 10, 11)` visits `0, 1, ..., 10` and
/// `n_steps = 1` visits `t0` only.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeStepper {
    t0: f64,
    t1: f64,
    n_steps: usize,
    step: usize,
}

impl TimeStepper {
    pub fn new(t0: f64, t1: f64, n_steps: usize) -> SimResult<Self> {
        if !t0.is_finite() || !t1.is_finite() {
            return Err(SimError::InvalidArg {
                what: "time bounds must be finite",
            });
        }
        if t1 < t0 {
            return Err(SimError::InvalidArg {
                what: "t1 must not precede t0",
            });
        }
        if n_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "n_steps must be positive",
            });
        }
        Ok(Self {
            t0,
            t1,
            n_steps,
            step: 0,
        })
    }

    pub fn t0(&self) -> f64 {
        self.t0
    }

    pub fn t1(&self) -> f64 {
        self.t1
    }

    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Spacing between instants (zero for a single instant).
    pub fn dt(&self) -> f64 {
        if self.n_steps < 2 {
            0.0
        } else {
            (self.t1 - self.t0) / (self.n_steps - 1) as f64
        }
    }

    /// Time of instant `step`; the last instant is exactly `t1`.
    pub fn time_at(&self, step: usize) -> f64 {
        if self.n_steps > 1 && step + 1 == self.n_steps {
            self.t1
        } else {
            self.t0 + step as f64 * self.dt()
        }
    }

    /// Index of the next instant to visit.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn is_done(&self) -> bool {
        self.step >= self.n_steps
    }

    /// All instants, independent of the cursor.
    pub fn times(&self) -> Vec<f64> {
        (0..self.n_steps).map(|i| self.time_at(i)).collect()
    }

    /// Fraction of the instants already visited.
    pub fn progress(&self) -> f64 {
        self.step.min(self.n_steps) as f64 / self.n_steps as f64
    }
}

impl Iterator for TimeStepper {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_done() {
            return None;
        }
        let step = self.step;
        self.step += 1;
        Some((step, self.time_at(step)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.n_steps.saturating_sub(self.step);
        (left, Some(left))
    }
}

impl ExactSizeIterator for TimeStepper {}
