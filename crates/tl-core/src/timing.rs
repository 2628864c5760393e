//! Lightweight performance timing utilities.
//!
//! Timers are cheap no-ops unless timing is enabled, either
//! programmatically or through the `TL_TIMING` environment variable.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable performance timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("TL_TIMING").is_ok()
}

/// A simple timer that measures elapsed time.
pub struct Timer {
    start: Instant,
    enabled: bool,
}

impl Timer {
    /// Create and start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            enabled: is_enabled(),
        }
    }

    /// Stop the timer and return elapsed time in seconds.
    /// If timing is disabled, returns None.
    pub fn stop(self) -> Option<f64> {
        if self.enabled {
            Some(self.start.elapsed().as_secs_f64())
        } else {
            None
        }
    }

    /// Stop the timer and add the elapsed time to an accumulator.
    pub fn stop_into(self, acc: &AccumulatingTimer) {
        if let Some(elapsed) = self.stop() {
            acc.record(elapsed);
        }
    }
}

/// Accumulating timer for tracking total time across multiple calls.
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for AccumulatingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatingTimer {
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Record a timing measurement.
    pub fn record(&self, duration_s: f64) {
        let nanos = (duration_s * 1e9) as u64;
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Total time spent (in seconds).
    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 / 1e9
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Counters for the hot spots of a nonlinear solve.
pub mod solver_timing {
    use super::AccumulatingTimer;

    /// Residual evaluations (element loop + reduction)
    pub static RESIDUAL: AccumulatingTimer = AccumulatingTimer::new();
    /// Tangent evaluations (element loop + reduction)
    pub static TANGENT: AccumulatingTimer = AccumulatingTimer::new();
    /// Linear solves of the saddle-point system
    pub static LINEAR_SOLVE: AccumulatingTimer = AccumulatingTimer::new();
    /// Per-step stress recovery
    pub static POST_PROCESS: AccumulatingTimer = AccumulatingTimer::new();

    pub fn reset_all() {
        RESIDUAL.reset();
        TANGENT.reset();
        LINEAR_SOLVE.reset();
        POST_PROCESS.reset();
    }

    /// Snapshot of all counters.
    pub fn summary() -> TimingSummary {
        TimingSummary {
            residual_s: RESIDUAL.total_seconds(),
            residual_count: RESIDUAL.count(),
            tangent_s: TANGENT.total_seconds(),
            tangent_count: TANGENT.count(),
            linear_solve_s: LINEAR_SOLVE.total_seconds(),
            linear_solve_count: LINEAR_SOLVE.count(),
            post_process_s: POST_PROCESS.total_seconds(),
            post_process_count: POST_PROCESS.count(),
        }
    }

    #[derive(Clone, Debug, Default)]
    pub struct TimingSummary {
        pub residual_s: f64,
        pub residual_count: u64,
        pub tangent_s: f64,
        pub tangent_count: u64,
        pub linear_solve_s: f64,
        pub linear_solve_count: u64,
        pub post_process_s: f64,
        pub post_process_count: u64,
    }

    impl TimingSummary {
        /// Print the breakdown if timing is enabled.
        pub fn print(&self) {
            if !super::is_enabled() {
                return;
            }
            println!("\n=== Solver Timing ===");
            let rows = [
                ("residual", self.residual_count, self.residual_s),
                ("tangent", self.tangent_count, self.tangent_s),
                ("linear solve", self.linear_solve_count, self.linear_solve_s),
                ("post-process", self.post_process_count, self.post_process_s),
            ];
            for (label, count, total) in rows {
                if count > 0 {
                    println!(
                        "{:<14} {:>6} calls, {:.3}s total, {:.4}ms avg",
                        label,
                        count,
                        total,
                        total / count as f64 * 1000.0
                    );
                }
            }
            println!("=====================\n");
        }
    }
}
