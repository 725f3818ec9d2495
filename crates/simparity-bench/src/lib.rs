//! Timing harness for reference and candidate simulation binaries.
//!
//! Each binary is run at a series of problem sizes with a scrubbed,
//! immutable environment; elapsed time and figure of merit are scraped from
//! its output and averaged over repeats into speedup rows.

pub mod env;
pub mod error;
pub mod launch;
pub mod metrics;
pub mod speedup;

pub use env::{DEFAULT_SCRUB_PREFIX, LaunchEnv, THREADS_VAR};
pub use error::{BenchError, Result};
pub use launch::{Invocation, Launcher, ProcessLauncher};
pub use metrics::{RunMetrics, parse_metrics};
pub use speedup::{
    DEFAULT_ITERATIONS, DEFAULT_REFERENCE_THREADS, DEFAULT_REPEATS, DEFAULT_SIZES, SpeedupPlan,
    SpeedupRow, parse_sizes, run_speedup,
};
