//! Reference vs candidate timing across problem sizes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::env::{LaunchEnv, THREADS_VAR};
use crate::error::{BenchError, Result};
use crate::launch::{Invocation, Launcher};
use crate::metrics::{RunMetrics, parse_metrics};

pub const DEFAULT_SIZES: &str = "30,50,70,90,110";
pub const DEFAULT_ITERATIONS: u32 = 100;
pub const DEFAULT_REFERENCE_THREADS: u32 = 24;
pub const DEFAULT_REPEATS: u32 = 1;

/// One size's averaged measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedupRow {
    pub size: u32,
    pub reference_elapsed_s: f64,
    pub candidate_elapsed_s: f64,
    pub reference_fom: f64,
    pub candidate_fom: f64,
    /// `reference_elapsed_s / candidate_elapsed_s`
    pub speedup_time: f64,
    /// `candidate_fom / reference_fom`, or 0 when the reference FOM is 0.
    pub speedup_fom: f64,
}

impl SpeedupRow {
    pub fn from_means(size: u32, reference: RunMetrics, candidate: RunMetrics) -> Result<Self> {
        if candidate.elapsed_s == 0.0 {
            return Err(BenchError::ZeroElapsed { size });
        }
        let speedup_fom =
            if reference.fom == 0.0 { 0.0 } else { candidate.fom / reference.fom };
        Ok(Self {
            size,
            reference_elapsed_s: reference.elapsed_s,
            candidate_elapsed_s: candidate.elapsed_s,
            reference_fom: reference.fom,
            candidate_fom: candidate.fom,
            speedup_time: reference.elapsed_s / candidate.elapsed_s,
            speedup_fom,
        })
    }
}

/// What to run and how often.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedupPlan {
    pub reference_bin: PathBuf,
    pub candidate_bin: PathBuf,
    pub sizes: Vec<u32>,
    pub iterations: u32,
    pub repeats: u32,
    pub reference_env: LaunchEnv,
    pub candidate_env: LaunchEnv,
    pub cwd: Option<PathBuf>,
}

impl SpeedupPlan {
    /// Plan with the default sizes, iterations and repeats. The reference side
    /// runs with [`DEFAULT_REFERENCE_THREADS`] OpenMP threads.
    pub fn new(
        reference_bin: impl Into<PathBuf>,
        candidate_bin: impl Into<PathBuf>,
        env: LaunchEnv,
    ) -> Self {
        Self {
            reference_bin: reference_bin.into(),
            candidate_bin: candidate_bin.into(),
            sizes: vec![30, 50, 70, 90, 110],
            iterations: DEFAULT_ITERATIONS,
            repeats: DEFAULT_REPEATS,
            reference_env: env.with_var(THREADS_VAR, DEFAULT_REFERENCE_THREADS.to_string()),
            candidate_env: env,
            cwd: None,
        }
    }

    #[must_use]
    pub fn with_reference_threads(mut self, threads: u32) -> Self {
        self.reference_env = self.reference_env.with_var(THREADS_VAR, threads.to_string());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sizes.is_empty() {
            return Err(BenchError::NoSizes);
        }
        if self.repeats == 0 {
            return Err(BenchError::InvalidRepeats);
        }
        Ok(())
    }

    fn invocation(&self, program: &std::path::Path, env: &LaunchEnv, size: u32) -> Invocation {
        Invocation::simulation(program, size, self.iterations, env.clone())
            .with_cwd(self.cwd.clone())
    }
}

/// Split `"30, 50,,70"` into sizes, skipping empty tokens.
pub fn parse_sizes(value: &str) -> Result<Vec<u32>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<u32>().map_err(|_| BenchError::InvalidSize { token: t.to_string() }))
        .collect()
}

/// Time both binaries at every planned size.
pub fn run_speedup(launcher: &dyn Launcher, plan: &SpeedupPlan) -> Result<Vec<SpeedupRow>> {
    plan.validate()?;

    let mut rows = Vec::with_capacity(plan.sizes.len());
    for &size in &plan.sizes {
        let mut reference = Vec::with_capacity(plan.repeats as usize);
        let mut candidate = Vec::with_capacity(plan.repeats as usize);

        for _ in 0..plan.repeats {
            let inv = plan.invocation(&plan.reference_bin, &plan.reference_env, size);
            reference.push(parse_metrics(&launcher.launch(&inv)?)?);

            let inv = plan.invocation(&plan.candidate_bin, &plan.candidate_env, size);
            candidate.push(parse_metrics(&launcher.launch(&inv)?)?);
        }

        let row = SpeedupRow::from_means(size, mean(&reference), mean(&candidate))?;
        info!(
            size,
            reference_s = row.reference_elapsed_s,
            candidate_s = row.candidate_elapsed_s,
            speedup = row.speedup_time,
            "measured size"
        );
        rows.push(row);
    }
    Ok(rows)
}

/// Arithmetic mean of each metric. `runs` is non-empty.
fn mean(runs: &[RunMetrics]) -> RunMetrics {
    let n = runs.len() as f64;
    RunMetrics {
        elapsed_s: runs.iter().map(|m| m.elapsed_s).sum::<f64>() / n,
        fom: runs.iter().map(|m| m.fom).sum::<f64>() / n,
    }
}
