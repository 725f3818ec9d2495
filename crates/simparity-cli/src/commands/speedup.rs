//! Speedup measurement command

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use simparity_bench::{
    DEFAULT_ITERATIONS, DEFAULT_REFERENCE_THREADS, DEFAULT_REPEATS, DEFAULT_SCRUB_PREFIX,
    DEFAULT_SIZES, LaunchEnv, ProcessLauncher, SpeedupPlan, parse_sizes, run_speedup,
};
use simparity_report::write_speedup_csv;

use crate::exit::EXIT_PASS;

/// Speedup command arguments
#[derive(Args, Debug)]
pub struct SpeedupCommand {
    /// Reference simulation binary
    #[arg(long, value_name = "PATH")]
    pub reference_bin: PathBuf,

    /// Candidate simulation binary
    #[arg(long, value_name = "PATH")]
    pub candidate_bin: PathBuf,

    /// Comma-separated problem sizes
    #[arg(long, default_value = DEFAULT_SIZES, value_name = "LIST")]
    pub sizes: String,

    /// Iterations per run
    #[arg(long, default_value_t = DEFAULT_ITERATIONS, value_name = "N")]
    pub iterations: u32,

    /// OpenMP threads for the reference binary
    #[arg(long, default_value_t = DEFAULT_REFERENCE_THREADS, value_name = "N")]
    pub reference_threads: u32,

    /// Runs per size to average
    #[arg(long, default_value_t = DEFAULT_REPEATS, value_name = "N")]
    pub repeats: u32,

    /// Output CSV
    #[arg(short, long, default_value = "speedup.csv", value_name = "PATH")]
    pub out: PathBuf,

    /// Environment variable prefix removed before launching (repeatable)
    #[arg(long, value_name = "PREFIX", default_values_t = [DEFAULT_SCRUB_PREFIX.to_string()])]
    pub scrub_prefix: Vec<String>,

    /// Working directory for both binaries
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

impl SpeedupCommand {
    pub fn plan(&self) -> Result<SpeedupPlan> {
        let env = LaunchEnv::from_process(self.scrub_prefix.as_slice());
        let mut plan = SpeedupPlan::new(&self.reference_bin, &self.candidate_bin, env)
            .with_reference_threads(self.reference_threads);
        plan.sizes = parse_sizes(&self.sizes)?;
        plan.iterations = self.iterations;
        plan.repeats = self.repeats;
        plan.cwd = self.cwd.clone();
        plan.validate()?;
        Ok(plan)
    }

    pub fn execute(&self) -> Result<i32> {
        let plan = self.plan()?;
        let rows = run_speedup(&ProcessLauncher, &plan)?;

        for row in &rows {
            println!(
                "size {:>4}: {} x (reference {:.3}s, candidate {:.3}s)",
                row.size,
                style(format!("{:.2}", row.speedup_time)).bold(),
                row.reference_elapsed_s,
                row.candidate_elapsed_s
            );
        }

        write_speedup_csv(&self.out, &rows)
            .with_context(|| format!("Failed to write {}", self.out.display()))?;
        println!("Wrote CSV: {}", self.out.display());
        Ok(EXIT_PASS)
    }
}
