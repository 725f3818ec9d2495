//! Per-cycle reporting

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use simparity_core::ParityConfig;
use simparity_report::{ParityReceipt, write_cycle_csv, write_step_csv};

use super::ComparisonArgs;
use crate::output::ProgressPrinter;

/// Report command arguments
#[derive(Args, Debug)]
pub struct ReportCommand {
    #[command(flatten)]
    pub args: ComparisonArgs,

    /// Per-cycle CSV output
    #[arg(long, value_name = "PATH", default_value = "correctness.csv")]
    pub out_csv: PathBuf,

    /// Per-step CSV output
    #[arg(long, value_name = "PATH", default_value = "correctness_steps.csv")]
    pub out_steps_csv: PathBuf,

    /// Also write a JSON parity receipt
    #[arg(long, value_name = "PATH")]
    pub receipt: Option<PathBuf>,
}

impl ReportCommand {
    /// Nothing is written when the run cannot start (no steps, bad settings).
    pub fn execute(&self, base: &ParityConfig) -> Result<i32> {
        let config = self.args.resolve(base)?;
        let mut printer = ProgressPrinter::stdout(config.quiet);
        let run = self.args.aggregator(&config).run(&mut printer)?;
        printer.finish(&run.verdict).context("Failed to write progress")?;

        write_cycle_csv(&self.out_csv, &run.cycles)
            .with_context(|| format!("Failed to write {}", self.out_csv.display()))?;
        println!("Wrote CSV: {}", self.out_csv.display());

        write_step_csv(&self.out_steps_csv, &run.steps)
            .with_context(|| format!("Failed to write {}", self.out_steps_csv.display()))?;
        println!("Wrote step CSV: {}", self.out_steps_csv.display());

        if let Some(path) = &self.receipt {
            ParityReceipt::new(
                &self.args.reference,
                &self.args.candidate,
                config.precision,
                config.tolerances(),
                &run,
            )
            .write_to_file(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote receipt: {}", path.display());
        }

        Ok(run.verdict.exit_code())
    }
}
