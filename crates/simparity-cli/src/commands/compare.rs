//! Pass/fail parity check

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use simparity_core::{ComparisonAggregator, NoProgress, ParityConfig, Precision, parse_list};
use simparity_report::ParityReceipt;
use tracing::info;

use crate::output::{ProgressPrinter, verdict_label};

/// Run tree selection and tolerance flags shared by `compare` and `report`.
#[derive(Args, Debug, Clone)]
pub struct ComparisonArgs {
    /// Reference run root (authoritative for which steps and fields exist)
    #[arg(long, value_name = "DIR")]
    pub reference: PathBuf,

    /// Candidate run root
    #[arg(long, value_name = "DIR")]
    pub candidate: PathBuf,

    /// Precision mode selecting default tolerances (double, float)
    #[arg(long, value_name = "MODE")]
    pub precision: Option<Precision>,

    /// Absolute tolerance override
    #[arg(long, value_name = "TOL")]
    pub abs_tol: Option<f64>,

    /// Relative tolerance override
    #[arg(long, value_name = "TOL")]
    pub rel_tol: Option<f64>,

    /// Comma-separated step directory names
    #[arg(long, value_name = "LIST")]
    pub steps: Option<String>,

    /// Comma-separated field basenames
    #[arg(long, value_name = "LIST")]
    pub fields: Option<String>,

    /// Skip missing directories/files instead of failing
    #[arg(long)]
    pub allow_missing: bool,

    /// Suppress per-file progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Data subdirectory inside each step
    #[arg(long, value_name = "NAME")]
    pub data_subdir: Option<String>,

    /// Field file extension
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,
}

impl ComparisonArgs {
    /// Layer command-line flags over `base` and validate the result.
    pub fn resolve(&self, base: &ParityConfig) -> Result<ParityConfig> {
        let mut config = base.clone();
        if let Some(precision) = self.precision {
            config.precision = precision;
        }
        if self.abs_tol.is_some() {
            config.abs_tol = self.abs_tol;
        }
        if self.rel_tol.is_some() {
            config.rel_tol = self.rel_tol;
        }
        if let Some(steps) = &self.steps {
            config.steps = parse_list(steps);
        }
        if let Some(fields) = &self.fields {
            config.fields = parse_list(fields);
        }
        config.allow_missing |= self.allow_missing;
        config.quiet |= self.quiet;
        if let Some(subdir) = &self.data_subdir {
            config.data_subdir = subdir.clone();
        }
        if let Some(ext) = &self.extension {
            config.extension = ext.clone();
        }
        config.validate().context("Invalid comparison settings")?;
        Ok(config)
    }

    pub fn aggregator(&self, config: &ParityConfig) -> ComparisonAggregator {
        ComparisonAggregator::new(&self.reference, &self.candidate, config.aggregate_options())
    }
}

/// Compare command arguments
#[derive(Args, Debug)]
pub struct CompareCommand {
    #[command(flatten)]
    pub args: ComparisonArgs,

    /// Print a JSON receipt to stdout instead of progress lines
    #[arg(long)]
    pub json: bool,
}

impl CompareCommand {
    pub fn execute(&self, base: &ParityConfig) -> Result<i32> {
        let config = self.args.resolve(base)?;
        let aggregator = self.args.aggregator(&config);
        info!(
            reference = %self.args.reference.display(),
            candidate = %self.args.candidate.display(),
            abs_tol = config.tolerances().abs,
            rel_tol = config.tolerances().rel,
            "comparing run trees"
        );

        if self.json {
            let run = aggregator.run(&mut NoProgress)?;
            let receipt = ParityReceipt::new(
                &self.args.reference,
                &self.args.candidate,
                config.precision,
                config.tolerances(),
                &run,
            );
            println!("{}", receipt.to_json()?);
            return Ok(run.verdict.exit_code());
        }

        let mut printer = ProgressPrinter::stdout(config.quiet);
        let run = aggregator.run(&mut printer)?;
        printer.finish(&run.verdict).context("Failed to write progress")?;
        if !config.quiet {
            println!("{}", verdict_label(&run.verdict));
        }
        Ok(run.verdict.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use simparity_core::Tolerances;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ComparisonArgs,
    }

    fn parse(extra: &[&str]) -> ComparisonArgs {
        let mut argv = vec!["t", "--reference", "r", "--candidate", "c"];
        argv.extend_from_slice(extra);
        Harness::try_parse_from(argv).unwrap().args
    }

    #[test]
    fn flags_override_config() {
        let base = ParityConfig { steps: vec!["step9".into()], ..ParityConfig::default() };
        let config = parse(&["--precision", "float", "--rel-tol", "0.1", "--steps", "a, b,"])
            .resolve(&base)
            .unwrap();
        assert_eq!(config.tolerances(), Tolerances { abs: 1e-5, rel: 0.1 });
        assert_eq!(config.steps, vec!["a", "b"]);
    }

    #[test]
    fn absent_flags_keep_config() {
        let base =
            ParityConfig { allow_missing: true, abs_tol: Some(0.5), ..ParityConfig::default() };
        let config = parse(&[]).resolve(&base).unwrap();
        assert!(config.allow_missing);
        assert_eq!(config.abs_tol, Some(0.5));
    }

    #[test]
    fn negative_tolerance_rejected() {
        let err = parse(&["--abs-tol=-1"]).resolve(&ParityConfig::default()).unwrap_err();
        assert_eq!(crate::exit::code_for_error(&err), crate::exit::EXIT_USAGE);
    }

    #[test]
    fn bad_precision_rejected_at_parse() {
        let argv = ["t", "--reference", "r", "--candidate", "c", "--precision", "half"];
        assert!(Harness::try_parse_from(argv).is_err());
    }
}
