//! simparity CLI library
//!
//! Argument definitions, subcommand implementations and logging setup for
//! the `simparity` binary, exposed for testing.

pub mod commands;
pub mod exit;
pub mod logging;
pub mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use simparity_core::{LogFormat, ParityConfig};

use commands::{CompareCommand, ConfigAction, ReportCommand, SpeedupCommand};

/// simparity - numerical parity checking for simulation run trees
#[derive(Parser, Debug)]
#[command(name = "simparity")]
#[command(about = "Compare reference and candidate simulation runs field by field")]
#[command(long_about = r#"
simparity compares two run trees laid out as <root>/<step>/matrix/<field>.csv,
one from a reference build and one from a candidate build, under a dual
absolute/relative tolerance.

Examples:
  # Pass/fail check (exit 0 = pass, 1 = fail, 2 = nothing to compare)
  simparity compare --reference logs/cpu --candidate logs/gpu

  # Per-cycle report tables
  simparity report --reference logs/cpu --candidate logs/gpu \
      --out-csv correctness.csv --out-steps-csv correctness_steps.csv

  # Speedup across problem sizes
  simparity speedup --reference-bin ./sim-ref --candidate-bin ./sim-gpu --sizes 30,50
"#)]
#[command(version)]
pub struct Cli {
    /// Configuration file path (default: ./simparity.toml if present)
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log format (pretty, compact, json)
    #[arg(long, value_name = "FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

const PLOT_NOTE: &str =
    "Plots are not rendered; load the CSV output into a plotting tool of your choice.";

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pass/fail parity check of two run trees
    #[command(alias = "cmp")]
    Compare(CompareCommand),

    /// Write per-cycle and per-step CSV tables for two run trees
    #[command(after_help = PLOT_NOTE)]
    Report(ReportCommand),

    /// Time reference and candidate binaries across problem sizes
    #[command(alias = "bench", after_help = PLOT_NOTE)]
    Speedup(SpeedupCommand),

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Resolve file and environment configuration, then the global log flags.
pub fn load_configuration(cli: &Cli, cwd: &Path) -> Result<ParityConfig> {
    let mut config = ParityConfig::discover(cli.config.as_deref(), cwd)
        .context("Failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    Ok(config)
}

/// Run the selected subcommand and return the process exit code.
pub fn run(cli: Cli, config: &ParityConfig) -> Result<i32> {
    match cli.command {
        Commands::Compare(cmd) => cmd.execute(config),
        Commands::Report(cmd) => cmd.execute(config),
        Commands::Speedup(cmd) => cmd.execute(),
        Commands::Config { action } => commands::config::execute(action, config),
    }
}
