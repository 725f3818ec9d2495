//! simparity command-line application
//!
//! Parity checking, per-cycle reporting and speedup measurement for pairs of
//! simulation runs.

use clap::Parser;
use console::style;

use simparity_cli::exit::{EXIT_FAIL, code_for_error};
use simparity_cli::logging::setup_logging;
use simparity_cli::{Cli, load_configuration, run};

fn main() {
    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{} cannot determine working directory: {e}", style("error:").red().bold());
            std::process::exit(EXIT_FAIL);
        }
    };

    let config = match load_configuration(&cli, &cwd) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    if let Err(e) = setup_logging(&config.logging) {
        eprintln!("{} {e:#}", style("warning:").yellow().bold());
    }

    match run(cli, &config) {
        Ok(code) => std::process::exit(code),
        Err(e) => exit_with(&e),
    }
}

/// Print the error chain and exit with its mapped code.
fn exit_with(err: &anyhow::Error) -> ! {
    eprintln!("{} {err}", style("error:").red().bold());
    for cause in err.chain().skip(1) {
        eprintln!("  Caused by: {cause}");
    }
    std::process::exit(code_for_error(err));
}
