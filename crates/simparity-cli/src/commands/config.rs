//! Configuration inspection

use anyhow::{Context, Result};
use clap::Subcommand;
use simparity_core::ParityConfig;

use crate::exit::EXIT_PASS;

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show the effective configuration (file + environment + global flags)
    Show,
    /// Print the default configuration file
    Default,
}

pub fn render(action: ConfigAction, config: &ParityConfig) -> Result<String> {
    let text = match action {
        ConfigAction::Show => config.to_toml(),
        ConfigAction::Default => ParityConfig::default_toml(),
    };
    text.context("Failed to serialize configuration")
}

pub fn execute(action: ConfigAction, config: &ParityConfig) -> Result<i32> {
    print!("{}", render(action, config)?);
    Ok(EXIT_PASS)
}
