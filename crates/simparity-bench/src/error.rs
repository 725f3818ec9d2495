use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("failed to launch {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The binary ran but exited unsuccessfully. `output` is its combined text.
    #[error("command failed ({status}): {command}\n{output}")]
    CommandFailed { command: String, status: String, output: String },

    #[error("no {metric} line found in simulation output")]
    MissingMetric { metric: &'static str },

    #[error("unparseable {metric} value {value:?}")]
    InvalidMetric { metric: &'static str, value: String },

    #[error("candidate mean elapsed time is zero at size {size}")]
    ZeroElapsed { size: u32 },

    #[error("invalid problem size {token:?}")]
    InvalidSize { token: String },

    #[error("no problem sizes specified")]
    NoSizes,

    #[error("repeats must be at least 1")]
    InvalidRepeats,
}

impl BenchError {
    /// Errors caused by the invocation rather than by a run.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidSize { .. } | Self::NoSizes | Self::InvalidRepeats)
    }
}

pub type Result<T, E = BenchError> = std::result::Result<T, E>;
