//! Typed errors for dataset loading and run aggregation.
//!
//! Missing data and tolerance breaches are not errors: they are counted in
//! the [`RunVerdict`](crate::RunVerdict). Only conditions that stop a field
//! (unreadable data) or the whole run (nothing to compare, unlistable
//! reference root) surface here.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load one field's values. Recoverable at the field level.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The source could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A token is not a valid floating-point literal.
    #[error("invalid number {token:?} at {}:{line}", path.display())]
    Parse { path: PathBuf, line: usize, token: String },

    /// A line is not valid UTF-8.
    #[error("undecodable text at {}:{line}", path.display())]
    Decode { path: PathBuf, line: usize },
}

impl DatasetError {
    /// True for content errors (bad token or bad encoding), false for I/O.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Decode { .. })
    }

    /// Path of the source that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } | Self::Decode { path, .. } => path,
        }
    }
}

/// Run-level failures. Any of these ends the run without summaries.
#[derive(Debug, Error)]
pub enum ParityError {
    /// The reference root is absent or holds no step directories.
    #[error("no step directories found under reference root {}", root.display())]
    NoSteps { root: PathBuf },

    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl ParityError {
    /// True when the run could not start because of how it was invoked.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::NoSteps { .. })
    }
}

/// A run-tree directory that exists but could not be listed.
#[derive(Debug, Error)]
#[error("failed to list {}: {source}", dir.display())]
pub struct ScanError {
    pub dir: PathBuf,
    #[source]
    pub source: std::io::Error,
}

pub type Result<T, E = ParityError> = std::result::Result<T, E>;
