//! Flat numeric field loading.
//!
//! A field file is line oriented. Each line holds zero or more
//! comma-separated floating-point tokens; blank lines and empty tokens are
//! skipped. Tokens from all lines are concatenated in file order into one
//! flat sequence, so a 3-column `x,y,z` dump and a single-column dump of the
//! same values load identically.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Token separator within a line.
pub const DELIMITER: char = ',';

/// Which implementation a dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Reference,
    Candidate,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Candidate => write!(f, "candidate"),
        }
    }
}

/// One field's values from one side. Lives for a single comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub side: Side,
    values: Vec<f64>,
}

impl Dataset {
    /// Load the field file at `path`.
    ///
    /// # Errors
    ///
    /// [`DatasetError::Io`] when the file cannot be opened or read,
    /// [`DatasetError::Parse`] / [`DatasetError::Decode`] for bad content.
    pub fn load(path: &Path, side: Side) -> Result<Self, DatasetError> {
        Ok(Self { side, values: read_values(path)? })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Read every numeric token in the file at `path`.
pub fn read_values(path: &Path) -> Result<Vec<f64>, DatasetError> {
    let file =
        File::open(path).map_err(|source| DatasetError::Io { path: path.to_path_buf(), source })?;
    parse_values(BufReader::new(file), path)
}

/// Parse numeric tokens from any line source. `path` is only used in errors.
pub fn parse_values<R: BufRead>(reader: R, path: &Path) -> Result<Vec<f64>, DatasetError> {
    let mut values = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|source| match source.kind() {
            ErrorKind::InvalidData => {
                DatasetError::Decode { path: path.to_path_buf(), line: line_no }
            }
            _ => DatasetError::Io { path: path.to_path_buf(), source },
        })?;

        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }

        for token in raw.split(DELIMITER).map(str::trim).filter(|t| !t.is_empty()) {
            let value = token.parse::<f64>().map_err(|_| DatasetError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                token: token.to_string(),
            })?;
            values.push(value);
        }
    }

    Ok(values)
}
