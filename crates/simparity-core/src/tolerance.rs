//! Dual absolute/relative tolerance comparison.
//!
//! A value pair is out of bounds only when it fails **both** tolerances:
//! `|a - b| > abs_tol` and `|a - b| / max(|a|, |b|, TINY) > rel_tol`.
//! Passing either one is enough.
//!
//! Non-finite operands (NaN, ±inf) count as out of bounds and pin the
//! reported maxima to +inf for the rest of the comparison. A length mismatch
//! is reported as an irreducible failure before any element is inspected.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Floor for the relative-difference denominator when both values are ~0.
pub const TINY: f64 = 1e-30;

/// Declared numeric precision of the simulation output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[default]
    Double,
    Float,
}

impl Precision {
    /// Default tolerance pair for this mode.
    pub const fn default_tolerances(self) -> Tolerances {
        match self {
            Self::Double => Tolerances::DOUBLE,
            Self::Float => Tolerances::FLOAT,
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Double => write!(f, "double"),
            Self::Float => write!(f, "float"),
        }
    }
}

impl std::str::FromStr for Precision {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "double" => Ok(Self::Double),
            "float" => Ok(Self::Float),
            _ => Err(ConfigError::InvalidPrecision(s.to_string())),
        }
    }
}

/// Absolute and relative tolerance thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Tolerances {
    pub const DOUBLE: Self = Self { abs: 1e-12, rel: 1e-9 };
    pub const FLOAT: Self = Self { abs: 1e-5, rel: 1e-4 };

    /// Mode default, with each explicit override taking precedence.
    pub fn resolve(precision: Precision, abs: Option<f64>, rel: Option<f64>) -> Self {
        let base = precision.default_tolerances();
        Self { abs: abs.unwrap_or(base.abs), rel: rel.unwrap_or(base.rel) }
    }

    /// Reject negative or non-finite thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("abs_tol", self.abs), ("rel_tol", self.rel)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::DOUBLE
    }
}

/// Outcome of comparing one field between reference and candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Values actually compared (`min(len)` on a length mismatch).
    pub count: usize,
    pub max_abs: f64,
    pub max_rel: f64,
    /// Positions failing both tolerances, or `max(len)` on a length mismatch.
    pub out_of_bounds: usize,
    /// Positions where either operand was NaN or infinite.
    pub non_finite: usize,
    pub length_mismatch: bool,
}

impl ComparisonResult {
    /// A field fails on a length mismatch or any out-of-bounds position.
    pub fn is_failure(&self) -> bool {
        self.length_mismatch || self.out_of_bounds > 0
    }

    fn mismatch(reference_len: usize, candidate_len: usize) -> Self {
        Self {
            count: reference_len.min(candidate_len),
            max_abs: f64::INFINITY,
            max_rel: f64::INFINITY,
            out_of_bounds: reference_len.max(candidate_len),
            non_finite: 0,
            length_mismatch: true,
        }
    }
}

/// Compare `reference` and `candidate` element-wise under `tolerances`.
pub fn compare(reference: &[f64], candidate: &[f64], tolerances: Tolerances) -> ComparisonResult {
    if reference.len() != candidate.len() {
        return ComparisonResult::mismatch(reference.len(), candidate.len());
    }

    let mut max_abs = 0.0_f64;
    let mut max_rel = 0.0_f64;
    let mut out_of_bounds = 0;
    let mut non_finite = 0;

    for (&a, &b) in reference.iter().zip(candidate) {
        if !a.is_finite() || !b.is_finite() {
            out_of_bounds += 1;
            non_finite += 1;
            max_abs = f64::INFINITY;
            max_rel = f64::INFINITY;
            continue;
        }

        let diff = (a - b).abs();
        let rel = diff / a.abs().max(b.abs()).max(TINY);
        if diff > max_abs {
            max_abs = diff;
        }
        if rel > max_rel {
            max_rel = rel;
        }
        if diff > tolerances.abs && rel > tolerances.rel {
            out_of_bounds += 1;
        }
    }

    ComparisonResult {
        count: reference.len(),
        max_abs,
        max_rel,
        out_of_bounds,
        non_finite,
        length_mismatch: false,
    }
}
