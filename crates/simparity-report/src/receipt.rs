//! JSON parity receipt for CI and archival.
//!
//! ## Schema
//!
//! - **v1**: roots, tolerances, verdict counters, cycle and step tables.
//!
//! Maxima that are not finite (length mismatch or NaN/inf input) are written
//! as `null`; `summary.poisoned_fields` and `summary.failure_count` keep the
//! signal.

use std::path::Path;

use serde::{Deserialize, Serialize};
use simparity_core::{Aggregation, CycleSummary, Precision, StepSummary, Tolerances};

use crate::error::{ReportError, Result};
use crate::tables::create_parent;

pub const RECEIPT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ParityReceipt {
    /// Schema version
    pub version: u32,

    /// RFC3339 timestamp when the receipt was generated
    pub timestamp: String,

    pub reference_root: String,
    pub candidate_root: String,
    pub precision: Precision,
    pub tolerances: Tolerances,
    pub allow_missing: bool,

    pub summary: ReceiptSummary,

    #[serde(default)]
    pub cycles: Vec<CycleRow>,

    #[serde(default)]
    pub steps: Vec<StepRow>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub passed: bool,
    pub missing_count: usize,
    pub failure_count: usize,
    pub total_files_compared: usize,
    pub read_errors: usize,
    pub poisoned_fields: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CycleRow {
    pub cycle: u64,
    pub max_abs: Option<f64>,
    pub max_rel: Option<f64>,
    pub out_of_bounds: usize,
    pub files_compared: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StepRow {
    pub step: String,
    pub cycle: u64,
    pub max_abs: Option<f64>,
    pub max_rel: Option<f64>,
    pub out_of_bounds: usize,
    pub files_compared: usize,
}

impl From<&CycleSummary> for CycleRow {
    fn from(c: &CycleSummary) -> Self {
        Self {
            cycle: c.cycle,
            max_abs: finite(c.max_abs),
            max_rel: finite(c.max_rel),
            out_of_bounds: c.out_of_bounds,
            files_compared: c.files_compared,
        }
    }
}

impl From<&StepSummary> for StepRow {
    fn from(s: &StepSummary) -> Self {
        Self {
            step: s.step.clone(),
            cycle: s.cycle,
            max_abs: finite(s.max_abs),
            max_rel: finite(s.max_rel),
            out_of_bounds: s.out_of_bounds,
            files_compared: s.files_compared,
        }
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

impl ParityReceipt {
    pub fn new(
        reference_root: &Path,
        candidate_root: &Path,
        precision: Precision,
        tolerances: Tolerances,
        run: &Aggregation,
    ) -> Self {
        let v = &run.verdict;
        Self {
            version: RECEIPT_VERSION,
            timestamp: chrono::Utc::now().to_rfc3339(),
            reference_root: reference_root.display().to_string(),
            candidate_root: candidate_root.display().to_string(),
            precision,
            tolerances,
            allow_missing: v.allow_missing,
            summary: ReceiptSummary {
                passed: v.passed(),
                missing_count: v.missing_count,
                failure_count: v.failure_count,
                total_files_compared: v.total_files_compared,
                read_errors: v.read_errors,
                poisoned_fields: v.poisoned_fields,
            },
            cycles: run.cycles.iter().map(CycleRow::from).collect(),
            steps: run.steps.iter().map(StepRow::from).collect(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        create_parent(path)?;
        let json = self.to_json()?;
        std::fs::write(path, json)
            .map_err(|source| ReportError::Io { path: path.to_path_buf(), source })?;
        tracing::info!(path = %path.display(), "wrote parity receipt");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simparity_core::RunVerdict;

    fn run() -> Aggregation {
        let mut step = StepSummary::new("step0000_cycle000010");
        step.max_abs = f64::INFINITY;
        step.max_rel = f64::INFINITY;
        step.out_of_bounds = 3;
        step.files_compared = 1;
        Aggregation {
            cycles: simparity_core::fold_cycles([&step]),
            steps: vec![step],
            verdict: RunVerdict {
                failure_count: 1,
                total_files_compared: 1,
                poisoned_fields: 1,
                ..RunVerdict::default()
            },
        }
    }

    #[test]
    fn non_finite_maxima_are_null() {
        let receipt = ParityReceipt::new(
            Path::new("ref"),
            Path::new("cand"),
            Precision::Double,
            Tolerances::DOUBLE,
            &run(),
        );
        let json: serde_json::Value = serde_json::from_str(&receipt.to_json().unwrap()).unwrap();
        assert_eq!(json["version"], 1);
        assert!(json["cycles"][0]["max_abs"].is_null());
        assert_eq!(json["cycles"][0]["cycle"], 10);
        assert_eq!(json["summary"]["passed"], false);
        assert_eq!(json["summary"]["poisoned_fields"], 1);
        assert_eq!(json["precision"], "double");
    }

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("receipt.json");
        let receipt = ParityReceipt::new(
            Path::new("ref"),
            Path::new("cand"),
            Precision::Float,
            Tolerances::FLOAT,
            &run(),
        );
        receipt.write_to_file(&path).unwrap();
        let back: ParityReceipt =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, receipt);
        assert!(chrono::DateTime::parse_from_rfc3339(&back.timestamp).is_ok());
    }
}
