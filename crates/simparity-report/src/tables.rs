//! CSV tables for cycles, steps and speedup measurements.
//!
//! The header row is always written, even with no data rows, so downstream
//! plotting scripts can rely on the column layout.

use std::fs;
use std::path::Path;

use serde::Serialize;
use simparity_bench::SpeedupRow;
use simparity_core::{CycleSummary, StepSummary};
use tracing::info;

use crate::error::{ReportError, Result};

pub const CYCLE_HEADER: [&str; 5] =
    ["cycle", "max_abs", "max_rel", "out_of_bounds", "files_compared"];

pub const STEP_HEADER: [&str; 6] =
    ["step", "cycle", "max_abs", "max_rel", "out_of_bounds", "files_compared"];

pub const SPEEDUP_HEADER: [&str; 7] = [
    "size",
    "reference_elapsed_s",
    "candidate_elapsed_s",
    "reference_fom",
    "candidate_fom",
    "speedup_time",
    "speedup_fom",
];

/// One row per cycle, in the given (ascending) order.
pub fn write_cycle_csv(path: &Path, cycles: &[CycleSummary]) -> Result<()> {
    write_table(path, &CYCLE_HEADER, cycles)
}

pub fn write_step_csv(path: &Path, steps: &[StepSummary]) -> Result<()> {
    write_table(path, &STEP_HEADER, steps)
}

pub fn write_speedup_csv(path: &Path, rows: &[SpeedupRow]) -> Result<()> {
    write_table(path, &SPEEDUP_HEADER, rows)
}

/// Render the cycle table to a string.
pub fn cycle_csv_string(cycles: &[CycleSummary]) -> Result<String> {
    table_string(&CYCLE_HEADER, cycles)
}

pub fn step_csv_string(steps: &[StepSummary]) -> Result<String> {
    table_string(&STEP_HEADER, steps)
}

fn write_table<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    create_parent(path)?;
    let csv_err = |source: csv::Error| ReportError::Csv { path: path.to_path_buf(), source };

    let mut writer =
        csv::WriterBuilder::new().has_headers(false).from_path(path).map_err(csv_err)?;
    writer.write_record(header).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer
        .flush()
        .map_err(|source| ReportError::Io { path: path.to_path_buf(), source })?;

    info!(path = %path.display(), rows = rows.len(), "wrote CSV");
    Ok(())
}

fn table_string<T: Serialize>(header: &[&str], rows: &[T]) -> Result<String> {
    let csv_err = |source: csv::Error| ReportError::Csv { path: "<memory>".into(), source };

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(header).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    let bytes = writer.into_inner().map_err(|e| ReportError::Io {
        path: "<memory>".into(),
        source: e.into_error(),
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub(crate) fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|source| ReportError::Io { path: parent.to_path_buf(), source }),
        _ => Ok(()),
    }
}
