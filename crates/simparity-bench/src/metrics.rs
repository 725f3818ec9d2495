//! Timing and figure-of-merit extraction from simulation output.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub elapsed_s: f64,
    pub fom: f64,
}

fn elapsed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Elapsed time\s*=\s*([0-9.]+)").expect("elapsed pattern must compile")
    })
}

fn fom_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"FOM\s*=\s*([0-9.eE+-]+)").expect("FOM pattern must compile"))
}

/// Pull elapsed seconds and FOM out of a run's output. The last line matching
/// each pattern wins.
pub fn parse_metrics(output: &str) -> Result<RunMetrics> {
    let mut elapsed = None;
    let mut fom = None;

    for line in output.lines() {
        if let Some(caps) = elapsed_re().captures(line) {
            elapsed = Some(caps[1].to_string());
        }
        if let Some(caps) = fom_re().captures(line) {
            fom = Some(caps[1].to_string());
        }
    }

    Ok(RunMetrics {
        elapsed_s: to_number("elapsed time", elapsed)?,
        fom: to_number("FOM", fom)?,
    })
}

fn to_number(metric: &'static str, raw: Option<String>) -> Result<f64> {
    let raw = raw.ok_or(BenchError::MissingMetric { metric })?;
    raw.parse().map_err(|_| BenchError::InvalidMetric { metric, value: raw })
}
