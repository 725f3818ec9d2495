//! Run-pair aggregation: field → step → cycle → run.
//!
//! The reference tree decides which steps and fields exist. Each field pair
//! is loaded, compared and folded into its step; steps that compared at
//! least one field are then folded into their cycle. Missing data, read
//! failures and unlistable data directories are counted in the
//! [`RunVerdict`], never raised.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cycle::parse_cycle;
use crate::dataset::{Dataset, Side};
use crate::error::{DatasetError, ParityError, Result, ScanError};
use crate::exit::{EXIT_FAIL, EXIT_PASS};
use crate::scan::{FieldFile, Layout, NameFilter, RunTree};
use crate::tolerance::{ComparisonResult, Tolerances, compare};

/// Inputs to one aggregation run besides the two roots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateOptions {
    pub tolerances: Tolerances,
    pub steps: NameFilter,
    pub fields: NameFilter,
    /// Tolerate missing directories/files instead of failing the verdict.
    pub allow_missing: bool,
    pub layout: Layout,
}

/// Roll-up of every compared field in one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    pub step: String,
    pub cycle: u64,
    pub max_abs: f64,
    pub max_rel: f64,
    pub out_of_bounds: usize,
    pub files_compared: usize,
}

impl StepSummary {
    pub fn new(step: impl Into<String>) -> Self {
        let step = step.into();
        let cycle = parse_cycle(&step);
        Self { step, cycle, max_abs: 0.0, max_rel: 0.0, out_of_bounds: 0, files_compared: 0 }
    }

    pub fn absorb(&mut self, result: &ComparisonResult) {
        self.max_abs = self.max_abs.max(result.max_abs);
        self.max_rel = self.max_rel.max(result.max_rel);
        self.out_of_bounds += result.out_of_bounds;
        self.files_compared += 1;
    }
}

/// All steps sharing a cycle number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub cycle: u64,
    pub max_abs: f64,
    pub max_rel: f64,
    pub out_of_bounds: usize,
    pub files_compared: usize,
}

impl CycleSummary {
    pub fn new(cycle: u64) -> Self {
        Self { cycle, max_abs: 0.0, max_rel: 0.0, out_of_bounds: 0, files_compared: 0 }
    }

    pub fn absorb(&mut self, step: &StepSummary) {
        self.max_abs = self.max_abs.max(step.max_abs);
        self.max_rel = self.max_rel.max(step.max_rel);
        self.out_of_bounds += step.out_of_bounds;
        self.files_compared += step.files_compared;
    }
}

/// Fold step summaries into cycle summaries, ascending by cycle.
///
/// The result does not depend on the order of `steps`.
pub fn fold_cycles<'a, I>(steps: I) -> Vec<CycleSummary>
where
    I: IntoIterator<Item = &'a StepSummary>,
{
    let mut cycles: BTreeMap<u64, CycleSummary> = BTreeMap::new();
    for step in steps {
        cycles.entry(step.cycle).or_insert_with(|| CycleSummary::new(step.cycle)).absorb(step);
    }
    cycles.into_values().collect()
}

/// Whole-run counters and the pass/fail decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunVerdict {
    pub missing_count: usize,
    /// Failing fields: length mismatch, any out-of-bounds value, or
    /// unreadable. An unlistable reference data directory counts once.
    pub failure_count: usize,
    /// Field pairs with both files present, readable or not.
    pub total_files_compared: usize,
    /// Unreadable field pairs plus unlistable reference data directories.
    pub read_errors: usize,
    /// Compared fields that held at least one non-finite value.
    pub poisoned_fields: usize,
    pub allow_missing: bool,
}

impl RunVerdict {
    pub fn passed(&self) -> bool {
        self.failure_count == 0 && (self.missing_count == 0 || self.allow_missing)
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed() { EXIT_PASS } else { EXIT_FAIL }
    }
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub cycles: Vec<CycleSummary>,
    pub steps: Vec<StepSummary>,
    pub verdict: RunVerdict,
}

/// A unit of expected data that was not there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingData {
    ReferenceDataDir { step: String, path: PathBuf },
    CandidateDataDir { step: String, path: PathBuf },
    CandidateField { step: String, field: String, path: PathBuf },
}

impl MissingData {
    pub fn path(&self) -> &Path {
        match self {
            Self::ReferenceDataDir { path, .. }
            | Self::CandidateDataDir { path, .. }
            | Self::CandidateField { path, .. } => path,
        }
    }
}

impl std::fmt::Display for MissingData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReferenceDataDir { path, .. } => {
                write!(f, "missing reference data dir: {}", path.display())
            }
            Self::CandidateDataDir { path, .. } => {
                write!(f, "missing candidate data dir: {}", path.display())
            }
            Self::CandidateField { path, .. } => {
                write!(f, "missing candidate file: {}", path.display())
            }
        }
    }
}

/// Receives per-field events while a run is in progress.
pub trait ProgressObserver {
    fn on_field(&mut self, _step: &str, _file: &str, _result: &ComparisonResult) {}
    fn on_missing(&mut self, _missing: &MissingData) {}
    fn on_read_error(&mut self, _step: &str, _file: &str, _error: &DatasetError) {}
    fn on_scan_error(&mut self, _step: &str, _error: &ScanError) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Drives scanning, loading and comparison over a reference/candidate pair.
#[derive(Debug, Clone)]
pub struct ComparisonAggregator {
    reference: RunTree,
    candidate: RunTree,
    options: AggregateOptions,
}

impl ComparisonAggregator {
    pub fn new(
        reference_root: impl Into<PathBuf>,
        candidate_root: impl Into<PathBuf>,
        options: AggregateOptions,
    ) -> Self {
        Self {
            reference: RunTree::new(reference_root, options.layout.clone()),
            candidate: RunTree::new(candidate_root, options.layout.clone()),
            options,
        }
    }

    /// Compare every selected step.
    ///
    /// # Errors
    ///
    /// [`ParityError::NoSteps`] when the reference root yields no step
    /// directories after filtering, [`ParityError::Scan`] when the root
    /// exists but cannot be listed.
    pub fn run(&self, observer: &mut dyn ProgressObserver) -> Result<Aggregation> {
        let steps = self.reference.steps(&self.options.steps)?;
        if steps.is_empty() {
            return Err(ParityError::NoSteps { root: self.reference.root().to_path_buf() });
        }

        let mut verdict =
            RunVerdict { allow_missing: self.options.allow_missing, ..RunVerdict::default() };
        let mut summaries = Vec::new();

        for step in &steps {
            if let Some(summary) = self.compare_step(step, &mut verdict, observer) {
                summaries.push(summary);
            }
        }

        let cycles = fold_cycles(&summaries);
        info!(
            steps = steps.len(),
            compared = verdict.total_files_compared,
            missing = verdict.missing_count,
            failures = verdict.failure_count,
            passed = verdict.passed(),
            "parity run complete"
        );

        Ok(Aggregation { cycles, steps: summaries, verdict })
    }

    /// `None` when no field of the step was actually compared.
    fn compare_step(
        &self,
        step: &str,
        verdict: &mut RunVerdict,
        observer: &mut dyn ProgressObserver,
    ) -> Option<StepSummary> {
        let reference_dir = self.reference.data_dir(step);
        let reference_ok = reference_dir.is_dir();
        if !reference_ok {
            record_missing(
                MissingData::ReferenceDataDir { step: step.to_string(), path: reference_dir },
                verdict,
                observer,
            );
            if !self.options.allow_missing {
                return None;
            }
        }

        let candidate_dir = self.candidate.data_dir(step);
        let candidate_ok = candidate_dir.is_dir();
        if !candidate_ok {
            record_missing(
                MissingData::CandidateDataDir { step: step.to_string(), path: candidate_dir },
                verdict,
                observer,
            );
        }

        if !reference_ok || !candidate_ok {
            return None;
        }

        let fields = match self.reference.fields(step, &self.options.fields) {
            Ok(fields) => fields,
            Err(err) => {
                warn!(step, error = %err, "failed to list reference fields");
                verdict.failure_count += 1;
                verdict.read_errors += 1;
                observer.on_scan_error(step, &err);
                return None;
            }
        };

        let mut summary = StepSummary::new(step);
        for field in &fields {
            let file = field.label();
            let candidate_path = self.candidate.field_path(step, field.file_name());
            // Anything at the candidate path is compared; a directory there
            // fails to load instead of counting as missing.
            if !candidate_path.exists() {
                record_missing(
                    MissingData::CandidateField {
                        step: step.to_string(),
                        field: file.into_owned(),
                        path: candidate_path,
                    },
                    verdict,
                    observer,
                );
                continue;
            }

            verdict.total_files_compared += 1;
            let result = match self.load_pair(step, field, &candidate_path) {
                Ok((reference, candidate)) => {
                    compare(reference.values(), candidate.values(), self.options.tolerances)
                }
                Err(err) => {
                    warn!(step, file = %file, error = %err, "failed to read field");
                    verdict.failure_count += 1;
                    verdict.read_errors += 1;
                    observer.on_read_error(step, &file, &err);
                    continue;
                }
            };

            debug!(
                step,
                file = %file,
                count = result.count,
                max_abs = result.max_abs,
                max_rel = result.max_rel,
                oob = result.out_of_bounds,
                "compared field"
            );
            observer.on_field(step, &file, &result);

            if result.non_finite > 0 {
                verdict.poisoned_fields += 1;
            }
            if result.is_failure() {
                verdict.failure_count += 1;
            }
            summary.absorb(&result);
        }

        (summary.files_compared > 0).then_some(summary)
    }

    fn load_pair(
        &self,
        step: &str,
        field: &FieldFile,
        candidate_path: &Path,
    ) -> std::result::Result<(Dataset, Dataset), DatasetError> {
        let reference_path = self.reference.field_path(step, field.file_name());
        let reference = Dataset::load(&reference_path, Side::Reference)?;
        let candidate = Dataset::load(candidate_path, Side::Candidate)?;
        Ok((reference, candidate))
    }
}

fn record_missing(
    missing: MissingData,
    verdict: &mut RunVerdict,
    observer: &mut dyn ProgressObserver,
) {
    warn!(path = %missing.path().display(), "{missing}");
    verdict.missing_count += 1;
    observer.on_missing(&missing);
}

/// Run a full comparison without progress reporting.
pub fn aggregate(
    reference_root: &Path,
    candidate_root: &Path,
    options: &AggregateOptions,
) -> Result<Aggregation> {
    ComparisonAggregator::new(reference_root, candidate_root, options.clone())
        .run(&mut NoProgress)
}
