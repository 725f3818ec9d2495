//! Reference vs candidate parity checking for multi-step simulation runs.
//!
//! Two executions of the same simulation (a reference build and an
//! accelerated build) each dump a run tree laid out as
//! `<root>/<step>/<data-subdir>/<field>.<ext>`. This crate walks both trees,
//! compares every field value-by-value under a dual absolute/relative
//! tolerance, and rolls the results up into per-step, per-cycle and
//! whole-run summaries.
//!
//! # Quick start
//!
//! ```no_run
//! use simparity_core::{aggregate, AggregateOptions, Precision, Tolerances};
//! use std::path::Path;
//!
//! let options = AggregateOptions {
//!     tolerances: Tolerances::resolve(Precision::Double, None, None),
//!     ..AggregateOptions::default()
//! };
//! let run = aggregate(Path::new("logs/cpu"), Path::new("logs/gpu"), &options)?;
//! println!("passed: {}", run.verdict.passed());
//! # Ok::<(), simparity_core::ParityError>(())
//! ```

pub mod aggregate;
pub mod config;
pub mod cycle;
pub mod dataset;
pub mod error;
pub mod exit;
pub mod scan;
pub mod tolerance;

pub use aggregate::{
    AggregateOptions, Aggregation, ComparisonAggregator, CycleSummary, MissingData, NoProgress,
    ProgressObserver, RunVerdict, StepSummary, aggregate, fold_cycles,
};
pub use config::{ConfigError, LogFormat, LoggingConfig, ParityConfig, parse_list};
pub use cycle::parse_cycle;
pub use dataset::{Dataset, Side};
pub use error::{DatasetError, ParityError, Result, ScanError};
pub use scan::{FieldFile, Layout, NameFilter, RunTree};
pub use tolerance::{ComparisonResult, Precision, Tolerances, compare};
