//! CLI command implementations

pub mod compare;
pub mod config;
pub mod report;
pub mod speedup;

pub use compare::{CompareCommand, ComparisonArgs};
pub use config::ConfigAction;
pub use report::ReportCommand;
pub use speedup::SpeedupCommand;
