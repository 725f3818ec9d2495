//! Report emission for simparity runs: CSV tables and JSON receipts.

pub mod error;
pub mod receipt;
pub mod tables;

pub use error::{ReportError, Result};
pub use receipt::{CycleRow, ParityReceipt, RECEIPT_VERSION, ReceiptSummary, StepRow};
pub use tables::{
    CYCLE_HEADER, SPEEDUP_HEADER, STEP_HEADER, cycle_csv_string, step_csv_string,
    write_cycle_csv, write_speedup_csv, write_step_csv,
};
