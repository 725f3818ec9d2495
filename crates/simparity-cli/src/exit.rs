// Exit codes for CI triage
pub use simparity_core::exit::{EXIT_FAIL, EXIT_PASS, EXIT_USAGE};

use simparity_bench::BenchError;
use simparity_core::{ConfigError, ParityError};

/// Exit code for a command that ended with an error.
///
/// Configuration and invocation problems, including an empty reference
/// tree, map to [`EXIT_USAGE`]; everything else is a runtime failure.
pub fn code_for_error(err: &anyhow::Error) -> i32 {
    let usage = err.chain().any(|cause| {
        cause.downcast_ref::<ParityError>().is_some_and(ParityError::is_usage)
            || cause.downcast_ref::<ConfigError>().is_some()
            || cause.downcast_ref::<BenchError>().is_some_and(BenchError::is_usage)
    });
    if usage { EXIT_USAGE } else { EXIT_FAIL }
}
