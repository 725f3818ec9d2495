//! Process exit codes shared by the command-line tools.

/// Every compared field within tolerance and no unexcused missing data.
pub const EXIT_PASS: i32 = 0;

/// At least one failure, unexcused missing data, or a runtime error.
pub const EXIT_FAIL: i32 = 1;

/// Nothing to compare, or the invocation itself was invalid.
pub const EXIT_USAGE: i32 = 2;
