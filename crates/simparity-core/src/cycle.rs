//! Cycle index extraction from step directory names.

use std::sync::OnceLock;

use regex::Regex;

/// Cycle number embedded in a step name as `_cycle<digits>`.
///
/// Falls back to cycle 0 when the name carries no cycle marker or the digits
/// do not fit in a `u64`, so oddly named steps still fold somewhere.
///
/// # Examples
///
/// ```
/// use simparity_core::parse_cycle;
///
/// assert_eq!(parse_cycle("step0003_cycle000120_rank0"), 120);
/// assert_eq!(parse_cycle("step_final"), 0);
/// ```
pub fn parse_cycle(step_name: &str) -> u64 {
    static RE: OnceLock<Regex> = OnceLock::new();
    let regex =
        RE.get_or_init(|| Regex::new(r"_cycle([0-9]+)").expect("cycle pattern must compile"));

    regex
        .captures(step_name)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conventional_name() {
        assert_eq!(parse_cycle("step0000_cycle000010"), 10);
    }

    #[test]
    fn rank_suffix_ignored() {
        assert_eq!(parse_cycle("step0001_cycle000042_rank3"), 42);
    }

    #[test]
    fn first_marker_wins() {
        assert_eq!(parse_cycle("step_cycle7_cycle9"), 7);
    }

    #[test]
    fn no_marker_defaults_to_zero() {
        assert_eq!(parse_cycle("step0000"), 0);
        assert_eq!(parse_cycle("step_cycle"), 0);
        assert_eq!(parse_cycle("stepcycle12"), 0);
    }

    #[test]
    fn overflowing_digits_default_to_zero() {
        assert_eq!(parse_cycle("step_cycle99999999999999999999999"), 0);
    }
}
