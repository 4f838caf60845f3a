//! Numeric conversions shared by the Diesel adapters.
//!
//! Windows and totals are `u64` in the ports while PostgreSQL speaks
//! `BIGINT`.

/// Convert an offset or limit to `BIGINT`, saturating at `i64::MAX`.
pub(crate) fn sql_bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Convert a `COUNT(*)` result to a total. Negative counts read as zero.
pub(crate) fn total_from(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(42, 42)]
    #[case(u64::MAX, i64::MAX)]
    fn sql_bound_saturates(#[case] value: u64, #[case] expected: i64) {
        assert_eq!(sql_bound(value), expected);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(7, 7)]
    #[case(-1, 0)]
    fn total_from_clamps_negative_counts(#[case] count: i64, #[case] expected: u64) {
        assert_eq!(total_from(count), expected);
    }
}
