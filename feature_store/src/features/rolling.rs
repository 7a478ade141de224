/// Mean of `values[end + 1 - window ..= end]`, or `None` if the window would
/// start before the first value.
pub(crate) fn trailing_mean(values: &[i32], end: usize, window: usize) -> Option<f64> {
    if window == 0 || end >= values.len() || end + 1 < window {
        return None;
    }
    let sum: i64 = values[end + 1 - window..=end].iter().map(|&v| v as i64).sum();
    Some(sum as f64 / window as f64)
}

/// Rounds to two decimals, ties to even on the scaled value.
///
/// This is the rule numeric libraries use for decimal rounding of floats, so
/// an average like 0.125 becomes 0.12, not 0.13.
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}
