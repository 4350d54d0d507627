/// Computes the median of a slice of values. Returns `None` for empty input.
///
/// For an even count the two middle values are averaged.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Returns the `(min, max)` of the defined values, or `None` if there are none.
pub fn min_max(values: impl IntoIterator<Item = Option<f64>>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .flatten()
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Rescales `value` from `[lo, hi]` onto `[0, 1]`. Callers guarantee `hi > lo`.
pub fn rescale(value: f64, lo: f64, hi: f64) -> f64 {
    (value - lo) / (hi - lo)
}
