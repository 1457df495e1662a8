//! Range scaling used to bring every feature onto a comparable [0, 1] scale.

/// Smallest range divided by in `rescale` and `normalize`.
pub const RANGE_FLOOR: f64 = 1e-9;

/// Map `x` from `[old_min, old_max]` onto `[new_min, new_max]`.
pub fn rescale(x: f64, old_min: f64, old_max: f64, new_min: f64, new_max: f64) -> f64 {
    new_min + (new_max - new_min) * (x - old_min) / (old_max - old_min).max(RANGE_FLOOR)
}

/// [`rescale`] applied to a whole series.
pub fn rescale_series(values: &[f64], old_min: f64, old_max: f64, new_min: f64, new_max: f64) -> Vec<f64> {
    values
        .iter()
        .map(|&v| rescale(v, old_min, old_max, new_min, new_max))
        .collect()
}

/// Min-max normalization of a series onto [0, 1].
///
/// A flat series (max == min) maps to all zeros instead of dividing by zero.
/// NaN values are ignored when looking for the extremes.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if min > max {
        return vec![f64::NAN; values.len()];
    }
    let range = (max - min).max(RANGE_FLOOR);
    values.iter().map(|&v| (v - min) / range).collect()
}
