//! Tail alignment of derived series.
//!
//! Every producer in the engine emits series that are shorter than the candle
//! window by its own warm-up. Series are combined by keeping the most recent
//! `min(len)` values of each, so index `k` of every aligned series refers to
//! the same candle. Unequal lengths are never an error.

/// Length every series would have after [`align`].
pub fn common_len(lens: impl IntoIterator<Item = usize>) -> usize {
    lens.into_iter().min().unwrap_or(0)
}

/// Keep the trailing `len` values of `series`.
///
/// A `len` larger than the series returns the whole series.
pub fn tail<T>(series: &[T], len: usize) -> &[T] {
    &series[series.len().saturating_sub(len)..]
}

/// Trim every series from the front to the shortest length.
pub fn align<'a, T>(series: &[&'a [T]]) -> Vec<&'a [T]> {
    let len = common_len(series.iter().map(|s| s.len()));
    series.iter().map(|s| tail(s, len)).collect()
}

/// Element-wise AND of boolean series after tail alignment.
pub fn and_all(series: &[&[bool]]) -> Vec<bool> {
    let aligned = align(series);
    let len = aligned.first().map_or(0, |s| s.len());
    (0..len).map(|i| aligned.iter().all(|s| s[i])).collect()
}

/// Element-wise binary combination after tail alignment.
pub fn zip_with<A: Copy, B: Copy, R>(a: &[A], b: &[B], f: impl Fn(A, B) -> R) -> Vec<R> {
    let len = a.len().min(b.len());
    tail(a, len)
        .iter()
        .zip(tail(b, len))
        .map(|(&x, &y)| f(x, y))
        .collect()
}
