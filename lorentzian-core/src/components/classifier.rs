//! Approximate nearest-neighbor classification in Lorentzian space.
//!
//! For candle `i`, walk the historical candidates chronologically and keep a
//! sliding window of at most `neighbors_count` labels whose feature distance
//! to `i` does not fall below a running threshold. The prediction is the sum
//! of the retained labels.
//!
//! Distance: `sum_f ln(1 + |f[i] - f[c]|)`. The log compresses large feature
//! gaps, so a single outlying feature cannot dominate the vote.

use std::collections::VecDeque;
use std::ops::Range;

use rayon::prelude::*;

use crate::domain::SignalDirection;
use crate::settings::ClassificationSettings;

use super::indicator::FeatureArrays;

/// Lorentzian distance between two feature vectors.
pub fn lorentzian_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (1.0 + (x - y).abs()).ln())
        .sum()
}

fn distance_between(features: &FeatureArrays, i: usize, c: usize) -> f64 {
    features
        .iter()
        .map(|series| (1.0 + (series[i] - series[c]).abs()).ln())
        .sum()
}

/// The neighbor window retained for one candle.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbors {
    /// Candidate candle indices, oldest first.
    pub indices: VecDeque<usize>,
    pub distances: VecDeque<f64>,
    pub labels: VecDeque<i64>,
    /// Final value of the running distance threshold.
    pub last_distance: f64,
}

impl Neighbors {
    fn new(capacity: usize) -> Self {
        Self {
            indices: VecDeque::with_capacity(capacity + 1),
            distances: VecDeque::with_capacity(capacity + 1),
            labels: VecDeque::with_capacity(capacity + 1),
            last_distance: -1.0,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Sum of the retained labels.
    pub fn prediction(&self) -> i64 {
        self.labels.iter().sum()
    }
}

/// Candidate candles for candle `i` in a series of `len` candles.
pub fn candidate_range(settings: &ClassificationSettings, i: usize, len: usize) -> Range<usize> {
    let size_loop = settings.max_bars_back.saturating_sub(1).min(i);
    let (start, end) = if settings.use_remote_fractals {
        let start = i.saturating_sub(settings.live_history_size);
        (start, start + size_loop)
    } else {
        (i - size_loop, i)
    };
    start.min(len)..end.min(len)
}

/// Run the neighbor search for candle `i`.
///
/// `features` and `labels` must be tail-aligned to the same length.
pub fn classify(
    settings: &ClassificationSettings,
    features: &FeatureArrays,
    labels: &[SignalDirection],
    i: usize,
) -> Neighbors {
    let k = settings.neighbors_count;
    let mut neighbors = Neighbors::new(k);
    let len = features.len().min(labels.len());
    if i >= len {
        return neighbors;
    }

    for c in candidate_range(settings, i, len) {
        if !settings.down_sampler.keeps(c) {
            continue;
        }
        let distance = distance_between(features, i, c);
        if distance < neighbors.last_distance {
            continue;
        }
        neighbors.last_distance = distance;
        neighbors.indices.push_back(c);
        neighbors.distances.push_back(distance);
        neighbors.labels.push_back(labels[c].value());

        if neighbors.len() > k {
            if let Some(&threshold) = neighbors
                .distances
                .get(settings.last_distance_neighbors_count)
            {
                neighbors.last_distance = threshold;
            }
            neighbors.indices.pop_front();
            neighbors.distances.pop_front();
            neighbors.labels.pop_front();
        }
    }
    neighbors
}

/// Predictions for every candle in `range`, in order.
///
/// Candles are independent of each other, so they are classified in parallel.
pub fn classify_range(
    settings: &ClassificationSettings,
    features: &FeatureArrays,
    labels: &[SignalDirection],
    range: Range<usize>,
) -> Vec<i64> {
    range
        .into_par_iter()
        .map(|i| classify(settings, features, labels, i).prediction())
        .collect()
}

/// Predictions for every aligned candle.
pub fn classify_all(
    settings: &ClassificationSettings,
    features: &FeatureArrays,
    labels: &[SignalDirection],
) -> Vec<i64> {
    let len = features.len().min(labels.len());
    classify_range(settings, features, labels, 0..len)
}
