//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Rescale bounds: inputs inside the old range map inside the new range
//! 2. Normalize bounds: every output lies in [0, 1]
//! 3. Lorentzian distance is a non-negative, symmetric premetric
//! 4. Neighbor window: never more than `neighbors_count` labels retained
//! 5. Alignment: tail alignment keeps the newest values of every series

use proptest::prelude::*;

use lorentzian_core::components::classifier::{classify, lorentzian_distance};
use lorentzian_core::components::indicator::FeatureArrays;
use lorentzian_core::domain::{align, SignalDirection};
use lorentzian_core::indicators::{normalize, rescale};
use lorentzian_core::settings::{ClassificationSettings, DownSampler};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_feature_vector(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0..1.0_f64, len)
}

fn arb_label() -> impl Strategy<Value = SignalDirection> {
    prop_oneof![
        Just(SignalDirection::Long),
        Just(SignalDirection::Short),
        Just(SignalDirection::Neutral),
    ]
}

fn arb_sampler() -> impl Strategy<Value = DownSampler> {
    prop_oneof![
        Just(DownSampler::Disabled),
        Just(DownSampler::EveryFourth),
        (1usize..6).prop_map(|every| DownSampler::UseEvery { every }),
        (2usize..6).prop_map(|every| DownSampler::SkipEvery { every }),
    ]
}

// ── 1. Rescale ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rescale_stays_in_target_range(
        lo in -1000.0..1000.0_f64,
        width in 0.1..1000.0_f64,
        t in 0.0..=1.0_f64,
        new_lo in -10.0..10.0_f64,
        new_width in 0.0..10.0_f64,
    ) {
        let hi = lo + width;
        let x = lo + t * width;
        let y = rescale(x, lo, hi, new_lo, new_lo + new_width);
        prop_assert!(y >= new_lo - 1e-9, "{y} below {new_lo}");
        prop_assert!(y <= new_lo + new_width + 1e-9, "{y} above {}", new_lo + new_width);
    }
}

// ── 2. Normalize ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn normalize_stays_in_unit_range(values in prop::collection::vec(-1e6..1e6_f64, 1..200)) {
        for v in normalize(&values) {
            prop_assert!((0.0..=1.0).contains(&v), "{v}");
        }
    }
}

// ── 3. Lorentzian distance ───────────────────────────────────────────

proptest! {
    #[test]
    fn distance_is_non_negative_and_symmetric(
        a in arb_feature_vector(5),
        b in arb_feature_vector(5),
    ) {
        let ab = lorentzian_distance(&a, &b);
        let ba = lorentzian_distance(&b, &a);
        prop_assert!(ab >= 0.0);
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn distance_is_zero_iff_equal(a in arb_feature_vector(4), i in 0usize..4, delta in 1e-6..1.0_f64) {
        prop_assert_eq!(lorentzian_distance(&a, &a), 0.0);
        let mut b = a.clone();
        b[i] += delta;
        prop_assert!(lorentzian_distance(&a, &b) > 0.0);
    }
}

// ── 4. Neighbor window ───────────────────────────────────────────────

proptest! {
    #[test]
    fn neighbor_window_is_bounded(
        f1 in arb_feature_vector(60),
        f2 in arb_feature_vector(60),
        labels in prop::collection::vec(arb_label(), 60),
        k in 1usize..10,
        max_bars_back in 1usize..80,
        sampler in arb_sampler(),
        remote in any::<bool>(),
    ) {
        let settings = ClassificationSettings::new(k, 0.0, max_bars_back, 30, remote, sampler).unwrap();
        let features = FeatureArrays::from_series(vec![("f1".into(), f1), ("f2".into(), f2)]);
        for i in 0..60 {
            let n = classify(&settings, &features, &labels, i);
            prop_assert!(n.len() <= k);
            prop_assert!(n.prediction().unsigned_abs() as usize <= k);
            prop_assert!(n.indices.iter().all(|&c| c < 60 && sampler.keeps(c)));
        }
    }
}

// ── 5. Alignment ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn align_keeps_newest_values(
        a in prop::collection::vec(any::<i32>(), 0..50),
        b in prop::collection::vec(any::<i32>(), 0..50),
    ) {
        let aligned = align(&[&a[..], &b[..]]);
        let len = a.len().min(b.len());
        prop_assert_eq!(aligned[0].len(), len);
        prop_assert_eq!(aligned[1].len(), len);
        prop_assert_eq!(aligned[0], &a[a.len() - len..]);
        prop_assert_eq!(aligned[1], &b[b.len() - len..]);
    }
}
