// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Carbon Impact Estimator

use group_buy_engine::carbon::{estimate, BaselineSource, CarbonPolicy};
use proptest::prelude::*;

const EPSILON: f64 = 1e-9;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    /// Same inputs, same breakdown
    #[test]
    fn prop_estimate_is_deterministic(
        baseline in proptest::option::of(0.0f64..500.0),
        n in 0u32..1_000,
        percent in 0.0f64..100.0,
    ) {
        prop_assert_eq!(estimate(baseline, n, percent), estimate(baseline, n, percent));
    }

    /// Total is shipping plus product; packaging stays separate
    #[test]
    fn prop_total_excludes_packaging(
        baseline in 0.1f64..500.0,
        n in 1u32..1_000,
        percent in 0.0f64..100.0,
    ) {
        let impact = estimate(Some(baseline), n, percent);
        prop_assert!(close(impact.total, impact.shipping_saved + impact.product_saved));
        prop_assert!(close(impact.packaging_saved, f64::from(n) * 0.2));
        prop_assert_eq!(impact.baseline_source, BaselineSource::Product);
    }

    /// Each extra participant saves 2.0 kg of shipping
    #[test]
    fn prop_shipping_grows_linearly(n in 1u32..10_000) {
        let a = estimate(Some(10.0), n, 15.0);
        let b = estimate(Some(10.0), n + 1, 15.0);
        prop_assert!(close(b.shipping_saved - a.shipping_saved, 2.0));
        prop_assert!(a.shipping_saved >= 0.0);
    }

    /// Unusable baselines fall back to the policy value
    #[test]
    fn prop_unusable_baseline_uses_fallback(
        bad in prop_oneof![
            Just(None),
            Just(Some(0.0)),
            (-1_000.0f64..0.0).prop_map(Some),
            Just(Some(f64::NAN)),
            Just(Some(f64::INFINITY)),
        ],
        n in 1u32..100,
        fallback in 0.1f64..100.0,
    ) {
        let policy = CarbonPolicy::default().with_fallback_baseline(fallback);
        let impact = policy.estimate(bad, n, 15.0);
        prop_assert_eq!(impact.baseline_source, BaselineSource::Fallback);
        prop_assert!(close(impact.product_saved, fallback * f64::from(n) * 15.0 / 100.0));
        prop_assert!(impact.total.is_finite());
    }
}

#[test]
fn test_reference_breakdown() {
    let impact = estimate(Some(10.0), 5, 15.0);
    assert_eq!(impact.product_saved, 7.5);
    assert_eq!(impact.shipping_saved, 8.0);
    assert_eq!(impact.packaging_saved, 1.0);
    assert_eq!(impact.total, 15.5);
}
