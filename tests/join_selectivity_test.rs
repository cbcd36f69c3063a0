// Copyright 2025 Geosel Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tests for spatial join selectivity estimation

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use geosel::{
    build_histogram, estimate_join_selectivity, FeatureBounds, Mode, NdHistogram, StatsConfig,
    VecSource, FALLBACK_JOINSEL,
};

fn uniform_stats(
    seed: u64,
    n: usize,
    origin: f64,
    span: f64,
    config: &StatsConfig,
) -> NdHistogram {
    let mut rng = StdRng::seed_from_u64(seed);
    let source = VecSource::from_bounds(
        (0..n).map(move |_| {
            let x: f64 = rng.random_range(origin..origin + span);
            let y: f64 = rng.random_range(origin..origin + span);
            FeatureBounds::xy(x, y, x + 1.0, y + 1.0)
        }),
        32,
    );
    build_histogram(&source, n as f64, Mode::TwoD, config).unwrap()
}

/// Test joins of overlapping relations produce a plausible, in-range
/// selectivity
#[test]
fn test_overlapping_join_in_range() {
    let config = StatsConfig::default();
    let a = uniform_stats(1, 1000, 0.0, 100.0, &config);
    let b = uniform_stats(2, 800, 50.0, 100.0, &config);

    let sel = estimate_join_selectivity(Some(&a), Some(&b));
    assert!(sel > 0.0, "overlapping relations must join");
    assert!(sel < 0.05, "unit boxes rarely pair up, got {}", sel);
}

/// Test join selectivity is symmetric in its operands
#[test]
fn test_join_symmetry() {
    let config = StatsConfig::default();
    // Different sizes and resolutions on purpose, so the swap-to-smaller
    // drive direction differs between the two calls
    let a = uniform_stats(3, 1000, 0.0, 100.0, &config);
    let coarse = StatsConfig::default().with_stats_target(20);
    let b = uniform_stats(4, 500, 30.0, 60.0, &coarse);
    assert!(a.cells() != b.cells());

    let ab = estimate_join_selectivity(Some(&a), Some(&b));
    let ba = estimate_join_selectivity(Some(&b), Some(&a));
    assert!(
        (ab - ba).abs() < 1e-12,
        "join selectivity not symmetric: {} vs {}",
        ab,
        ba
    );
}

/// Test relations with disjoint extents join to exactly zero
#[test]
fn test_disjoint_relations_join_to_zero() {
    let config = StatsConfig::default();
    let a = uniform_stats(5, 500, 0.0, 50.0, &config);
    let b = uniform_stats(6, 500, 10_000.0, 50.0, &config);
    assert_eq!(estimate_join_selectivity(Some(&a), Some(&b)), 0.0);
    assert_eq!(estimate_join_selectivity(Some(&b), Some(&a)), 0.0);
}

/// Test a relation always joins with itself
#[test]
fn test_self_join_positive() {
    let config = StatsConfig::default();
    let a = uniform_stats(7, 1000, 0.0, 100.0, &config);
    let sel = estimate_join_selectivity(Some(&a), Some(&a));
    assert!(sel > 0.0 && sel <= 1.0, "self join sel {}", sel);
}

/// Test a dense overlap joins more selectively than a marginal one
#[test]
fn test_overlap_area_orders_estimates() {
    let config = StatsConfig::default();
    let a = uniform_stats(8, 1000, 0.0, 100.0, &config);
    let mostly_overlapping = uniform_stats(9, 1000, 10.0, 100.0, &config);
    let barely_overlapping = uniform_stats(10, 1000, 95.0, 100.0, &config);

    let dense = estimate_join_selectivity(Some(&a), Some(&mostly_overlapping));
    let sparse = estimate_join_selectivity(Some(&a), Some(&barely_overlapping));
    assert!(
        dense > sparse,
        "dense overlap {} should beat sparse {}",
        dense,
        sparse
    );
}

/// Test missing statistics on either side fall back to the documented
/// constant
#[test]
fn test_missing_statistics_fallback() {
    let config = StatsConfig::default();
    let a = uniform_stats(11, 200, 0.0, 50.0, &config);
    assert_eq!(estimate_join_selectivity(None, None), FALLBACK_JOINSEL);
    assert_eq!(
        estimate_join_selectivity(Some(&a), None),
        FALLBACK_JOINSEL
    );
    assert_eq!(
        estimate_join_selectivity(None, Some(&a)),
        FALLBACK_JOINSEL
    );
}

/// Test sampled relations scale up to their table estimates: the same
/// sample standing in for a bigger table must not change the join
/// fraction
#[test]
fn test_sample_scaling_keeps_fraction_stable() {
    let mut rng = StdRng::seed_from_u64(12);
    let bounds: Vec<FeatureBounds> = (0..1000)
        .map(|_| {
            let x: f64 = rng.random_range(0.0..99.0);
            let y: f64 = rng.random_range(0.0..99.0);
            FeatureBounds::xy(x, y, x + 1.0, y + 1.0)
        })
        .collect();
    let config = StatsConfig::default();
    let source = VecSource::from_bounds(bounds, 32);

    let as_full_table = build_histogram(&source, 1000.0, Mode::TwoD, &config).unwrap();
    let as_sample = build_histogram(&source, 100_000.0, Mode::TwoD, &config).unwrap();

    let sel_full = estimate_join_selectivity(Some(&as_full_table), Some(&as_full_table));
    let sel_sampled = estimate_join_selectivity(Some(&as_sample), Some(&as_sample));
    let ratio = sel_full / sel_sampled;
    assert!(
        (0.5..2.0).contains(&ratio),
        "join fraction should be scale-invariant: {} vs {}",
        sel_full,
        sel_sampled
    );
}
