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

//! Benchmarks for histogram construction and selectivity estimation
//!
//! Run with: cargo bench --bench selectivity

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use geosel::{
    build_histogram, estimate_join_selectivity, estimate_selectivity, FeatureBounds, Mode,
    NdHistogram, StatsConfig, VecSource,
};

const SAMPLE_SIZE: usize = 10_000;

fn uniform_source(seed: u64, origin: f64) -> VecSource {
    let mut rng = StdRng::seed_from_u64(seed);
    VecSource::from_bounds(
        (0..SAMPLE_SIZE).map(move |_| {
            let x: f64 = rng.random_range(origin..origin + 1000.0);
            let y: f64 = rng.random_range(origin..origin + 1000.0);
            FeatureBounds::xy(x, y, x + 5.0, y + 5.0)
        }),
        64,
    )
}

fn uniform_stats(seed: u64, origin: f64) -> NdHistogram {
    build_histogram(
        &uniform_source(seed, origin),
        SAMPLE_SIZE as f64,
        Mode::TwoD,
        &StatsConfig::default(),
    )
    .unwrap()
}

fn bench_build(c: &mut Criterion) {
    let source = uniform_source(1, 0.0);
    c.bench_function("build_histogram_10k", |b| {
        b.iter(|| {
            build_histogram(
                black_box(&source),
                SAMPLE_SIZE as f64,
                Mode::TwoD,
                &StatsConfig::default(),
            )
            .unwrap()
        })
    });
}

fn bench_estimate(c: &mut Criterion) {
    let stats = uniform_stats(1, 0.0);
    let query = FeatureBounds::xy(100.0, 100.0, 400.0, 400.0);
    c.bench_function("estimate_selectivity", |b| {
        b.iter(|| estimate_selectivity(black_box(Some(&stats)), black_box(&query), Mode::TwoD))
    });
}

fn bench_join(c: &mut Criterion) {
    let left = uniform_stats(1, 0.0);
    let right = uniform_stats(2, 500.0);
    c.bench_function("estimate_join_selectivity", |b| {
        b.iter(|| estimate_join_selectivity(black_box(Some(&left)), black_box(Some(&right))))
    });
}

criterion_group!(benches, bench_build, bench_estimate, bench_join);
criterion_main!(benches);
