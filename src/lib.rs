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

//! # Geosel - spatial selectivity estimation
//!
//! Geosel is a standalone statistics engine for spatial columns. It
//! builds adaptive multi-dimensional histograms over feature bounding
//! boxes and uses them to estimate the selectivity of range-overlap and
//! spatial-join predicates — the numbers a cost-based query planner needs
//! to pick a sane plan, produced without any host database.
//!
//! ## Key Features
//!
//! - **Adaptive histograms** - resolution apportioned per dimension by
//!   observed density variability, bounded by a configurable cell budget
//! - **Outlier-aware extents** - deviation-based trimming keeps a few
//!   far-flung features from flattening the whole histogram
//! - **Dual 2D/N-D statistics** - both histograms maintained per column,
//!   up to 4 dimensions, so 2D overlap queries are not over-estimated
//! - **Graceful degradation** - estimators always answer, falling back to
//!   documented constants when statistics are missing or unstable
//! - **Pure and shareable** - histograms are immutable after build and
//!   safe to read from any number of threads
//!
//! ## Quick Start
//!
//! ```rust
//! use geosel::{
//!     build_histogram, estimate_selectivity, FeatureBounds, Mode, StatsConfig, VecSource,
//! };
//!
//! // Bounding boxes of 100 features on a 10x10 grid
//! let source = VecSource::from_bounds(
//!     (0..100).map(|i| {
//!         let x = (i % 10) as f64;
//!         let y = (i / 10) as f64;
//!         FeatureBounds::xy(x, y, x + 1.0, y + 1.0)
//!     }),
//!     32,
//! );
//!
//! let stats = build_histogram(&source, 100.0, Mode::TwoD, &StatsConfig::default()).unwrap();
//!
//! // Fraction of rows expected to overlap the left half of the domain
//! let query = FeatureBounds::xy(0.0, 0.0, 5.0, 10.0);
//! let sel = estimate_selectivity(Some(&stats), &query, Mode::TwoD);
//! assert!(sel > 0.3 && sel < 0.7);
//! ```
//!
//! ## Modules
//!
//! - [`core`] - bounding-box primitives, errors, cancellation
//! - [`sample`] - the [`BoxSource`] ingestion interface and collection pass
//! - [`histogram`] - the histogram artifact and its builder
//! - [`selectivity`] - single-relation and join estimators
//! - [`analyze`] - the dual-mode analysis driver, statistics cache, and
//!   estimated-extent helper
//! - [`config`] - engine configuration

pub mod analyze;
pub mod config;
pub mod core;
pub mod histogram;
pub mod sample;
pub mod selectivity;

// Re-export main types for convenience
pub use core::{
    CancelFlag, Error, FeatureBounds, NdBox, NdCellRange, Result, MAX_DIMENSION_WIDTH,
    MIN_DIMENSION_WIDTH, ND_DIMS,
};

// Re-export config types
pub use config::StatsConfig;

// Re-export sample types
pub use sample::{
    BoxSource, IndexExtentReader, SampleCollector, SampleDigest, SampleValue, VecSource,
};

// Re-export histogram types
pub use histogram::{HistogramBuilder, Mode, NdHistogram};

// Re-export estimators and their fallback constants
pub use selectivity::{
    estimate_join_selectivity, estimate_selectivity, DEFAULT_JOINSEL, DEFAULT_SEL,
    FALLBACK_JOINSEL, FALLBACK_SEL,
};

// Re-export analysis driver types
pub use analyze::{build_histogram, estimated_extent, Analyzer, ColumnStatistics, StatsCache};
