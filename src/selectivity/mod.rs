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

//! Selectivity estimation
//!
//! Pure functions over read-only histograms. An estimate is *always*
//! produced: missing statistics and numeric trouble degrade to the
//! documented fallback constants instead of failing the caller's query,
//! so a planner can lean on these unconditionally.

use crate::core::FeatureBounds;
use crate::histogram::{Mode, NdHistogram};

/// Selectivity assumed when a query produces an unusable number
/// (NaN, infinite, negative).
pub const DEFAULT_SEL: f64 = 0.0001;

/// Join selectivity assumed when the join estimate is unusable.
pub const DEFAULT_JOINSEL: f64 = 0.001;

/// Selectivity assumed when no histogram exists for the column.
pub const FALLBACK_SEL: f64 = 0.2;

/// Join selectivity assumed when either side lacks a histogram.
pub const FALLBACK_JOINSEL: f64 = 0.3;

/// Estimate the fraction of a table's rows whose bounding box overlaps
/// `query`, from the column's histogram.
///
/// Sums the histogram mass under the query box, pro-rating cells the box
/// only partially covers, and scales by the number of features that built
/// the histogram. 2D mode restricts the overlap test to the first two
/// dimensions regardless of the data's dimensionality.
///
/// Exactness guarantees: a query disjoint from the histogram extent in
/// any active dimension returns exactly 0.0 — required for correctness of
/// N-dimensional overlap semantics, not just speed — and a query box
/// enclosing the whole extent returns exactly 1.0.
pub fn estimate_selectivity(
    stats: Option<&NdHistogram>,
    query: &FeatureBounds,
    mode: Mode,
) -> f64 {
    let Some(stats) = stats else {
        tracing::debug!("selectivity requested without statistics, using fallback");
        return FALLBACK_SEL;
    };

    // A search box that could not be computed matches nothing
    if !query.is_finite() {
        return 0.0;
    }

    let nd_box = query.nd_box();
    let ndims_max = match mode {
        Mode::TwoD => 2,
        Mode::Nd => stats.ndims.max(query.ndims()),
    };

    if !nd_box.intersects(&stats.extent, ndims_max) {
        tracing::trace!("search box does not overlap histogram, selectivity 0");
        return 0.0;
    }
    if nd_box.contains(&stats.extent, ndims_max) {
        tracing::trace!("search box contains histogram, selectivity 1");
        return 1.0;
    }

    let range = stats.cell_range(&nd_box);
    let mut total = 0.0_f64;
    let mut at = range.min;
    loop {
        let cell = stats.cell_bounds(&at);
        let ratio = nd_box.ratio(&cell, stats.ndims);
        if let Some(idx) = stats.value_index(&at) {
            total += stats.values[idx] as f64 * ratio;
        }
        if !range.increment(stats.ndims, &mut at) {
            break;
        }
    }

    let selectivity = total / stats.histogram_features;
    tracing::debug!(total, selectivity, "single-relation estimate");

    if !selectivity.is_finite() || selectivity < 0.0 {
        return DEFAULT_SEL;
    }
    selectivity.min(1.0)
}

/// Estimate the selectivity of an overlap join between two columns from
/// their histograms: the estimated number of matching row pairs divided
/// by the full cross product of the two relations' non-null rows.
///
/// Walks every cell of one histogram and accumulates
/// `val1 · val2 · overlap_ratio` over the other's overlapping cells, then
/// scales the sampled mass up to full-table mass on both sides. The walk
/// is driven from the histogram with fewer cells, which bounds the work
/// without changing the result; the estimate is symmetric in its
/// arguments.
pub fn estimate_join_selectivity(s1: Option<&NdHistogram>, s2: Option<&NdHistogram>) -> f64 {
    let (Some(s1), Some(s2)) = (s1, s2) else {
        tracing::debug!("join selectivity requested without statistics, using fallback");
        return FALLBACK_JOINSEL;
    };

    // Drive the outer loop from the smaller histogram
    let (s1, s2) = if s1.cells() > s2.cells() {
        (s2, s1)
    } else {
        (s1, s2)
    };

    // Largest join output these relations could produce: the cross
    // product of their estimated non-null row counts
    let not_null1 = s1.table_features * (s1.not_null_features / s1.sample_features);
    let not_null2 = s2.table_features * (s2.not_null_features / s2.sample_features);
    let ntuples_max = not_null1 * not_null2;

    let ndims = s1.ndims.max(s2.ndims);

    // Non-intersecting relation extents make the join very, very
    // selective
    if !s1.extent.intersects(&s2.extent, ndims) {
        tracing::trace!("relation extents do not intersect, join selectivity 0");
        return 0.0;
    }

    // Only the part of s1 that overlaps s2's extent can contribute
    let range1 = s1.cell_range(&s2.extent);
    let mut val = 0.0_f64;
    let mut at1 = range1.min;
    loop {
        let cell1 = s1.cell_bounds(&at1);
        let val1 = match s1.value_index(&at1) {
            Some(idx) => s1.values[idx] as f64,
            None => 0.0,
        };

        let range2 = s2.cell_range(&cell1);
        let mut at2 = range2.min;
        loop {
            let cell2 = s2.cell_bounds(&at2);
            let ratio = cell1.ratio(&cell2, ndims);
            if let Some(idx) = s2.value_index(&at2) {
                val += val1 * (s2.values[idx] as f64 * ratio);
            }
            if !range2.increment(s2.ndims, &mut at2) {
                break;
            }
        }

        if !range1.increment(s1.ndims, &mut at1) {
            break;
        }
    }

    // The histograms hold sampled mass; project both sides up to
    // full-table mass before comparing against the cross product
    val *= s1.table_features / s1.sample_features;
    val *= s2.table_features / s2.sample_features;

    let selectivity = val / ntuples_max;
    tracing::debug!(val, ntuples_max, selectivity, "join estimate");

    if !selectivity.is_finite() || selectivity < 0.0 {
        return DEFAULT_JOINSEL;
    }
    selectivity.min(1.0)
}
