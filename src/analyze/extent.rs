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

//! Estimated column extent
//!
//! A planner often only needs a rough bounding box for a whole column.
//! The cheapest answer is the root of a spatial index, when the host can
//! read one; otherwise the histogram extent serves, since the histogram
//! already covers (almost) all of the sampled data.

use crate::core::FeatureBounds;
use crate::histogram::NdHistogram;
use crate::sample::IndexExtentReader;

/// Estimate a column's spatial extent.
///
/// Consults the index reader first — its answer is an upper bound read
/// straight from index metadata — and falls back to the histogram extent
/// when no index is available or it cannot produce a box. Returns `None`
/// only when neither source can answer.
///
/// The histogram path reports X/Y, plus Z for histograms built over more
/// than two dimensions. Note the histogram extent is deviation-trimmed:
/// extreme outliers may fall outside it.
pub fn estimated_extent(
    index: Option<&dyn IndexExtentReader>,
    stats: Option<&NdHistogram>,
) -> Option<FeatureBounds> {
    if let Some(reader) = index {
        if let Some(extent) = reader.read_extent() {
            tracing::debug!("column extent read from index");
            return Some(extent);
        }
    }

    let stats = stats?;
    let e = &stats.extent;
    let mut bounds = FeatureBounds::xy(
        e.min[0] as f64,
        e.min[1] as f64,
        e.max[0] as f64,
        e.max[1] as f64,
    );
    if stats.ndims > 2 {
        bounds.zmin = e.min[2] as f64;
        bounds.zmax = e.max[2] as f64;
        bounds.has_z = true;
    }
    tracing::debug!("column extent read from histogram");
    Some(bounds)
}
