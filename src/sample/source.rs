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

//! Sample row sources
//!
//! The engine never sees geometry. A host hands it bounding boxes through
//! [`BoxSource`], one [`SampleValue`] per sampled row, and (optionally)
//! a cheap column-extent upper bound through [`IndexExtentReader`].

use crate::core::FeatureBounds;

/// One sampled row, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    /// The row's spatial value is NULL.
    Null,
    /// The row holds an empty geometry: no bounding box can be computed.
    Empty,
    /// A feature with computable bounds. `width_bytes` is the serialized
    /// size of the feature payload, used for average-width statistics.
    Feature {
        bounds: FeatureBounds,
        width_bytes: usize,
    },
}

impl SampleValue {
    /// Convenience constructor for a feature row.
    pub fn feature(bounds: FeatureBounds, width_bytes: usize) -> Self {
        SampleValue::Feature {
            bounds,
            width_bytes,
        }
    }
}

/// Source of sampled rows for one column.
///
/// Implementations are indexed rather than iterated so the collector can
/// visit a reservoir-sampled subset of a large input without the host
/// materializing it twice.
pub trait BoxSource {
    /// Number of sampled rows available.
    fn len(&self) -> usize;

    /// True when the source holds no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value of row `row`, `0 <= row < len()`.
    fn get(&self, row: usize) -> SampleValue;
}

/// In-memory [`BoxSource`] over a vector of sample values.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    rows: Vec<SampleValue>,
}

impl VecSource {
    /// Wrap an owned vector of sample values.
    pub fn new(rows: Vec<SampleValue>) -> Self {
        Self { rows }
    }

    /// Build a source of plain features with a fixed payload width.
    pub fn from_bounds(bounds: impl IntoIterator<Item = FeatureBounds>, width_bytes: usize) -> Self {
        Self {
            rows: bounds
                .into_iter()
                .map(|b| SampleValue::feature(b, width_bytes))
                .collect(),
        }
    }
}

impl BoxSource for VecSource {
    fn len(&self) -> usize {
        self.rows.len()
    }

    fn get(&self, row: usize) -> SampleValue {
        self.rows[row]
    }
}

/// Optional fast path: a reader that can produce a cheap upper bound on a
/// column's spatial extent, typically from the root page of a spatial
/// index. Absence is non-fatal; callers fall back to histogram extents.
pub trait IndexExtentReader {
    /// A box guaranteed to cover the column's true extent, or `None` if
    /// the index cannot provide one.
    fn read_extent(&self) -> Option<FeatureBounds>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_source_roundtrip() {
        let source = VecSource::new(vec![
            SampleValue::Null,
            SampleValue::Empty,
            SampleValue::feature(FeatureBounds::xy(0.0, 0.0, 1.0, 1.0), 32),
        ]);
        assert_eq!(source.len(), 3);
        assert!(!source.is_empty());
        assert_eq!(source.get(0), SampleValue::Null);
        assert_eq!(source.get(1), SampleValue::Empty);
        assert!(matches!(source.get(2), SampleValue::Feature { .. }));
    }

    #[test]
    fn test_from_bounds_sets_width() {
        let source = VecSource::from_bounds([FeatureBounds::xy(0.0, 0.0, 1.0, 1.0)], 48);
        match source.get(0) {
            SampleValue::Feature { width_bytes, .. } => assert_eq!(width_bytes, 48),
            other => panic!("unexpected value {:?}", other),
        }
    }
}
