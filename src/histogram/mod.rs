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

//! N-dimensional feature histograms
//!
//! The persisted statistical artifact: a grid over the (trimmed) sample
//! extent whose cells hold the fractional number of sampled features
//! overlapping them. Built once per (column, mode) by
//! [`HistogramBuilder`](builder::HistogramBuilder), read-only afterwards,
//! shareable across any number of concurrent estimator calls.

pub mod builder;

pub use builder::HistogramBuilder;

use crate::core::{NdBox, NdCellRange, MIN_DIMENSION_WIDTH, ND_DIMS};

/// Which flavor of histogram this is.
///
/// Both flavors are maintained over the same sample: a pure N-D histogram
/// over-estimates 2D-only overlap queries, because features spanning
/// several cells of an unused dimension inflate the aggregated counts in
/// ways a 2D projection cannot undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// First two dimensions only. Always built, whatever the data.
    TwoD,
    /// Full observed dimensionality, up to 4.
    Nd,
}

/// An N-dimensional histogram of feature bounding boxes, plus the
/// cardinality bookkeeping the estimators need to turn cell mass into
/// row-fraction selectivity.
///
/// Invariant: the sum of `values` approximates `histogram_features`
/// within floating tolerance — every folded-in feature deposits a total
/// unit of mass, pro-rated over the cells it overlaps.
#[derive(Debug, Clone)]
pub struct NdHistogram {
    /// Mode this histogram was built under.
    pub mode: Mode,
    /// Dimensionality of the grid (2..=4).
    pub ndims: usize,
    /// Cells per dimension; dimensions past `ndims` hold 1.
    pub size: [usize; ND_DIMS],
    /// Spatial domain covered by the grid.
    pub extent: NdBox,
    /// Estimated rows in the table the sample was drawn from.
    pub table_features: f64,
    /// Rows examined by the sampling pass.
    pub sample_features: f64,
    /// Rows that produced a usable box.
    pub not_null_features: f64,
    /// Rows actually folded into the grid (survivors of deviant
    /// trimming).
    pub histogram_features: f64,
    /// Total fractional cell coverage deposited; ≈ `histogram_features`.
    pub cells_covered: f64,
    /// Flat row-major cell values: cell (i0,..,ik) lives at
    /// `Σ i_k · Π_{j<k} size[j]`.
    pub values: Vec<f32>,
}

impl NdHistogram {
    /// Number of cells in the grid.
    pub fn cells(&self) -> usize {
        self.values.len()
    }

    /// Flat index of the cell at `at`, or `None` when any coordinate is
    /// out of range.
    pub fn value_index(&self, at: &[usize; ND_DIMS]) -> Option<usize> {
        let mut accum = 1;
        let mut idx = 0;
        for d in 0..self.ndims {
            if at[d] >= self.size[d] {
                return None;
            }
            idx += at[d] * accum;
            accum *= self.size[d];
        }
        Some(idx)
    }

    /// Range of cell addresses overlapped by `nd_box`, clamped to the
    /// grid. Degenerate dimensions (width below [`MIN_DIMENSION_WIDTH`])
    /// always carry exactly one cell, so they pin to address 0.
    pub fn cell_range(&self, nd_box: &NdBox) -> NdCellRange {
        let mut range = NdCellRange::default();
        for d in 0..self.ndims {
            let smin = self.extent.min[d] as f64;
            let width = self.extent.width(d);

            if width < MIN_DIMENSION_WIDTH {
                range.min[d] = 0;
                range.max[d] = 0;
                continue;
            }

            let size = self.size[d] as f64;
            let last = self.size[d] as i64 - 1;
            let lo = (size * (nd_box.min[d] as f64 - smin) / width).floor() as i64;
            let hi = (size * (nd_box.max[d] as f64 - smin) / width).floor() as i64;
            range.min[d] = lo.clamp(0, last) as usize;
            range.max[d] = hi.clamp(0, last) as usize;
        }
        range
    }

    /// Spatial bounds of the cell at `at`.
    pub fn cell_bounds(&self, at: &[usize; ND_DIMS]) -> NdBox {
        let mut cell = NdBox::zero();
        for d in 0..self.ndims {
            let min = self.extent.min[d] as f64;
            let cellsize = self.extent.width(d) / self.size[d] as f64;
            cell.min[d] = (min + at[d] as f64 * cellsize) as f32;
            cell.max[d] = (min + (at[d] + 1) as f64 * cellsize) as f32;
        }
        cell
    }

    /// Sum of all cell values. Diagnostic cross-check against
    /// `histogram_features`.
    pub fn total_mass(&self) -> f64 {
        self.values.iter().map(|&v| v as f64).sum()
    }

    /// Render the histogram header as JSON for diagnostics. Cell values
    /// are omitted; this is a human-readable summary, not a wire format.
    pub fn to_json(&self) -> String {
        let size = self.size[..self.ndims]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{{\"ndims\":{},\"size\":[{}],\"extent\":{},\
             \"table_features\":{},\"sample_features\":{},\
             \"not_null_features\":{},\"histogram_features\":{},\
             \"histogram_cells\":{},\"cells_covered\":{}}}",
            self.ndims,
            size,
            self.extent.to_json(self.ndims),
            self.table_features.round() as i64,
            self.sample_features.round() as i64,
            self.not_null_features.round() as i64,
            self.histogram_features.round() as i64,
            self.cells() as i64,
            self.cells_covered.round() as i64,
        )
    }

    /// Printable grid of the first two dimensions, one text row per Y
    /// cell row. Diagnostic only.
    pub fn to_grid(&self) -> String {
        let sizex = self.size[0];
        let sizey = if self.ndims > 1 { self.size[1] } else { 1 };
        let mut out = String::new();
        for y in 0..sizey {
            for x in 0..sizex {
                let v = self.values[x + y * sizex];
                out.push_str(&format!("{:3} ", v.round() as i64));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_2x3() -> NdHistogram {
        let mut extent = NdBox::zero();
        extent.min = [0.0, 0.0, 0.0, 0.0];
        extent.max = [2.0, 3.0, 0.0, 0.0];
        NdHistogram {
            mode: Mode::TwoD,
            ndims: 2,
            size: [2, 3, 1, 1],
            extent,
            table_features: 6.0,
            sample_features: 6.0,
            not_null_features: 6.0,
            histogram_features: 6.0,
            cells_covered: 6.0,
            values: vec![1.0; 6],
        }
    }

    #[test]
    fn test_value_index_row_major() {
        let h = grid_2x3();
        assert_eq!(h.value_index(&[0, 0, 0, 0]), Some(0));
        assert_eq!(h.value_index(&[1, 0, 0, 0]), Some(1));
        assert_eq!(h.value_index(&[0, 1, 0, 0]), Some(2));
        assert_eq!(h.value_index(&[1, 2, 0, 0]), Some(5));
        assert_eq!(h.value_index(&[2, 0, 0, 0]), None);
        assert_eq!(h.value_index(&[0, 3, 0, 0]), None);
    }

    #[test]
    fn test_cell_range_clamps_to_grid() {
        let h = grid_2x3();
        let mut probe = NdBox::zero();
        probe.min = [-5.0, -5.0, 0.0, 0.0];
        probe.max = [10.0, 10.0, 0.0, 0.0];
        let range = h.cell_range(&probe);
        assert_eq!(range.min[0], 0);
        assert_eq!(range.max[0], 1);
        assert_eq!(range.min[1], 0);
        assert_eq!(range.max[1], 2);
    }

    #[test]
    fn test_cell_range_maps_interior_points() {
        let h = grid_2x3();
        let mut probe = NdBox::zero();
        probe.min = [0.5, 1.2, 0.0, 0.0];
        probe.max = [1.5, 2.8, 0.0, 0.0];
        let range = h.cell_range(&probe);
        assert_eq!((range.min[0], range.max[0]), (0, 1));
        assert_eq!((range.min[1], range.max[1]), (1, 2));
    }

    #[test]
    fn test_cell_range_degenerate_dimension_pins_to_zero() {
        let mut h = grid_2x3();
        h.extent.min[1] = 5.0;
        h.extent.max[1] = 5.0;
        h.size[1] = 1;
        h.values = vec![1.0; 2];
        let mut probe = NdBox::zero();
        probe.min = [0.0, 5.0, 0.0, 0.0];
        probe.max = [2.0, 5.0, 0.0, 0.0];
        let range = h.cell_range(&probe);
        assert_eq!((range.min[1], range.max[1]), (0, 0));
    }

    #[test]
    fn test_cell_bounds_tile_the_extent() {
        let h = grid_2x3();
        let first = h.cell_bounds(&[0, 0, 0, 0]);
        assert_eq!(first.min[0], 0.0);
        assert_eq!(first.max[0], 1.0);
        assert_eq!(first.max[1], 1.0);
        let last = h.cell_bounds(&[1, 2, 0, 0]);
        assert_eq!(last.min[0], 1.0);
        assert_eq!(last.max[0], 2.0);
        assert_eq!(last.min[1], 2.0);
        assert_eq!(last.max[1], 3.0);
    }

    #[test]
    fn test_json_dump_fields() {
        let json = grid_2x3().to_json();
        for field in [
            "\"ndims\":2",
            "\"size\":[2,3]",
            "\"extent\":",
            "\"table_features\":6",
            "\"sample_features\":6",
            "\"not_null_features\":6",
            "\"histogram_features\":6",
            "\"histogram_cells\":6",
            "\"cells_covered\":6",
        ] {
            assert!(json.contains(field), "missing {} in {}", field, json);
        }
    }

    #[test]
    fn test_grid_dump_shape() {
        let grid = grid_2x3().to_grid();
        let lines: Vec<_> = grid.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.matches("  1").count() == 2));
    }

    #[test]
    fn test_total_mass() {
        assert_eq!(grid_2x3().total_mass(), 6.0);
    }
}
