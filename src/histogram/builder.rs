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

//! Histogram construction
//!
//! Turns a [`SampleDigest`] into an [`NdHistogram`] in four steps:
//!
//! 1. Bound the cell budget by the configured resolution target, the
//!    dimensionality, and the table size.
//! 2. Trim the histogram extent to mean ± [`SD_FACTOR`] standard
//!    deviations per dimension (never beyond the sample extent), drop
//!    boxes entirely outside as hard deviants, re-fit the extent to the
//!    survivors, and pad it 1% against boundary artifacts.
//! 3. Apportion cells to dimensions in proportion to each dimension's
//!    density variability; uniform dimensions get a single cell.
//! 4. Deposit each survivor's unit mass across the cells it overlaps,
//!    pro-rated by geometric overlap.

use crate::config::StatsConfig;
use crate::core::{
    CancelFlag, Error, NdBox, Result, MAX_DIMENSION_WIDTH, MIN_DIMENSION_WIDTH, ND_DIMS,
};
use crate::histogram::NdHistogram;
use crate::sample::SampleDigest;

/// How many standard deviations from the mean the histogram extent may
/// reach. Boxes entirely beyond this are treated as outliers and kept out
/// of the histogram.
pub const SD_FACTOR: f64 = 3.25;

/// Most 1-D bins used when scoring a dimension's density variability.
pub const MAX_NUM_BINS: usize = 50;

/// Sample boxes per variability bin.
pub const BIN_MIN_SIZE: usize = 10;

/// Proportional padding applied to the fitted extent so features sitting
/// exactly on the boundary still fall inside the grid.
const EXTENT_EXPANSION: f64 = 0.01;

/// One-shot histogram builder. Owns its digest for the duration of the
/// build; the deviant-trimming pass nulls boxes out in place.
pub struct HistogramBuilder {
    digest: SampleDigest,
    total_rows: f64,
    config: StatsConfig,
}

impl HistogramBuilder {
    /// Prepare a build over `digest`, for a table estimated to hold
    /// `total_rows` rows.
    pub fn new(digest: SampleDigest, total_rows: f64, config: &StatsConfig) -> Self {
        Self {
            digest,
            total_rows,
            config: config.clone(),
        }
    }

    /// Run the build. Fails with [`Error::NoStatistics`] when the sample
    /// holds no usable feature or every feature was trimmed as a deviant;
    /// no histogram is ever fabricated from an empty sample.
    pub fn build(mut self, cancel: Option<&CancelFlag>) -> Result<NdHistogram> {
        if self.digest.notnull_cnt == 0 {
            return Err(Error::empty_sample());
        }

        let ndims = self.digest.ndims;
        let notnull = self.digest.notnull_cnt;
        let target_cells = target_cells(self.config.stats_target, ndims, self.total_rows);

        // Mean and standard deviation of box bounds, per dimension
        let mut avg_min = [0.0_f64; ND_DIMS];
        let mut avg_max = [0.0_f64; ND_DIMS];
        let mut dev_min = [0.0_f64; ND_DIMS];
        let mut dev_max = [0.0_f64; ND_DIMS];
        for d in 0..ndims {
            avg_min[d] = self.digest.sum_min[d] / notnull as f64;
            avg_max[d] = self.digest.sum_max[d] / notnull as f64;
            for b in self.digest.boxes.iter().flatten() {
                dev_min[d] += (b.min[d] as f64 - avg_min[d]).powi(2);
                dev_max[d] += (b.max[d] as f64 - avg_max[d]).powi(2);
            }
            dev_min[d] = (dev_min[d] / notnull as f64).sqrt();
            dev_max[d] = (dev_max[d] / notnull as f64).sqrt();
        }

        // Candidate extent: mean ± SD_FACTOR·σ, never beyond the sample
        let sample_extent = self.digest.sample_extent;
        let mut trim_extent = NdBox::zero();
        for d in 0..ndims {
            trim_extent.min[d] = (avg_min[d] - SD_FACTOR * dev_min[d])
                .max(sample_extent.min[d] as f64) as f32;
            trim_extent.max[d] = (avg_max[d] + SD_FACTOR * dev_max[d])
                .min(sample_extent.max[d] as f64) as f32;
        }

        // Drop hard deviants, re-fit the extent to the survivors
        let mut extent = NdBox::accumulator();
        let mut survivors = 0usize;
        for slot in self.digest.boxes.iter_mut() {
            let Some(b) = *slot else { continue };
            if !trim_extent.intersects(&b, ndims) {
                *slot = None;
                continue;
            }
            extent.merge(&b);
            survivors += 1;
        }
        if survivors == 0 {
            return Err(Error::all_deviant());
        }
        extent.expand(EXTENT_EXPANSION);

        tracing::debug!(
            ndims,
            survivors,
            deviants = notnull - survivors,
            extent = %extent.to_json(ndims),
            "histogram extent fitted"
        );

        // Apportion cells to dimensions by density variability
        let scores = dimension_scores(&self.digest.boxes, notnull, &extent, ndims);
        let size = allocate_cells(&scores, target_cells, ndims);
        let histo_cells: usize = size[..ndims].iter().product();

        tracing::debug!(
            target_cells,
            ?scores,
            size = ?&size[..ndims],
            histo_cells,
            "histogram cells allocated"
        );

        let mut stats = NdHistogram {
            mode: self.digest.mode,
            ndims,
            size,
            extent,
            table_features: self.total_rows,
            sample_features: self.digest.sample_rows as f64,
            not_null_features: notnull as f64,
            histogram_features: 0.0,
            cells_covered: 0.0,
            values: vec![0.0; histo_cells],
        };

        // Deposit each survivor's unit mass, pro-rated over the cells its
        // box overlaps. A box fully inside one cell contributes 1.0 to
        // it; a box halved across two cells contributes 0.5 to each.
        let mut histogram_features = 0usize;
        let mut total_cell_count = 0.0_f64;
        for (i, b) in self.digest.boxes.iter().enumerate() {
            if i % self.config.cancel_check_interval == 0 {
                if let Some(flag) = cancel {
                    if flag.is_cancelled() {
                        return Err(Error::Cancelled);
                    }
                }
            }
            let Some(b) = b else { continue };

            let range = stats.cell_range(b);
            let mut at = range.min;
            loop {
                let cell = stats.cell_bounds(&at);
                let ratio = cell.ratio(b, ndims);
                if let Some(idx) = stats.value_index(&at) {
                    stats.values[idx] += ratio as f32;
                }
                total_cell_count += ratio;
                if !range.increment(ndims, &mut at) {
                    break;
                }
            }
            histogram_features += 1;
        }

        if histogram_features == 0 {
            return Err(Error::all_deviant());
        }
        stats.histogram_features = histogram_features as f64;
        stats.cells_covered = total_cell_count;

        tracing::debug!(
            histogram_features,
            cells_covered = total_cell_count,
            "histogram populated"
        );

        Ok(stats)
    }
}

/// Cell budget: the configured per-dimension target raised to the
/// dimensionality, bounded by an absolute per-dimensionality ceiling and
/// by table size — a histogram far finer than the table could ever
/// populate is wasted memory.
fn target_cells(stats_target: usize, ndims: usize, total_rows: f64) -> usize {
    let by_target = (stats_target as f64).powi(ndims as i32);
    let by_dims = (ndims * 100_000) as f64;
    let by_rows = 10.0 * ndims as f64 * total_rows;
    by_target.min(by_dims).min(by_rows).max(0.0) as usize
}

/// Score each dimension's density variability: bin the boxes into a 1-D
/// partition of the extent, count per-bin overlaps, and take the spread
/// (max − min) of the counts. Uniformly dense dimensions score near zero
/// and deserve few histogram cells; clustered dimensions score high.
fn dimension_scores(
    boxes: &[Option<NdBox>],
    num_boxes: usize,
    extent: &NdBox,
    ndims: usize,
) -> [f64; ND_DIMS] {
    let num_bins = (num_boxes / BIN_MIN_SIZE).clamp(2, MAX_NUM_BINS);
    let mut scores = [0.0_f64; ND_DIMS];

    for d in 0..ndims {
        let smin = extent.min[d] as f64;
        let swidth = extent.width(d);

        // No distribution worth measuring on degenerate or effectively
        // unbounded dimensions
        if swidth < MIN_DIMENSION_WIDTH || swidth > MAX_DIMENSION_WIDTH {
            scores[d] = 0.0;
            continue;
        }

        let mut counts = vec![0usize; num_bins];
        for b in boxes.iter().flatten() {
            let minoffset = b.min[d] as f64 - smin;
            let maxoffset = b.max[d] as f64 - smin;
            if minoffset < 0.0 || minoffset > swidth || maxoffset < 0.0 || maxoffset > swidth {
                continue;
            }

            let bmin = (num_bins as f64 * minoffset / swidth).floor() as usize;
            let bmax = ((num_bins as f64 * maxoffset / swidth).floor() as usize)
                .min(num_bins - 1);
            if bmin > bmax {
                continue;
            }
            for count in &mut counts[bmin..=bmax] {
                *count += 1;
            }
        }

        let max = counts.iter().copied().max().unwrap_or(0);
        let min = counts.iter().copied().min().unwrap_or(0);
        scores[d] = (max - min) as f64;
    }

    scores
}

/// Turn variability scores into per-dimension cell counts whose product
/// approximates `target_cells`. Zero-score dimensions get one cell; when
/// every dimension scores zero the budget is split evenly.
fn allocate_cells(scores: &[f64; ND_DIMS], target_cells: usize, ndims: usize) -> [usize; ND_DIMS] {
    let mut size = [1usize; ND_DIMS];
    let interesting = scores[..ndims].iter().filter(|&&s| s > 0.0).count();

    if interesting == 0 {
        let per_dim = (target_cells as f64).powf(1.0 / ndims as f64) as usize;
        for s in size.iter_mut().take(ndims) {
            *s = per_dim.max(1);
        }
        return size;
    }

    let total: f64 = scores[..ndims].iter().sum();
    for d in 0..ndims {
        if scores[d] == 0.0 {
            continue;
        }
        let share = scores[d] / total;
        let cells = (target_cells as f64 * interesting as f64 * share)
            .powf(1.0 / interesting as f64) as usize;
        size[d] = cells.max(1);
    }
    size
}
