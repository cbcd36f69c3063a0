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

//! Sample collection pass
//!
//! First of the analysis scans: reads every sampled row once, discards
//! rows that cannot contribute (null, empty, non-finite), and accumulates
//! the aggregates the histogram builder needs — the merged sample extent,
//! per-dimension coordinate sums for the later mean/stddev pass, payload
//! width, and the boxes themselves.

use crate::config::StatsConfig;
use crate::core::{CancelFlag, Error, NdBox, Result, ND_DIMS};
use crate::histogram::Mode;
use crate::sample::source::{BoxSource, SampleValue};

/// Aggregates of one collection pass over a sample, in one mode.
///
/// `boxes` holds one entry per valid feature; the histogram builder nulls
/// out entries it rejects as hard deviants, so the vector doubles as the
/// survivor mask.
#[derive(Debug, Clone)]
pub struct SampleDigest {
    /// Mode the sample was collected under.
    pub mode: Mode,
    /// Dimensionality observed: 2 in 2D mode, otherwise the maximum
    /// feature dimensionality seen (2..=4).
    pub ndims: usize,
    /// Rows examined, including nulls and discards.
    pub sample_rows: usize,
    /// Rows whose spatial value was NULL.
    pub null_cnt: usize,
    /// Rows that produced a usable box.
    pub notnull_cnt: usize,
    /// Merged extent of all usable boxes.
    pub sample_extent: NdBox,
    /// The usable boxes, in scan order.
    pub boxes: Vec<Option<NdBox>>,
    /// Per-dimension sums of box minima, for the mean/stddev pass.
    pub sum_min: [f64; ND_DIMS],
    /// Per-dimension sums of box maxima.
    pub sum_max: [f64; ND_DIMS],
    /// Total payload bytes across usable rows.
    pub total_width: f64,
}

impl SampleDigest {
    /// Fraction of examined rows that were NULL.
    pub fn null_frac(&self) -> f64 {
        if self.sample_rows == 0 {
            return 0.0;
        }
        self.null_cnt as f64 / self.sample_rows as f64
    }

    /// Average payload width of usable rows, in bytes.
    pub fn avg_width(&self) -> f64 {
        if self.notnull_cnt == 0 {
            return 0.0;
        }
        self.total_width / self.notnull_cnt as f64
    }
}

/// Streaming collector over a [`BoxSource`].
pub struct SampleCollector;

impl SampleCollector {
    /// Scan the rows named by `rows` (indices into `source`) and build a
    /// digest for `mode`.
    ///
    /// Row handling:
    /// - NULL rows are counted in `null_cnt` and skipped.
    /// - Empty rows (no computable box) are skipped without counting.
    /// - Non-finite boxes are malformed input, skipped without counting.
    /// - In 2D mode the Z and M ranges are zeroed before any further
    ///   processing, so junk in unused dimensions cannot poison the
    ///   2D histogram.
    pub fn collect(
        source: &dyn BoxSource,
        rows: &[usize],
        mode: Mode,
        config: &StatsConfig,
        cancel: Option<&CancelFlag>,
    ) -> Result<SampleDigest> {
        let mut digest = SampleDigest {
            mode,
            ndims: 2,
            sample_rows: rows.len(),
            null_cnt: 0,
            notnull_cnt: 0,
            sample_extent: NdBox::accumulator(),
            boxes: Vec::with_capacity(rows.len()),
            sum_min: [0.0; ND_DIMS],
            sum_max: [0.0; ND_DIMS],
            total_width: 0.0,
        };

        for (i, &row) in rows.iter().enumerate() {
            if i % config.cancel_check_interval == 0 {
                if let Some(flag) = cancel {
                    if flag.is_cancelled() {
                        return Err(Error::Cancelled);
                    }
                }
            }

            let (mut bounds, width_bytes) = match source.get(row) {
                SampleValue::Null => {
                    digest.null_cnt += 1;
                    continue;
                }
                // No box could be computed; not counted as null or valid
                SampleValue::Empty => continue,
                SampleValue::Feature {
                    bounds,
                    width_bytes,
                } => (bounds, width_bytes),
            };

            if mode == Mode::TwoD {
                bounds.zmin = 0.0;
                bounds.zmax = 0.0;
                bounds.mmin = 0.0;
                bounds.mmax = 0.0;
            }

            if !bounds.is_finite() {
                tracing::trace!(row, "skipped non-finite bounds");
                continue;
            }

            if mode == Mode::Nd {
                digest.ndims = digest.ndims.max(bounds.ndims());
            }

            let nd_box = bounds.nd_box();
            digest.sample_extent.merge(&nd_box);
            digest.total_width += width_bytes as f64;
            for d in 0..ND_DIMS {
                digest.sum_min[d] += nd_box.min[d] as f64;
                digest.sum_max[d] += nd_box.max[d] as f64;
            }
            digest.boxes.push(Some(nd_box));
            digest.notnull_cnt += 1;
        }

        tracing::debug!(
            mode = ?mode,
            sample_rows = digest.sample_rows,
            null_cnt = digest.null_cnt,
            notnull_cnt = digest.notnull_cnt,
            ndims = digest.ndims,
            "sample collection complete"
        );

        Ok(digest)
    }
}
