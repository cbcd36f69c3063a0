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

//! Column analysis driver
//!
//! One `analyze_column` call produces the full statistical artifact for a
//! spatial column: a 2D histogram and an N-D histogram over the same
//! sample, plus the null fraction and average feature width a host
//! catalog reports alongside them.
//!
//! Two histograms, not one: an N-D histogram cannot answer 2D overlap
//! queries accurately, because features spanning several cells of a
//! dimension the query ignores inflate the aggregated counts. The 2D
//! build runs first; the N-D build only runs if the 2D one produced
//! valid statistics.

pub mod cache;
pub mod extent;

pub use cache::StatsCache;
pub use extent::estimated_extent;

use rand::Rng;

use crate::config::StatsConfig;
use crate::core::{CancelFlag, Result};
use crate::histogram::{HistogramBuilder, Mode, NdHistogram};
use crate::sample::{BoxSource, SampleCollector};

/// Complete statistics for one spatial column.
#[derive(Debug, Clone)]
pub struct ColumnStatistics {
    /// Histogram over the first two dimensions. Always present.
    pub stats_2d: NdHistogram,
    /// Histogram over the full observed dimensionality.
    pub stats_nd: NdHistogram,
    /// Fraction of sampled rows whose spatial value was NULL.
    pub null_frac: f64,
    /// Average serialized feature size over usable rows, in bytes.
    pub avg_width: f64,
}

impl ColumnStatistics {
    /// The histogram matching `mode`.
    pub fn histogram(&self, mode: Mode) -> &NdHistogram {
        match mode {
            Mode::TwoD => &self.stats_2d,
            Mode::Nd => &self.stats_nd,
        }
    }
}

/// Batch analyzer for spatial columns.
pub struct Analyzer {
    config: StatsConfig,
}

impl Analyzer {
    /// Create an analyzer with the given configuration.
    pub fn new(config: StatsConfig) -> Self {
        Self { config }
    }

    /// The analyzer's configuration.
    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Analyze one column: sample `source`, build both histograms, and
    /// return the column's statistics.
    ///
    /// `total_rows` is the host's estimate of the full table row count;
    /// sample-derived counts are scaled against it at estimation time.
    /// Fails with `NoStatistics` when the sample yields nothing usable —
    /// the column is then simply left without statistics.
    pub fn analyze_column(
        &self,
        source: &dyn BoxSource,
        total_rows: f64,
        cancel: Option<&CancelFlag>,
    ) -> Result<ColumnStatistics> {
        let rows = self.sample_rows(source.len());

        let digest_2d =
            SampleCollector::collect(source, &rows, Mode::TwoD, &self.config, cancel)?;
        let null_frac = digest_2d.null_frac();
        let avg_width = digest_2d.avg_width();
        let stats_2d = HistogramBuilder::new(digest_2d, total_rows, &self.config).build(cancel)?;

        // N-D pass only once the 2D statistics are known to be valid
        let digest_nd = SampleCollector::collect(source, &rows, Mode::Nd, &self.config, cancel)?;
        let stats_nd = HistogramBuilder::new(digest_nd, total_rows, &self.config).build(cancel)?;

        Ok(ColumnStatistics {
            stats_2d,
            stats_nd,
            null_frac,
            avg_width,
        })
    }

    /// Pick the row indices to examine: everything, or a reservoir sample
    /// when the source exceeds the configured sample size.
    fn sample_rows(&self, len: usize) -> Vec<usize> {
        let max = self.config.max_sample_rows;
        if len <= max {
            return (0..len).collect();
        }

        let mut rng = rand::rng();
        let mut reservoir: Vec<usize> = (0..max).collect();
        for i in max..len {
            let j = rng.random_range(0..=i);
            if j < max {
                reservoir[j] = i;
            }
        }
        reservoir
    }
}

/// Build a single histogram in one call, for callers that drive the two
/// modes themselves.
pub fn build_histogram(
    source: &dyn BoxSource,
    total_rows: f64,
    mode: Mode,
    config: &StatsConfig,
) -> Result<NdHistogram> {
    let analyzer = Analyzer::new(config.clone());
    let rows = analyzer.sample_rows(source.len());
    let digest = SampleCollector::collect(source, &rows, mode, config, None)?;
    HistogramBuilder::new(digest, total_rows, config).build(None)
}
