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

//! Statistics engine configuration
//!

/// Configuration options for statistics collection and caching
#[derive(Debug, Clone)]
pub struct StatsConfig {
    /// Per-dimension histogram resolution target. The total cell budget
    /// is `stats_target^ndims`, further bounded by dimensionality and
    /// table size.
    /// Default: 100
    pub stats_target: usize,

    /// Maximum number of sample rows examined per analysis pass. Larger
    /// inputs are reservoir-sampled down to this size.
    /// Default: 10000
    pub max_sample_rows: usize,

    /// How many rows a scan processes between cancellation checks.
    /// Default: 4096
    pub cancel_check_interval: usize,

    /// Time-to-live for cached column statistics in seconds. After this,
    /// cached entries are considered potentially stale.
    /// Default: 300 (5 minutes)
    pub cache_ttl_secs: u64,

    /// Maximum number of cached column statistics entries before the
    /// least recently used entry is evicted.
    /// Default: 1000
    pub max_cache_entries: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            stats_target: 100,
            max_sample_rows: 10_000,
            cancel_check_interval: 4096,
            cache_ttl_secs: 300,     // 5 minutes
            max_cache_entries: 1000, // Bound planner-side memory
        }
    }
}

impl StatsConfig {
    /// Creates a new StatsConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-dimension resolution target
    pub fn with_stats_target(mut self, target: usize) -> Self {
        self.stats_target = target;
        self
    }

    /// Set the maximum number of sample rows per analysis pass
    pub fn with_max_sample_rows(mut self, rows: usize) -> Self {
        self.max_sample_rows = rows;
        self
    }
}
