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

//! Column statistics cache
//!
//! Planners ask for the same column statistics on every query; analysis
//! is a full sample scan. This cache sits between them: entries live for
//! a TTL, are invalidated explicitly on re-analysis, and the least
//! recently used entry is evicted once the cache is full.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::analyze::ColumnStatistics;
use crate::config::StatsConfig;

/// Cached statistics for one column
struct CacheEntry {
    stats: Arc<ColumnStatistics>,
    /// When this entry was created
    cached_at: Instant,
    /// Last access, for LRU eviction
    last_accessed: Instant,
}

impl CacheEntry {
    fn is_stale(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() > ttl
    }
}

/// Thread-safe cache of column statistics, keyed by `table.column`.
pub struct StatsCache {
    entries: RwLock<FxHashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl StatsCache {
    /// Create a cache sized per the configuration.
    pub fn new(config: &StatsConfig) -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
            ttl: Duration::from_secs(config.cache_ttl_secs),
            max_entries: config.max_cache_entries,
        }
    }

    fn key(table: &str, column: &str) -> String {
        format!("{}.{}", table, column)
    }

    /// Fetch a column's statistics if present and fresh. Stale entries
    /// are dropped on access and reported as a miss, prompting the caller
    /// to re-analyze.
    pub fn get(&self, table: &str, column: &str) -> Option<Arc<ColumnStatistics>> {
        let key = Self::key(table, column);
        let mut entries = self.entries.write();
        match entries.get_mut(&key) {
            Some(entry) if !entry.is_stale(self.ttl) => {
                entry.last_accessed = Instant::now();
                Some(Arc::clone(&entry.stats))
            }
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Store a column's statistics, evicting the least recently used
    /// entry if the cache is at capacity.
    pub fn insert(&self, table: &str, column: &str, stats: Arc<ColumnStatistics>) {
        let key = Self::key(table, column);
        let mut entries = self.entries.write();

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.last_accessed)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        let now = Instant::now();
        entries.insert(
            key,
            CacheEntry {
                stats,
                cached_at: now,
                last_accessed: now,
            },
        );
    }

    /// Drop one column's cached statistics.
    pub fn invalidate(&self, table: &str, column: &str) {
        self.entries.write().remove(&Self::key(table, column));
    }

    /// Drop every cached entry for a table. Called after re-analysis.
    pub fn invalidate_table(&self, table: &str) {
        let prefix = format!("{}.", table);
        self.entries.write().retain(|k, _| !k.starts_with(&prefix));
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
