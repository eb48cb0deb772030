// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Block number to timestamp memoization

use std::collections::HashMap;

use alloy_primitives::BlockNumber;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::CacheStats;
use crate::budget::TimeBudget;
use crate::client::ChainReader;

#[derive(Debug, Default)]
struct TimestampState {
    entries: HashMap<BlockNumber, u64>,
    stats: CacheStats,
}

/// Append-only cache of mined block timestamps (Unix seconds).
///
/// The lock is never held across an RPC call, so concurrent lookups of
/// different blocks proceed in parallel. Two tasks missing on the same block
/// both fetch it and store the same value.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use activityscan::BlockTimestampCache;
///
/// let cache = Arc::new(BlockTimestampCache::new());
/// let ts = cache.get_or_fetch(&reader, 19_000_000, &budget).await;
/// ```
#[derive(Debug, Default)]
pub struct BlockTimestampCache {
    state: Mutex<TimestampState>,
}

impl BlockTimestampCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached timestamp of `block`, recording a hit or miss
    pub async fn get(&self, block: BlockNumber) -> Option<u64> {
        let mut state = self.state.lock().await;
        let found = state.entries.get(&block).copied();
        match found {
            Some(_) => state.stats.hits += 1,
            None => state.stats.misses += 1,
        }
        found
    }

    /// Store the timestamp of a mined block
    pub async fn insert(&self, block: BlockNumber, timestamp: u64) {
        let mut state = self.state.lock().await;
        state.entries.insert(block, timestamp);
        state.stats.entries = state.entries.len();
    }

    /// Cached timestamp of `block`, fetching it under `budget` on a miss.
    ///
    /// Returns `None` when the fetch fails, times out or the budget is spent;
    /// failures are not cached.
    pub async fn get_or_fetch(
        &self,
        reader: &dyn ChainReader,
        block: BlockNumber,
        budget: &TimeBudget,
    ) -> Option<u64> {
        if let Some(timestamp) = self.get(block).await {
            return Some(timestamp);
        }

        match budget.with_timeout(reader.get_block_timestamp(block)).await {
            Ok(Ok(timestamp)) => {
                self.insert(block, timestamp).await;
                Some(timestamp)
            }
            Ok(Err(e)) => {
                warn!(block, error = %e, "Failed to fetch block timestamp");
                None
            }
            Err(e) => {
                debug!(block, error = %e, "Block timestamp lookup abandoned");
                None
            }
        }
    }

    /// Number of cached blocks
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// Whether the cache holds no blocks
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of hit/miss counters
    pub async fn stats(&self) -> CacheStats {
        self.state.lock().await.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_hits_and_misses() {
        let cache = BlockTimestampCache::new();
        assert_eq!(cache.get(10).await, None);

        cache.insert(10, 1_700_000_000).await;
        assert_eq!(cache.get(10).await, Some(1_700_000_000));

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn repeated_inserts_are_idempotent() {
        let cache = BlockTimestampCache::new();
        cache.insert(7, 42).await;
        cache.insert(7, 42).await;
        assert_eq!(cache.len().await, 1);
        assert!(!cache.is_empty().await);
    }
}
