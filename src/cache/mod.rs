// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Process-local memoization of immutable chain data.
//!
//! Both caches are explicit objects, constructed once and shared by reference
//! (typically behind an `Arc`) with the components that read through them:
//!
//! - [`BlockTimestampCache`]: block number to Unix seconds
//! - [`TokenMetadataCache`]: per-token decimals and symbol, per-pair token addresses
//!
//! Entries are never invalidated. Mined block timestamps and token metadata do
//! not change, so concurrent writers racing on the same key store the same value.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod timestamps;
pub mod tokens;

pub use timestamps::BlockTimestampCache;
pub use tokens::{PairMetadata, TokenMetadata, TokenMetadataCache};

/// Statistics about cache performance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cache hits (successful retrievals)
    pub hits: u64,
    /// Number of cache misses (key not found)
    pub misses: u64,
    /// Current number of entries in the cache
    pub entries: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate as a percentage (0.0 to 100.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={}, misses={}, entries={}, hit_rate={:.1}%",
            self.hits,
            self.misses,
            self.entries,
            self.hit_rate()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_handles_empty_stats() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn hit_rate_is_a_percentage() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            entries: 2,
        };
        assert!((stats.hit_rate() - 75.0).abs() < f64::EPSILON);
        assert_eq!(stats.to_string(), "hits=3, misses=1, entries=2, hit_rate=75.0%");
    }
}
