//! Configuration for activityscan operations
//!
//! This module provides a flexible configuration system for controlling
//! activityscan's time budget, scan windows, rate limiting and sparse-mapping
//! reads, plus the per-chain deployment data that candidate resolution
//! consumes (see [`deployment`]).
//!
//! # Example: Using defaults
//!
//! ```rust
//! use activityscan::ScanConfig;
//! use std::time::Duration;
//!
//! let config = ScanConfig::default();
//! assert_eq!(config.total_budget, Duration::from_secs(20));
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use activityscan::ScanConfigBuilder;
//! use std::time::Duration;
//! use alloy_chains::NamedChain;
//!
//! let config = ScanConfigBuilder::with_defaults()
//!     .initial_window(20_000)
//!     .chain_rate_limit(NamedChain::Arbitrum, Duration::from_millis(100))
//!     .build();
//! assert!(config.validate().is_ok());
//! ```

use std::collections::HashMap;
use std::time::Duration;

use alloy_chains::NamedChain;

use crate::budget::{TimeBudget, DEFAULT_PER_CALL_TIMEOUT, DEFAULT_TOTAL_BUDGET};
use crate::errors::ConfigError;

pub mod constants;
pub mod deployment;

use constants::{mapping, scan};

/// Configuration for activityscan operations
///
/// Use [`ScanConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Wall-clock budget for one discovery run
    /// Default: 20 seconds
    pub total_budget: Duration,

    /// Upper bound for any single RPC call
    /// Default: 4 seconds
    pub per_call_timeout: Duration,

    /// First window size tried by the range scanner, in blocks
    /// Default: 50,000
    pub initial_window: u64,

    /// Smallest window the scanner will shrink to, in blocks
    /// Default: 5,000
    pub min_window: u64,

    /// Total spans tried per candidate, widest first
    /// Default: 2M, 1M, 500k, 250k, 100k
    pub span_ladder: Vec<u64>,

    /// Delay between consecutive range queries to avoid rate limiting
    /// Default: None (no delay)
    pub rate_limit_delay: Option<Duration>,

    /// Highest id the sparse-mapping probe may reach
    /// Default: 2^20
    pub probe_cap: u64,

    /// Retries for an inconclusive existence read
    /// Default: 2
    pub probe_retries: u32,

    /// Absent ids past a found boundary that are still probed
    /// Default: 2
    pub probe_gap_tolerance: u64,

    /// Ids per multicall batch when reading a sparse mapping
    /// Default: 200
    pub batch_size: u64,

    /// Concurrent block-timestamp lookups during back-fill
    /// Default: 8
    pub timestamp_concurrency: usize,

    /// Chain-specific overrides
    pub chain_overrides: HashMap<NamedChain, ChainConfig>,
}

/// Chain-specific configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ChainConfig {
    /// Override initial scan window for this chain
    pub initial_window: Option<u64>,

    /// Override rate limit delay for this chain
    pub rate_limit_delay: Option<Duration>,

    /// Override per-call timeout for this chain
    pub per_call_timeout: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::with_common_defaults()
    }
}

impl ScanConfig {
    /// Create config with defaults suited to public RPC endpoints
    ///
    /// Base and Sonic get a 250ms delay between range queries; their public
    /// endpoints throttle `eth_getLogs` aggressively.
    pub fn with_common_defaults() -> Self {
        let mut config = Self::minimal();

        config.set_chain_override(
            NamedChain::Base,
            ChainConfig {
                rate_limit_delay: Some(Duration::from_millis(250)),
                ..ChainConfig::default()
            },
        );

        config.set_chain_override(
            NamedChain::Sonic,
            ChainConfig {
                rate_limit_delay: Some(Duration::from_millis(250)),
                ..ChainConfig::default()
            },
        );

        config
    }

    /// Create minimal config with no delays
    ///
    /// Suitable for testing or premium RPC endpoints with generous rate limits.
    pub fn minimal() -> Self {
        Self {
            total_budget: DEFAULT_TOTAL_BUDGET,
            per_call_timeout: DEFAULT_PER_CALL_TIMEOUT,
            initial_window: scan::INITIAL_WINDOW,
            min_window: scan::MIN_WINDOW,
            span_ladder: scan::SPAN_LADDER.to_vec(),
            rate_limit_delay: None,
            probe_cap: mapping::PROBE_CAP,
            probe_retries: mapping::PROBE_RETRIES,
            probe_gap_tolerance: mapping::PROBE_GAP_TOLERANCE,
            batch_size: mapping::BATCH_SIZE,
            timestamp_concurrency: 8,
            chain_overrides: HashMap::new(),
        }
    }

    /// Get effective initial window for a specific chain, never below `min_window`
    pub fn get_initial_window(&self, chain: NamedChain) -> u64 {
        self.chain_overrides
            .get(&chain)
            .and_then(|c| c.initial_window)
            .unwrap_or(self.initial_window)
            .max(self.min_window)
    }

    /// Get effective rate limit delay for a specific chain
    ///
    /// Returns chain-specific override if set, otherwise returns global default.
    pub fn get_rate_limit_delay(&self, chain: NamedChain) -> Option<Duration> {
        self.chain_overrides
            .get(&chain)
            .and_then(|c| c.rate_limit_delay)
            .or(self.rate_limit_delay)
    }

    /// Get effective per-call timeout for a specific chain
    pub fn get_per_call_timeout(&self, chain: NamedChain) -> Duration {
        self.chain_overrides
            .get(&chain)
            .and_then(|c| c.per_call_timeout)
            .unwrap_or(self.per_call_timeout)
    }

    /// Start a fresh [`TimeBudget`] for one run on `chain`
    pub fn start_budget(&self, chain: NamedChain) -> TimeBudget {
        TimeBudget::new(self.total_budget, self.get_per_call_timeout(chain))
    }

    /// Set chain-specific override
    pub fn set_chain_override(&mut self, chain: NamedChain, config: ChainConfig) {
        self.chain_overrides.insert(chain, config);
    }

    /// Reject settings the scanner or reader cannot make progress with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_window == 0 {
            return Err(ConfigError::out_of_range("min_window", "must be at least 1 block"));
        }
        if self.initial_window < self.min_window {
            return Err(ConfigError::out_of_range(
                "initial_window",
                format!(
                    "{} is smaller than min_window {}",
                    self.initial_window, self.min_window
                ),
            ));
        }
        if self.span_ladder.is_empty() || self.span_ladder.contains(&0) {
            return Err(ConfigError::out_of_range(
                "span_ladder",
                "needs at least one non-zero span",
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::out_of_range("batch_size", "must be at least 1"));
        }
        if self.probe_cap < 2 {
            return Err(ConfigError::out_of_range("probe_cap", "must be at least 2"));
        }
        if self.timestamp_concurrency == 0 {
            return Err(ConfigError::out_of_range(
                "timestamp_concurrency",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Builder for [`ScanConfig`]
///
/// # Example
///
/// ```rust
/// use activityscan::ScanConfigBuilder;
/// use alloy_chains::NamedChain;
/// use std::time::Duration;
///
/// let config = ScanConfigBuilder::new()
///     .total_budget(Duration::from_secs(10))
///     .chain_timeout(NamedChain::Base, Duration::from_secs(2))
///     .build();
/// assert_eq!(config.get_per_call_timeout(NamedChain::Base), Duration::from_secs(2));
/// ```
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl Default for ScanConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: ScanConfig::minimal(),
        }
    }

    /// Start with common defaults
    ///
    /// Initializes the builder with the same defaults as [`ScanConfig::with_common_defaults`].
    pub fn with_defaults() -> Self {
        Self {
            config: ScanConfig::with_common_defaults(),
        }
    }

    /// Set the total wall-clock budget
    pub fn total_budget(mut self, budget: Duration) -> Self {
        self.config.total_budget = budget;
        self
    }

    /// Set the global per-call timeout
    pub fn per_call_timeout(mut self, timeout: Duration) -> Self {
        self.config.per_call_timeout = timeout;
        self
    }

    /// Set the initial scan window
    pub fn initial_window(mut self, blocks: u64) -> Self {
        self.config.initial_window = blocks;
        self
    }

    /// Set the minimum scan window
    pub fn min_window(mut self, blocks: u64) -> Self {
        self.config.min_window = blocks;
        self
    }

    /// Replace the span ladder
    pub fn span_ladder(mut self, spans: impl Into<Vec<u64>>) -> Self {
        self.config.span_ladder = spans.into();
        self
    }

    /// Set global rate limit delay
    pub fn rate_limit_delay(mut self, delay: Duration) -> Self {
        self.config.rate_limit_delay = Some(delay);
        self
    }

    /// Set the probe cap
    pub fn probe_cap(mut self, cap: u64) -> Self {
        self.config.probe_cap = cap;
        self
    }

    /// Set retries for inconclusive existence reads
    pub fn probe_retries(mut self, retries: u32) -> Self {
        self.config.probe_retries = retries;
        self
    }

    /// Set how many absent ids past a boundary are still probed
    pub fn probe_gap_tolerance(mut self, ids: u64) -> Self {
        self.config.probe_gap_tolerance = ids;
        self
    }

    /// Set ids per multicall batch
    pub fn batch_size(mut self, size: u64) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Set concurrent timestamp lookups
    pub fn timestamp_concurrency(mut self, concurrency: usize) -> Self {
        self.config.timestamp_concurrency = concurrency;
        self
    }

    /// Add chain-specific configuration
    pub fn chain_config(mut self, chain: NamedChain, config: ChainConfig) -> Self {
        self.config.set_chain_override(chain, config);
        self
    }

    /// Convenience: set rate limit delay for a specific chain
    pub fn chain_rate_limit(mut self, chain: NamedChain, delay: Duration) -> Self {
        let mut chain_config = self.config.chain_overrides.remove(&chain).unwrap_or_default();
        chain_config.rate_limit_delay = Some(delay);
        self.config.set_chain_override(chain, chain_config);
        self
    }

    /// Convenience: set initial window for a specific chain
    pub fn chain_initial_window(mut self, chain: NamedChain, blocks: u64) -> Self {
        let mut chain_config = self.config.chain_overrides.remove(&chain).unwrap_or_default();
        chain_config.initial_window = Some(blocks);
        self.config.set_chain_override(chain, chain_config);
        self
    }

    /// Convenience: set per-call timeout for a specific chain
    pub fn chain_timeout(mut self, chain: NamedChain, timeout: Duration) -> Self {
        let mut chain_config = self.config.chain_overrides.remove(&chain).unwrap_or_default();
        chain_config.per_call_timeout = Some(timeout);
        self.config.set_chain_override(chain, chain_config);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> ScanConfig {
        self.config
    }
}
