//! Well-known addresses and constants
//!
//! This module centralizes magic constants and well-known blockchain addresses
//! used throughout the activityscan crate.

use alloy_primitives::{address, Address};

/// Multicall3, deployed at the same address on nearly every EVM chain.
///
/// Contract: 0xcA11bde05977b3631167028862bE2a173976CA11
pub const MULTICALL3: Address = address!("ca11bde05977b3631167028862be2a173976ca11");

/// Scan window and span defaults, in blocks.
pub mod scan {
    /// First window tried by the range scanner
    pub const INITIAL_WINDOW: u64 = 50_000;

    /// Smallest window; a failure at this size abandons the candidate
    pub const MIN_WINDOW: u64 = 5_000;

    /// Total spans tried against one candidate, widest first
    pub const SPAN_LADDER: [u64; 5] = [2_000_000, 1_000_000, 500_000, 250_000, 100_000];
}

/// Sparse-mapping defaults.
pub mod mapping {
    /// Highest id the exponential probe will reach (2^20)
    pub const PROBE_CAP: u64 = 1 << 20;

    /// Retries for an inconclusive existence read before treating it as absent
    pub const PROBE_RETRIES: u32 = 2;

    /// Ids past a found boundary that are still probed, so short gaps in the
    /// mapping do not hide later records
    pub const PROBE_GAP_TOLERANCE: u64 = 2;

    /// Ids fetched per multicall batch
    pub const BATCH_SIZE: u64 = 200;
}

/// Symbol used for a native-asset donation when the deployment does not name one
pub const DEFAULT_NATIVE_SYMBOL: &str = "ETH";
