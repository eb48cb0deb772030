//! Pair event definitions for activity decoding
//!
//! This module provides strongly-typed definitions of the three events a
//! constant-product pair emits for user activity. The `sol!` macro generates a
//! `SIGNATURE_HASH` (topic-0) constant for each event, so the known topic set
//! is computed once at compile time.
//!
//! # Event Signatures
//!
//! - **Swap**: `Swap(address,uint256,uint256,uint256,uint256,address)`
//! - **Mint**: `Mint(address,uint256,uint256)`
//! - **Burn**: `Burn(address,uint256,uint256,address)`
//!
//! # Example
//!
//! ```rust,ignore
//! use activityscan::events::definitions::Swap;
//! use alloy_sol_types::SolEvent;
//!
//! let swap = Swap::decode_log_data(&entry.log_data())?;
//! println!("{} swapped into {}", swap.sender, swap.to);
//! ```

use std::fmt::Debug;

use alloy_primitives::B256;
use alloy_sol_types::{sol, SolEvent};

sol! {
    /// Pair Swap event
    ///
    /// Both directions are encoded as in/out amounts per token; exactly which
    /// legs are non-zero depends on the swap direction.
    event Swap(
        address indexed sender,
        uint256 amount0In,
        uint256 amount1In,
        uint256 amount0Out,
        uint256 amount1Out,
        address indexed to
    );
}

impl Debug for Swap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Swap(sender: {}, in: {}/{}, out: {}/{}, to: {})",
            self.sender, self.amount0In, self.amount1In, self.amount0Out, self.amount1Out, self.to
        )
    }
}

sol! {
    /// Pair Mint event, emitted when liquidity is added
    event Mint(address indexed sender, uint256 amount0, uint256 amount1);
}

impl Debug for Mint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Mint(sender: {}, amount0: {}, amount1: {})",
            self.sender, self.amount0, self.amount1
        )
    }
}

sol! {
    /// Pair Burn event, emitted when liquidity is removed
    event Burn(address indexed sender, uint256 amount0, uint256 amount1, address indexed to);
}

impl Debug for Burn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Burn(sender: {}, amount0: {}, amount1: {}, to: {})",
            self.sender, self.amount0, self.amount1, self.to
        )
    }
}

/// A set of event signatures that a log query matches on topic-0.
///
/// Used both for local classification of unfiltered logs and as the
/// server-side filter of the fallback query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSchema {
    name: &'static str,
    topics: Vec<B256>,
}

impl EventSchema {
    /// Swap, Mint and Burn of a constant-product pair
    pub fn pair_activity() -> Self {
        Self {
            name: "pair-activity",
            topics: vec![Swap::SIGNATURE_HASH, Mint::SIGNATURE_HASH, Burn::SIGNATURE_HASH],
        }
    }

    /// A custom schema
    pub fn new(name: &'static str, topics: Vec<B256>) -> Self {
        Self { name, topics }
    }

    /// Schema name for logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Topic-0 hashes in the schema
    pub fn topics(&self) -> &[B256] {
        &self.topics
    }

    /// Whether `topic0` belongs to the schema
    pub fn matches(&self, topic0: Option<B256>) -> bool {
        topic0.is_some_and(|t| self.topics.contains(&t))
    }
}
