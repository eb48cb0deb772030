// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Read-only blockchain client seam
//!
//! Every component in activityscan talks to the chain through [`ChainReader`],
//! an object-safe async trait exposing exactly the reads discovery needs. The
//! crate ships [`ProviderReader`], which implements it for any alloy
//! [`Provider`](alloy_provider::Provider); tests substitute scripted readers.
//!
//! # Examples
//!
//! ```rust,ignore
//! use activityscan::client::{connect_http, ProviderReader};
//!
//! let provider = connect_http("https://eth.llamarpc.com")?;
//! let reader = ProviderReader::new(provider);
//! let head = reader.head_block_number().await?;
//! ```

use alloy_primitives::{Address, BlockNumber, Bytes};
use async_trait::async_trait;

use crate::contracts::ReadCall;
use crate::errors::RpcError;
use crate::events::definitions::EventSchema;
use crate::types::{block_range::BlockRange, log::RawLogEntry};

mod provider;

pub use provider::{connect_http, ProviderReader};

/// Outcome of one call inside a multicall batch.
pub type CallResult = Result<Bytes, RpcError>;

/// The read-only RPC operations discovery relies on.
///
/// Implementations must be thread-safe. They should not retry internally;
/// retry policy (window shrinking, probe retries) lives in the callers.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Current chain head.
    async fn head_block_number(&self) -> Result<BlockNumber, RpcError>;

    /// All logs emitted by `address` in `range`, classified locally by the caller.
    async fn get_logs(
        &self,
        address: Address,
        range: BlockRange,
    ) -> Result<Vec<RawLogEntry>, RpcError>;

    /// Logs emitted by `address` in `range` whose topic-0 is in `schema`,
    /// filtered by the node.
    async fn get_logs_by_schema(
        &self,
        address: Address,
        schema: &EventSchema,
        range: BlockRange,
    ) -> Result<Vec<RawLogEntry>, RpcError>;

    /// Unix timestamp (seconds) of a mined block.
    async fn get_block_timestamp(&self, block_number: BlockNumber) -> Result<u64, RpcError>;

    /// A single `eth_call` read.
    async fn call(&self, target: Address, input: Bytes) -> Result<Bytes, RpcError>;

    /// Many reads in one round-trip with per-call failure isolation.
    ///
    /// The outer error is a whole-batch failure; otherwise the returned vector
    /// has one entry per input call, in order.
    async fn multicall(&self, calls: Vec<ReadCall>) -> Result<Vec<CallResult>, RpcError>;
}
