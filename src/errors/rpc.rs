// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Shared RPC error types for blockchain provider operations.
//!
//! This module provides error types for common RPC failures that can occur
//! across different modules when interacting with blockchain providers.

use alloy_primitives::Address;

/// Errors that can occur during blockchain RPC operations.
///
/// This error type captures the failure modes of the read-only
/// [`ChainReader`](crate::ChainReader) surface. It includes context about what
/// operation was being performed to aid in debugging.
///
/// # Examples
///
/// ```rust
/// use activityscan::RpcError;
///
/// let error = RpcError::BlockNotFound { block_number: 42 };
/// assert!(!error.is_transient());
/// println!("Error: {}", error);
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Failed to fetch logs from the blockchain.
    ///
    /// This can occur due to rate limiting, block ranges wider than the
    /// provider accepts, network connectivity issues, or provider-side errors.
    #[error("Failed to fetch logs for {operation}")]
    GetLogsFailed {
        /// Description of the operation that failed (e.g., "0xabc.. 100-200")
        operation: String,
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Block was not found at the specified block number.
    ///
    /// This can occur if the block number is beyond the chain tip or if the
    /// provider hasn't synced that block.
    #[error("Block not found: {block_number}")]
    BlockNotFound {
        /// The block number that wasn't found
        block_number: u64,
    },

    /// Failed to fetch block number from the blockchain.
    #[error("Failed to get current block number")]
    GetBlockNumberFailed {
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to fetch block details by number.
    ///
    /// This is different from `BlockNotFound` - it indicates the RPC call itself
    /// failed, not that the block doesn't exist.
    #[error("Failed to fetch block {block_number} details")]
    GetBlockFailed {
        /// The block number we tried to fetch
        block_number: u64,
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An `eth_call` read failed at the transport or node level.
    #[error("Read call to {target} failed")]
    CallFailed {
        /// Contract that was called
        target: Address,
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A single call inside a multicall batch reverted.
    ///
    /// Only that entry of the batch is affected; siblings carry their own results.
    #[error("Read call to {target} reverted inside batch")]
    CallReverted {
        /// Contract that reverted
        target: Address,
    },

    /// Return data could not be decoded into the expected ABI type.
    #[error("Could not decode return data of {function}: {details}")]
    ReturnDecodeFailed {
        /// Function whose return data was malformed
        function: &'static str,
        /// Decoder message
        details: String,
    },

    /// The provider URL could not be parsed.
    #[error("Invalid provider URL: {0}")]
    ProviderUrlInvalid(String),
}

impl RpcError {
    /// Helper to create a `GetLogsFailed` error from any error type.
    pub fn get_logs_failed(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::GetLogsFailed {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Helper to create a `GetBlockNumberFailed` error from any error type.
    pub fn get_block_number_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        RpcError::GetBlockNumberFailed {
            source: Box::new(source),
        }
    }

    /// Helper to create a `GetBlockFailed` error from any error type.
    pub fn get_block_failed(
        block_number: u64,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::GetBlockFailed {
            block_number,
            source: Box::new(source),
        }
    }

    /// Helper to create a `CallFailed` error from any error type.
    pub fn call_failed(
        target: Address,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::CallFailed {
            target,
            source: Box::new(source),
        }
    }

    /// Helper to create a `ReturnDecodeFailed` error.
    pub fn return_decode_failed(function: &'static str, details: impl ToString) -> Self {
        RpcError::ReturnDecodeFailed {
            function,
            details: details.to_string(),
        }
    }

    /// Whether retrying (possibly with a smaller request) could succeed.
    ///
    /// Timeouts, rate limits and range caps all surface as transport failures
    /// and are transient. Missing blocks, reverts, malformed return data and
    /// bad URLs are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RpcError::GetLogsFailed { .. }
                | RpcError::GetBlockNumberFailed { .. }
                | RpcError::GetBlockFailed { .. }
                | RpcError::CallFailed { .. }
        )
    }
}
