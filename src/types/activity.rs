// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Typed pair activity records

use alloy_primitives::{Address, BlockNumber, TxHash};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of pair activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Token swap through the pair
    Swap,
    /// Liquidity added
    Mint,
    /// Liquidity removed
    Burn,
}

impl ActivityKind {
    /// Event name as emitted by the pair contract.
    pub fn event_name(&self) -> &'static str {
        match self {
            ActivityKind::Swap => "Swap",
            ActivityKind::Mint => "Mint",
            ActivityKind::Burn => "Burn",
        }
    }
}

/// Per-token normalized amounts for one activity.
///
/// For swaps each side is `in - out`, so a positive value was paid into the
/// pair and a negative value was taken out. Mint and burn amounts are always
/// non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmounts {
    /// Amount of the pair's token0
    pub token0: BigDecimal,
    /// Amount of the pair's token1
    pub token1: BigDecimal,
}

/// Symbols of the pair's two tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenLabels {
    /// Symbol of token0
    pub token0: String,
    /// Symbol of token1
    pub token1: String,
}

/// One decoded Swap, Mint or Burn on a pair.
///
/// Created by the [`EventDecoder`](crate::EventDecoder) with no timestamp; the
/// [`ActivityAggregator`](crate::ActivityAggregator) back-fills `timestamp` from
/// its block-timestamp cache, after which the record is not modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Activity kind
    pub kind: ActivityKind,
    /// Pair contract that emitted the event
    pub pair: Address,
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block the event was mined in
    pub block_number: BlockNumber,
    /// Position of the log within its block, when known
    pub log_index: Option<u64>,
    /// Unix seconds of the block, once resolved
    pub timestamp: Option<u64>,
    /// `sender` of the event
    pub participant: Address,
    /// `to` of a swap or burn
    pub counterparty: Option<Address>,
    /// Normalized per-token amounts
    pub amounts: TokenAmounts,
    /// Token symbols
    pub token_labels: TokenLabels,
}

impl ActivityRecord {
    /// Block timestamp as UTC date-time, once resolved.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .and_then(|ts| i64::try_from(ts).ok())
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}
