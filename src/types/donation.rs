// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Donation receipts read from the donation ledger mapping

use alloy_primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tokens::TokenDecimals;

/// One donation receipt.
///
/// A receipt exists when its `timestamp` is non-zero. Receipts are append-only
/// on-chain and never change after being read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRecord {
    /// Mapping key
    pub id: u64,
    /// Account that donated
    pub donor: Address,
    /// Donated token, `None` for the chain's native asset
    pub token: Option<Address>,
    /// Raw amount in the token's smallest unit
    pub amount: U256,
    /// Unix seconds at which the donation was recorded
    pub timestamp: u64,
    /// Receipt hash stored alongside the donation
    pub verification_hash: B256,
    /// Decimals of `token` (18 for native)
    pub decimals: TokenDecimals,
    /// Symbol of `token`
    pub symbol: String,
}

impl DonationRecord {
    /// Whether this receipt is populated.
    pub fn exists(&self) -> bool {
        self.timestamp > 0
    }

    /// Whether the donation was made in the native asset.
    pub fn is_native(&self) -> bool {
        self.token.is_none()
    }

    /// Recorded time as UTC date-time.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: u64) -> DonationRecord {
        DonationRecord {
            id: 1,
            donor: Address::repeat_byte(1),
            token: None,
            amount: U256::from(5u64),
            timestamp,
            verification_hash: B256::ZERO,
            decimals: TokenDecimals::NATIVE,
            symbol: "ETH".to_string(),
        }
    }

    #[test]
    fn existence_is_defined_by_timestamp() {
        assert!(record(1).exists());
        assert!(!record(0).exists());
    }

    #[test]
    fn timestamp_converts_to_utc() {
        let utc = record(1_700_000_000).timestamp_utc().unwrap();
        assert_eq!(utc.timestamp(), 1_700_000_000);
    }
}
