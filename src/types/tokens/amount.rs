// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Raw token amount type

use std::str::FromStr;

use alloy_primitives::U256;
use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::decimals::TokenDecimals;

/// Raw token amount (not normalized for decimals)
///
/// This represents the raw token amount as stored on-chain in the smallest
/// unit (e.g., wei for ETH, satoshis for WBTC). To convert to human-readable
/// amounts, use [`normalize`](Self::normalize) with the token's [`TokenDecimals`].
///
/// Normalization is exact: the result is a [`BigDecimal`] with the token's
/// decimals as its scale, so no precision is lost for 256-bit values.
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use activityscan::{TokenAmount, TokenDecimals};
/// use bigdecimal::BigDecimal;
/// use std::str::FromStr;
///
/// // 1.5 ETH in wei (18 decimals)
/// let amount = TokenAmount::new(U256::from(1_500_000_000_000_000_000u64));
/// assert_eq!(amount.normalize(TokenDecimals::STANDARD), BigDecimal::from_str("1.5").unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAmount(U256);

impl TokenAmount {
    /// Zero token amount
    pub const ZERO: Self = Self(U256::ZERO);

    /// Create a new token amount from U256
    pub const fn new(amount: U256) -> Self {
        Self(amount)
    }

    /// Get the inner U256 value
    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    /// Normalize by token decimals: amount / 10^decimals
    ///
    /// # Examples
    ///
    /// ```
    /// use alloy_primitives::U256;
    /// use activityscan::{TokenAmount, TokenDecimals};
    /// use bigdecimal::BigDecimal;
    ///
    /// // 100 USDC (6 decimals)
    /// let raw = TokenAmount::new(U256::from(100_000_000u64));
    /// assert_eq!(raw.normalize(TokenDecimals::USDC), BigDecimal::from(100));
    /// ```
    pub fn normalize(&self, decimals: TokenDecimals) -> BigDecimal {
        BigDecimal::new(self.as_bigint(), i64::from(decimals.as_u8()))
    }

    /// Normalized `self - other`, negative when `other` is larger.
    ///
    /// Used for swap legs where a token can flow both in and out of the pair.
    pub fn signed_delta(&self, other: TokenAmount, decimals: TokenDecimals) -> BigDecimal {
        let delta = self.as_bigint() - other.as_bigint();
        BigDecimal::new(delta, i64::from(decimals.as_u8()))
    }

    fn as_bigint(&self) -> BigInt {
        // U256 renders as plain base-10 digits, which always parse
        BigInt::from_str(&self.0.to_string()).unwrap_or_default()
    }
}

impl From<U256> for TokenAmount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn normalize_usdc() {
        let amount = TokenAmount::new(U256::from(1_234_567u64));
        assert_eq!(amount.normalize(TokenDecimals::USDC), dec("1.234567"));
    }

    #[test]
    fn normalize_zero_decimals_is_identity() {
        let amount = TokenAmount::new(U256::from(42u64));
        assert_eq!(amount.normalize(TokenDecimals::new(0)), dec("42"));
    }

    #[test]
    fn normalize_max_u256_keeps_every_digit() {
        let amount = TokenAmount::new(U256::MAX);
        let normalized = amount.normalize(TokenDecimals::STANDARD);
        let expected = format!("{}", U256::MAX);
        let (whole, frac) = expected.split_at(expected.len() - 18);
        assert_eq!(normalized, dec(&format!("{whole}.{frac}")));
    }

    #[test]
    fn signed_delta_goes_negative() {
        let paid_in = TokenAmount::new(U256::from(1_000_000u64));
        let paid_out = TokenAmount::new(U256::from(3_500_000u64));
        assert_eq!(
            paid_in.signed_delta(paid_out, TokenDecimals::USDC),
            dec("-2.5")
        );
        assert_eq!(
            paid_out.signed_delta(paid_in, TokenDecimals::USDC),
            dec("2.5")
        );
    }
}
