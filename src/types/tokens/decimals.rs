//! Token decimal precision type

use serde::{Deserialize, Serialize};

/// ERC-20 token decimal precision
///
/// Represents the number of decimal places for a token. Most ERC-20 tokens
/// use 18 decimals (like ETH), but stablecoins commonly use 6.
///
/// When a token's `decimals()` read fails, activity amounts are normalized with
/// [`TokenDecimals::FALLBACK`] so that the record can still be shown.
///
/// # Examples
///
/// ```
/// use activityscan::TokenDecimals;
///
/// assert_eq!(TokenDecimals::NATIVE.as_u8(), 18);
/// assert_eq!(TokenDecimals::USDC.as_u8(), 6);
/// assert_eq!(TokenDecimals::default(), TokenDecimals::FALLBACK);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenDecimals(u8);

impl TokenDecimals {
    /// Maximum reasonable decimals (following ERC-20 convention)
    pub const MAX_REASONABLE: u8 = 18;

    /// Standard decimals for ETH-like tokens (18)
    pub const STANDARD: Self = Self(18);

    /// Decimals of the chain's native asset (18 on every supported EVM chain)
    pub const NATIVE: Self = Self(18);

    /// Used when a token's decimals cannot be read
    pub const FALLBACK: Self = Self(18);

    /// USDC decimals (6)
    pub const USDC: Self = Self(6);

    /// Create a new decimal precision value
    pub const fn new(decimals: u8) -> Self {
        Self(decimals)
    }

    /// Get the inner u8 value
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    /// Check if decimals are in reasonable range (0-18)
    ///
    /// Values over 18 are unusual and may indicate data errors; they are still
    /// honored when normalizing.
    pub const fn is_reasonable(&self) -> bool {
        self.0 <= Self::MAX_REASONABLE
    }
}

impl Default for TokenDecimals {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl From<u8> for TokenDecimals {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TokenDecimals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} decimals", self.0)
    }
}
