// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Token and pair metadata memoization
//!
//! Decimals and symbols are resolved once per token address and the
//! `token0`/`token1` addresses once per pair. Lookups that fail are not cached,
//! so a later request can try again; the caller gets fallback metadata in the
//! meantime (18 decimals, labels `TOKEN0` / `TOKEN1`).

use std::collections::HashMap;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::CacheStats;
use crate::budget::TimeBudget;
use crate::client::{CallResult, ChainReader};
use crate::contracts::{decode_return, decode_symbol, IERC20Metadata, IPair, ReadCall};
use crate::errors::RpcError;
use crate::types::activity::TokenLabels;
use crate::types::tokens::TokenDecimals;

const TOKEN0_LABEL: &str = "TOKEN0";
const TOKEN1_LABEL: &str = "TOKEN1";

/// Decimals and symbol of one ERC-20 token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// `decimals()` result
    pub decimals: TokenDecimals,
    /// `symbol()` result
    pub symbol: String,
}

/// Everything the decoder needs to normalize a pair's events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairMetadata {
    /// Pair contract
    pub pair: Address,
    /// `token0()` of the pair, if it could be read
    pub token0: Option<Address>,
    /// `token1()` of the pair, if it could be read
    pub token1: Option<Address>,
    /// Decimals used to normalize token0 amounts
    pub decimals0: TokenDecimals,
    /// Decimals used to normalize token1 amounts
    pub decimals1: TokenDecimals,
    /// Display labels of the two tokens
    pub labels: TokenLabels,
}

impl PairMetadata {
    /// Metadata used when nothing about the pair could be read
    pub fn fallback(pair: Address) -> Self {
        Self {
            pair,
            token0: None,
            token1: None,
            decimals0: TokenDecimals::FALLBACK,
            decimals1: TokenDecimals::FALLBACK,
            labels: TokenLabels {
                token0: TOKEN0_LABEL.to_string(),
                token1: TOKEN1_LABEL.to_string(),
            },
        }
    }

    /// Whether any part of the metadata is a fallback value
    pub fn is_partial(&self) -> bool {
        self.token0.is_none()
            || self.token1.is_none()
            || self.labels.token0 == TOKEN0_LABEL
            || self.labels.token1 == TOKEN1_LABEL
    }
}

#[derive(Debug, Default)]
struct MetadataState {
    tokens: HashMap<Address, TokenMetadata>,
    pairs: HashMap<Address, (Address, Address)>,
    stats: CacheStats,
}

impl MetadataState {
    fn refresh_entries(&mut self) {
        self.stats.entries = self.tokens.len() + self.pairs.len();
    }
}

/// Shared cache of token and pair metadata.
#[derive(Debug, Default)]
pub struct TokenMetadataCache {
    state: Mutex<MetadataState>,
}

impl TokenMetadataCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed metadata for a token, e.g. from static configuration
    pub async fn insert_token(&self, token: Address, metadata: TokenMetadata) {
        let mut state = self.state.lock().await;
        state.tokens.insert(token, metadata);
        state.refresh_entries();
    }

    /// Cached metadata for `token`, if present
    pub async fn cached_token(&self, token: Address) -> Option<TokenMetadata> {
        let mut state = self.state.lock().await;
        let found = state.tokens.get(&token).cloned();
        match found {
            Some(_) => state.stats.hits += 1,
            None => state.stats.misses += 1,
        }
        found
    }

    /// Decimals and symbol of `token`, read in one batch on a miss.
    ///
    /// Returns `None` when either read fails or the budget is spent.
    pub async fn token_metadata(
        &self,
        reader: &dyn ChainReader,
        token: Address,
        budget: &TimeBudget,
    ) -> Option<TokenMetadata> {
        if let Some(metadata) = self.cached_token(token).await {
            return Some(metadata);
        }

        let calls = vec![
            ReadCall::new(token, &IERC20Metadata::decimalsCall {}),
            ReadCall::new(token, &IERC20Metadata::symbolCall {}),
        ];
        let results = batch_under_budget(reader, calls, budget).await?;

        let metadata = match decode_token_metadata(&results) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(token = %token, error = %e, "Failed to read token metadata");
                return None;
            }
        };

        if !metadata.decimals.is_reasonable() {
            debug!(token = %token, decimals = metadata.decimals.as_u8(), "Token reports unusual decimals");
        }

        self.insert_token(token, metadata.clone()).await;
        Some(metadata)
    }

    /// Token addresses, decimals and labels of `pair`.
    ///
    /// Never fails: any part that cannot be read is replaced by its fallback.
    pub async fn pair_metadata(
        &self,
        reader: &dyn ChainReader,
        pair: Address,
        budget: &TimeBudget,
    ) -> PairMetadata {
        let Some((token0, token1)) = self.pair_tokens(reader, pair, budget).await else {
            return PairMetadata::fallback(pair);
        };

        let mut metadata = PairMetadata::fallback(pair);
        metadata.token0 = Some(token0);
        metadata.token1 = Some(token1);

        if let Some(token) = self.token_metadata(reader, token0, budget).await {
            metadata.decimals0 = token.decimals;
            metadata.labels.token0 = token.symbol;
        }
        if let Some(token) = self.token_metadata(reader, token1, budget).await {
            metadata.decimals1 = token.decimals;
            metadata.labels.token1 = token.symbol;
        }

        metadata
    }

    async fn pair_tokens(
        &self,
        reader: &dyn ChainReader,
        pair: Address,
        budget: &TimeBudget,
    ) -> Option<(Address, Address)> {
        {
            let mut state = self.state.lock().await;
            if let Some(tokens) = state.pairs.get(&pair).copied() {
                state.stats.hits += 1;
                return Some(tokens);
            }
            state.stats.misses += 1;
        }

        let calls = vec![
            ReadCall::new(pair, &IPair::token0Call {}),
            ReadCall::new(pair, &IPair::token1Call {}),
        ];
        let results = batch_under_budget(reader, calls, budget).await?;

        let tokens = match decode_pair_tokens(&results) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(pair = %pair, error = %e, "Failed to read pair tokens");
                return None;
            }
        };

        let mut state = self.state.lock().await;
        state.pairs.insert(pair, tokens);
        state.refresh_entries();
        Some(tokens)
    }

    /// Snapshot of hit/miss counters
    pub async fn stats(&self) -> CacheStats {
        self.state.lock().await.stats
    }
}

async fn batch_under_budget(
    reader: &dyn ChainReader,
    calls: Vec<ReadCall>,
    budget: &TimeBudget,
) -> Option<Vec<CallResult>> {
    match budget.with_timeout(reader.multicall(calls)).await {
        Ok(Ok(results)) => Some(results),
        Ok(Err(e)) => {
            warn!(error = %e, "Metadata batch failed");
            None
        }
        Err(e) => {
            debug!(error = %e, "Metadata batch abandoned");
            None
        }
    }
}

fn nth(results: &[CallResult], index: usize) -> Result<&[u8], RpcError> {
    match results.get(index) {
        Some(Ok(data)) => Ok(data),
        Some(Err(e)) => Err(RpcError::return_decode_failed("metadata batch", e)),
        None => Err(RpcError::return_decode_failed("metadata batch", "missing result")),
    }
}

fn decode_token_metadata(results: &[CallResult]) -> Result<TokenMetadata, RpcError> {
    let decimals = decode_return::<IERC20Metadata::decimalsCall>(nth(results, 0)?)?;
    let symbol = decode_symbol(nth(results, 1)?)?;
    Ok(TokenMetadata {
        decimals: TokenDecimals::new(decimals),
        symbol,
    })
}

fn decode_pair_tokens(results: &[CallResult]) -> Result<(Address, Address), RpcError> {
    let token0 = decode_return::<IPair::token0Call>(nth(results, 0)?)?;
    let token1 = decode_return::<IPair::token1Call>(nth(results, 1)?)?;
    Ok((token0, token1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Bytes;
    use alloy_sol_types::SolValue;

    #[test]
    fn fallback_uses_placeholder_labels() {
        let metadata = PairMetadata::fallback(Address::repeat_byte(1));
        assert_eq!(metadata.decimals0, TokenDecimals::FALLBACK);
        assert_eq!(metadata.labels.token0, "TOKEN0");
        assert_eq!(metadata.labels.token1, "TOKEN1");
        assert!(metadata.is_partial());
    }

    #[test]
    fn decodes_metadata_batch() {
        let results: Vec<CallResult> = vec![
            Ok(Bytes::from(<alloy_sol_types::sol_data::Uint<8> as alloy_sol_types::SolType>::abi_encode(&6u8))),
            Ok(Bytes::from(("USDC".to_string(),).abi_encode_params())),
        ];
        let metadata = decode_token_metadata(&results).unwrap();
        assert_eq!(metadata.decimals, TokenDecimals::USDC);
        assert_eq!(metadata.symbol, "USDC");
    }

    #[test]
    fn reverted_entry_fails_decode() {
        let results: Vec<CallResult> = vec![
            Ok(Bytes::from(<alloy_sol_types::sol_data::Uint<8> as alloy_sol_types::SolType>::abi_encode(&18u8))),
            Err(RpcError::CallReverted {
                target: Address::ZERO,
            }),
        ];
        assert!(decode_token_metadata(&results).is_err());
        assert!(decode_pair_tokens(&results[..1]).is_err());
    }

    #[tokio::test]
    async fn seeded_tokens_count_as_hits() {
        let cache = TokenMetadataCache::new();
        let token = Address::repeat_byte(2);
        cache
            .insert_token(
                token,
                TokenMetadata {
                    decimals: TokenDecimals::STANDARD,
                    symbol: "WETH".into(),
                },
            )
            .await;

        assert_eq!(cache.cached_token(token).await.unwrap().symbol, "WETH");
        assert!(cache.cached_token(Address::ZERO).await.is_none());

        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }
}
