// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Candidate address resolution
//!
//! [`CandidateResolver`] decides which contract addresses a discovery run
//! scans, in priority order:
//!
//! 1. an explicit override supplied by the caller, which wins outright
//! 2. the pair statically configured for the active chain
//! 3. pairs derived through the factory's `getPair(tokenA, tokenB)` for each
//!    configured token pair
//!
//! The zero address (the factory's "no pair" sentinel) is never a candidate and
//! duplicates keep their first, highest-priority position. An empty result is
//! not an error; callers treat it as "nothing to scan".

use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::Address;
use alloy_sol_types::SolCall;
use tracing::{debug, info, warn, Instrument};

use crate::budget::TimeBudget;
use crate::client::ChainReader;
use crate::config::deployment::{ChainContext, TokenPair};
use crate::contracts::{decode_return, IPairFactory};
use crate::errors::{ConfigError, ScanError};
use crate::tracing::spans;
use crate::types::candidate::{CandidateAddress, CandidateSource};

/// Parse a caller-supplied override into a non-zero address.
///
/// # Examples
///
/// ```rust
/// use activityscan::resolver::parse_override;
///
/// assert!(parse_override("0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc").is_ok());
/// assert!(parse_override("0x1234").is_err());
/// assert!(parse_override("0x0000000000000000000000000000000000000000").is_err());
/// ```
pub fn parse_override(input: &str) -> Result<Address, ConfigError> {
    let invalid = || ConfigError::InvalidAddress {
        field: "pair_override",
        value: input.to_string(),
    };
    let address = Address::from_str(input.trim()).map_err(|_| invalid())?;
    if address.is_zero() {
        return Err(invalid());
    }
    Ok(address)
}

/// Ordered, deduplicated candidate collection.
#[derive(Debug, Default)]
struct Candidates(Vec<CandidateAddress>);

impl Candidates {
    fn push(&mut self, address: Address, source: CandidateSource) {
        if address.is_zero() {
            debug!(source = source.name(), "Skipping zero-address candidate");
            return;
        }
        if self.0.iter().any(|c| c.address == address) {
            debug!(%address, source = source.name(), "Skipping duplicate candidate");
            return;
        }
        self.0.push(CandidateAddress::new(address, source));
    }
}

/// Resolves the ordered set of addresses to scan for a chain.
#[derive(Clone)]
pub struct CandidateResolver {
    reader: Arc<dyn ChainReader>,
}

impl std::fmt::Debug for CandidateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateResolver").finish_non_exhaustive()
    }
}

impl CandidateResolver {
    /// Create a resolver reading factory pairs through `reader`
    pub fn new(reader: Arc<dyn ChainReader>) -> Self {
        Self { reader }
    }

    /// Candidates for `context`, highest priority first.
    ///
    /// A well-formed override is the only candidate returned. A malformed or
    /// zero override is ignored with a warning and resolution continues with
    /// configuration and the factory. Factory reads are bounded by `budget`.
    pub async fn resolve(&self, context: &ChainContext, budget: &TimeBudget) -> Vec<CandidateAddress> {
        let span = spans::resolve_candidates(context.chain());
        self.resolve_inner(context, budget).instrument(span).await
    }

    async fn resolve_inner(&self, context: &ChainContext, budget: &TimeBudget) -> Vec<CandidateAddress> {
        let mut candidates = Candidates::default();

        if let Some(input) = context.pair_override.as_deref() {
            match parse_override(input) {
                Ok(address) => {
                    info!(%address, "Using explicit pair override");
                    candidates.push(address, CandidateSource::Override);
                    return candidates.0;
                }
                Err(e) => warn!(error = %e, "Ignoring pair override"),
            }
        }

        if let Some(pair) = context.deployment.pair {
            candidates.push(pair, CandidateSource::Config);
        }

        if let Some(factory) = context.deployment.factory {
            for token_pair in &context.deployment.token_pairs {
                if budget.expired() {
                    warn!("Budget spent before all factory pairs were derived");
                    break;
                }
                match self.factory_pair(factory, token_pair, budget).await {
                    Ok(pair) => candidates.push(pair, CandidateSource::Factory),
                    Err(e) => warn!(
                        factory = %factory,
                        token_a = %token_pair.token_a,
                        token_b = %token_pair.token_b,
                        error = %e,
                        "Factory lookup failed"
                    ),
                }
            }
        }

        info!(
            chain = %context.chain(),
            candidates = candidates.0.len(),
            "Resolved candidates"
        );
        candidates.0
    }

    async fn factory_pair(
        &self,
        factory: Address,
        token_pair: &TokenPair,
        budget: &TimeBudget,
    ) -> Result<Address, ScanError> {
        let call = IPairFactory::getPairCall {
            tokenA: token_pair.token_a,
            tokenB: token_pair.token_b,
        };
        let raw = budget
            .with_timeout(self.reader.call(factory, call.abi_encode().into()))
            .await??;
        Ok(decode_return::<IPairFactory::getPairCall>(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn override_parsing_accepts_any_case() {
        let lower = parse_override("0xb4e16d0168e52d35cacd2c6185b44281ec28c9dc").unwrap();
        let checksummed = parse_override(" 0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc ").unwrap();
        assert_eq!(lower, checksummed);
    }

    #[test]
    fn override_parsing_rejects_garbage() {
        assert!(matches!(
            parse_override("not-an-address"),
            Err(ConfigError::InvalidAddress { field: "pair_override", .. })
        ));
        assert!(parse_override(&Address::ZERO.to_string()).is_err());
    }

    #[test]
    fn candidates_skip_zero_and_duplicates() {
        let pair = address!("b4e16d0168e52d35cacd2c6185b44281ec28c9dc");
        let mut candidates = Candidates::default();
        candidates.push(pair, CandidateSource::Config);
        candidates.push(Address::ZERO, CandidateSource::Factory);
        candidates.push(pair, CandidateSource::Factory);

        assert_eq!(candidates.0, vec![CandidateAddress::new(pair, CandidateSource::Config)]);
    }
}
