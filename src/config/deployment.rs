// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-chain deployment data consumed by candidate resolution
//!
//! The deployment data is owned by the embedding application; activityscan only
//! reads it. It can be built in code or parsed from JSON:
//!
//! ```rust
//! use activityscan::DeploymentConfig;
//! use alloy_chains::NamedChain;
//!
//! let config = DeploymentConfig::from_json_str(r#"{
//!     "chains": [{
//!         "chain": "mainnet",
//!         "factory": "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f",
//!         "token_pairs": [{
//!             "token_a": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
//!             "token_b": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
//!         }]
//!     }]
//! }"#).unwrap();
//!
//! let mainnet = config.for_chain(NamedChain::Mainnet).unwrap();
//! assert_eq!(mainnet.token_pairs.len(), 1);
//! assert_eq!(mainnet.native_symbol, "ETH");
//! ```

use alloy_chains::NamedChain;
use alloy_primitives::{Address, BlockNumber};
use serde::{Deserialize, Serialize};

use super::constants::{DEFAULT_NATIVE_SYMBOL, MULTICALL3};
use crate::errors::ConfigError;

/// Two tokens whose pair address is derived through the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPair {
    /// First token
    pub token_a: Address,
    /// Second token
    pub token_b: Address,
}

impl TokenPair {
    /// Create a token pair
    pub const fn new(token_a: Address, token_b: Address) -> Self {
        Self { token_a, token_b }
    }
}

/// Addresses and limits for one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDeployment {
    /// The chain these addresses live on
    pub chain: NamedChain,

    /// Pair factory exposing `getPair(tokenA, tokenB)`
    #[serde(default)]
    pub factory: Option<Address>,

    /// Statically configured pair for this chain
    #[serde(default)]
    pub pair: Option<Address>,

    /// Token pairs to derive through the factory, in priority order
    #[serde(default)]
    pub token_pairs: Vec<TokenPair>,

    /// Multicall3 deployment used for batch reads
    #[serde(default = "default_multicall")]
    pub multicall: Address,

    /// Lowest block worth scanning (e.g. the factory's deployment block)
    #[serde(default)]
    pub floor_block: BlockNumber,

    /// Symbol of the native asset
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
}

fn default_multicall() -> Address {
    MULTICALL3
}

fn default_native_symbol() -> String {
    DEFAULT_NATIVE_SYMBOL.to_string()
}

impl ChainDeployment {
    /// A deployment with no addresses configured
    pub fn new(chain: NamedChain) -> Self {
        Self {
            chain,
            factory: None,
            pair: None,
            token_pairs: Vec::new(),
            multicall: MULTICALL3,
            floor_block: 0,
            native_symbol: default_native_symbol(),
        }
    }

    /// Set the pair factory
    pub fn with_factory(mut self, factory: Address) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Set the statically configured pair
    pub fn with_pair(mut self, pair: Address) -> Self {
        self.pair = Some(pair);
        self
    }

    /// Add a token pair for factory derivation
    pub fn with_token_pair(mut self, token_a: Address, token_b: Address) -> Self {
        self.token_pairs.push(TokenPair::new(token_a, token_b));
        self
    }

    /// Set the lowest block worth scanning
    pub fn with_floor_block(mut self, floor_block: BlockNumber) -> Self {
        self.floor_block = floor_block;
        self
    }

    /// Set the native asset symbol
    pub fn with_native_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.native_symbol = symbol.into();
        self
    }
}

/// Deployment data for every supported chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// One entry per chain
    pub chains: Vec<ChainDeployment>,
}

impl DeploymentConfig {
    /// Parse deployment data from JSON
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Deployment for `chain`, if configured
    pub fn for_chain(&self, chain: NamedChain) -> Option<&ChainDeployment> {
        self.chains.iter().find(|d| d.chain == chain)
    }
}

/// Everything candidate resolution needs for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainContext {
    /// Active chain deployment
    pub deployment: ChainDeployment,
    /// Caller-supplied pair address, validated during resolution
    pub pair_override: Option<String>,
}

impl ChainContext {
    /// Context without an override
    pub fn new(deployment: ChainDeployment) -> Self {
        Self {
            deployment,
            pair_override: None,
        }
    }

    /// Attach an explicit pair override
    pub fn with_pair_override(mut self, pair: impl Into<String>) -> Self {
        self.pair_override = Some(pair.into());
        self
    }

    /// The active chain
    pub fn chain(&self) -> NamedChain {
        self.deployment.chain
    }
}
