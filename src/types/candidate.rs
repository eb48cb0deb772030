//! Candidate contract addresses and their provenance

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Where a candidate address came from, ranked explicit > configured > derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Caller-supplied override
    Override,
    /// Statically configured for the active chain
    Config,
    /// Derived from a factory `getPair` lookup
    Factory,
}

impl CandidateSource {
    /// Lower-case name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            CandidateSource::Override => "override",
            CandidateSource::Config => "config",
            CandidateSource::Factory => "factory",
        }
    }
}

/// A contract address considered for scanning.
///
/// `Address` is a fixed 20-byte value, so two candidates with the same bytes are
/// the same contract regardless of how their input strings were cased.
/// [`CandidateAddress::checksummed`] gives the EIP-55 rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateAddress {
    /// Normalized contract address
    pub address: Address,
    /// Provenance of this candidate
    pub source: CandidateSource,
}

impl CandidateAddress {
    /// Pair an address with its provenance.
    pub const fn new(address: Address, source: CandidateSource) -> Self {
        Self { address, source }
    }

    /// EIP-55 checksummed form of the address.
    pub fn checksummed(&self) -> String {
        self.address.to_checksum(None)
    }
}

impl std::fmt::Display for CandidateAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.checksummed(), self.source.name())
    }
}
