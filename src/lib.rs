// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! # activityscan
//!
//! Bounded-budget discovery of on-chain activity over a plain JSON-RPC endpoint,
//! with no indexer in between.
//!
//! Two entry points:
//!
//! - [`ActivityAggregator::get_recent_activity`]: recent Swap/Mint/Burn events
//!   of a constant-product pair, found by scanning backward from the chain head
//!   with adaptively sized windows
//! - [`DonationHistoryAssembler::get_donation_history`]: every receipt of an
//!   event-less, id-addressed donation ledger, found by probing for the highest
//!   id and batch-reading the range through Multicall3
//!
//! Both run under a wall-clock [`TimeBudget`] (20 s total, 4 s per call by
//! default) and degrade to partial or empty results with diagnostics instead
//! of failing.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use activityscan::{connect_http, ActivityAggregator, ChainDeployment, ProviderReader, ScanConfig};
//! use alloy_chains::NamedChain;
//!
//! let reader = Arc::new(ProviderReader::new(connect_http("https://eth.llamarpc.com")?));
//! let deployment = ChainDeployment::new(NamedChain::Mainnet).with_pair(pair);
//!
//! let aggregator = ActivityAggregator::new(reader, deployment, ScanConfig::default());
//! let report = aggregator.get_recent_activity(None).await;
//! for record in &report.records {
//!     println!("{:?} at block {}", record.kind, record.block_number);
//! }
//! ```
//!
//! ## Architecture
//!
//! All chain access goes through the [`ChainReader`] trait, implemented for any
//! alloy provider by [`ProviderReader`]. The components are:
//!
//! - [`TimeBudget`]: deadline plus per-call timeout shared by a run
//! - [`CandidateResolver`]: override, then configured pair, then factory pairs
//! - [`RangeScanner`]: backward windowed scan that halves its window on failure
//! - [`EventDecoder`]: topic-0 classification and typed decoding
//! - [`RecordProber`]: exponential-then-binary search for a mapping's highest id
//! - [`BatchReader`]: multicall reads of an id range with per-entry results
//!
//! Block timestamps and token metadata are memoized in explicit caches
//! ([`BlockTimestampCache`], [`TokenMetadataCache`]) that can be shared between
//! aggregators. [`ActivityRefreshJob`] re-runs discovery on an interval.

pub mod activity;
pub mod budget;
pub mod cache;
pub mod client;
pub mod config;
pub mod contracts;
pub mod donations;
pub mod errors;
pub mod events;
pub mod refresh;
pub mod resolver;
mod tracing;
pub mod types;

pub use activity::{ActivityAggregator, ActivityDiagnostics, ActivityReport, EmptyReason};
pub use budget::TimeBudget;
pub use cache::{BlockTimestampCache, CacheStats, PairMetadata, TokenMetadata, TokenMetadataCache};
pub use client::{connect_http, CallResult, ChainReader, ProviderReader};
pub use config::deployment::{ChainContext, ChainDeployment, DeploymentConfig, TokenPair};
pub use config::{ChainConfig, ScanConfig, ScanConfigBuilder};
pub use contracts::ReadCall;
pub use donations::{
    BatchOutcome, BatchReader, DonationHistory, DonationHistoryAssembler, DonationLedger, Probe,
    ProbeBounds, ProbeOutcome, RecordProber, SparseMapping,
};
pub use errors::{BudgetError, ConfigError, EventProcessingError, RpcError, ScanError};
pub use events::decoder::{DecodedEvent, EventDecoder};
pub use events::definitions::EventSchema;
pub use events::scanner::{LogQuery, RangeScanner, ScanCursor, ScanOutcome};
pub use refresh::{ActivityRefreshJob, LatestReport, RefreshHandle};
pub use resolver::CandidateResolver;
pub use types::activity::{ActivityKind, ActivityRecord, TokenAmounts, TokenLabels};
pub use types::block_range::BlockRange;
pub use types::candidate::{CandidateAddress, CandidateSource};
pub use types::donation::DonationRecord;
pub use types::log::RawLogEntry;
pub use types::tokens::{TokenAmount, TokenDecimals};
