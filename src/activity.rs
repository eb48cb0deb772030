// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Recent pair activity: the discovery entry point
//!
//! [`ActivityAggregator::get_recent_activity`] chains the components together
//! under one [`TimeBudget`]:
//!
//! 1. [`CandidateResolver`] produces the ordered candidate pairs
//! 2. for each candidate, [`RangeScanner`] walks back from the head over each
//!    span of the ladder (2M, 1M, 500k, 250k, 100k blocks) until one yields
//!    entries; if none does, the ladder is retried with node-side filtering
//! 3. [`EventDecoder`] turns the entries into [`ActivityRecord`]s
//! 4. records are deduplicated, ordered newest block first, and their block
//!    timestamps back-filled through the shared [`BlockTimestampCache`]
//!
//! The first candidate that yields records wins. Failures never surface as
//! errors: an empty report carries an [`EmptyReason`] instead.
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use activityscan::{ActivityAggregator, ProviderReader, ScanConfig, connect_http};
//!
//! let reader = Arc::new(ProviderReader::new(connect_http(&rpc_url)?));
//! let aggregator = ActivityAggregator::new(reader, deployment, ScanConfig::default());
//!
//! let report = aggregator.get_recent_activity(None).await;
//! println!("{} records, diagnostics: {:?}", report.records.len(), report.diagnostics);
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use alloy_primitives::BlockNumber;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Instrument};

use crate::budget::TimeBudget;
use crate::cache::{BlockTimestampCache, TokenMetadataCache};
use crate::client::ChainReader;
use crate::config::deployment::{ChainContext, ChainDeployment};
use crate::config::ScanConfig;
use crate::errors::{BudgetError, ConfigError};
use crate::events::decoder::EventDecoder;
use crate::events::scanner::{LogQuery, RangeScanner, ScanOutcome};
use crate::resolver::CandidateResolver;
use crate::tracing::spans;
use crate::types::activity::ActivityRecord;
use crate::types::candidate::CandidateAddress;
use crate::types::log::RawLogEntry;

/// Why a report holds no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// No override, configured pair or factory pair could be resolved
    NoCandidates,
    /// The chain head could not be read
    HeadUnavailable,
    /// Range queries were issued and every one of them failed
    AllWindowsFailed,
    /// The budget ran out before any range query succeeded
    BudgetExhaustedBeforeFirstSuccess,
    /// Queries succeeded but the scanned ranges hold no pair activity, or the
    /// range between the floor block and the head was empty
    NoEventsInRange,
}

/// How a discovery run went.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDiagnostics {
    /// Candidates that were scanned
    pub candidates_tried: usize,
    /// Candidate whose records were returned
    pub candidate_used: Option<CandidateAddress>,
    /// Span of the ladder that produced the records
    pub block_span: Option<u64>,
    /// Chain head the scan started from
    pub head_block: Option<BlockNumber>,
    /// Matching log entries fetched across all candidates
    pub logs_fetched: usize,
    /// Range queries that failed or timed out
    pub windows_failed: usize,
    /// Whether the node-filtered fallback query ran
    pub used_fallback: bool,
    /// Whether the budget ran out during the run
    pub budget_exhausted: bool,
    /// Whether token addresses, decimals or symbols of the returned pair fell
    /// back to defaults (18 decimals, `TOKEN0` / `TOKEN1`)
    pub metadata_incomplete: bool,
    /// Set when `records` is empty
    pub empty_reason: Option<EmptyReason>,
}

/// Records plus diagnostics of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityReport {
    /// Activity ordered by descending block number
    pub records: Vec<ActivityRecord>,
    /// How the run went
    pub diagnostics: ActivityDiagnostics,
}

impl ActivityReport {
    fn empty(diagnostics: ActivityDiagnostics, reason: EmptyReason) -> Self {
        Self {
            records: Vec::new(),
            diagnostics: ActivityDiagnostics {
                empty_reason: Some(reason),
                ..diagnostics
            },
        }
    }
}

/// Scan totals of one candidate.
#[derive(Debug, Default)]
struct CandidateScan {
    entries: Vec<RawLogEntry>,
    span: Option<u64>,
    any_success: bool,
}

/// Orchestrates candidate resolution, scanning, decoding and timestamp back-fill.
#[derive(Clone)]
pub struct ActivityAggregator {
    reader: Arc<dyn ChainReader>,
    deployment: ChainDeployment,
    config: ScanConfig,
    decoder: EventDecoder,
    timestamps: Arc<BlockTimestampCache>,
    tokens: Arc<TokenMetadataCache>,
}

impl std::fmt::Debug for ActivityAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityAggregator")
            .field("chain", &self.deployment.chain)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ActivityAggregator {
    /// Aggregator for `deployment`'s chain with private caches
    pub fn new(reader: Arc<dyn ChainReader>, deployment: ChainDeployment, config: ScanConfig) -> Self {
        Self {
            reader,
            deployment,
            config,
            decoder: EventDecoder::new(),
            timestamps: Arc::new(BlockTimestampCache::new()),
            tokens: Arc::new(TokenMetadataCache::new()),
        }
    }

    /// Like [`new`](Self::new), rejecting a configuration that fails
    /// [`ScanConfig::validate`]
    pub fn try_new(
        reader: Arc<dyn ChainReader>,
        deployment: ChainDeployment,
        config: ScanConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(reader, deployment, config))
    }

    /// Share a block timestamp cache with other components
    pub fn with_timestamp_cache(mut self, timestamps: Arc<BlockTimestampCache>) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Share a token metadata cache with other components
    pub fn with_token_cache(mut self, tokens: Arc<TokenMetadataCache>) -> Self {
        self.tokens = tokens;
        self
    }

    /// The shared block timestamp cache
    pub fn timestamp_cache(&self) -> &Arc<BlockTimestampCache> {
        &self.timestamps
    }

    /// Recent Swap/Mint/Burn activity of the chain's pair.
    ///
    /// `pair_override` replaces configured and factory-derived candidates when it
    /// is a well-formed, non-zero address.
    pub async fn get_recent_activity(&self, pair_override: Option<&str>) -> ActivityReport {
        let span = spans::get_recent_activity(self.deployment.chain, pair_override.is_some());
        self.run(pair_override).instrument(span).await
    }

    async fn run(&self, pair_override: Option<&str>) -> ActivityReport {
        let chain = self.deployment.chain;
        let budget = self.config.start_budget(chain);
        let mut diagnostics = ActivityDiagnostics::default();

        let mut context = ChainContext::new(self.deployment.clone());
        if let Some(pair) = pair_override {
            context = context.with_pair_override(pair);
        }

        let candidates = CandidateResolver::new(self.reader.clone())
            .resolve(&context, &budget)
            .await;
        if candidates.is_empty() {
            info!(chain = %chain, "No candidates to scan");
            diagnostics.budget_exhausted = budget.expired();
            return ActivityReport::empty(diagnostics, EmptyReason::NoCandidates);
        }

        let head = match budget.with_timeout(self.reader.head_block_number()).await {
            Ok(Ok(head)) => head,
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to read chain head");
                return ActivityReport::empty(diagnostics, EmptyReason::HeadUnavailable);
            }
            Err(e) => {
                warn!(error = %e, "Chain head read abandoned");
                diagnostics.budget_exhausted = matches!(e, BudgetError::Exhausted) || budget.expired();
                return ActivityReport::empty(diagnostics, EmptyReason::HeadUnavailable);
            }
        };
        diagnostics.head_block = Some(head);

        let scanner = RangeScanner::from_config(self.reader.clone(), &self.config, chain);
        let mut any_success = false;
        let mut records = Vec::new();

        for candidate in &candidates {
            if budget.expired() {
                diagnostics.budget_exhausted = true;
                break;
            }
            diagnostics.candidates_tried += 1;

            let scan = self
                .scan_candidate(&scanner, candidate, head, &budget, &mut diagnostics)
                .await;
            any_success |= scan.any_success;
            diagnostics.logs_fetched += scan.entries.len();

            if scan.entries.is_empty() {
                debug!(candidate = %candidate, "Candidate yielded no entries");
                continue;
            }

            let metadata = self
                .tokens
                .pair_metadata(self.reader.as_ref(), candidate.address, &budget)
                .await;
            let decoded = order_records(self.decoder.decode(&unique_entries(scan.entries), &metadata));
            if decoded.is_empty() {
                continue;
            }

            if metadata.is_partial() {
                warn!(pair = %candidate.address, "Token metadata incomplete, amounts use fallback decimals");
            }
            diagnostics.metadata_incomplete = metadata.is_partial();
            diagnostics.candidate_used = Some(*candidate);
            diagnostics.block_span = scan.span;
            records = decoded;
            break;
        }

        diagnostics.budget_exhausted |= budget.expired();

        if records.is_empty() {
            let reason = if any_success {
                EmptyReason::NoEventsInRange
            } else if diagnostics.budget_exhausted {
                EmptyReason::BudgetExhaustedBeforeFirstSuccess
            } else if diagnostics.windows_failed > 0 {
                EmptyReason::AllWindowsFailed
            } else {
                // The floor block lies above the head: nothing to query
                EmptyReason::NoEventsInRange
            };
            info!(chain = %chain, reason = ?reason, "No recent activity found");
            return ActivityReport::empty(diagnostics, reason);
        }

        self.backfill_timestamps(&mut records, &budget).await;
        diagnostics.budget_exhausted |= budget.expired();

        info!(
            chain = %chain,
            records = records.len(),
            candidates_tried = diagnostics.candidates_tried,
            logs_fetched = diagnostics.logs_fetched,
            budget_exhausted = diagnostics.budget_exhausted,
            "Recent activity assembled"
        );

        ActivityReport {
            records,
            diagnostics,
        }
    }

    /// Try the span ladder locally filtered, then node filtered.
    async fn scan_candidate(
        &self,
        scanner: &RangeScanner,
        candidate: &CandidateAddress,
        head: BlockNumber,
        budget: &TimeBudget,
        diagnostics: &mut ActivityDiagnostics,
    ) -> CandidateScan {
        let schema = self.decoder.schema().clone();

        let primary = self
            .scan_ladder(scanner, candidate, &LogQuery::Local(schema.clone()), head, budget, diagnostics)
            .await;
        if !primary.entries.is_empty() || budget.expired() {
            return primary;
        }

        diagnostics.used_fallback = true;
        let fallback = self
            .scan_ladder(scanner, candidate, &LogQuery::Server(schema), head, budget, diagnostics)
            .await;

        CandidateScan {
            any_success: primary.any_success || fallback.any_success,
            ..fallback
        }
    }

    async fn scan_ladder(
        &self,
        scanner: &RangeScanner,
        candidate: &CandidateAddress,
        query: &LogQuery,
        head: BlockNumber,
        budget: &TimeBudget,
        diagnostics: &mut ActivityDiagnostics,
    ) -> CandidateScan {
        let mut scan = CandidateScan::default();

        for &span_blocks in &self.config.span_ladder {
            if budget.expired() {
                break;
            }

            let floor = head
                .saturating_sub(span_blocks.saturating_sub(1))
                .max(self.deployment.floor_block);
            let outcome: ScanOutcome = scanner
                .scan(candidate.address, query, floor, head, budget)
                .instrument(spans::scan_candidate(candidate, span_blocks, query.is_server_filtered()))
                .await;

            diagnostics.windows_failed += outcome.windows_failed;
            scan.any_success |= outcome.any_window_succeeded();

            if !outcome.entries.is_empty() {
                scan.span = Some(span_blocks);
                scan.entries = outcome.entries;
                break;
            }

            // Narrower spans are subsets of a range that was fully scanned
            if !outcome.abandoned && !outcome.budget_exhausted {
                debug!(span_blocks, "Span fully scanned without entries");
                break;
            }
        }

        scan
    }

    /// Attach block timestamps, resolving each distinct block once.
    async fn backfill_timestamps(&self, records: &mut [ActivityRecord], budget: &TimeBudget) {
        let blocks: BTreeSet<BlockNumber> = records.iter().map(|r| r.block_number).collect();
        let span = spans::backfill_timestamps(blocks.len());

        let reader = self.reader.as_ref();
        let timestamps: HashMap<BlockNumber, u64> = stream::iter(blocks)
            .map(|block| async move {
                let timestamp = self.timestamps.get_or_fetch(reader, block, budget).await;
                (block, timestamp)
            })
            .buffer_unordered(self.config.timestamp_concurrency.max(1))
            .filter_map(|(block, timestamp)| async move { timestamp.map(|ts| (block, ts)) })
            .collect::<HashMap<_, _>>()
            .instrument(span)
            .await;

        for record in records.iter_mut() {
            record.timestamp = timestamps.get(&record.block_number).copied();
        }
    }
}

/// Drop entries fetched twice, keeping the first occurrence.
fn unique_entries(entries: Vec<RawLogEntry>) -> Vec<RawLogEntry> {
    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.dedup_key()))
        .collect()
}

/// Order by descending block, keeping fetch order within a block.
fn order_records(mut records: Vec<ActivityRecord>) -> Vec<ActivityRecord> {
    records.sort_by(|a, b| b.block_number.cmp(&a.block_number));
    records
}
