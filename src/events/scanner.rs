// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Backward, adaptively windowed log scanner
//!
//! [`RangeScanner`] walks from the chain head toward a floor block one window at
//! a time, so the most recent activity is found first and a bounded budget is
//! spent where it matters most. Every query is raced against the
//! [`TimeBudget`]; a failed or timed-out window is retried at half the size
//! over the same end block, until the minimum window also fails and the scan
//! gives up on the remaining range. Errors a smaller request cannot fix (see
//! [`RpcError::is_transient`]) give up on the remaining range at once.
//!
//! Windows never shrink below the minimum (5,000 blocks by default), and each
//! success moves the cursor strictly backward, so a scan always terminates.
//!
//! # Examples
//!
//! ```rust,ignore
//! use activityscan::events::scanner::{LogQuery, RangeScanner};
//! use activityscan::{EventSchema, TimeBudget};
//!
//! let scanner = RangeScanner::new(reader.clone());
//! let query = LogQuery::Local(EventSchema::pair_activity());
//! let outcome = scanner.scan(pair, &query, floor, head, &TimeBudget::default()).await;
//! println!("{} entries, {} failed windows", outcome.entries.len(), outcome.windows_failed);
//! ```

use std::sync::Arc;
use std::time::Duration;

use alloy_chains::NamedChain;
use alloy_primitives::{Address, BlockNumber};
use tokio::time::sleep;
use tracing::{debug, info, warn, Instrument};

use super::definitions::EventSchema;
use crate::budget::TimeBudget;
use crate::client::ChainReader;
use crate::config::constants::scan::{INITIAL_WINDOW, MIN_WINDOW};
use crate::config::ScanConfig;
use crate::errors::{BudgetError, RpcError};
use crate::tracing::spans;
use crate::types::{block_range::BlockRange, log::RawLogEntry};

/// How logs are requested from the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogQuery {
    /// Fetch every log of the address and keep those whose topic-0 is in the schema
    Local(EventSchema),
    /// Let the node filter on the schema's topic-0 set
    Server(EventSchema),
}

impl LogQuery {
    /// The schema matched by this query
    pub fn schema(&self) -> &EventSchema {
        match self {
            LogQuery::Local(schema) | LogQuery::Server(schema) => schema,
        }
    }

    /// Whether filtering happens on the node
    pub fn is_server_filtered(&self) -> bool {
        matches!(self, LogQuery::Server(_))
    }
}

/// Position of a backward scan: the next window ends at `end` and spans at
/// most `window_size` blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanCursor {
    /// Last block of the next window (inclusive)
    pub end: BlockNumber,
    /// Current window size in blocks
    pub window_size: u64,
}

impl ScanCursor {
    /// Cursor at `end` with the given window
    pub const fn new(end: BlockNumber, window_size: u64) -> Self {
        Self { end, window_size }
    }

    /// The next window, clamped to `floor`
    pub fn window(&self, floor: BlockNumber) -> BlockRange {
        BlockRange::ending_at(self.end, self.window_size, floor)
    }

    /// Move past a successfully scanned window.
    ///
    /// Returns `false` when the window reached `floor` and nothing is left.
    pub fn advance(&mut self, scanned: BlockRange, floor: BlockNumber) -> bool {
        if scanned.from() <= floor {
            return false;
        }
        self.end = scanned.from() - 1;
        true
    }

    /// Halve the window after a failure, never going below `min_window`.
    ///
    /// Returns `false` when the window was already at the minimum, meaning the
    /// remaining range is abandoned.
    pub fn shrink(&mut self, min_window: u64) -> bool {
        if self.window_size <= min_window {
            return false;
        }
        self.window_size = (self.window_size / 2).max(min_window);
        true
    }
}

/// Everything a single scan produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Matching entries, newest window first, node order within a window
    pub entries: Vec<RawLogEntry>,
    /// Number of range queries issued
    pub windows_attempted: usize,
    /// Number of range queries that failed or timed out
    pub windows_failed: usize,
    /// Whether a failure at the minimum window, or a permanent error, ended
    /// the scan early
    pub abandoned: bool,
    /// Whether the budget ran out before the floor was reached
    pub budget_exhausted: bool,
}

impl ScanOutcome {
    /// Whether at least one window succeeded
    pub fn any_window_succeeded(&self) -> bool {
        self.windows_attempted > self.windows_failed
    }
}

/// Backward adaptive scanner over one address.
#[derive(Clone)]
pub struct RangeScanner {
    reader: Arc<dyn ChainReader>,
    initial_window: u64,
    min_window: u64,
    rate_limit_delay: Option<Duration>,
}

impl std::fmt::Debug for RangeScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeScanner")
            .field("initial_window", &self.initial_window)
            .field("min_window", &self.min_window)
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl RangeScanner {
    /// Scanner with the default 50,000 / 5,000 block windows and no rate limit
    pub fn new(reader: Arc<dyn ChainReader>) -> Self {
        Self {
            reader,
            initial_window: INITIAL_WINDOW,
            min_window: MIN_WINDOW,
            rate_limit_delay: None,
        }
    }

    /// Scanner using the window sizes and rate limit configured for `chain`
    pub fn from_config(reader: Arc<dyn ChainReader>, config: &ScanConfig, chain: NamedChain) -> Self {
        Self::new(reader)
            .with_windows(config.get_initial_window(chain), config.min_window)
            .with_rate_limit(config.get_rate_limit_delay(chain))
    }

    /// Override the initial and minimum window sizes
    pub fn with_windows(mut self, initial_window: u64, min_window: u64) -> Self {
        self.min_window = min_window.max(1);
        self.initial_window = initial_window.max(self.min_window);
        self
    }

    /// Pause between consecutive range queries
    pub fn with_rate_limit(mut self, delay: Option<Duration>) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    /// Scan `[floor, head]` backward on `address`.
    ///
    /// Never fails: transient RPC errors shrink the window, and whatever was
    /// accumulated before the budget ran out or the scan was abandoned is
    /// returned.
    pub async fn scan(
        &self,
        address: Address,
        query: &LogQuery,
        floor: BlockNumber,
        head: BlockNumber,
        budget: &TimeBudget,
    ) -> ScanOutcome {
        let span = spans::range_scan(address, floor, head);
        self.scan_inner(address, query, floor, head, budget)
            .instrument(span)
            .await
    }

    async fn scan_inner(
        &self,
        address: Address,
        query: &LogQuery,
        floor: BlockNumber,
        head: BlockNumber,
        budget: &TimeBudget,
    ) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        if floor > head {
            debug!(floor, head, "Floor above head, nothing to scan");
            return outcome;
        }

        info!(
            address = %address,
            floor,
            head,
            schema = query.schema().name(),
            server_filtered = query.is_server_filtered(),
            "Starting backward scan"
        );

        let mut cursor = ScanCursor::new(head, self.initial_window);

        loop {
            if budget.expired() {
                outcome.budget_exhausted = true;
                break;
            }

            let window = cursor.window(floor);
            outcome.windows_attempted += 1;

            let failure = match budget.with_timeout(self.fetch(address, query, window)).await {
                Ok(Ok(entries)) => {
                    debug!(
                        window = %window,
                        window_size = cursor.window_size,
                        entries = entries.len(),
                        "Fetched window"
                    );
                    outcome.entries.extend(entries);
                    if !cursor.advance(window, floor) {
                        break;
                    }
                    None
                }
                Err(BudgetError::Exhausted) => {
                    outcome.windows_attempted -= 1;
                    outcome.budget_exhausted = true;
                    break;
                }
                Ok(Err(e)) => Some((e.is_transient(), e.to_string())),
                Err(e) => Some((true, e.to_string())),
            };

            if let Some((transient, reason)) = failure {
                outcome.windows_failed += 1;
                warn!(
                    window = %window,
                    window_size = cursor.window_size,
                    reason = %reason,
                    transient,
                    "Window failed"
                );
                if !transient {
                    warn!(end = cursor.end, "Permanent error, abandoning remaining range");
                    outcome.abandoned = true;
                    break;
                }
                if !cursor.shrink(self.min_window) {
                    warn!(end = cursor.end, "Minimum window failed, abandoning remaining range");
                    outcome.abandoned = true;
                    break;
                }
            }

            if let Some(delay) = self.rate_limit_delay {
                debug!(delay_ms = delay.as_millis(), "Applying rate limit delay");
                sleep(delay.min(budget.remaining())).await;
            }
        }

        info!(
            address = %address,
            entries = outcome.entries.len(),
            windows = outcome.windows_attempted,
            failed = outcome.windows_failed,
            budget_exhausted = outcome.budget_exhausted,
            "Finished backward scan"
        );

        outcome
    }

    async fn fetch(
        &self,
        address: Address,
        query: &LogQuery,
        window: BlockRange,
    ) -> Result<Vec<RawLogEntry>, RpcError> {
        match query {
            LogQuery::Local(schema) => {
                let entries = self.reader.get_logs(address, window).await?;
                Ok(entries
                    .into_iter()
                    .filter(|entry| schema.matches(entry.topic0()))
                    .collect())
            }
            LogQuery::Server(schema) => self.reader.get_logs_by_schema(address, schema, window).await,
        }
    }
}
