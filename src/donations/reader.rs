// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Batched reads of a contiguous id range from a sparse mapping
//!
//! [`BatchReader`] splits an id range into fixed-size chunks (200 ids by
//! default) and fetches each chunk with a single multicall. Every entry carries
//! its own result, so one failing id never costs its siblings. Entries that do
//! not exist are dropped and the rest are returned newest first.

use std::ops::RangeInclusive;
use std::sync::Arc;

use alloy_primitives::Address;
use tracing::{debug, warn, Instrument};

use crate::budget::TimeBudget;
use crate::client::ChainReader;
use crate::config::constants::mapping::BATCH_SIZE;
use crate::contracts::ReadCall;
use crate::errors::RpcError;
use crate::tracing::spans;

/// An id-addressed on-chain mapping that can be read in batches.
pub trait SparseMapping: Send + Sync {
    /// Decoded entry type
    type Record: Send;

    /// Contract holding the mapping
    fn contract(&self) -> Address;

    /// The read that fetches entry `id`
    fn read_call(&self, id: u64) -> ReadCall;

    /// Decode the return data of [`read_call`](Self::read_call)
    fn decode(&self, id: u64, data: &[u8]) -> Result<Self::Record, RpcError>;

    /// Whether a decoded entry is populated
    fn exists(&self, record: &Self::Record) -> bool;

    /// Key used to order records, newest first
    fn sort_key(&self, record: &Self::Record) -> u64;
}

/// Records read from one id range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome<R> {
    /// Existing records, ordered by descending sort key
    pub records: Vec<R>,
    /// Ids whose read failed or whose data could not be decoded
    pub failed_reads: u64,
    /// Ids that were read but are not populated
    pub empty: u64,
    /// Whether the budget ran out before every chunk was read
    pub truncated: bool,
}

impl<R> Default for BatchOutcome<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            failed_reads: 0,
            empty: 0,
            truncated: false,
        }
    }
}

/// Reads id ranges through multicall in fixed-size chunks.
#[derive(Clone)]
pub struct BatchReader {
    reader: Arc<dyn ChainReader>,
    batch_size: u64,
}

impl std::fmt::Debug for BatchReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchReader")
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl BatchReader {
    /// Reader with the default chunk size of 200 ids
    pub fn new(reader: Arc<dyn ChainReader>) -> Self {
        Self {
            reader,
            batch_size: BATCH_SIZE,
        }
    }

    /// Use a different chunk size (at least 1)
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Read every id in `ids` from `mapping`.
    ///
    /// Chunks are issued one after another, which keeps the request rate
    /// predictable. A chunk whose whole batch fails counts every id in it as a
    /// failed read.
    pub async fn read_range<M: SparseMapping>(
        &self,
        mapping: &M,
        ids: RangeInclusive<u64>,
        budget: &TimeBudget,
    ) -> BatchOutcome<M::Record> {
        let span = spans::read_range(*ids.start(), *ids.end(), self.batch_size);
        self.read_range_inner(mapping, ids, budget).instrument(span).await
    }

    async fn read_range_inner<M: SparseMapping>(
        &self,
        mapping: &M,
        ids: RangeInclusive<u64>,
        budget: &TimeBudget,
    ) -> BatchOutcome<M::Record> {
        let mut outcome = BatchOutcome::default();
        if ids.is_empty() {
            return outcome;
        }

        let (first, last) = (*ids.start(), *ids.end());
        let mut chunk_start = first;

        loop {
            if budget.expired() {
                warn!(next_id = chunk_start, last, "Budget spent before every batch was read");
                outcome.truncated = true;
                break;
            }

            let chunk_end = chunk_start.saturating_add(self.batch_size - 1).min(last);
            let chunk: Vec<u64> = (chunk_start..=chunk_end).collect();
            let calls = chunk.iter().map(|id| mapping.read_call(*id)).collect();

            match budget.with_timeout(self.reader.multicall(calls)).await {
                Ok(Ok(results)) => {
                    let returned = results.len() as u64;
                    for (id, result) in chunk.iter().copied().zip(results) {
                        let decoded = result.and_then(|data| mapping.decode(id, &data));
                        match decoded {
                            Ok(record) if mapping.exists(&record) => outcome.records.push(record),
                            Ok(_) => outcome.empty += 1,
                            Err(e) => {
                                debug!(id, error = %e, "Entry read failed");
                                outcome.failed_reads += 1;
                            }
                        }
                    }
                    // A short batch leaves the tail unread
                    outcome.failed_reads += (chunk.len() as u64).saturating_sub(returned);
                }
                Ok(Err(e)) => {
                    warn!(from = chunk_start, to = chunk_end, error = %e, "Batch read failed");
                    outcome.failed_reads += chunk.len() as u64;
                }
                Err(e) => {
                    warn!(from = chunk_start, to = chunk_end, error = %e, "Batch read abandoned");
                    outcome.failed_reads += chunk.len() as u64;
                }
            }

            if chunk_end >= last {
                break;
            }
            chunk_start = chunk_end + 1;
        }

        outcome
            .records
            .sort_by_key(|record| std::cmp::Reverse(mapping.sort_key(record)));

        debug!(
            records = outcome.records.len(),
            failed = outcome.failed_reads,
            empty = outcome.empty,
            "Finished range read"
        );
        outcome
    }
}
