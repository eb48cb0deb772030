//! Immutable raw log entries fetched from the chain

use alloy_primitives::{Address, BlockNumber, Bytes, LogData, TxHash, B256};
use alloy_rpc_types::Log;
use serde::{Deserialize, Serialize};

/// A log entry as returned by a range query, before classification.
///
/// Entries are immutable once fetched. Pending logs (without a block number or
/// transaction hash) never become `RawLogEntry`s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLogEntry {
    /// Contract that emitted the log
    pub address: Address,
    /// Block the log was mined in
    pub block_number: BlockNumber,
    /// Transaction that emitted the log
    pub transaction_hash: TxHash,
    /// Position within the block, when the node reports it
    pub log_index: Option<u64>,
    /// Ordered topics; `topics[0]` is the event signature hash for non-anonymous events
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed fields
    pub data: Bytes,
}

impl RawLogEntry {
    /// Convert an RPC log, returning `None` for pending logs.
    pub fn from_rpc(log: Log) -> Option<Self> {
        let block_number = log.block_number?;
        let transaction_hash = log.transaction_hash?;
        let log_index = log.log_index;
        let address = log.inner.address;
        Some(Self {
            address,
            block_number,
            transaction_hash,
            log_index,
            topics: log.inner.data.topics().to_vec(),
            data: log.inner.data.data,
        })
    }

    /// The event signature hash, if the log has any topics.
    pub fn topic0(&self) -> Option<B256> {
        self.topics.first().copied()
    }

    /// Rebuild alloy `LogData` for ABI decoding.
    pub(crate) fn log_data(&self) -> LogData {
        LogData::new_unchecked(self.topics.clone(), self.data.clone())
    }

    /// Identity used for de-duplication across overlapping fetches.
    pub fn dedup_key(&self) -> (TxHash, Option<u64>) {
        (self.transaction_hash, self.log_index)
    }
}
