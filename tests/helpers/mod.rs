// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for activityscan integration tests
//!
//! Provides a scripted [`ChainReader`] so the scanner, prober and assemblers can
//! be exercised without a real blockchain connection.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use activityscan::contracts::{IDonationLedger, IERC20Metadata, IPair, IPairFactory};
use activityscan::events::definitions::{Burn, Mint, Swap};
use activityscan::{BlockRange, CallResult, ChainReader, EventSchema, RawLogEntry, ReadCall, RpcError};
use alloy_primitives::{Address, BlockNumber, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use async_trait::async_trait;

type RangePredicate = Box<dyn Fn(usize, &BlockRange) -> bool + Send + Sync>;
type CallHandler = Box<dyn Fn(Address, &[u8]) -> Result<Bytes, RpcError> + Send + Sync>;

/// One `get_logs` request seen by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRequest {
    pub address: Address,
    pub range: BlockRange,
    pub server_filtered: bool,
}

/// Scripted chain reader
///
/// # Example
///
/// ```rust,ignore
/// let mock = MockChainReader::new(1_000_000)
///     .with_logs(vec![swap_entry(pair, 999_000, 0)])
///     .fail_logs_when(|_, range| range.block_count() > 10_000);
/// ```
pub struct MockChainReader {
    head: Option<BlockNumber>,
    logs: Vec<RawLogEntry>,
    fail_local: RangePredicate,
    fail_server: RangePredicate,
    permanent_failures: bool,
    failing_timestamps: usize,
    log_delay: Option<Duration>,
    call_handler: CallHandler,
    fail_multicall: bool,
    requests: Mutex<Vec<LogRequest>>,
    log_calls: AtomicUsize,
    timestamp_calls: AtomicUsize,
    reads: AtomicUsize,
}

impl MockChainReader {
    /// A chain at `head` with no logs and no contracts
    pub fn new(head: BlockNumber) -> Self {
        Self {
            head: Some(head),
            logs: Vec::new(),
            fail_local: Box::new(|_, _| false),
            fail_server: Box::new(|_, _| false),
            permanent_failures: false,
            failing_timestamps: 0,
            log_delay: None,
            call_handler: Box::new(|target, _| Err(RpcError::CallReverted { target })),
            fail_multicall: false,
            requests: Mutex::new(Vec::new()),
            log_calls: AtomicUsize::new(0),
            timestamp_calls: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
        }
    }

    /// Head block lookups fail
    pub fn without_head(mut self) -> Self {
        self.head = None;
        self
    }

    /// Logs returned by range queries
    pub fn with_logs(mut self, logs: Vec<RawLogEntry>) -> Self {
        self.logs = logs;
        self
    }

    /// Fail unfiltered range queries for which `predicate(request_index, range)` holds
    pub fn fail_logs_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(usize, &BlockRange) -> bool + Send + Sync + 'static,
    {
        self.fail_local = Box::new(predicate);
        self
    }

    /// Fail node-filtered range queries for which `predicate(request_index, range)` holds
    pub fn fail_filtered_logs_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(usize, &BlockRange) -> bool + Send + Sync + 'static,
    {
        self.fail_server = Box::new(predicate);
        self
    }

    /// Failed range queries report a missing block instead of a transport error
    pub fn permanent_log_failures(mut self) -> Self {
        self.permanent_failures = true;
        self
    }

    /// The first `count` block timestamp lookups fail
    pub fn fail_timestamps(mut self, count: usize) -> Self {
        self.failing_timestamps = count;
        self
    }

    /// Every range query takes `delay`
    pub fn with_log_delay(mut self, delay: Duration) -> Self {
        self.log_delay = Some(delay);
        self
    }

    /// Answer `eth_call` reads (and multicall entries) with `handler`
    pub fn with_calls<F>(mut self, handler: F) -> Self
    where
        F: Fn(Address, &[u8]) -> Result<Bytes, RpcError> + Send + Sync + 'static,
    {
        self.call_handler = Box::new(handler);
        self
    }

    /// Whole multicall batches fail
    pub fn failing_multicall(mut self) -> Self {
        self.fail_multicall = true;
        self
    }

    /// All range queries issued so far
    pub fn requests(&self) -> Vec<LogRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of range queries issued
    pub fn log_calls(&self) -> usize {
        self.log_calls.load(Ordering::SeqCst)
    }

    /// Number of block timestamp lookups issued
    pub fn timestamp_calls(&self) -> usize {
        self.timestamp_calls.load(Ordering::SeqCst)
    }

    /// Number of individual reads (single calls plus multicall entries)
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    async fn serve_logs(
        &self,
        address: Address,
        range: BlockRange,
        schema: Option<&EventSchema>,
    ) -> Result<Vec<RawLogEntry>, RpcError> {
        let index = self.log_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(LogRequest {
            address,
            range,
            server_filtered: schema.is_some(),
        });

        if let Some(delay) = self.log_delay {
            tokio::time::sleep(delay).await;
        }

        let fail = match schema {
            None => (self.fail_local)(index, &range),
            Some(_) => (self.fail_server)(index, &range),
        };
        if fail && self.permanent_failures {
            return Err(RpcError::BlockNotFound {
                block_number: range.to(),
            });
        }
        if fail {
            return Err(RpcError::get_logs_failed(
                format!("{address} {range}"),
                std::io::Error::other("query returned more than 10000 results"),
            ));
        }

        Ok(self
            .logs
            .iter()
            .filter(|log| log.address == address && range.contains(log.block_number))
            .filter(|log| schema.is_none_or(|s| s.matches(log.topic0())))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn head_block_number(&self) -> Result<BlockNumber, RpcError> {
        self.head
            .ok_or_else(|| RpcError::get_block_number_failed(std::io::Error::other("connection refused")))
    }

    async fn get_logs(&self, address: Address, range: BlockRange) -> Result<Vec<RawLogEntry>, RpcError> {
        self.serve_logs(address, range, None).await
    }

    async fn get_logs_by_schema(
        &self,
        address: Address,
        schema: &EventSchema,
        range: BlockRange,
    ) -> Result<Vec<RawLogEntry>, RpcError> {
        self.serve_logs(address, range, Some(schema)).await
    }

    async fn get_block_timestamp(&self, block_number: BlockNumber) -> Result<u64, RpcError> {
        let index = self.timestamp_calls.fetch_add(1, Ordering::SeqCst);
        if index < self.failing_timestamps {
            return Err(RpcError::get_block_failed(
                block_number,
                std::io::Error::other("header not found"),
            ));
        }
        Ok(block_timestamp(block_number))
    }

    async fn call(&self, target: Address, input: Bytes) -> Result<Bytes, RpcError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        (self.call_handler)(target, &input)
    }

    async fn multicall(&self, calls: Vec<ReadCall>) -> Result<Vec<CallResult>, RpcError> {
        if self.fail_multicall {
            return Err(RpcError::call_failed(
                Address::ZERO,
                std::io::Error::other("multicall unavailable"),
            ));
        }
        self.reads.fetch_add(calls.len(), Ordering::SeqCst);
        Ok(calls
            .iter()
            .map(|call| (self.call_handler)(call.target, &call.input))
            .collect())
    }
}

/// Deterministic timestamp served for a block: genesis at 1.6e9, 12 s blocks
pub fn block_timestamp(block: BlockNumber) -> u64 {
    1_600_000_000 + block * 12
}

fn entry(address: Address, block: BlockNumber, log_index: u64, event: impl SolEvent) -> RawLogEntry {
    let data = event.encode_log_data();
    let mut tx = [0u8; 32];
    tx[..8].copy_from_slice(&block.to_be_bytes());
    tx[8..16].copy_from_slice(&log_index.to_be_bytes());
    RawLogEntry {
        address,
        block_number: block,
        transaction_hash: B256::from(tx),
        log_index: Some(log_index),
        topics: data.topics().to_vec(),
        data: data.data,
    }
}

/// A Swap of 1 token0 in for 2 token1 out (18 decimals each)
pub fn swap_entry(pair: Address, block: BlockNumber, log_index: u64) -> RawLogEntry {
    let one = U256::from(10u64).pow(U256::from(18u64));
    entry(
        pair,
        block,
        log_index,
        Swap {
            sender: Address::repeat_byte(0x51),
            amount0In: one,
            amount1In: U256::ZERO,
            amount0Out: U256::ZERO,
            amount1Out: one * U256::from(2u64),
            to: Address::repeat_byte(0x52),
        },
    )
}

/// A Mint of 1 unit of each token
pub fn mint_entry(pair: Address, block: BlockNumber, log_index: u64) -> RawLogEntry {
    entry(
        pair,
        block,
        log_index,
        Mint {
            sender: Address::repeat_byte(0x61),
            amount0: U256::from(1u64),
            amount1: U256::from(1u64),
        },
    )
}

/// A Burn of 1 unit of each token
pub fn burn_entry(pair: Address, block: BlockNumber, log_index: u64) -> RawLogEntry {
    entry(
        pair,
        block,
        log_index,
        Burn {
            sender: Address::repeat_byte(0x71),
            amount0: U256::from(1u64),
            amount1: U256::from(1u64),
            to: Address::repeat_byte(0x72),
        },
    )
}

/// A log the decoder does not know (e.g. a pair `Sync`)
pub fn unrelated_entry(pair: Address, block: BlockNumber, log_index: u64) -> RawLogEntry {
    RawLogEntry {
        address: pair,
        block_number: block,
        transaction_hash: B256::repeat_byte(0xee),
        log_index: Some(log_index),
        topics: vec![alloy_primitives::keccak256("Sync(uint112,uint112)")],
        data: Bytes::from(vec![0u8; 64]),
    }
}

/// Scripted contract state behind `eth_call`
#[derive(Debug, Clone, Default)]
pub struct Contracts {
    /// `(factory, tokenA, tokenB) -> pair`
    pub factory_pairs: HashMap<(Address, Address, Address), Address>,
    /// `pair -> (token0, token1)`
    pub pair_tokens: HashMap<Address, (Address, Address)>,
    /// `token -> (decimals, symbol)`
    pub tokens: HashMap<Address, (u8, String)>,
    /// `ledger -> (id -> receipt)`
    pub ledgers: HashMap<Address, HashMap<u64, Receipt>>,
    /// Ids whose ledger reads revert
    pub failing_ids: HashSet<u64>,
}

/// A stored donation receipt
#[derive(Debug, Clone, Copy)]
pub struct Receipt {
    pub donor: Address,
    pub token: Address,
    pub amount: U256,
    pub timestamp: u64,
}

impl Contracts {
    /// Answer reads from this state
    pub fn into_handler(self) -> impl Fn(Address, &[u8]) -> Result<Bytes, RpcError> + Send + Sync + 'static {
        move |target, input| self.answer(target, input)
    }

    fn answer(&self, target: Address, input: &[u8]) -> Result<Bytes, RpcError> {
        let reverted = || RpcError::CallReverted { target };
        let selector: [u8; 4] = input.get(..4).and_then(|s| s.try_into().ok()).ok_or_else(reverted)?;

        if selector == IPairFactory::getPairCall::SELECTOR {
            let call = IPairFactory::getPairCall::abi_decode(input).map_err(|_| reverted())?;
            let pair = self
                .factory_pairs
                .get(&(target, call.tokenA, call.tokenB))
                .copied()
                .unwrap_or(Address::ZERO);
            return Ok(pair.abi_encode().into());
        }
        if selector == IPair::token0Call::SELECTOR || selector == IPair::token1Call::SELECTOR {
            let (token0, token1) = self.pair_tokens.get(&target).copied().ok_or_else(reverted)?;
            let token = if selector == IPair::token0Call::SELECTOR { token0 } else { token1 };
            return Ok(token.abi_encode().into());
        }
        if selector == IERC20Metadata::decimalsCall::SELECTOR {
            let (decimals, _) = self.tokens.get(&target).ok_or_else(reverted)?;
            return Ok(<alloy_sol_types::sol_data::Uint<8> as alloy_sol_types::SolType>::abi_encode(decimals).into());
        }
        if selector == IERC20Metadata::symbolCall::SELECTOR {
            let (_, symbol) = self.tokens.get(&target).ok_or_else(reverted)?;
            return Ok((symbol.clone(),).abi_encode_params().into());
        }
        if selector == IDonationLedger::donationsCall::SELECTOR {
            let call = IDonationLedger::donationsCall::abi_decode(input).map_err(|_| reverted())?;
            let id: u64 = call.id.to::<u64>();
            if self.failing_ids.contains(&id) {
                return Err(reverted());
            }
            let receipts = self.ledgers.get(&target).ok_or_else(reverted)?;
            let encoded = match receipts.get(&id) {
                Some(r) => (r.donor, r.token, r.amount, U256::from(r.timestamp), B256::repeat_byte(id as u8))
                    .abi_encode_params(),
                None => (Address::ZERO, Address::ZERO, U256::ZERO, U256::ZERO, B256::ZERO).abi_encode_params(),
            };
            return Ok(encoded.into());
        }

        Err(reverted())
    }
}

/// Shared handle to a mock, usable where `Arc<dyn ChainReader>` is expected
pub fn shared(mock: MockChainReader) -> (Arc<MockChainReader>, Arc<dyn ChainReader>) {
    let mock = Arc::new(mock);
    let reader: Arc<dyn ChainReader> = mock.clone();
    (mock, reader)
}
