// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! [`ChainReader`] backed by an alloy provider

use std::marker::PhantomData;

use alloy_consensus::BlockHeader;
use alloy_network::{BlockResponse, Ethereum, Network, TransactionBuilder};
use alloy_primitives::{Address, BlockNumber, Bytes};
use alloy_provider::{Provider, ProviderBuilder, RootProvider};
use alloy_rpc_types::Filter;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use tracing::debug;

use super::{CallResult, ChainReader};
use crate::config::constants::MULTICALL3;
use crate::contracts::{decode_return, IMulticall3, ReadCall};
use crate::errors::RpcError;
use crate::events::definitions::EventSchema;
use crate::types::{block_range::BlockRange, log::RawLogEntry};

/// Create an HTTP provider for the Ethereum network from a URL string
///
/// # Errors
///
/// Returns [`RpcError::ProviderUrlInvalid`] if the URL cannot be parsed.
pub fn connect_http(url: &str) -> Result<RootProvider<Ethereum>, RpcError> {
    let url: url::Url = url
        .parse()
        .map_err(|e| RpcError::ProviderUrlInvalid(format!("{e}")))?;

    Ok(ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_http(url))
}

/// [`ChainReader`] over any alloy [`Provider`].
///
/// Batch reads go through Multicall3's `aggregate3` with `allowFailure` set on
/// every call, so one reverting read never fails its siblings.
#[derive(Debug, Clone)]
pub struct ProviderReader<P, N = Ethereum> {
    provider: P,
    multicall: Address,
    _network: PhantomData<fn() -> N>,
}

impl<P, N> ProviderReader<P, N>
where
    P: Provider<N>,
    N: Network,
{
    /// Wrap a provider, using the canonical Multicall3 deployment
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            multicall: MULTICALL3,
            _network: PhantomData,
        }
    }

    /// Use a chain-specific Multicall3 deployment
    pub fn with_multicall(mut self, multicall: Address) -> Self {
        self.multicall = multicall;
        self
    }

    /// The wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn fetch_logs(
        &self,
        filter: Filter,
        operation: String,
    ) -> Result<Vec<RawLogEntry>, RpcError> {
        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| RpcError::get_logs_failed(operation, e))?;

        Ok(logs.into_iter().filter_map(RawLogEntry::from_rpc).collect())
    }
}

#[async_trait]
impl<P, N> ChainReader for ProviderReader<P, N>
where
    P: Provider<N> + Send + Sync,
    N: Network,
{
    async fn head_block_number(&self) -> Result<BlockNumber, RpcError> {
        self.provider
            .get_block_number()
            .await
            .map_err(RpcError::get_block_number_failed)
    }

    async fn get_logs(
        &self,
        address: Address,
        range: BlockRange,
    ) -> Result<Vec<RawLogEntry>, RpcError> {
        let filter = Filter::new()
            .address(address)
            .from_block(range.from())
            .to_block(range.to());
        self.fetch_logs(filter, format!("{address} {range}")).await
    }

    async fn get_logs_by_schema(
        &self,
        address: Address,
        schema: &EventSchema,
        range: BlockRange,
    ) -> Result<Vec<RawLogEntry>, RpcError> {
        let filter = Filter::new()
            .address(address)
            .event_signature(schema.topics().to_vec())
            .from_block(range.from())
            .to_block(range.to());
        self.fetch_logs(filter, format!("{} {address} {range}", schema.name()))
            .await
    }

    async fn get_block_timestamp(&self, block_number: BlockNumber) -> Result<u64, RpcError> {
        let block = self
            .provider
            .get_block_by_number(block_number.into())
            .await
            .map_err(|e| RpcError::get_block_failed(block_number, e))?
            .ok_or(RpcError::BlockNotFound { block_number })?;

        Ok(block.header().timestamp())
    }

    async fn call(&self, target: Address, input: Bytes) -> Result<Bytes, RpcError> {
        let tx = N::TransactionRequest::default()
            .with_to(target)
            .with_input(input);

        self.provider
            .call(tx)
            .await
            .map_err(|e| RpcError::call_failed(target, e))
    }

    async fn multicall(&self, calls: Vec<ReadCall>) -> Result<Vec<CallResult>, RpcError> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        let targets: Vec<Address> = calls.iter().map(|c| c.target).collect();
        let batch = IMulticall3::aggregate3Call {
            calls: calls
                .into_iter()
                .map(|c| IMulticall3::Call3 {
                    target: c.target,
                    allowFailure: true,
                    callData: c.input,
                })
                .collect(),
        };

        debug!(calls = targets.len(), multicall = %self.multicall, "Sending multicall batch");

        let raw = self.call(self.multicall, batch.abi_encode().into()).await?;
        let results = decode_return::<IMulticall3::aggregate3Call>(&raw)?;

        if results.len() != targets.len() {
            return Err(RpcError::return_decode_failed(
                IMulticall3::aggregate3Call::SIGNATURE,
                format!("expected {} results, got {}", targets.len(), results.len()),
            ));
        }

        Ok(targets
            .into_iter()
            .zip(results)
            .map(|(target, result)| {
                if result.success {
                    Ok(result.returnData)
                } else {
                    Err(RpcError::CallReverted { target })
                }
            })
            .collect())
    }
}
