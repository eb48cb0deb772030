// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Read-only contract interfaces used for candidate resolution, metadata and
//! sparse-mapping reads.
//!
//! Calls are ABI-encoded with [`SolCall::abi_encode`] and sent through
//! [`ChainReader::call`](crate::ChainReader::call) or batched through
//! Multicall3's `aggregate3`.

use alloy_primitives::{Address, Bytes, FixedBytes};
use alloy_sol_types::{sol, SolCall};

use crate::errors::RpcError;

sol! {
    /// Pair factory (Uniswap V2 shape)
    interface IPairFactory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }

    /// Pair token accessors
    interface IPair {
        function token0() external view returns (address);
        function token1() external view returns (address);
    }

    /// ERC-20 metadata
    interface IERC20Metadata {
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }

    /// Legacy tokens (e.g. MKR) that return `bytes32` from `symbol()`
    interface IERC20SymbolBytes32 {
        function symbol() external view returns (bytes32);
    }

    /// Donation ledger: an id-addressed public mapping without events
    interface IDonationLedger {
        function donations(uint256 id)
            external
            view
            returns (
                address donor,
                address token,
                uint256 amount,
                uint256 timestamp,
                bytes32 verificationHash
            );
    }

    /// Multicall3 batch reads with per-call failure isolation
    interface IMulticall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Call3Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls)
            external
            payable
            returns (Call3Result[] memory returnData);
    }
}

/// One read inside a multicall batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCall {
    /// Contract to call
    pub target: Address,
    /// ABI-encoded calldata
    pub input: Bytes,
}

impl ReadCall {
    /// Encode `call` against `target`.
    pub fn new<C: SolCall>(target: Address, call: &C) -> Self {
        Self {
            target,
            input: call.abi_encode().into(),
        }
    }
}

/// Decode the return data of `C`, mapping failures to [`RpcError::ReturnDecodeFailed`].
pub(crate) fn decode_return<C: SolCall>(data: &[u8]) -> Result<C::Return, RpcError> {
    C::abi_decode_returns(data).map_err(|e| RpcError::return_decode_failed(C::SIGNATURE, e))
}

/// Decode a `symbol()` result as `string`, falling back to a NUL-padded `bytes32`.
pub(crate) fn decode_symbol(data: &[u8]) -> Result<String, RpcError> {
    if let Ok(symbol) = IERC20Metadata::symbolCall::abi_decode_returns(data) {
        return Ok(symbol);
    }
    let raw: FixedBytes<32> = decode_return::<IERC20SymbolBytes32::symbolCall>(data)?;
    let trimmed: Vec<u8> = raw.iter().copied().take_while(|b| *b != 0).collect();
    String::from_utf8(trimmed).map_err(|e| RpcError::return_decode_failed("symbol()", e))
}
