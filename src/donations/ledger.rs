// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! The donation ledger as a [`SparseMapping`]

use alloy_primitives::{Address, U256};
use tracing::trace;

use super::prober::Probe;
use super::reader::SparseMapping;
use crate::client::ChainReader;
use crate::contracts::{decode_return, IDonationLedger, ReadCall};
use crate::errors::RpcError;
use crate::types::donation::DonationRecord;
use crate::types::tokens::TokenDecimals;

/// `donations(uint256)` mapping of a deployed ledger.
///
/// Decoded records carry native-asset decimals and an empty symbol until the
/// assembler enriches them with token metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonationLedger {
    address: Address,
}

impl DonationLedger {
    /// Ledger deployed at `address`
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// Existence of receipt `id` from a single read.
    ///
    /// Transport failures and undecodable data are inconclusive.
    pub async fn probe(&self, reader: &dyn ChainReader, id: u64) -> Probe {
        let call = self.read_call(id);
        let result = reader
            .call(call.target, call.input)
            .await
            .and_then(|data| self.decode(id, &data));

        match result {
            Ok(record) if record.exists() => Probe::Exists,
            Ok(_) => Probe::Absent,
            Err(e) => {
                trace!(id, error = %e, "Receipt read inconclusive");
                Probe::Unknown
            }
        }
    }
}

impl SparseMapping for DonationLedger {
    type Record = DonationRecord;

    fn contract(&self) -> Address {
        self.address
    }

    fn read_call(&self, id: u64) -> ReadCall {
        ReadCall::new(self.address, &IDonationLedger::donationsCall { id: U256::from(id) })
    }

    fn decode(&self, id: u64, data: &[u8]) -> Result<DonationRecord, RpcError> {
        let receipt = decode_return::<IDonationLedger::donationsCall>(data)?;
        Ok(DonationRecord {
            id,
            donor: receipt.donor,
            token: (!receipt.token.is_zero()).then_some(receipt.token),
            amount: receipt.amount,
            timestamp: receipt.timestamp.saturating_to::<u64>(),
            verification_hash: receipt.verificationHash,
            decimals: TokenDecimals::NATIVE,
            symbol: String::new(),
        })
    }

    fn exists(&self, record: &DonationRecord) -> bool {
        record.exists()
    }

    fn sort_key(&self, record: &DonationRecord) -> u64 {
        record.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B256, U256};
    use alloy_sol_types::{SolCall, SolValue};

    fn encoded(token: Address, timestamp: u64) -> Vec<u8> {
        (
            Address::repeat_byte(0xd0),
            token,
            U256::from(5u64),
            U256::from(timestamp),
            B256::repeat_byte(0x77),
        )
            .abi_encode_params()
    }

    #[test]
    fn zero_token_means_native() {
        let ledger = DonationLedger::new(Address::repeat_byte(1));
        let record = ledger.decode(4, &encoded(Address::ZERO, 1_700_000_000)).unwrap();
        assert_eq!(record.id, 4);
        assert!(record.is_native());
        assert!(ledger.exists(&record));
        assert_eq!(ledger.sort_key(&record), 1_700_000_000);
    }

    #[test]
    fn zero_timestamp_is_absent() {
        let ledger = DonationLedger::new(Address::repeat_byte(1));
        let record = ledger.decode(9, &encoded(Address::repeat_byte(2), 0)).unwrap();
        assert_eq!(record.token, Some(Address::repeat_byte(2)));
        assert!(!ledger.exists(&record));
    }

    #[test]
    fn read_call_targets_ledger() {
        let ledger = DonationLedger::new(Address::repeat_byte(1));
        let call = ledger.read_call(3);
        assert_eq!(call.target, ledger.contract());
        assert_eq!(&call.input[..4], IDonationLedger::donationsCall::SELECTOR.as_slice());
    }
}
