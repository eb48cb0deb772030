// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Classification and decoding of pair activity logs
//!
//! [`EventDecoder::classify`] matches an entry's topic-0 against the known
//! Swap/Mint/Burn signature hashes and decodes the rest of the entry according
//! to that event's schema, producing a [`DecodedEvent`]. [`EventDecoder::decode`]
//! turns a batch of entries into [`ActivityRecord`]s, skipping entries it does
//! not recognize and dropping malformed ones without aborting the batch.
//!
//! Decoding is pure: it reads nothing from the chain. Token decimals and labels
//! come from the [`PairMetadata`] supplied by the caller.

use alloy_primitives::B256;
use alloy_sol_types::SolEvent;
use tracing::{trace, warn};

use super::definitions::{Burn, EventSchema, Mint, Swap};
use crate::cache::PairMetadata;
use crate::errors::EventProcessingError;
use crate::types::activity::{ActivityKind, ActivityRecord, TokenAmounts};
use crate::types::log::RawLogEntry;
use crate::types::tokens::TokenAmount;

/// Result of classifying one log entry.
#[derive(Debug)]
pub enum DecodedEvent {
    /// A decoded pair Swap
    Swap(Swap),
    /// A decoded pair Mint
    Mint(Mint),
    /// A decoded pair Burn
    Burn(Burn),
    /// The entry is not a pair activity event, or it is malformed
    Failed(EventProcessingError),
}

/// Decoder for constant-product pair activity.
#[derive(Debug, Clone)]
pub struct EventDecoder {
    schema: EventSchema,
}

impl Default for EventDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDecoder {
    /// Decoder for Swap, Mint and Burn
    pub fn new() -> Self {
        Self {
            schema: EventSchema::pair_activity(),
        }
    }

    /// The topic-0 set this decoder understands
    pub fn schema(&self) -> &EventSchema {
        &self.schema
    }

    /// Classify and decode a single entry.
    pub fn classify(&self, entry: &RawLogEntry) -> DecodedEvent {
        let topic0 = entry.topic0();
        if !self.schema.matches(topic0) {
            return DecodedEvent::Failed(EventProcessingError::UnknownTopic {
                topic: topic0.unwrap_or(B256::ZERO),
            });
        }

        let data = entry.log_data();
        let decoded = match topic0 {
            Some(t) if t == Swap::SIGNATURE_HASH => Swap::decode_log_data(&data).map(DecodedEvent::Swap),
            Some(t) if t == Mint::SIGNATURE_HASH => Mint::decode_log_data(&data).map(DecodedEvent::Mint),
            _ => Burn::decode_log_data(&data).map(DecodedEvent::Burn),
        };

        decoded.unwrap_or_else(|e| {
            DecodedEvent::Failed(EventProcessingError::decode_failed(format!(
                "tx {} log {:?}: {e}",
                entry.transaction_hash, entry.log_index
            )))
        })
    }

    /// Decode a batch of entries emitted by the pair described by `metadata`.
    ///
    /// Output order follows input order. Unrecognized entries (e.g. `Sync` or LP
    /// token transfers in an unfiltered query) are skipped; malformed entries are
    /// dropped with a warning.
    pub fn decode(&self, entries: &[RawLogEntry], metadata: &PairMetadata) -> Vec<ActivityRecord> {
        entries
            .iter()
            .filter_map(|entry| match self.classify(entry) {
                DecodedEvent::Failed(EventProcessingError::UnknownTopic { topic }) => {
                    trace!(%topic, tx = %entry.transaction_hash, "Skipping unrelated log");
                    None
                }
                DecodedEvent::Failed(e) => {
                    warn!(error = %e, block = entry.block_number, "Dropping malformed log");
                    None
                }
                event => to_record(event, entry, metadata),
            })
            .collect()
    }
}

fn to_record(event: DecodedEvent, entry: &RawLogEntry, metadata: &PairMetadata) -> Option<ActivityRecord> {
    let (kind, participant, counterparty, amounts) = match event {
        DecodedEvent::Swap(swap) => {
            let token0 = TokenAmount::new(swap.amount0In)
                .signed_delta(TokenAmount::new(swap.amount0Out), metadata.decimals0);
            let token1 = TokenAmount::new(swap.amount1In)
                .signed_delta(TokenAmount::new(swap.amount1Out), metadata.decimals1);
            (ActivityKind::Swap, swap.sender, Some(swap.to), TokenAmounts { token0, token1 })
        }
        DecodedEvent::Mint(mint) => (
            ActivityKind::Mint,
            mint.sender,
            None,
            normalized(mint.amount0, mint.amount1, metadata),
        ),
        DecodedEvent::Burn(burn) => (
            ActivityKind::Burn,
            burn.sender,
            Some(burn.to),
            normalized(burn.amount0, burn.amount1, metadata),
        ),
        DecodedEvent::Failed(_) => return None,
    };

    Some(ActivityRecord {
        kind,
        pair: entry.address,
        tx_hash: entry.transaction_hash,
        block_number: entry.block_number,
        log_index: entry.log_index,
        timestamp: None,
        participant,
        counterparty,
        amounts,
        token_labels: metadata.labels.clone(),
    })
}

fn normalized(
    amount0: alloy_primitives::U256,
    amount1: alloy_primitives::U256,
    metadata: &PairMetadata,
) -> TokenAmounts {
    TokenAmounts {
        token0: TokenAmount::new(amount0).normalize(metadata.decimals0),
        token1: TokenAmount::new(amount1).normalize(metadata.decimals1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{keccak256, Address, Bytes, U256};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn pair() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn entry(event: impl SolEvent, log_index: u64) -> RawLogEntry {
        let data = event.encode_log_data();
        RawLogEntry {
            address: pair(),
            block_number: 100,
            transaction_hash: B256::repeat_byte(log_index as u8),
            log_index: Some(log_index),
            topics: data.topics().to_vec(),
            data: data.data,
        }
    }

    fn usdc_weth() -> PairMetadata {
        let mut metadata = PairMetadata::fallback(pair());
        metadata.decimals0 = crate::TokenDecimals::USDC;
        metadata.labels.token0 = "USDC".into();
        metadata.labels.token1 = "WETH".into();
        metadata
    }

    #[test]
    fn swap_amounts_are_signed_per_token() {
        let sender = Address::repeat_byte(1);
        let to = Address::repeat_byte(2);
        let swap = Swap {
            sender,
            amount0In: U256::from(2_500_000_000u64),
            amount1In: U256::ZERO,
            amount0Out: U256::ZERO,
            amount1Out: U256::from(1_000_000_000_000_000_000u64),
            to,
        };

        let records = EventDecoder::new().decode(&[entry(swap, 0)], &usdc_weth());
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.kind, ActivityKind::Swap);
        assert_eq!(record.participant, sender);
        assert_eq!(record.counterparty, Some(to));
        assert_eq!(record.amounts.token0, BigDecimal::from(2500));
        assert_eq!(record.amounts.token1, BigDecimal::from(-1));
        assert_eq!(record.token_labels.token0, "USDC");
        assert_eq!(record.timestamp, None);
    }

    #[test]
    fn mint_has_no_counterparty_and_burn_does() {
        let sender = Address::repeat_byte(3);
        let mint = Mint {
            sender,
            amount0: U256::from(1_500_000u64),
            amount1: U256::from(10u64).pow(U256::from(17u64)),
        };
        let burn = Burn {
            sender,
            amount0: U256::from(1u64),
            amount1: U256::from(1u64),
            to: Address::repeat_byte(4),
        };

        let records = EventDecoder::new().decode(&[entry(mint, 0), entry(burn, 1)], &usdc_weth());
        assert_eq!(records[0].kind, ActivityKind::Mint);
        assert_eq!(records[0].counterparty, None);
        assert_eq!(records[0].amounts.token0, BigDecimal::from_str("1.5").unwrap());
        assert_eq!(records[0].amounts.token1, BigDecimal::from_str("0.1").unwrap());
        assert_eq!(records[1].kind, ActivityKind::Burn);
        assert_eq!(records[1].counterparty, Some(Address::repeat_byte(4)));
    }

    #[test]
    fn unknown_and_malformed_entries_are_skipped() {
        let sync = RawLogEntry {
            address: pair(),
            block_number: 100,
            transaction_hash: B256::repeat_byte(9),
            log_index: Some(0),
            topics: vec![keccak256("Sync(uint112,uint112)")],
            data: Bytes::from(vec![0u8; 64]),
        };
        let truncated_swap = RawLogEntry {
            topics: vec![Swap::SIGNATURE_HASH],
            data: Bytes::from(vec![0u8; 7]),
            ..sync.clone()
        };
        let mint = entry(
            Mint {
                sender: Address::repeat_byte(5),
                amount0: U256::from(1u64),
                amount1: U256::from(1u64),
            },
            2,
        );

        let decoder = EventDecoder::new();
        assert!(matches!(
            decoder.classify(&sync),
            DecodedEvent::Failed(EventProcessingError::UnknownTopic { .. })
        ));
        assert!(matches!(
            decoder.classify(&truncated_swap),
            DecodedEvent::Failed(EventProcessingError::DecodeFailed { .. })
        ));

        let records = decoder.decode(&[sync, truncated_swap, mint], &usdc_weth());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, ActivityKind::Mint);
    }

    #[test]
    fn anonymous_log_is_unknown() {
        let anonymous = RawLogEntry {
            address: pair(),
            block_number: 1,
            transaction_hash: B256::ZERO,
            log_index: None,
            topics: vec![],
            data: Bytes::new(),
        };
        let decoded = EventDecoder::new().classify(&anonymous);
        assert!(matches!(
            decoded,
            DecodedEvent::Failed(EventProcessingError::UnknownTopic { topic }) if topic == B256::ZERO
        ));
    }
}
