// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Donation history: probe the ledger's extent, then batch-read it

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{info, Instrument};

use super::ledger::DonationLedger;
use super::prober::RecordProber;
use super::reader::BatchReader;
use crate::budget::TimeBudget;
use crate::cache::{TokenMetadata, TokenMetadataCache};
use crate::client::ChainReader;
use crate::config::deployment::ChainDeployment;
use crate::config::ScanConfig;
use crate::errors::ConfigError;
use crate::tracing::spans;
use crate::types::donation::DonationRecord;
use crate::types::tokens::TokenDecimals;

/// Symbol shown for a token whose metadata could not be read
const UNKNOWN_SYMBOL: &str = "UNKNOWN";

/// Donation receipts of one ledger, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationHistory {
    /// Existing receipts ordered by descending timestamp
    pub records: Vec<DonationRecord>,
    /// Highest receipt id found by the probe, 0 for an empty ledger
    pub max_id: u64,
    /// Whether the history may be incomplete (budget spent, failed or inconclusive reads)
    pub partial: bool,
    /// Receipt reads that failed in the batch phase
    pub failed_reads: u64,
}

/// Builds donation histories from a ledger contract.
#[derive(Clone)]
pub struct DonationHistoryAssembler {
    reader: Arc<dyn ChainReader>,
    deployment: ChainDeployment,
    config: ScanConfig,
    tokens: Arc<TokenMetadataCache>,
}

impl std::fmt::Debug for DonationHistoryAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DonationHistoryAssembler")
            .field("chain", &self.deployment.chain)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DonationHistoryAssembler {
    /// Assembler for `deployment`'s chain with a private metadata cache
    pub fn new(reader: Arc<dyn ChainReader>, deployment: ChainDeployment, config: ScanConfig) -> Self {
        Self {
            reader,
            deployment,
            config,
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

    /// Share a token metadata cache with other components
    pub fn with_token_cache(mut self, tokens: Arc<TokenMetadataCache>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Every receipt of `ledger`.
    pub async fn get_donation_history(&self, ledger: Address) -> DonationHistory {
        self.assemble(ledger, None).await
    }

    /// Receipts of `ledger` made by `donor`.
    pub async fn get_donor_history(&self, ledger: Address, donor: Address) -> DonationHistory {
        self.assemble(ledger, Some(donor)).await
    }

    async fn assemble(&self, ledger: Address, donor: Option<Address>) -> DonationHistory {
        let span = spans::get_donation_history(self.deployment.chain, ledger);
        self.assemble_inner(ledger, donor).instrument(span).await
    }

    async fn assemble_inner(&self, ledger: Address, donor: Option<Address>) -> DonationHistory {
        let budget = self.config.start_budget(self.deployment.chain);
        let mapping = DonationLedger::new(ledger);
        let reader = self.reader.as_ref();

        let probe = RecordProber::from_config(&self.config)
            .find_max_existing_id(|id| mapping.probe(reader, id), &budget)
            .await;

        let mut history = DonationHistory {
            max_id: probe.max_id,
            partial: probe.truncated || probe.unresolved > 0,
            ..DonationHistory::default()
        };

        if probe.max_id == 0 {
            info!(ledger = %ledger, partial = history.partial, "Ledger holds no receipts");
            return history;
        }

        let batch = BatchReader::new(self.reader.clone())
            .with_batch_size(self.config.batch_size)
            .read_range(&mapping, 1..=probe.max_id, &budget)
            .await;

        history.failed_reads = batch.failed_reads;
        history.partial |= batch.truncated || batch.failed_reads > 0;

        let mut records = batch.records;
        if let Some(donor) = donor {
            records.retain(|record| record.donor == donor);
        }
        self.enrich(&mut records, &budget).await;
        history.records = records;

        info!(
            ledger = %ledger,
            max_id = history.max_id,
            records = history.records.len(),
            failed_reads = history.failed_reads,
            partial = history.partial,
            "Assembled donation history"
        );
        history
    }

    /// Fill in decimals and symbol, resolving each distinct token once.
    async fn enrich(&self, records: &mut [DonationRecord], budget: &TimeBudget) {
        let tokens: BTreeSet<Address> = records.iter().filter_map(|r| r.token).collect();

        let mut metadata: HashMap<Address, TokenMetadata> = HashMap::with_capacity(tokens.len());
        for token in tokens {
            let resolved = self
                .tokens
                .token_metadata(self.reader.as_ref(), token, budget)
                .await
                .unwrap_or_else(|| TokenMetadata {
                    decimals: TokenDecimals::FALLBACK,
                    symbol: UNKNOWN_SYMBOL.to_string(),
                });
            metadata.insert(token, resolved);
        }

        for record in records.iter_mut() {
            match record.token.and_then(|token| metadata.get(&token)) {
                Some(token) => {
                    record.decimals = token.decimals;
                    record.symbol = token.symbol.clone();
                }
                None => {
                    record.decimals = TokenDecimals::NATIVE;
                    record.symbol = self.deployment.native_symbol.clone();
                }
            }
        }
    }
}
