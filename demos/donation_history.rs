/// Example: reconstruct every receipt of a donation ledger
///
/// The ledger emits no events, so its extent is found by probing for the
/// highest populated id and the receipts are then read in multicall batches.
///
/// Run with:
/// ```bash
/// RPC_URL=https://mainnet.base.org \
/// CHAIN=base \
/// LEDGER=0x... \
/// DONOR=0x... \
/// cargo run --example donation_history
/// ```
use std::env;
use std::str::FromStr;
use std::sync::Arc;

use activityscan::{connect_http, ChainDeployment, DonationHistoryAssembler, ProviderReader, ScanConfig};
use alloy_chains::NamedChain;
use alloy_primitives::Address;
use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let rpc_url = env::var("RPC_URL").context("RPC_URL environment variable not set")?;
    let chain_name = env::var("CHAIN").unwrap_or_else(|_| "base".to_string());
    let chain = NamedChain::from_str(&chain_name).context("Unknown CHAIN")?;
    let ledger = Address::from_str(&env::var("LEDGER").context("LEDGER environment variable not set")?)
        .context("LEDGER is not an address")?;
    let donor = env::var("DONOR")
        .ok()
        .map(|d| Address::from_str(&d))
        .transpose()
        .context("DONOR is not an address")?;

    let provider = connect_http(&rpc_url)?;
    let reader = Arc::new(ProviderReader::new(provider));
    let assembler = DonationHistoryAssembler::try_new(reader, ChainDeployment::new(chain), ScanConfig::default())?;

    info!(chain = %chain, ledger = %ledger, "Assembling donation history");
    let history = match donor {
        Some(donor) => assembler.get_donor_history(ledger, donor).await,
        None => assembler.get_donation_history(ledger).await,
    };

    println!("=== Donation history ({} receipts, max id {}) ===", history.records.len(), history.max_id);
    for record in &history.records {
        let when = record
            .timestamp_utc()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| record.timestamp.to_string());
        println!(
            "#{:<6} {when}  {}  {} {} (raw, {} decimals)",
            record.id,
            record.donor,
            record.amount,
            record.symbol,
            record.decimals.as_u8()
        );
    }
    if history.partial {
        println!("\nHistory is partial: {} reads failed or the budget ran out", history.failed_reads);
    }

    Ok(())
}
