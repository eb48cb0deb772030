/// Example: find the most recent Swap/Mint/Burn activity of a pair
///
/// Resolves candidates from the deployment data (or `PAIR_OVERRIDE`), scans
/// backward from the chain head under a 20 second budget, and prints the
/// report as JSON.
///
/// Run with:
/// ```bash
/// RPC_URL=https://eth.llamarpc.com \
/// DEPLOYMENT_JSON=deployments.json \
/// CHAIN=mainnet \
/// PAIR_OVERRIDE=0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc \
/// RUST_LOG=activityscan=debug \
/// cargo run --example recent_activity
/// ```
use std::env;
use std::str::FromStr;
use std::sync::Arc;

use activityscan::{
    connect_http, ActivityAggregator, ChainDeployment, DeploymentConfig, ProviderReader, ScanConfig,
};
use alloy_chains::NamedChain;
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
    let chain_name = env::var("CHAIN").unwrap_or_else(|_| "mainnet".to_string());
    let chain = NamedChain::from_str(&chain_name).context("Unknown CHAIN")?;
    let pair_override = env::var("PAIR_OVERRIDE").ok();

    let deployment = match env::var("DEPLOYMENT_JSON") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("Failed to read {path}"))?;
            DeploymentConfig::from_json_str(&json)?
                .for_chain(chain)
                .cloned()
                .with_context(|| format!("No deployment for {chain}"))?
        }
        Err(_) => ChainDeployment::new(chain),
    };

    let provider = connect_http(&rpc_url)?;
    let reader = Arc::new(ProviderReader::new(provider).with_multicall(deployment.multicall));
    let aggregator = ActivityAggregator::try_new(reader, deployment, ScanConfig::default())?;

    info!(chain = %chain, has_override = pair_override.is_some(), "Discovering recent activity");
    let report = aggregator.get_recent_activity(pair_override.as_deref()).await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if let Some(reason) = report.diagnostics.empty_reason {
        println!("\nNo activity: {reason:?}");
    }

    Ok(())
}
