use std::sync::Arc;

use clap::Parser;
use goldfish::crypto::hashing::normalize_address;
use goldfish::infra::config::Config;
use goldfish::infra::sui::{Ledger, SuiRpcClient};
use goldfish::infra::walrus::{StorageNetwork, WalrusHttpClient};
use goldfish::SuiKeypair;

/// SUI below this many MIST is unlikely to cover an upload (three transactions).
const LOW_BALANCE_MIST: u128 = 300_000_000;
const MIST_PER_SUI: f64 = 1_000_000_000.0;

/// Checks configuration, ledger connectivity, signer funds and the storage
/// network before starting the service.
#[derive(Parser, Debug)]
#[command(name = "preflight", about)]
struct Cli {
    wallet_address: Option<String>,
    private_key_hex: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_env(cli.wallet_address, cli.private_key_hex)?;

    println!("> Preflight:");
    println!("  GOLDFISH_WALLET_ADDRESS={}", config.wallet_address);
    println!("  SUI_RPC_URL={}", config.sui_rpc_url);
    println!("  GOLDFISH_PACKAGE_ID={}", config.registry.package_id);
    println!("  GOLDFISH_REGISTRY_OBJECT_ID={}", config.registry.registry_object_id);
    println!("  GOLDFISH_TABLE_OBJECT_ID={}", config.registry.table_object_id);
    println!("  WALRUS_AGGREGATOR_URL={}", config.walrus.aggregator_url);
    println!("  WALRUS_ENCODER_URL={}", config.walrus.encoder_url);
    println!("  WALRUS_STORAGE_NODES={} configured", config.walrus.storage_nodes.len());

    let signer = config
        .private_key_hex
        .as_deref()
        .map(SuiKeypair::from_hex)
        .transpose()?
        .map(Arc::new);
    let sender = signer
        .as_ref()
        .map(|k| k.address())
        .unwrap_or_else(|| config.wallet_address.clone());

    let client = SuiRpcClient::new(config.sui_rpc_url.clone(), sender.clone(), signer.clone(), config.gas_budget)?;

    // Basic RPC connectivity
    let chain = client
        .chain_identifier()
        .await
        .map_err(|e| anyhow::anyhow!("Sui RPC unreachable at {}: {}", client.rpc_url(), e))?;
    println!("  Chain identifier: {}", chain);

    // Signer and balance
    match &signer {
        Some(_) => {
            println!("  Signer: {}", sender);
            if normalize_address(&sender) != normalize_address(&config.wallet_address) {
                eprintln!("  Warning: signer address differs from the wallet address.");
            }
            let balance = client.balance(&sender).await?;
            println!(
                "  Signer balance: {} MIST (~{:.4} SUI)",
                balance,
                balance as f64 / MIST_PER_SUI
            );
            if balance < LOW_BALANCE_MIST {
                eprintln!("  Warning: signer balance looks low; upload transactions may fail.");
            }
        }
        None => eprintln!("  Warning: no signing key configured; uploads and deletions will fail."),
    }

    // Registry table reachable
    let page = client
        .dynamic_fields(&config.registry.table_object_id, None, Some(1))
        .await
        .map_err(|e| anyhow::anyhow!("Registry table not readable: {}", e))?;
    println!("  Registry table readable ({} field(s) on first page).", page.data.len());

    // Storage network
    let storage = WalrusHttpClient::new(config.walrus.clone())?;
    match storage.blob_type().await {
        Ok(blob_type) => println!("  Walrus blob type: {}", blob_type),
        Err(e) => {
            eprintln!("  Walrus check failed: {}", e);
            std::process::exit(1);
        }
    }

    println!("> Preflight OK.");
    Ok(())
}
