// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use goldfish::crypto::hashing::normalize_address;
use goldfish::infra::config::Config;
use goldfish::infra::sui::{Ledger, SuiRpcClient};
use goldfish::infra::walrus::{StorageNetwork, WalrusHttpClient};
use goldfish::transport;
use goldfish::{FileService, SuiKeypair};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Goldfish file storage service: Walrus blobs with a Sui ownership registry.
#[derive(Parser, Debug)]
#[command(name = "goldfish", version, about)]
struct Cli {
    /// Wallet address whose files are served (GOLDFISH_WALLET_ADDRESS takes precedence)
    wallet_address: Option<String>,

    /// Hex ed25519 secret key used to sign transactions
    /// (GOLDFISH_SERVER_PRIVATE_KEY_HEX takes precedence)
    private_key_hex: Option<String>,

    /// Address to listen on, overrides GOLDFISH_BIND_ADDR
    #[arg(long)]
    bind: Option<SocketAddr>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "goldfish=info,tower_http=info".into()),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let mut config = match Config::from_env(cli.wallet_address, cli.private_key_hex) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    info!(wallet = %config.wallet_address, rpc = %config.sui_rpc_url, "configuration loaded");

    // --- Signing key ---
    let signer = match config.private_key_hex.as_deref() {
        Some(hex) => match SuiKeypair::from_hex(hex) {
            Ok(keypair) => {
                let address = keypair.address();
                if normalize_address(&address) != normalize_address(&config.wallet_address) {
                    warn!(
                        key_address = %address,
                        wallet = %config.wallet_address,
                        "server key address does not match the configured wallet address; \
                         transactions will be sent by the key's address"
                    );
                } else {
                    info!(%address, "server signing key loaded");
                }
                Some(Arc::new(keypair))
            }
            Err(e) => {
                error!("Error loading server private key: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            warn!("GOLDFISH_SERVER_PRIVATE_KEY_HEX not set; uploads and deletions will fail");
            None
        }
    };
    let sender = signer
        .as_ref()
        .map(|k| k.address())
        .unwrap_or_else(|| config.wallet_address.clone());

    // --- Clients ---
    let ledger: Arc<dyn Ledger> = Arc::new(SuiRpcClient::new(
        config.sui_rpc_url.clone(),
        sender,
        signer,
        config.gas_budget,
    )?);
    let storage: Arc<dyn StorageNetwork> = Arc::new(WalrusHttpClient::new(config.walrus.clone())?);

    match storage.blob_type().await {
        Ok(blob_type) => info!(%blob_type, "connected to Walrus"),
        Err(e) => warn!(error = %e, "failed to connect to Walrus on startup"),
    }

    let files = Arc::new(FileService::new(
        config.wallet_address.clone(),
        config.registry.clone(),
        config.default_epochs,
        ledger,
        storage,
    ));
    let initial = files.file_ids().refetch().await;
    match &initial.error {
        None => info!(count = initial.ids.len(), "registry scanned"),
        Some(e) => warn!(error = %e, "initial registry scan failed"),
    }

    // --- API Server ---
    let app_state = transport::http::AppState { files };
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("API server listening on http://{}", config.bind_addr);
    info!("Swagger UI available at http://{}/swagger-ui", config.bind_addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, stopping");
        }
    }

    Ok(())
}
