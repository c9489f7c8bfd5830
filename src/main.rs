//! NFT Market Client — Entry Point
//!
//! Initializes configuration, logging, the chain connection, and the
//! background refresh tasks. Runs until SIGINT/SIGTERM.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Connect RPC provider + validate chain id
//! 4. Resolve contract addresses + verify deployed code on-chain
//! 5. Build signing client from SIGNER_PRIVATE_KEY (read-only without it)
//! 6. Build the market store and services
//! 7. Establish the wallet session for the signing account
//! 8. Spawn health server, balance poller, NFT inventory
//! 9. Wait for SIGINT → graceful shutdown (signal→drain→exit)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

mod adapters;
mod config;
mod domain;
mod ports;
mod store;
mod usecases;

use adapters::chain::{
    ContractAddresses, Erc20Reader, Erc20Writer, Erc721Reader, Erc721Writer, RpcClient,
    RpcSigner,
};
use domain::error::ClientError;
use ports::chain::{ReadClient, SigningClient};
use store::MarketStore;
use usecases::balance_poller::BalancePoller;
use usecases::nft_inventory::NftInventory;
use usecases::nft_service::NftService;
use usecases::session::SessionManager;
use usecases::token_service::TokenService;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.client.log_level)
                }),
        )
        .json()
        .init();

    info!(
        name = %config.client.name,
        version = env!("CARGO_PKG_VERSION"),
        chain_id = config.chain.chain_id,
        "Starting NFT market client"
    );

    if config.wallet.walletconnect_project_id.is_none() {
        warn!("No WalletConnect project id configured — wallet pairing metadata unavailable");
    }

    // ── 3. Shutdown signal channels ─────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let (health_tx, health_rx) = watch::channel(true);

    // ── 4. Connect RPC provider + resolve contracts ─────────
    let rpc = Arc::new(
        RpcClient::connect(&config.chain)
            .await
            .context("Failed to connect to RPC endpoint")?,
    );
    let read_client: Arc<dyn ReadClient> = rpc;

    let addresses = ContractAddresses::from_config(&config.contracts)
        .context("Failed to resolve contract addresses")?;
    addresses
        .validate_deployed(read_client.as_ref())
        .await
        .context("Contract validation failed")?;

    // ── 5. Signing client (optional: read-only without a key) ──
    let signing: Option<Arc<dyn SigningClient>> = match RpcSigner::from_env(&config.chain) {
        Ok(signer) => Some(Arc::new(signer)),
        Err(ClientError::NoActiveAccount) => {
            warn!("SIGNER_PRIVATE_KEY not set — running in read-only mode");
            None
        }
        Err(e) => anyhow::bail!("Failed to build signing client: {e}"),
    };

    // ── 6. Store, readers, writers, services ────────────────
    let market_store = Arc::new(MarketStore::new());

    let erc20_reader = Arc::new(Erc20Reader::new(Arc::clone(&read_client), addresses.erc20));
    let erc721_reader = Arc::new(Erc721Reader::new(Arc::clone(&read_client), addresses.erc721));

    let erc20_writer = signing
        .as_ref()
        .map(|s| Arc::new(Erc20Writer::new(Arc::clone(s), addresses.erc20)));
    let erc721_writer = signing
        .as_ref()
        .map(|s| Arc::new(Erc721Writer::new(Arc::clone(s), addresses.erc721)));

    let token_service = TokenService::new(
        Arc::clone(&erc20_reader),
        erc20_writer.clone(),
        Arc::clone(&market_store),
    );
    let nft_service = NftService::new(
        Arc::clone(&erc721_reader),
        erc721_writer,
        erc20_writer,
        Arc::clone(&market_store),
    );
    let session = SessionManager::new(
        Arc::clone(&erc20_reader),
        Arc::clone(&erc721_reader),
        Arc::clone(&market_store),
    );

    // ── 7. Spawn NFT inventory before the first refresh signal ──
    let inventory = Arc::new(NftInventory::new(
        Arc::clone(&erc721_reader),
        Arc::clone(&market_store),
    ));
    let inventory_handle = {
        let inventory = Arc::clone(&inventory);
        let shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move { inventory.run(shutdown_rx).await })
    };

    // ── 8. Establish the session for the signing account ────
    if let Some(signer) = &signing {
        session.connect(signer.account()).await;
        // The refresh broadcast may have fired before the inventory task
        // subscribed; one direct reload makes the initial set deterministic.
        inventory.reload().await;
    }

    // Startup snapshots are passive display state: log what is readable,
    // degrade silently otherwise.
    match token_service.token_info().await {
        Ok(token) => info!(
            name = %token.name,
            symbol = %token.symbol,
            decimals = token.decimals,
            "Payment token online"
        ),
        Err(e) => warn!(error = %e, "Payment token info unavailable"),
    }
    match nft_service.collection_info().await {
        Ok(collection) => info!(
            name = %collection.name,
            symbol = %collection.symbol,
            price = %domain::amount::format_token_amount(collection.price),
            minted = %collection.total_supply,
            "NFT collection online"
        ),
        Err(e) => warn!(error = %e, "NFT collection info unavailable"),
    }

    // ── 9. Spawn balance poller + health server ─────────────
    let poller = Arc::new(BalancePoller::new(
        Arc::clone(&erc20_reader),
        Arc::clone(&market_store),
        Duration::from_secs(config.client.poll_interval_secs),
    ));
    let poller_handle = {
        let poller = Arc::clone(&poller);
        let shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move { poller.run(shutdown_rx).await })
    };

    let health_handle = if config.health.enabled {
        Some(tokio::spawn(serve_health(
            health_rx,
            config.health.bind_address.clone(),
        )))
    } else {
        None
    };

    info!("All tasks spawned — client is running");

    // ── 10. Wait for SIGINT ─────────────────────────────────
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("SIGINT received, initiating graceful shutdown");
        }
    }

    // ── Graceful shutdown (signal→drain→exit) ───────────────

    // 1. Signal all tasks to stop
    let _ = shutdown_tx.send(());
    info!("Shutdown signal broadcast to all tasks");

    // 2. Mark health as unhealthy (readiness probe → 503)
    let _ = health_tx.send(false);

    // 3. Wait for background tasks to drain (bounded)
    let _ = tokio::time::timeout(Duration::from_secs(10), poller_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(10), inventory_handle).await;

    // 4. Stop health server
    if let Some(handle) = health_handle {
        handle.abort();
    }

    info!("Shutdown complete");
    Ok(())
}

/// Serve health endpoints on the configured bind address.
///
/// - `/live`  — Liveness probe: 200 if process is running
/// - `/ready` — Readiness probe: 503 during graceful shutdown
async fn serve_health(health_rx: watch::Receiver<bool>, bind_address: String) -> Result<()> {
    use axum::{extract::State, http::StatusCode, routing::get, Router};

    let app = Router::new()
        .route("/live", get(|| async { StatusCode::OK }))
        .route(
            "/ready",
            get(
                move |State(rx): State<watch::Receiver<bool>>| async move {
                    if *rx.borrow() {
                        StatusCode::OK
                    } else {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                },
            ),
        )
        .with_state(health_rx);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(bind_address = %bind_address, "Health server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
