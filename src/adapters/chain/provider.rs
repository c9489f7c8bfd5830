//! RPC Provider - alloy-rs 0.9 Connection Management
//!
//! Manages the connection to the configured EVM chain via alloy-rs.
//! Validates RPC connectivity and the expected chain id at startup and
//! exposes a shared provider instance for all on-chain operations.
//!
//! In alloy 0.9, `ProviderBuilder::new().on_http()` returns a complex
//! filler type. We store it as a type-erased `dyn Provider` to keep
//! the API clean across the adapter layer.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, instrument};

use crate::config::ChainConfig;
use crate::domain::error::ClientError;
use crate::ports::chain::ReadClient;

/// Shared RPC provider backed by alloy-rs 0.9.
///
/// All chain adapters share a single provider instance to avoid
/// redundant connections and enable connection pooling.
///
/// Uses `dyn Provider` for type erasure because alloy 0.9's
/// `ProviderBuilder::new().on_http()` returns a deeply-nested
/// generic filler type that would leak implementation details.
pub struct RpcClient {
    /// The alloy HTTP provider (type-erased).
    provider: Arc<dyn Provider + Send + Sync>,
    /// Chain id confirmed at connect time.
    chain_id: u64,
}

impl RpcClient {
    /// Connect to the configured RPC endpoint and validate the chain id.
    ///
    /// The URL and expected chain id come from `config.toml` (never
    /// hardcoded). A chain-id mismatch is a startup error: submitting
    /// against the wrong network is worse than refusing to start.
    #[instrument(skip_all)]
    pub async fn connect(config: &ChainConfig) -> Result<Self> {
        // alloy 0.9: on_http() is synchronous, returns impl Provider
        let provider = ProviderBuilder::new()
            .on_http(config.rpc_url.parse().context("Invalid RPC URL")?)
            .boxed();

        // Wrap in Arc<dyn Provider> for type erasure
        let provider: Arc<dyn Provider + Send + Sync> = Arc::new(provider);

        let chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")?;

        if chain_id != config.chain_id {
            anyhow::bail!(
                "Expected chain_id={}, got {chain_id} — check [chain] in config.toml",
                config.chain_id
            );
        }

        info!(chain_id, "Connected to RPC endpoint");

        Ok(Self { provider, chain_id })
    }

    /// Get a shared reference to the alloy provider (type-erased).
    pub fn inner(&self) -> Arc<dyn Provider + Send + Sync> {
        Arc::clone(&self.provider)
    }

    /// Chain id confirmed at connect time.
    pub fn confirmed_chain_id(&self) -> u64 {
        self.chain_id
    }
}

#[async_trait]
impl ReadClient for RpcClient {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ClientError> {
        let tx = TransactionRequest::default().to(to).input(data.into());

        self.provider
            .call(&tx)
            .await
            .map_err(|e| ClientError::ChainCall(e.to_string()))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ClientError> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(|e| ClientError::ChainCall(e.to_string()))
    }

    async fn chain_id(&self) -> Result<u64, ClientError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ClientError::ChainCall(e.to_string()))
    }

    async fn is_healthy(&self) -> bool {
        self.provider.get_block_number().await.is_ok()
    }
}
