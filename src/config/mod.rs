//! Configuration Module - TOML-based Client Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! All contract addresses and chain parameters are externalized here -
//! nothing is hardcoded in the domain layer. The signing key is the one
//! secret and stays in the environment (`SIGNER_PRIVATE_KEY`), never in a
//! config file.

pub mod loader;

use serde::Deserialize;

/// Top-level client configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before any chain connection is attempted.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Client identity and runtime knobs.
  pub client: ClientConfig,
  /// RPC endpoint and expected chain.
  pub chain: ChainConfig,
  /// Deployment addresses of the two contracts.
  pub contracts: ContractsConfig,
  /// Wallet-connection metadata.
  #[serde(default)]
  pub wallet: WalletConfig,
  /// Health endpoint configuration.
  #[serde(default)]
  pub health: HealthConfig,
}

/// Client identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
  /// Human-readable client name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Seconds between token-balance polls while connected.
  #[serde(default = "default_poll_interval")]
  pub poll_interval_secs: u64,
}

/// RPC endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
  /// HTTP JSON-RPC endpoint.
  pub rpc_url: String,
  /// Chain id the endpoint must serve; a mismatch aborts startup.
  pub chain_id: u64,
}

/// Deployment addresses - ALWAYS in config, never hardcoded.
///
/// A missing entry means "no contract deployed for this environment" and is
/// reported as a configuration error at startup, not a chain error later.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
  /// ERC-20 payment token address.
  pub erc20_address: Option<String>,
  /// ERC-721 NFT contract address.
  pub erc721_address: Option<String>,
}

/// Wallet-connection metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletConfig {
  /// WalletConnect project identifier (informational for this client).
  pub walletconnect_project_id: Option<String>,
}

/// Health endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
  /// Enable the /live and /ready endpoints.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Bind address for the health server.
  #[serde(default = "default_health_addr")]
  pub bind_address: String,
}

impl Default for HealthConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: default_health_addr(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_poll_interval() -> u64 {
  10
}

fn default_true() -> bool {
  true
}

fn default_health_addr() -> String {
  "0.0.0.0:9090".to_string()
}
