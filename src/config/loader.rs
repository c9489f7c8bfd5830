//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config: AppConfig = toml::from_str(&content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  info!(
    name = %config.client.name,
    chain_id = config.chain.chain_id,
    poll_interval_secs = config.client.poll_interval_secs,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty RPC endpoint and client name
/// - Present contract addresses (absence is a configuration error,
///   distinct from any runtime chain failure)
/// - Sensible polling interval
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.client.name.trim().is_empty(),
    "Client name must not be empty"
  );
  anyhow::ensure!(
    config.client.poll_interval_secs > 0,
    "poll_interval_secs must be positive, got {}",
    config.client.poll_interval_secs
  );

  anyhow::ensure!(
    !config.chain.rpc_url.trim().is_empty(),
    "RPC URL must not be empty"
  );
  anyhow::ensure!(config.chain.chain_id > 0, "chain_id must be positive");

  anyhow::ensure!(
    config
      .contracts
      .erc20_address
      .as_deref()
      .is_some_and(|a| !a.trim().is_empty()),
    "contracts.erc20_address is not set — no ERC-20 deployment configured for this environment"
  );
  anyhow::ensure!(
    config
      .contracts
      .erc721_address
      .as_deref()
      .is_some_and(|a| !a.trim().is_empty()),
    "contracts.erc721_address is not set — no ERC-721 deployment configured for this environment"
  );

  if config.health.enabled {
    anyhow::ensure!(
      !config.health.bind_address.trim().is_empty(),
      "health.bind_address must not be empty when health endpoints are enabled"
    );
  }

  Ok(())
}
