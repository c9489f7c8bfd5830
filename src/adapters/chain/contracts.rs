//! Contract Addresses - Configuration Binding and On-chain Verification
//!
//! Resolves the ERC-20 and ERC-721 deployment addresses from configuration
//! and validates at startup that each address carries deployed code.
//! A missing address is a configuration error, distinct from any on-chain
//! failure; an address without code is a misconfiguration caught before the
//! first real call instead of a confusing revert later.

use alloy::primitives::Address;
use anyhow::{bail, Context, Result};
use tracing::{info, instrument};

use crate::config::ContractsConfig;
use crate::domain::error::ClientError;
use crate::ports::chain::ReadClient;

/// The two deployment addresses every service binds against.
#[derive(Debug, Clone, Copy)]
pub struct ContractAddresses {
    /// ERC-20 payment token contract.
    pub erc20: Address,
    /// ERC-721 NFT contract.
    pub erc721: Address,
}

impl ContractAddresses {
    /// Resolve addresses from configuration.
    ///
    /// # Errors
    /// `Configuration` naming the missing or malformed entry. This is the
    /// "no contract deployed for this environment" failure mode and never
    /// touches the network.
    pub fn from_config(config: &ContractsConfig) -> Result<Self, ClientError> {
        Ok(Self {
            erc20: parse_configured("erc20_address", config.erc20_address.as_deref())?,
            erc721: parse_configured("erc721_address", config.erc721_address.as_deref())?,
        })
    }

    /// Validate that both addresses have deployed code on-chain.
    ///
    /// Called once at startup, before any service is built.
    #[instrument(skip_all)]
    pub async fn validate_deployed(&self, client: &dyn ReadClient) -> Result<()> {
        for (name, addr) in [("ERC-20", self.erc20), ("ERC-721", self.erc721)] {
            let code = client
                .code_at(addr)
                .await
                .with_context(|| format!("Failed to query code for {name}"))?;

            if code.is_empty() {
                bail!(
                    "Contract {name} at {addr} has no deployed code — check [contracts] in config.toml"
                );
            }

            info!(contract = name, address = %addr, "Validated on-chain");
        }

        Ok(())
    }
}

fn parse_configured(
    which: &'static str,
    value: Option<&str>,
) -> Result<Address, ClientError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ClientError::Configuration(which))?;

    raw.parse::<Address>()
        .map_err(|_| ClientError::Configuration(which))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(erc20: Option<&str>, erc721: Option<&str>) -> ContractsConfig {
        ContractsConfig {
            erc20_address: erc20.map(str::to_string),
            erc721_address: erc721.map(str::to_string),
        }
    }

    const ADDR_A: &str = "0x1111111111111111111111111111111111111111";
    const ADDR_B: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn test_both_addresses_resolve() {
        let addresses =
            ContractAddresses::from_config(&config(Some(ADDR_A), Some(ADDR_B))).unwrap();
        assert_eq!(addresses.erc20, ADDR_A.parse::<Address>().unwrap());
        assert_eq!(addresses.erc721, ADDR_B.parse::<Address>().unwrap());
    }

    #[test]
    fn test_missing_erc20_is_configuration_error() {
        let err = ContractAddresses::from_config(&config(None, Some(ADDR_B))).unwrap_err();
        assert!(matches!(err, ClientError::Configuration("erc20_address")));
    }

    #[test]
    fn test_empty_erc721_is_configuration_error() {
        let err = ContractAddresses::from_config(&config(Some(ADDR_A), Some("  "))).unwrap_err();
        assert!(matches!(err, ClientError::Configuration("erc721_address")));
    }

    #[test]
    fn test_malformed_address_is_configuration_error() {
        let err =
            ContractAddresses::from_config(&config(Some("0xnothex"), Some(ADDR_B))).unwrap_err();
        assert!(matches!(err, ClientError::Configuration("erc20_address")));
    }
}
