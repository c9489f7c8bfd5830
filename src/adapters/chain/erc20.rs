//! ERC-20 Payment Token Bindings
//!
//! Typed read and write handles bound to the payment-token deployment.
//! One method per on-chain function; calls are encoded through the shared
//! `abi` helpers and dispatched through the chain ports, so the same
//! bindings run against the real RPC adapters and against test mocks.

use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};

use crate::domain::error::ClientError;
use crate::domain::market::TokenInfo;
use crate::ports::chain::{ReadClient, SigningClient};

use super::abi;

/// Read-only handle for the payment token.
pub struct Erc20Reader {
    client: Arc<dyn ReadClient>,
    address: Address,
}

impl Erc20Reader {
    /// Bind the reader to the deployed contract.
    pub fn new(client: Arc<dyn ReadClient>, address: Address) -> Self {
        Self { client, address }
    }

    /// Deployment address this reader is bound to.
    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn name(&self) -> Result<String, ClientError> {
        let data = self.client.call(self.address, abi::encode_call("name()")).await?;
        abi::decode_string("name", &data)
    }

    pub async fn symbol(&self) -> Result<String, ClientError> {
        let data = self.client.call(self.address, abi::encode_call("symbol()")).await?;
        abi::decode_string("symbol", &data)
    }

    pub async fn decimals(&self) -> Result<u8, ClientError> {
        let data = self
            .client
            .call(self.address, abi::encode_call("decimals()"))
            .await?;
        abi::decode_u8("decimals", &data)
    }

    pub async fn total_supply(&self) -> Result<U256, ClientError> {
        let data = self
            .client
            .call(self.address, abi::encode_call("totalSupply()"))
            .await?;
        abi::decode_u256("totalSupply", &data)
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, ClientError> {
        let data = self
            .client
            .call(
                self.address,
                abi::encode_call_with("balanceOf(address)", (account,)),
            )
            .await?;
        abi::decode_u256("balanceOf", &data)
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ClientError> {
        let data = self
            .client
            .call(
                self.address,
                abi::encode_call_with("allowance(address,address)", (owner, spender)),
            )
            .await?;
        abi::decode_u256("allowance", &data)
    }

    pub async fn owner(&self) -> Result<Address, ClientError> {
        let data = self
            .client
            .call(self.address, abi::encode_call("owner()"))
            .await?;
        abi::decode_address("owner", &data)
    }

    /// Joint snapshot of the static token metadata plus supply and owner.
    pub async fn token_info(&self) -> Result<TokenInfo, ClientError> {
        let (name, symbol, decimals, total_supply, owner) = tokio::try_join!(
            self.name(),
            self.symbol(),
            self.decimals(),
            self.total_supply(),
            self.owner(),
        )?;

        Ok(TokenInfo {
            name,
            symbol,
            decimals,
            total_supply,
            owner,
        })
    }
}

/// Signing handle for the payment token.
pub struct Erc20Writer {
    client: Arc<dyn SigningClient>,
    address: Address,
}

impl Erc20Writer {
    /// Bind the writer to the deployed contract.
    pub fn new(client: Arc<dyn SigningClient>, address: Address) -> Self {
        Self { client, address }
    }

    /// The account submitting these writes.
    pub fn account(&self) -> Address {
        self.client.account()
    }

    /// Await inclusion of a previously submitted transaction.
    pub async fn confirm(&self, tx_hash: TxHash) -> Result<(), ClientError> {
        self.client.confirm(tx_hash).await
    }

    pub async fn transfer(&self, to: Address, amount: U256) -> Result<TxHash, ClientError> {
        self.client
            .send_transaction(
                self.address,
                abi::encode_call_with("transfer(address,uint256)", (to, amount)),
            )
            .await
    }

    pub async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, ClientError> {
        self.client
            .send_transaction(
                self.address,
                abi::encode_call_with("approve(address,uint256)", (spender, amount)),
            )
            .await
    }

    pub async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, ClientError> {
        self.client
            .send_transaction(
                self.address,
                abi::encode_call_with(
                    "transferFrom(address,address,uint256)",
                    (from, to, amount),
                ),
            )
            .await
    }

    /// Owner-only mint-and-send; the contract enforces the restriction.
    pub async fn mint_and_transfer(
        &self,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, ClientError> {
        self.client
            .send_transaction(
                self.address,
                abi::encode_call_with("mintAndTransfer(address,uint256)", (to, amount)),
            )
            .await
    }

    pub async fn transfer_ownership(&self, new_owner: Address) -> Result<TxHash, ClientError> {
        self.client
            .send_transaction(
                self.address,
                abi::encode_call_with("transferOwnership(address)", (new_owner,)),
            )
            .await
    }

    pub async fn renounce_ownership(&self) -> Result<TxHash, ClientError> {
        self.client
            .send_transaction(self.address, abi::encode_call("renounceOwnership()"))
            .await
    }
}
