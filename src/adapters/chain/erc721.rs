//! ERC-721 NFT Contract Bindings
//!
//! Typed read and write handles for the payment-gated NFT collection:
//! the standard ERC-721 surface, the enumeration extension used to rebuild
//! the owned set, and the collection's mint/price/URI administration.

use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};

use crate::domain::error::ClientError;
use crate::domain::market::CollectionInfo;
use crate::ports::chain::{ReadClient, SigningClient};

use super::abi;

/// Read-only handle for the NFT collection.
pub struct Erc721Reader {
    client: Arc<dyn ReadClient>,
    address: Address,
}

impl Erc721Reader {
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

    pub async fn balance_of(&self, owner: Address) -> Result<U256, ClientError> {
        let data = self
            .client
            .call(
                self.address,
                abi::encode_call_with("balanceOf(address)", (owner,)),
            )
            .await?;
        abi::decode_u256("balanceOf", &data)
    }

    pub async fn owner_of(&self, token_id: U256) -> Result<Address, ClientError> {
        let data = self
            .client
            .call(
                self.address,
                abi::encode_call_with("ownerOf(uint256)", (token_id,)),
            )
            .await?;
        abi::decode_address("ownerOf", &data)
    }

    pub async fn token_uri(&self, token_id: U256) -> Result<String, ClientError> {
        let data = self
            .client
            .call(
                self.address,
                abi::encode_call_with("tokenURI(uint256)", (token_id,)),
            )
            .await?;
        abi::decode_string("tokenURI", &data)
    }

    pub async fn get_approved(&self, token_id: U256) -> Result<Address, ClientError> {
        let data = self
            .client
            .call(
                self.address,
                abi::encode_call_with("getApproved(uint256)", (token_id,)),
            )
            .await?;
        abi::decode_address("getApproved", &data)
    }

    pub async fn is_approved_for_all(
        &self,
        owner: Address,
        operator: Address,
    ) -> Result<bool, ClientError> {
        let data = self
            .client
            .call(
                self.address,
                abi::encode_call_with("isApprovedForAll(address,address)", (owner, operator)),
            )
            .await?;
        abi::decode_bool("isApprovedForAll", &data)
    }

    /// Current mint price in payment-token smallest units.
    pub async fn price(&self) -> Result<U256, ClientError> {
        let data = self.client.call(self.address, abi::encode_call("price()")).await?;
        abi::decode_u256("price", &data)
    }

    pub async fn total_supply(&self) -> Result<U256, ClientError> {
        let data = self
            .client
            .call(self.address, abi::encode_call("totalSupply()"))
            .await?;
        abi::decode_u256("totalSupply", &data)
    }

    /// Token id the next mint will be assigned.
    pub async fn next_token_id(&self) -> Result<U256, ClientError> {
        let data = self
            .client
            .call(self.address, abi::encode_call("nextTokenId()"))
            .await?;
        abi::decode_u256("nextTokenId", &data)
    }

    /// Address of the ERC-20 token mints are paid in.
    pub async fn payment_token(&self) -> Result<Address, ClientError> {
        let data = self
            .client
            .call(self.address, abi::encode_call("paymentToken()"))
            .await?;
        abi::decode_address("paymentToken", &data)
    }

    pub async fn owner(&self) -> Result<Address, ClientError> {
        let data = self
            .client
            .call(self.address, abi::encode_call("owner()"))
            .await?;
        abi::decode_address("owner", &data)
    }

    /// Enumeration extension: the owner's token id at a given index.
    pub async fn token_of_owner_by_index(
        &self,
        owner: Address,
        index: U256,
    ) -> Result<U256, ClientError> {
        let data = self
            .client
            .call(
                self.address,
                abi::encode_call_with("tokenOfOwnerByIndex(address,uint256)", (owner, index)),
            )
            .await?;
        abi::decode_u256("tokenOfOwnerByIndex", &data)
    }

    /// Joint snapshot of collection metadata and mint parameters.
    pub async fn collection_info(&self) -> Result<CollectionInfo, ClientError> {
        let (name, symbol, price, total_supply, next_token_id, payment_token, owner) = tokio::try_join!(
            self.name(),
            self.symbol(),
            self.price(),
            self.total_supply(),
            self.next_token_id(),
            self.payment_token(),
            self.owner(),
        )?;

        Ok(CollectionInfo {
            name,
            symbol,
            price,
            total_supply,
            next_token_id,
            payment_token,
            owner,
        })
    }
}

/// Signing handle for the NFT collection.
pub struct Erc721Writer {
    client: Arc<dyn SigningClient>,
    address: Address,
}

impl Erc721Writer {
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

    /// Mint to the caller; payment is pulled via the prior ERC-20 approval.
    pub async fn mint(&self) -> Result<TxHash, ClientError> {
        self.client
            .send_transaction(self.address, abi::encode_call("mint()"))
            .await
    }

    /// Mint to another recipient; the caller still pays.
    pub async fn mint_to(&self, to: Address) -> Result<TxHash, ClientError> {
        self.client
            .send_transaction(
                self.address,
                abi::encode_call_with("mintTo(address)", (to,)),
            )
            .await
    }

    pub async fn approve(&self, to: Address, token_id: U256) -> Result<TxHash, ClientError> {
        self.client
            .send_transaction(
                self.address,
                abi::encode_call_with("approve(address,uint256)", (to, token_id)),
            )
            .await
    }

    pub async fn set_approval_for_all(
        &self,
        operator: Address,
        approved: bool,
    ) -> Result<TxHash, ClientError> {
        self.client
            .send_transaction(
                self.address,
                abi::encode_call_with("setApprovalForAll(address,bool)", (operator, approved)),
            )
            .await
    }

    pub async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<TxHash, ClientError> {
        self.client
            .send_transaction(
                self.address,
                abi::encode_call_with(
                    "transferFrom(address,address,uint256)",
                    (from, to, token_id),
                ),
            )
            .await
    }

    pub async fn safe_transfer_from(
        &self,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<TxHash, ClientError> {
        self.client
            .send_transaction(
                self.address,
                abi::encode_call_with(
                    "safeTransferFrom(address,address,uint256)",
                    (from, to, token_id),
                ),
            )
            .await
    }

    pub async fn set_price(&self, price: U256) -> Result<TxHash, ClientError> {
        self.client
            .send_transaction(
                self.address,
                abi::encode_call_with("setPrice(uint256)", (price,)),
            )
            .await
    }

    pub async fn set_base_uri(&self, base_uri: String) -> Result<TxHash, ClientError> {
        self.client
            .send_transaction(
                self.address,
                abi::encode_call_with("setBaseURI(string)", (base_uri,)),
            )
            .await
    }

    pub async fn set_token_uri(
        &self,
        token_id: U256,
        uri: String,
    ) -> Result<TxHash, ClientError> {
        self.client
            .send_transaction(
                self.address,
                abi::encode_call_with("setTokenURI(uint256,string)", (token_id, uri)),
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
