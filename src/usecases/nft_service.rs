//! NFT Service - Orchestrated ERC-721 Operations
//!
//! Every collection operation follows the same validate → submit → confirm
//! → reconcile protocol as the token service. Minting is the composite
//! flow: read the current price, approve exactly that amount of payment
//! token to the NFT contract, wait for the approval, then mint — two
//! signatures, two confirmations, one operation from the caller's view.
//!
//! Reconciliation is optimistic: a confirmed mint inserts the pre-read next
//! token id into the owned set and a confirmed transfer-out removes the id,
//! both without re-querying; the refresh broadcast afterwards lets the
//! inventory re-enumerate and correct any lost race.

use std::sync::Arc;

use alloy::primitives::{Address, U256};

use crate::adapters::chain::{Erc20Writer, Erc721Reader, Erc721Writer};
use crate::domain::address::{parse_address, parse_participant};
use crate::domain::amount::{parse_token_amount, parse_token_id};
use crate::domain::error::ClientError;
use crate::domain::market::{CollectionInfo, OwnedNft, TxReport};
use crate::store::MarketStore;

use super::orchestrator::{self, OpFailure, OpResult};

/// Orchestrates NFT collection reads and writes against the shared store.
pub struct NftService {
  reader: Arc<Erc721Reader>,
  writer: Option<Arc<Erc721Writer>>,
  /// Payment-token writer for the approve-price step of minting.
  payment_writer: Option<Arc<Erc20Writer>>,
  store: Arc<MarketStore>,
}

impl NftService {
  /// Writers are `None` in read-only mode (no signing account configured).
  pub fn new(
    reader: Arc<Erc721Reader>,
    writer: Option<Arc<Erc721Writer>>,
    payment_writer: Option<Arc<Erc20Writer>>,
    store: Arc<MarketStore>,
  ) -> Self {
    Self {
      reader,
      writer,
      payment_writer,
      store,
    }
  }

  fn writer(&self) -> Result<&Erc721Writer, ClientError> {
    self.writer.as_deref().ok_or(ClientError::NoActiveAccount)
  }

  fn payment_writer(&self) -> Result<&Erc20Writer, ClientError> {
    self
      .payment_writer
      .as_deref()
      .ok_or(ClientError::NoActiveAccount)
  }

  async fn connected_account(&self) -> Option<Address> {
    let session = self.store.session().await;
    session.address.filter(|_| session.connected)
  }

  // ── Reads ───────────────────────────────────────────────

  /// Joint collection snapshot; also refreshes the cached price.
  pub async fn collection_info(&self) -> Result<CollectionInfo, ClientError> {
    let info = self.reader.collection_info().await?;
    self.store.set_nft_price(info.price).await;
    Ok(info)
  }

  pub async fn balance_of(&self, address: &str) -> Result<U256, ClientError> {
    let address = parse_address("address", address)?;
    self.reader.balance_of(address).await
  }

  pub async fn owner_of(&self, token_id: &str) -> Result<Address, ClientError> {
    let token_id = parse_token_id("token_id", token_id)?;
    self.reader.owner_of(token_id).await
  }

  pub async fn token_uri(&self, token_id: &str) -> Result<String, ClientError> {
    let token_id = parse_token_id("token_id", token_id)?;
    self.reader.token_uri(token_id).await
  }

  pub async fn get_approved(&self, token_id: &str) -> Result<Address, ClientError> {
    let token_id = parse_token_id("token_id", token_id)?;
    self.reader.get_approved(token_id).await
  }

  pub async fn is_approved_for_all(
    &self,
    owner: &str,
    operator: &str,
  ) -> Result<bool, ClientError> {
    let owner = parse_address("owner", owner)?;
    let operator = parse_address("operator", operator)?;
    self.reader.is_approved_for_all(owner, operator).await
  }

  // ── Minting ─────────────────────────────────────────────

  /// Buy an NFT for the connected account: approve the price, then mint.
  pub async fn mint(&self) -> TxReport {
    let outcome = self.try_mint(None).await;
    orchestrator::report("mint", "NFT minted successfully", outcome)
  }

  /// Mint directly to another wallet; the caller still pays.
  pub async fn mint_to(&self, recipient: &str) -> TxReport {
    let outcome = async {
      let recipient = parse_participant("recipient", recipient)?;
      self.try_mint(Some(recipient)).await
    }
    .await;
    orchestrator::report("mint_to", "NFT minted successfully", outcome)
  }

  async fn try_mint(&self, recipient: Option<Address>) -> OpResult {
    let writer = self.writer()?;
    let payment = self.payment_writer()?;

    // Current price governs the approval amount, whatever the local cache
    // says; the read also refreshes that cache.
    let price = self.reader.price().await?;
    self.store.set_nft_price(price).await;

    let approve_hash = payment.approve(self.reader.address(), price).await?;
    payment
      .confirm(approve_hash)
      .await
      .map_err(|e| OpFailure::after_submit(approve_hash, e))?;

    // Read before minting so reconciliation knows the id it will receive.
    let minted_id = self.reader.next_token_id().await?;

    let tx_hash = match recipient {
      None => writer.mint().await?,
      Some(to) => writer.mint_to(to).await?,
    };
    writer
      .confirm(tx_hash)
      .await
      .map_err(|e| OpFailure::after_submit(tx_hash, e))?;

    if let Some(me) = self.connected_account().await {
      self.store.debit_balance(price).await;

      let minted_to_me = recipient.is_none_or(|to| to == me);
      if minted_to_me {
        let metadata_uri = self.reader.token_uri(minted_id).await.unwrap_or_default();
        self
          .store
          .insert_owned(OwnedNft {
            token_id: minted_id,
            metadata_uri,
          })
          .await;
      }
    }

    self.store.request_owned_refresh();
    Ok(tx_hash)
  }

  // ── Transfers and approvals ─────────────────────────────

  pub async fn transfer(&self, from: &str, to: &str, token_id: &str) -> TxReport {
    let outcome = self.try_transfer(from, to, token_id, false).await;
    orchestrator::report("transfer", "NFT transferred successfully", outcome)
  }

  pub async fn safe_transfer(&self, from: &str, to: &str, token_id: &str) -> TxReport {
    let outcome = self.try_transfer(from, to, token_id, true).await;
    orchestrator::report("safe_transfer", "NFT transferred successfully", outcome)
  }

  async fn try_transfer(
    &self,
    from: &str,
    to: &str,
    token_id: &str,
    safe: bool,
  ) -> OpResult {
    let from = parse_participant("from", from)?;
    let to = parse_participant("to", to)?;
    let token_id = parse_token_id("token_id", token_id)?;
    let writer = self.writer()?;

    let tx_hash = if safe {
      writer.safe_transfer_from(from, to, token_id).await?
    } else {
      writer.transfer_from(from, to, token_id).await?
    };
    writer
      .confirm(tx_hash)
      .await
      .map_err(|e| OpFailure::after_submit(tx_hash, e))?;

    if self.connected_account().await == Some(from) {
      self.store.remove_owned(token_id).await;
    }
    self.store.request_owned_refresh();

    Ok(tx_hash)
  }

  /// Allow `to` to transfer one specific token.
  pub async fn approve(&self, to: &str, token_id: &str) -> TxReport {
    let outcome = async {
      let to = parse_participant("to", to)?;
      let token_id = parse_token_id("token_id", token_id)?;
      let writer = self.writer()?;

      let tx_hash = writer.approve(to, token_id).await?;
      writer
        .confirm(tx_hash)
        .await
        .map_err(|e| OpFailure::after_submit(tx_hash, e))?;
      Ok(tx_hash)
    }
    .await;
    orchestrator::report("approve", "Approval successful", outcome)
  }

  /// Grant or revoke an operator over all of the caller's tokens.
  pub async fn set_approval_for_all(&self, operator: &str, approved: bool) -> TxReport {
    let message = if approved {
      "Approval for all granted"
    } else {
      "Approval for all revoked"
    };
    let outcome = async {
      let operator = parse_participant("operator", operator)?;
      let writer = self.writer()?;

      let tx_hash = writer.set_approval_for_all(operator, approved).await?;
      writer
        .confirm(tx_hash)
        .await
        .map_err(|e| OpFailure::after_submit(tx_hash, e))?;
      Ok(tx_hash)
    }
    .await;
    orchestrator::report("set_approval_for_all", message, outcome)
  }

  // ── Owner administration ────────────────────────────────

  /// Owner-only: set the mint price in payment tokens.
  pub async fn set_price(&self, price: &str) -> TxReport {
    let outcome = self.try_set_price(price).await;
    orchestrator::report("set_price", "Price updated successfully", outcome)
  }

  async fn try_set_price(&self, price: &str) -> OpResult {
    let price = parse_token_amount("price", price)?;
    let writer = self.writer()?;

    let tx_hash = writer.set_price(price).await?;
    writer
      .confirm(tx_hash)
      .await
      .map_err(|e| OpFailure::after_submit(tx_hash, e))?;

    // The cached price is stale the moment the owner changes it.
    self.store.set_nft_price(price).await;

    Ok(tx_hash)
  }

  /// Owner-only: set the base path metadata URLs are built from.
  pub async fn set_base_uri(&self, base_uri: &str) -> TxReport {
    let outcome = async {
      if base_uri.trim().is_empty() {
        return Err(ClientError::validation("base_uri", "base URI is required").into());
      }
      let writer = self.writer()?;

      let tx_hash = writer.set_base_uri(base_uri.trim().to_string()).await?;
      writer
        .confirm(tx_hash)
        .await
        .map_err(|e| OpFailure::after_submit(tx_hash, e))?;
      Ok(tx_hash)
    }
    .await;
    let report = orchestrator::report("set_base_uri", "Base URI updated successfully", outcome);
    if report.succeeded() {
      // Stored metadata URIs were derived from the old base.
      self.store.request_owned_refresh();
    }
    report
  }

  /// Owner-only: override the metadata URI of one token.
  pub async fn set_token_uri(&self, token_id: &str, uri: &str) -> TxReport {
    let outcome = async {
      let token_id = parse_token_id("token_id", token_id)?;
      if uri.trim().is_empty() {
        return Err(ClientError::validation("uri", "token URI is required").into());
      }
      let writer = self.writer()?;

      let tx_hash = writer.set_token_uri(token_id, uri.trim().to_string()).await?;
      writer
        .confirm(tx_hash)
        .await
        .map_err(|e| OpFailure::after_submit(tx_hash, e))?;
      Ok(tx_hash)
    }
    .await;
    let report = orchestrator::report("set_token_uri", "Token URI updated successfully", outcome);
    if report.succeeded() {
      self.store.request_owned_refresh();
    }
    report
  }

  /// Owner-only: hand contract admin rights to a new owner.
  pub async fn transfer_ownership(&self, new_owner: &str) -> TxReport {
    let outcome = async {
      let new_owner = parse_participant("new_owner", new_owner)?;
      let writer = self.writer()?;

      let tx_hash = writer.transfer_ownership(new_owner).await?;
      writer
        .confirm(tx_hash)
        .await
        .map_err(|e| OpFailure::after_submit(tx_hash, e))?;

      if self.connected_account().await != Some(new_owner) {
        self.store.set_contract_owner(false).await;
      }
      Ok(tx_hash)
    }
    .await;
    orchestrator::report(
      "transfer_ownership",
      "Ownership transferred successfully",
      outcome,
    )
  }

  /// Owner-only: permanently renounce contract admin rights.
  pub async fn renounce_ownership(&self) -> TxReport {
    let outcome = async {
      let writer = self.writer()?;

      let tx_hash = writer.renounce_ownership().await?;
      writer
        .confirm(tx_hash)
        .await
        .map_err(|e| OpFailure::after_submit(tx_hash, e))?;

      self.store.set_contract_owner(false).await;
      Ok(tx_hash)
    }
    .await;
    orchestrator::report(
      "renounce_ownership",
      "Ownership renounced successfully",
      outcome,
    )
  }
}
