//! Token Service - Orchestrated ERC-20 Operations
//!
//! Drives every payment-token operation through the four-phase protocol:
//! validate inputs, pre-check on-chain invariants where a revert is
//! predictable, submit through the signing client, await confirmation, then
//! reconcile the local store optimistically from the known outcome.
//!
//! The delegated transfer is the one operation with a pre-flight phase:
//! balance and allowance are read before the signer is asked for anything,
//! so a transaction guaranteed to revert never costs the user a signature.
//! The check is best-effort by design — chain state can still move between
//! pre-flight and submission, and nothing re-verifies in between.

use std::sync::Arc;

use alloy::primitives::{Address, U256};

use crate::adapters::chain::{Erc20Reader, Erc20Writer};
use crate::domain::address::{parse_address, parse_participant};
use crate::domain::amount::parse_token_amount;
use crate::domain::error::{ClientError, PreconditionFailure};
use crate::domain::market::{TokenInfo, TxReport};
use crate::store::MarketStore;

use super::orchestrator::{self, OpFailure, OpResult};

/// Orchestrates payment-token reads and writes against the shared store.
pub struct TokenService {
  reader: Arc<Erc20Reader>,
  writer: Option<Arc<Erc20Writer>>,
  store: Arc<MarketStore>,
}

impl TokenService {
  /// `writer` is `None` in read-only mode (no signing account configured).
  pub fn new(
    reader: Arc<Erc20Reader>,
    writer: Option<Arc<Erc20Writer>>,
    store: Arc<MarketStore>,
  ) -> Self {
    Self {
      reader,
      writer,
      store,
    }
  }

  fn writer(&self) -> Result<&Erc20Writer, ClientError> {
    self.writer.as_deref().ok_or(ClientError::NoActiveAccount)
  }

  async fn connected_account(&self) -> Option<Address> {
    let session = self.store.session().await;
    session.address.filter(|_| session.connected)
  }

  // ── Reads ───────────────────────────────────────────────

  /// Joint token metadata snapshot.
  pub async fn token_info(&self) -> Result<TokenInfo, ClientError> {
    self.reader.token_info().await
  }

  /// Balance of an arbitrary address, validated before the read.
  pub async fn balance_of(&self, address: &str) -> Result<U256, ClientError> {
    let address = parse_address("address", address)?;
    self.reader.balance_of(address).await
  }

  /// Allowance granted by `owner` to `spender`.
  pub async fn allowance(&self, owner: &str, spender: &str) -> Result<U256, ClientError> {
    let owner = parse_address("owner", owner)?;
    let spender = parse_address("spender", spender)?;
    self.reader.allowance(owner, spender).await
  }

  // ── Writes ──────────────────────────────────────────────

  /// Send tokens from the connected account.
  pub async fn transfer(&self, to: &str, amount: &str) -> TxReport {
    let outcome = self.try_transfer(to, amount).await;
    orchestrator::report("transfer", "Tokens transferred successfully", outcome)
  }

  async fn try_transfer(&self, to: &str, amount: &str) -> OpResult {
    let to = parse_participant("to", to)?;
    let amount = parse_token_amount("amount", amount)?;
    let writer = self.writer()?;

    let tx_hash = writer.transfer(to, amount).await?;
    writer
      .confirm(tx_hash)
      .await
      .map_err(|e| OpFailure::after_submit(tx_hash, e))?;

    // Sender is always the connected account; a self-transfer nets to zero.
    if let Some(me) = self.connected_account().await {
      if to != me {
        self.store.debit_balance(amount).await;
      }
    }

    Ok(tx_hash)
  }

  /// Authorize `spender` to move up to `amount` of the caller's tokens.
  pub async fn approve(&self, spender: &str, amount: &str) -> TxReport {
    let outcome = self.try_approve(spender, amount).await;
    orchestrator::report("approve", "Approval successful", outcome)
  }

  async fn try_approve(&self, spender: &str, amount: &str) -> OpResult {
    let spender = parse_participant("spender", spender)?;
    let amount = parse_token_amount("amount", amount)?;
    let writer = self.writer()?;

    let tx_hash = writer.approve(spender, amount).await?;
    writer
      .confirm(tx_hash)
      .await
      .map_err(|e| OpFailure::after_submit(tx_hash, e))?;

    Ok(tx_hash)
  }

  /// Move tokens between two other addresses using an existing allowance.
  ///
  /// The only operation with a pre-flight phase: source balance first, then
  /// the caller's allowance, each aborting before any signature request.
  pub async fn transfer_from(&self, from: &str, to: &str, amount: &str) -> TxReport {
    let outcome = self.try_transfer_from(from, to, amount).await;
    orchestrator::report("transfer_from", "Transfer from successful", outcome)
  }

  async fn try_transfer_from(&self, from: &str, to: &str, amount: &str) -> OpResult {
    let from = parse_participant("from", from)?;
    let to = parse_participant("to", to)?;
    let amount = parse_token_amount("amount", amount)?;
    let writer = self.writer()?;

    // Pre-flight: balance before allowance, so the cheaper failure wins.
    let balance = self.reader.balance_of(from).await?;
    if balance < amount {
      return Err(
        ClientError::Precondition(PreconditionFailure::InsufficientBalance {
          available: balance,
          required: amount,
        })
        .into(),
      );
    }

    let caller = writer.account();
    let allowance = self.reader.allowance(from, caller).await?;
    if allowance < amount {
      return Err(
        ClientError::Precondition(PreconditionFailure::InsufficientAllowance {
          available: allowance,
          required: amount,
        })
        .into(),
      );
    }

    let tx_hash = writer.transfer_from(from, to, amount).await?;
    writer
      .confirm(tx_hash)
      .await
      .map_err(|e| OpFailure::after_submit(tx_hash, e))?;

    if let Some(me) = self.connected_account().await {
      if from == me && to != me {
        self.store.debit_balance(amount).await;
      } else if to == me && from != me {
        self.store.credit_balance(amount).await;
      }
    }

    Ok(tx_hash)
  }

  /// Owner-only: mint new tokens directly to a recipient.
  pub async fn mint_and_transfer(&self, to: &str, amount: &str) -> TxReport {
    let outcome = self.try_mint_and_transfer(to, amount).await;
    orchestrator::report(
      "mint_and_transfer",
      "Tokens minted and transferred successfully",
      outcome,
    )
  }

  async fn try_mint_and_transfer(&self, to: &str, amount: &str) -> OpResult {
    let to = parse_participant("to", to)?;
    let amount = parse_token_amount("amount", amount)?;
    let writer = self.writer()?;

    let tx_hash = writer.mint_and_transfer(to, amount).await?;
    writer
      .confirm(tx_hash)
      .await
      .map_err(|e| OpFailure::after_submit(tx_hash, e))?;

    if self.connected_account().await == Some(to) {
      self.store.credit_balance(amount).await;
    }

    Ok(tx_hash)
  }

  /// Owner-only: hand contract admin rights to a new owner.
  pub async fn transfer_ownership(&self, new_owner: &str) -> TxReport {
    let outcome = self.try_transfer_ownership(new_owner).await;
    orchestrator::report(
      "transfer_ownership",
      "Ownership transferred successfully",
      outcome,
    )
  }

  async fn try_transfer_ownership(&self, new_owner: &str) -> OpResult {
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

  /// Owner-only: permanently renounce contract admin rights.
  pub async fn renounce_ownership(&self) -> TxReport {
    let outcome = self.try_renounce_ownership().await;
    orchestrator::report(
      "renounce_ownership",
      "Ownership renounced successfully",
      outcome,
    )
  }

  async fn try_renounce_ownership(&self) -> OpResult {
    let writer = self.writer()?;

    let tx_hash = writer.renounce_ownership().await?;
    writer
      .confirm(tx_hash)
      .await
      .map_err(|e| OpFailure::after_submit(tx_hash, e))?;

    self.store.set_contract_owner(false).await;

    Ok(tx_hash)
  }
}
