//! Session Manager - Wallet Connect / Disconnect Lifecycle
//!
//! Owns the transitions of the wallet session: on connect it recomputes the
//! contract-ownership flag from both deployments, loads the initial balance
//! and price, and asks the inventory to enumerate the owned set; on
//! disconnect it clears everything derived from the address.
//!
//! All reads here feed passive display state, so failures degrade to
//! warnings instead of aborting the connect.

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::{info, instrument, warn};

use crate::adapters::chain::{Erc20Reader, Erc721Reader};
use crate::store::MarketStore;

/// Drives session state in the store from chain reads.
pub struct SessionManager {
  erc20: Arc<Erc20Reader>,
  erc721: Arc<Erc721Reader>,
  store: Arc<MarketStore>,
}

impl SessionManager {
  pub fn new(
    erc20: Arc<Erc20Reader>,
    erc721: Arc<Erc721Reader>,
    store: Arc<MarketStore>,
  ) -> Self {
    Self {
      erc20,
      erc721,
      store,
    }
  }

  /// Establish a session for `address` and hydrate derived state.
  #[instrument(skip(self), fields(address = %address))]
  pub async fn connect(&self, address: Address) {
    self.store.connect(address).await;
    self.refresh_ownership(address).await;

    match self.erc20.balance_of(address).await {
      Ok(balance) => self.store.set_token_balance(balance).await,
      Err(e) => warn!(error = %e, "Initial balance read failed"),
    }

    match self.erc721.price().await {
      Ok(price) => self.store.set_nft_price(price).await,
      Err(e) => warn!(error = %e, "Initial price read failed"),
    }

    self.store.request_owned_refresh();
    info!("Session established");
  }

  /// Tear the session down; the store drops all derived state.
  pub async fn disconnect(&self) {
    self.store.disconnect().await;
    info!("Session closed");
  }

  /// Recompute whether the address owns either contract.
  ///
  /// Owner reads that fail count as "not owner" — the flag only ever
  /// unlocks administrative operations the chain enforces anyway.
  pub async fn refresh_ownership(&self, address: Address) {
    let (token_owner, collection_owner) =
      tokio::join!(self.erc20.owner(), self.erc721.owner());

    let is_owner = token_owner.map(|o| o == address).unwrap_or(false)
      || collection_owner.map(|o| o == address).unwrap_or(false);

    self.store.set_contract_owner(is_owner).await;
  }
}
