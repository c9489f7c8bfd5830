//! Owned-NFT Inventory - Enumeration of the Connected Wallet's Tokens
//!
//! Rebuilds the owned-NFT set whenever the session changes or a service
//! broadcasts the refresh signal after a mint or transfer. Enumeration
//! walks `tokenOfOwnerByIndex` over the owner's balance, then resolves all
//! metadata URIs jointly; an index that fails to resolve is skipped and a
//! URI that fails to resolve degrades to an empty string.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use futures_util::future::join_all;
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::adapters::chain::Erc721Reader;
use crate::domain::error::ClientError;
use crate::domain::market::OwnedNft;
use crate::store::{MarketStore, StoreEvent};

/// Keeps the store's owned-NFT set in sync with chain state.
pub struct NftInventory {
  reader: Arc<Erc721Reader>,
  store: Arc<MarketStore>,
}

impl NftInventory {
  pub fn new(reader: Arc<Erc721Reader>, store: Arc<MarketStore>) -> Self {
    Self { reader, store }
  }

  /// React to store events until the shutdown broadcast fires.
  pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
    let mut events = self.store.subscribe();

    loop {
      tokio::select! {
        biased;
        _ = shutdown.recv() => {
          info!("NFT inventory stopped");
          break;
        }
        event = events.recv() => match event {
          Ok(StoreEvent::SessionChanged | StoreEvent::RefreshOwnedNfts) => {
            self.reload().await;
          }
          Ok(_) => {}
          // Missed events mean unknown state; a full reload resynchronizes.
          Err(broadcast::error::RecvError::Lagged(skipped)) => {
            warn!(skipped, "Inventory lagged behind store events");
            self.reload().await;
          }
          Err(broadcast::error::RecvError::Closed) => break,
        }
      }
    }
  }

  /// Rebuild the owned set for the connected address, if any.
  ///
  /// Enumeration failures leave the previous set in place — passive display
  /// state degrades rather than aborting.
  pub async fn reload(&self) {
    let session = self.store.session().await;
    let Some(address) = session.address.filter(|_| session.connected) else {
      return;
    };

    match self.enumerate(address).await {
      Ok(nfts) => {
        info!(owned = nfts.len(), "Owned-NFT set rebuilt");
        self.store.replace_owned(nfts).await;
      }
      Err(e) => warn!(error = %e, "Failed to enumerate owned NFTs"),
    }
  }

  #[instrument(skip(self), fields(owner = %owner))]
  async fn enumerate(&self, owner: Address) -> Result<Vec<OwnedNft>, ClientError> {
    let balance = self.reader.balance_of(owner).await?;
    let count = u64::try_from(balance).unwrap_or(u64::MAX);

    if count == 0 {
      return Ok(Vec::new());
    }

    let mut token_ids = Vec::new();
    for index in 0..count {
      match self
        .reader
        .token_of_owner_by_index(owner, U256::from(index))
        .await
      {
        Ok(token_id) => token_ids.push(token_id),
        Err(e) => warn!(index, error = %e, "Skipping unresolvable token index"),
      }
    }

    // URIs resolve jointly; a failure yields an empty URI, not a lost token.
    let uris = join_all(token_ids.iter().map(|id| self.reader.token_uri(*id))).await;

    Ok(
      token_ids
        .into_iter()
        .zip(uris)
        .map(|(token_id, uri)| OwnedNft {
          token_id,
          metadata_uri: uri.unwrap_or_default(),
        })
        .collect(),
    )
  }
}
