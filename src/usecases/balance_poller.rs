//! Balance Poller - Periodic Token Balance Refresh
//!
//! Re-derives the payment-token balance from a read call on a fixed
//! interval while a wallet is connected. This is the one ongoing background
//! task of the client: each tick is a single short read with no in-flight
//! overlap, and the loop exits deterministically on the shutdown broadcast.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::adapters::chain::Erc20Reader;
use crate::store::MarketStore;

/// Periodically refreshes the store's token balance while connected.
pub struct BalancePoller {
  reader: Arc<Erc20Reader>,
  store: Arc<MarketStore>,
  interval: Duration,
}

impl BalancePoller {
  pub fn new(reader: Arc<Erc20Reader>, store: Arc<MarketStore>, interval: Duration) -> Self {
    Self {
      reader,
      store,
      interval,
    }
  }

  /// Run until the shutdown broadcast fires.
  pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
    let mut ticker = tokio::time::interval(self.interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
      tokio::select! {
        biased;
        _ = shutdown.recv() => {
          info!("Balance poller stopped");
          break;
        }
        _ = ticker.tick() => {
          self.refresh_once().await;
        }
      }
    }
  }

  /// One polling tick: read the balance for the connected address, if any.
  ///
  /// Idempotent — two immediate refreshes with unchanged chain state store
  /// the same value twice. Read failures keep the previous value.
  pub async fn refresh_once(&self) {
    let session = self.store.session().await;
    let Some(address) = session.address.filter(|_| session.connected) else {
      return;
    };

    match self.reader.balance_of(address).await {
      Ok(balance) => {
        debug!(balance = %balance, "Balance refreshed");
        self.store.set_token_balance(balance).await;
      }
      Err(e) => warn!(error = %e, "Balance poll failed"),
    }
  }
}
