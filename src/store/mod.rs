//! Local State Store - Observable In-process Market State
//!
//! Single source of truth for the wallet session, payment-token balance,
//! NFT price, and the owned-NFT set. Writers are the orchestrating services
//! and the balance poller; readers subscribe to typed change events over a
//! broadcast channel. Nothing persists across restarts — the store is
//! rebuilt from chain reads on every (re)connect.
//!
//! There are no transactional guarantees across fields: an observer may see
//! the balance change before the price within one reconciliation step. No
//! invariant spans two fields, so that ordering is acceptable.

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::domain::market::{OwnedNft, WalletSession};

/// Typed change notifications emitted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// Wallet connected, disconnected, or ownership flag recomputed.
    SessionChanged,
    /// Payment-token balance updated.
    BalanceChanged,
    /// Cached NFT price replaced.
    PriceChanged,
    /// Owned-NFT set mutated (insert/remove/replace).
    OwnedNftsChanged,
    /// A service asks the inventory to re-enumerate the owned set.
    RefreshOwnedNfts,
}

#[derive(Debug, Default)]
struct MarketState {
    session: WalletSession,
    token_balance: U256,
    nft_price: U256,
    owned_nfts: Vec<OwnedNft>,
    balance_refreshed_at: Option<DateTime<Utc>>,
}

/// Observable in-process market state.
///
/// Constructed once in `main` and shared `Arc`-wise into every service —
/// no ambient singletons.
pub struct MarketStore {
    state: RwLock<MarketState>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for MarketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketStore {
    /// Event channel capacity; slow subscribers observe `Lagged` and
    /// resynchronize from a fresh snapshot.
    const EVENT_CAPACITY: usize = 64;

    pub fn new() -> Self {
        let (events, _) = broadcast::channel(Self::EVENT_CAPACITY);
        Self {
            state: RwLock::new(MarketState::default()),
            events,
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: StoreEvent) {
        // No subscribers is fine (e.g. in unit tests).
        let _ = self.events.send(event);
    }

    // ── Session ─────────────────────────────────────────────

    pub async fn session(&self) -> WalletSession {
        self.state.read().await.session.clone()
    }

    /// Record a freshly connected account. Balance and owned set start
    /// empty until the first reads land.
    pub async fn connect(&self, address: Address) {
        {
            let mut state = self.state.write().await;
            state.session = WalletSession::connected(address);
            state.token_balance = U256::ZERO;
            state.owned_nfts.clear();
            state.balance_refreshed_at = None;
        }
        debug!(address = %address, "Session connected");
        self.publish(StoreEvent::SessionChanged);
    }

    /// Clear the session and everything derived from it.
    pub async fn disconnect(&self) {
        {
            let mut state = self.state.write().await;
            state.session = WalletSession::default();
            state.token_balance = U256::ZERO;
            state.owned_nfts.clear();
            state.balance_refreshed_at = None;
        }
        debug!("Session disconnected");
        self.publish(StoreEvent::SessionChanged);
    }

    /// Record whether the connected account owns a contract.
    ///
    /// Meaningless (forced false) while disconnected.
    pub async fn set_contract_owner(&self, is_owner: bool) {
        {
            let mut state = self.state.write().await;
            state.session.is_contract_owner = state.session.connected && is_owner;
        }
        self.publish(StoreEvent::SessionChanged);
    }

    // ── Token balance ───────────────────────────────────────

    pub async fn token_balance(&self) -> U256 {
        self.state.read().await.token_balance
    }

    pub async fn balance_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.balance_refreshed_at
    }

    /// Replace the balance with a freshly read value.
    pub async fn set_token_balance(&self, balance: U256) {
        {
            let mut state = self.state.write().await;
            state.token_balance = balance;
            state.balance_refreshed_at = Some(Utc::now());
        }
        self.publish(StoreEvent::BalanceChanged);
    }

    /// Optimistically credit the balance after a confirmed inbound transfer.
    pub async fn credit_balance(&self, amount: U256) {
        {
            let mut state = self.state.write().await;
            state.token_balance = state.token_balance.saturating_add(amount);
        }
        self.publish(StoreEvent::BalanceChanged);
    }

    /// Optimistically debit the balance after a confirmed outbound transfer.
    ///
    /// Saturating: the balance invariant (never negative) holds even if the
    /// optimistic view briefly disagrees with the chain.
    pub async fn debit_balance(&self, amount: U256) {
        {
            let mut state = self.state.write().await;
            state.token_balance = state.token_balance.saturating_sub(amount);
        }
        self.publish(StoreEvent::BalanceChanged);
    }

    // ── NFT price ───────────────────────────────────────────

    pub async fn nft_price(&self) -> U256 {
        self.state.read().await.nft_price
    }

    pub async fn set_nft_price(&self, price: U256) {
        {
            let mut state = self.state.write().await;
            state.nft_price = price;
        }
        self.publish(StoreEvent::PriceChanged);
    }

    // ── Owned NFTs ──────────────────────────────────────────

    pub async fn owned_nfts(&self) -> Vec<OwnedNft> {
        self.state.read().await.owned_nfts.clone()
    }

    /// Replace the owned set with a freshly enumerated one (deduplicated).
    pub async fn replace_owned(&self, nfts: Vec<OwnedNft>) {
        {
            let mut state = self.state.write().await;
            state.owned_nfts.clear();
            for nft in nfts {
                if !state.owned_nfts.iter().any(|n| n.token_id == nft.token_id) {
                    state.owned_nfts.push(nft);
                }
            }
        }
        self.publish(StoreEvent::OwnedNftsChanged);
    }

    /// Optimistically insert a newly minted token (exactly once).
    pub async fn insert_owned(&self, nft: OwnedNft) {
        {
            let mut state = self.state.write().await;
            if state.owned_nfts.iter().any(|n| n.token_id == nft.token_id) {
                return;
            }
            state.owned_nfts.push(nft);
        }
        self.publish(StoreEvent::OwnedNftsChanged);
    }

    /// Optimistically remove a transferred-out token.
    pub async fn remove_owned(&self, token_id: U256) {
        let removed = {
            let mut state = self.state.write().await;
            let before = state.owned_nfts.len();
            state.owned_nfts.retain(|n| n.token_id != token_id);
            state.owned_nfts.len() != before
        };
        if removed {
            self.publish(StoreEvent::OwnedNftsChanged);
        }
    }

    /// Ask the inventory task to re-enumerate the owned set from chain.
    pub fn request_owned_refresh(&self) {
        self.publish(StoreEvent::RefreshOwnedNfts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn nft(id: u64) -> OwnedNft {
        OwnedNft {
            token_id: U256::from(id),
            metadata_uri: format!("ipfs://meta/{id}.json"),
        }
    }

    #[tokio::test]
    async fn test_connect_then_disconnect_clears_session() {
        let store = MarketStore::new();
        store.connect(addr(0xaa)).await;
        store.set_contract_owner(true).await;
        store.set_token_balance(U256::from(7u64)).await;
        store.insert_owned(nft(1)).await;

        store.disconnect().await;
        let session = store.session().await;
        assert!(!session.connected);
        assert!(!session.is_contract_owner);
        assert!(session.address.is_none());
        assert_eq!(store.token_balance().await, U256::ZERO);
        assert!(store.owned_nfts().await.is_empty());
    }

    #[tokio::test]
    async fn test_owner_flag_forced_false_when_disconnected() {
        let store = MarketStore::new();
        store.set_contract_owner(true).await;
        assert!(!store.session().await.is_contract_owner);
    }

    #[tokio::test]
    async fn test_insert_owned_is_idempotent() {
        let store = MarketStore::new();
        store.insert_owned(nft(5)).await;
        store.insert_owned(nft(5)).await;
        assert_eq!(store.owned_nfts().await.len(), 1);
    }

    #[tokio::test]
    async fn test_replace_owned_deduplicates() {
        let store = MarketStore::new();
        store
            .replace_owned(vec![nft(1), nft(2), nft(1)])
            .await;
        assert_eq!(store.owned_nfts().await.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_owned() {
        let store = MarketStore::new();
        store.replace_owned(vec![nft(1), nft(2)]).await;
        store.remove_owned(U256::from(1u64)).await;
        let owned = store.owned_nfts().await;
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].token_id, U256::from(2u64));
    }

    #[tokio::test]
    async fn test_debit_saturates_at_zero() {
        let store = MarketStore::new();
        store.set_token_balance(U256::from(5u64)).await;
        store.debit_balance(U256::from(9u64)).await;
        assert_eq!(store.token_balance().await, U256::ZERO);
    }

    #[tokio::test]
    async fn test_events_are_published() {
        let store = MarketStore::new();
        let mut rx = store.subscribe();

        store.set_token_balance(U256::from(1u64)).await;
        assert_eq!(rx.recv().await.unwrap(), StoreEvent::BalanceChanged);

        store.request_owned_refresh();
        assert_eq!(rx.recv().await.unwrap(), StoreEvent::RefreshOwnedNfts);
    }
}
