//! Integration Tests - End-to-end Service and Orchestration Testing
//!
//! Exercises the use-case services against mocked chain ports: the real ABI
//! encoding, validation, pre-flight, and reconciliation paths run; only the
//! wire is faked. Uses mockall for trait mocking and tokio::test for async
//! tests.

use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolValue;
use mockall::mock;

use nft_market_client::adapters::chain::abi;
use nft_market_client::adapters::chain::{
    Erc20Reader, Erc20Writer, Erc721Reader, Erc721Writer,
};
use nft_market_client::domain::amount::one_token;
use nft_market_client::domain::error::ClientError;
use nft_market_client::domain::market::TxStage;
use nft_market_client::store::MarketStore;
use nft_market_client::usecases::balance_poller::BalancePoller;
use nft_market_client::usecases::nft_service::NftService;
use nft_market_client::usecases::session::SessionManager;
use nft_market_client::usecases::token_service::TokenService;

// ---- Mock Definitions ----

mock! {
    pub Read {}

    #[async_trait::async_trait]
    impl nft_market_client::ports::chain::ReadClient for Read {
        async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ClientError>;
        async fn code_at(&self, address: Address) -> Result<Bytes, ClientError>;
        async fn chain_id(&self) -> Result<u64, ClientError>;
        async fn is_healthy(&self) -> bool;
    }
}

mock! {
    pub Signer {}

    #[async_trait::async_trait]
    impl nft_market_client::ports::chain::SigningClient for Signer {
        fn account(&self) -> Address;
        async fn send_transaction(&self, to: Address, data: Bytes) -> Result<B256, ClientError>;
        async fn confirm(&self, tx_hash: B256) -> Result<(), ClientError>;
    }
}

// ---- Helpers ----

fn tokens(n: u64) -> U256 {
    U256::from(n) * one_token()
}

fn erc20_addr() -> Address {
    Address::repeat_byte(0x11)
}

fn erc721_addr() -> Address {
    Address::repeat_byte(0x22)
}

fn account_a() -> Address {
    Address::repeat_byte(0xaa)
}

fn account_b() -> Address {
    Address::repeat_byte(0xbb)
}

fn account_c() -> Address {
    Address::repeat_byte(0xcc)
}

fn addr_str(address: Address) -> String {
    format!("{address:?}")
}

fn selector_of(data: &[u8]) -> [u8; 4] {
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&data[..4]);
    sel
}

/// Read mock answering ERC-20 balance and allowance queries.
fn erc20_read_mock(balance: U256, allowance: U256) -> MockRead {
    let mut read = MockRead::new();
    read.expect_call().returning(move |_to, data| {
        let sel = selector_of(&data);
        if sel == abi::selector("balanceOf(address)") {
            Ok(Bytes::from(balance.abi_encode()))
        } else if sel == abi::selector("allowance(address,address)") {
            Ok(Bytes::from(allowance.abi_encode()))
        } else {
            Err(ClientError::ChainCall("unexpected read".into()))
        }
    });
    read
}

fn token_service(
    read: MockRead,
    signer: MockSigner,
    store: Arc<MarketStore>,
) -> TokenService {
    let read: Arc<dyn nft_market_client::ports::chain::ReadClient> = Arc::new(read);
    let signer: Arc<dyn nft_market_client::ports::chain::SigningClient> = Arc::new(signer);
    TokenService::new(
        Arc::new(Erc20Reader::new(read, erc20_addr())),
        Some(Arc::new(Erc20Writer::new(signer, erc20_addr()))),
        store,
    )
}

// ---- ERC-20 transfer_from orchestration ----

#[tokio::test]
async fn test_transfer_from_confirms_and_reconciles_inbound() {
    let read = erc20_read_mock(tokens(200), tokens(150));

    let mut signer = MockSigner::new();
    signer.expect_account().return_const(account_a());
    signer
        .expect_send_transaction()
        .times(1)
        .returning(|_, _| Ok(B256::repeat_byte(0x77)));
    signer.expect_confirm().times(1).returning(|_| Ok(()));

    let store = Arc::new(MarketStore::new());
    store.connect(account_a()).await;
    store.set_token_balance(tokens(10)).await;

    let service = token_service(read, signer, Arc::clone(&store));

    // B -> A: the connected account receives 100 tokens.
    let report = service
        .transfer_from(&addr_str(account_b()), &addr_str(account_a()), "100")
        .await;

    assert!(report.succeeded(), "unexpected report: {report:?}");
    assert_eq!(report.stage, TxStage::Confirmed);
    assert!(report.tx_hash.is_some());
    assert_eq!(store.token_balance().await, tokens(110));
}

#[tokio::test]
async fn test_transfer_from_insufficient_balance_never_reaches_signer() {
    // Balance 50 < required 100; allowance is irrelevant because the
    // balance check aborts first.
    let read = erc20_read_mock(tokens(50), tokens(500));

    let mut signer = MockSigner::new();
    signer.expect_account().times(0);
    signer.expect_send_transaction().times(0);
    signer.expect_confirm().times(0);

    let store = Arc::new(MarketStore::new());
    let service = token_service(read, signer, Arc::clone(&store));

    let report = service
        .transfer_from(&addr_str(account_b()), &addr_str(account_c()), "100")
        .await;

    assert_eq!(report.stage, TxStage::PreconditionFailed);
    assert!(report.message.contains("Insufficient Balance"));
    assert!(report.tx_hash.is_none());
}

#[tokio::test]
async fn test_transfer_from_insufficient_allowance_reports_amounts() {
    // Balance fine, allowance 50 < required 100.
    let read = erc20_read_mock(tokens(500), tokens(50));

    let mut signer = MockSigner::new();
    signer.expect_account().return_const(account_a());
    signer.expect_send_transaction().times(0);
    signer.expect_confirm().times(0);

    let store = Arc::new(MarketStore::new());
    let service = token_service(read, signer, Arc::clone(&store));

    let report = service
        .transfer_from(&addr_str(account_b()), &addr_str(account_c()), "100")
        .await;

    assert_eq!(report.stage, TxStage::PreconditionFailed);
    assert!(report.message.contains("Insufficient Allowance"));
    assert!(report.message.contains("50"));
    assert!(report.message.contains("100"));
}

#[tokio::test]
async fn test_malformed_address_issues_no_calls() {
    let mut read = MockRead::new();
    read.expect_call().times(0);

    let mut signer = MockSigner::new();
    signer.expect_account().times(0);
    signer.expect_send_transaction().times(0);

    let store = Arc::new(MarketStore::new());
    let service = token_service(read, signer, Arc::clone(&store));

    let report = service.transfer("0x1234", "10").await;
    assert_eq!(report.stage, TxStage::ValidationFailed);

    let report = service
        .transfer_from("not-an-address", &addr_str(account_b()), "10")
        .await;
    assert_eq!(report.stage, TxStage::ValidationFailed);
}

#[tokio::test]
async fn test_zero_address_rejected_before_any_call() {
    let mut read = MockRead::new();
    read.expect_call().times(0);

    let mut signer = MockSigner::new();
    signer.expect_send_transaction().times(0);

    let store = Arc::new(MarketStore::new());
    let service = token_service(read, signer, Arc::clone(&store));

    let zero = format!("0x{}", "0".repeat(40));
    let report = service
        .transfer_from(&zero, &addr_str(account_b()), "10")
        .await;

    assert_eq!(report.stage, TxStage::ValidationFailed);
    assert!(report.message.contains("from"));
}

#[tokio::test]
async fn test_transfer_debits_local_balance() {
    let mut read = MockRead::new();
    read.expect_call().times(0);

    let mut signer = MockSigner::new();
    signer
        .expect_send_transaction()
        .times(1)
        .returning(|_, _| Ok(B256::repeat_byte(0x55)));
    signer.expect_confirm().times(1).returning(|_| Ok(()));

    let store = Arc::new(MarketStore::new());
    store.connect(account_a()).await;
    store.set_token_balance(tokens(30)).await;

    let service = token_service(read, signer, Arc::clone(&store));
    let report = service.transfer(&addr_str(account_b()), "12").await;

    assert!(report.succeeded());
    assert_eq!(store.token_balance().await, tokens(18));
}

#[tokio::test]
async fn test_reverted_transfer_reports_reason_and_hash() {
    let mut read = MockRead::new();
    read.expect_call().times(0);

    let hash = B256::repeat_byte(0x99);
    let mut signer = MockSigner::new();
    signer
        .expect_send_transaction()
        .times(1)
        .returning(move |_, _| Ok(hash));
    signer.expect_confirm().times(1).returning(|_| {
        Err(ClientError::ExecutionReverted(
            "ERC20: transfer amount exceeds balance".into(),
        ))
    });

    let store = Arc::new(MarketStore::new());
    store.connect(account_a()).await;
    store.set_token_balance(tokens(30)).await;

    let service = token_service(read, signer, Arc::clone(&store));
    let report = service.transfer(&addr_str(account_b()), "12").await;

    assert_eq!(report.stage, TxStage::Reverted);
    assert_eq!(report.tx_hash, Some(hash));
    assert!(report.message.contains("exceeds balance"));
    // No reconciliation on failure.
    assert_eq!(store.token_balance().await, tokens(30));
}

// ---- NFT mint orchestration ----

/// Read mock for the mint flow: price, nextTokenId, tokenURI.
fn mint_read_mock(price: U256, next_id: u64) -> MockRead {
    let mut read = MockRead::new();
    read.expect_call().returning(move |_to, data| {
        let sel = selector_of(&data);
        if sel == abi::selector("price()") {
            Ok(Bytes::from(price.abi_encode()))
        } else if sel == abi::selector("nextTokenId()") {
            Ok(Bytes::from(U256::from(next_id).abi_encode()))
        } else if sel == abi::selector("tokenURI(uint256)") {
            Ok(Bytes::from(format!("ipfs://collection/{next_id}.json").abi_encode()))
        } else {
            Err(ClientError::ChainCall("unexpected read".into()))
        }
    });
    read
}

struct MintHarness {
    service: NftService,
    store: Arc<MarketStore>,
    sent: Arc<Mutex<Vec<(Address, Bytes)>>>,
}

/// Wire an NftService whose signer records every submission.
///
/// `reject_mint` makes the mint submission (to the ERC-721 contract) fail
/// as a signer rejection while the approval still goes through.
fn mint_harness(price: U256, next_id: u64, reject_mint: bool) -> MintHarness {
    let read: Arc<dyn nft_market_client::ports::chain::ReadClient> =
        Arc::new(mint_read_mock(price, next_id));

    let sent: Arc<Mutex<Vec<(Address, Bytes)>>> = Arc::new(Mutex::new(Vec::new()));
    let mut signer = MockSigner::new();
    signer.expect_account().return_const(account_a());
    {
        let sent = Arc::clone(&sent);
        signer
            .expect_send_transaction()
            .returning(move |to, data| {
                if reject_mint && to == erc721_addr() {
                    return Err(ClientError::UserRejected);
                }
                sent.lock().unwrap().push((to, data));
                Ok(B256::repeat_byte(0x42))
            });
    }
    signer.expect_confirm().returning(|_| Ok(()));
    let signer: Arc<dyn nft_market_client::ports::chain::SigningClient> = Arc::new(signer);

    let store = Arc::new(MarketStore::new());
    let service = NftService::new(
        Arc::new(Erc721Reader::new(Arc::clone(&read), erc721_addr())),
        Some(Arc::new(Erc721Writer::new(Arc::clone(&signer), erc721_addr()))),
        Some(Arc::new(Erc20Writer::new(signer, erc20_addr()))),
        Arc::clone(&store),
    );

    MintHarness {
        service,
        store,
        sent,
    }
}

#[tokio::test]
async fn test_mint_round_trip_owned_set() {
    let harness = mint_harness(tokens(10), 7, false);
    harness.store.connect(account_a()).await;
    harness.store.set_token_balance(tokens(25)).await;

    let report = harness.service.mint().await;
    assert!(report.succeeded(), "unexpected report: {report:?}");

    // The minted id appears exactly once and the price was debited.
    let owned = harness.store.owned_nfts().await;
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].token_id, U256::from(7u64));
    assert_eq!(owned[0].metadata_uri, "ipfs://collection/7.json");
    assert_eq!(harness.store.token_balance().await, tokens(15));

    // Transfer it out; it must disappear from the owned set.
    let report = harness
        .service
        .safe_transfer(&addr_str(account_a()), &addr_str(account_b()), "7")
        .await;
    assert!(report.succeeded());
    assert!(harness.store.owned_nfts().await.is_empty());
}

#[tokio::test]
async fn test_mint_approves_exactly_the_price() {
    // Balance (5) is lower than price (10): the approval must still be for
    // the price — the chain, not the client, decides whether payment fails.
    let harness = mint_harness(tokens(10), 3, false);
    harness.store.connect(account_a()).await;
    harness.store.set_token_balance(tokens(5)).await;

    let _ = harness.service.mint().await;

    let sent = harness.sent.lock().unwrap();
    let (to, data) = &sent[0];
    assert_eq!(*to, erc20_addr());
    let expected = abi::encode_call_with("approve(address,uint256)", (erc721_addr(), tokens(10)));
    assert_eq!(data, &expected);
}

#[tokio::test]
async fn test_mint_rejected_by_user_leaves_balance_unchanged() {
    let harness = mint_harness(tokens(10), 3, true);
    harness.store.connect(account_a()).await;
    harness.store.set_token_balance(tokens(5)).await;

    let report = harness.service.mint().await;

    assert_eq!(report.stage, TxStage::Rejected);
    assert_eq!(harness.store.token_balance().await, tokens(5));
    assert!(harness.store.owned_nfts().await.is_empty());

    // The approval went out (for the price), the mint never did.
    let sent = harness.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, erc20_addr());
}

#[tokio::test]
async fn test_set_price_updates_cache() {
    let harness = mint_harness(tokens(10), 3, false);
    harness.store.connect(account_a()).await;

    let report = harness.service.set_price("42").await;
    assert!(report.succeeded());
    assert_eq!(harness.store.nft_price().await, tokens(42));
}

// ---- Balance poller ----

#[tokio::test]
async fn test_poller_refresh_is_idempotent() {
    let mut read = MockRead::new();
    read.expect_call().times(2).returning(|_to, data| {
        assert_eq!(selector_of(&data), abi::selector("balanceOf(address)"));
        Ok(Bytes::from(tokens(123).abi_encode()))
    });

    let store = Arc::new(MarketStore::new());
    store.connect(account_a()).await;

    let read: Arc<dyn nft_market_client::ports::chain::ReadClient> = Arc::new(read);
    let poller = BalancePoller::new(
        Arc::new(Erc20Reader::new(read, erc20_addr())),
        Arc::clone(&store),
        std::time::Duration::from_secs(10),
    );

    poller.refresh_once().await;
    let first = store.token_balance().await;
    poller.refresh_once().await;
    let second = store.token_balance().await;

    assert_eq!(first, tokens(123));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_poller_skips_when_disconnected() {
    let mut read = MockRead::new();
    read.expect_call().times(0);

    let store = Arc::new(MarketStore::new());
    let read: Arc<dyn nft_market_client::ports::chain::ReadClient> = Arc::new(read);
    let poller = BalancePoller::new(
        Arc::new(Erc20Reader::new(read, erc20_addr())),
        Arc::clone(&store),
        std::time::Duration::from_secs(10),
    );

    poller.refresh_once().await;
    assert_eq!(store.token_balance().await, U256::ZERO);
}

// ---- Session manager ----

/// Read mock answering owner()/balanceOf/price for both contracts.
fn session_read_mock(owner: Address) -> MockRead {
    let mut read = MockRead::new();
    read.expect_call().returning(move |_to, data| {
        let sel = selector_of(&data);
        if sel == abi::selector("owner()") {
            Ok(Bytes::from(owner.abi_encode()))
        } else if sel == abi::selector("balanceOf(address)") {
            Ok(Bytes::from(tokens(9).abi_encode()))
        } else if sel == abi::selector("price()") {
            Ok(Bytes::from(tokens(10).abi_encode()))
        } else {
            Err(ClientError::ChainCall("unexpected read".into()))
        }
    });
    read
}

#[tokio::test]
async fn test_connect_recomputes_ownership_and_hydrates() {
    let read: Arc<dyn nft_market_client::ports::chain::ReadClient> =
        Arc::new(session_read_mock(account_a()));
    let store = Arc::new(MarketStore::new());

    let session = SessionManager::new(
        Arc::new(Erc20Reader::new(Arc::clone(&read), erc20_addr())),
        Arc::new(Erc721Reader::new(read, erc721_addr())),
        Arc::clone(&store),
    );

    session.connect(account_a()).await;
    let state = store.session().await;
    assert!(state.connected);
    assert!(state.is_contract_owner);
    assert_eq!(store.token_balance().await, tokens(9));
    assert_eq!(store.nft_price().await, tokens(10));

    session.disconnect().await;
    let state = store.session().await;
    assert!(!state.connected);
    assert!(!state.is_contract_owner);
    assert_eq!(store.token_balance().await, U256::ZERO);
}

#[tokio::test]
async fn test_connect_as_non_owner() {
    let read: Arc<dyn nft_market_client::ports::chain::ReadClient> =
        Arc::new(session_read_mock(account_b()));
    let store = Arc::new(MarketStore::new());

    let session = SessionManager::new(
        Arc::new(Erc20Reader::new(Arc::clone(&read), erc20_addr())),
        Arc::new(Erc721Reader::new(read, erc721_addr())),
        Arc::clone(&store),
    );

    session.connect(account_a()).await;
    assert!(!store.session().await.is_contract_owner);
}

// ---- Read-only mode ----

#[tokio::test]
async fn test_write_without_signer_fails_cleanly() {
    let mut read = MockRead::new();
    read.expect_call().times(0);

    let read: Arc<dyn nft_market_client::ports::chain::ReadClient> = Arc::new(read);
    let store = Arc::new(MarketStore::new());
    let service = TokenService::new(
        Arc::new(Erc20Reader::new(read, erc20_addr())),
        None,
        store,
    );

    let report = service.transfer(&addr_str(account_b()), "1").await;
    assert_eq!(report.stage, TxStage::SubmissionFailed);
    assert!(report.message.contains("signing account"));
}
