//! Signing Client - Local-Key Transaction Submission
//!
//! Implements the `SigningClient` port with an alloy wallet-filled provider.
//! The signing key comes from the `SIGNER_PRIVATE_KEY` environment variable;
//! constructing the signer without one fails with the no-active-account
//! error, mirroring a wallet client that has no connected account.
//!
//! Confirmation polls for the receipt and, on a reverted transaction,
//! replays the call to recover a best-effort `Error(string)` reason.

use std::sync::Arc;
use std::time::Duration;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::config::ChainConfig;
use crate::domain::error::ClientError;
use crate::ports::chain::SigningClient;

use super::abi;

/// Environment variable holding the hex-encoded signing key.
pub const SIGNER_KEY_ENV: &str = "SIGNER_PRIVATE_KEY";

/// How long to wait for inclusion before giving up.
const CONFIRM_TIMEOUT: Duration = Duration::from_secs(120);
/// Receipt polling interval.
const CONFIRM_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Local-key signing client over an alloy wallet provider.
pub struct RpcSigner {
    /// Wallet-filled provider (signs and fills before submission).
    provider: Arc<dyn Provider + Send + Sync>,
    /// The single active signing account.
    account: Address,
}

impl RpcSigner {
    /// Build a signer from `SIGNER_PRIVATE_KEY`.
    ///
    /// # Errors
    /// `NoActiveAccount` when the variable is unset or empty; a validation
    /// error when it is set but not a valid secp256k1 key.
    #[instrument(skip_all)]
    pub fn from_env(config: &ChainConfig) -> Result<Self, ClientError> {
        let key = std::env::var(SIGNER_KEY_ENV)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ClientError::NoActiveAccount)?;

        let signer: PrivateKeySigner = key
            .parse()
            .map_err(|e| ClientError::validation(SIGNER_KEY_ENV, format!("{e}")))?;

        let account = signer.address();
        let wallet = EthereumWallet::from(signer);

        let rpc_client = alloy::rpc::client::RpcClient::new_http(
            config.rpc_url.parse().map_err(|e| {
                ClientError::validation("rpc_url", format!("invalid RPC URL: {e}"))
            })?,
        )
        .boxed();
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .on_client(rpc_client);

        info!(account = %account, "Signing client ready");

        Ok(Self {
            provider: Arc::new(provider),
            account,
        })
    }
}

#[async_trait]
impl SigningClient for RpcSigner {
    fn account(&self) -> Address {
        self.account
    }

    #[instrument(skip(self, data), fields(to = %to))]
    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash, ClientError> {
        let tx = TransactionRequest::default()
            .from(self.account)
            .to(to)
            .input(data.into());

        match self.provider.send_transaction(tx).await {
            Ok(pending) => {
                let hash = *pending.tx_hash();
                info!(tx_hash = %hash, "Transaction submitted");
                Ok(hash)
            }
            Err(e) => Err(classify_send_error(&e.to_string())),
        }
    }

    #[instrument(skip(self), fields(tx_hash = %tx_hash))]
    async fn confirm(&self, tx_hash: TxHash) -> Result<(), ClientError> {
        let deadline = tokio::time::Instant::now() + CONFIRM_TIMEOUT;

        let receipt = loop {
            match self.provider.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => break receipt,
                Ok(None) => {
                    if tokio::time::Instant::now() >= deadline {
                        return Err(ClientError::ChainCall(format!(
                            "transaction {tx_hash} not included within {}s",
                            CONFIRM_TIMEOUT.as_secs()
                        )));
                    }
                    debug!("Receipt not yet available, polling again");
                    tokio::time::sleep(CONFIRM_POLL_INTERVAL).await;
                }
                Err(e) => return Err(ClientError::ChainCall(e.to_string())),
            }
        };

        if receipt.status() {
            info!("Transaction confirmed");
            return Ok(());
        }

        // Included but reverted: replay the call for a best-effort reason.
        let reason = self
            .replayed_revert_reason(tx_hash)
            .await
            .unwrap_or_else(|| "execution reverted".to_string());
        warn!(reason = %reason, "Transaction reverted on-chain");
        Err(ClientError::ExecutionReverted(reason))
    }
}

impl RpcSigner {
    /// Replay the original call and mine its error text for a revert reason.
    ///
    /// Best-effort only: the replay runs against current state, which may
    /// have moved since inclusion.
    async fn replayed_revert_reason(&self, tx_hash: TxHash) -> Option<String> {
        use alloy::consensus::Transaction as _;

        let tx = self
            .provider
            .get_transaction_by_hash(tx_hash)
            .await
            .ok()
            .flatten()?;

        let request = TransactionRequest::default()
            .from(tx.from)
            .to(tx.to()?)
            .input(tx.input().clone().into());

        match self.provider.call(&request).await {
            // A replay that now succeeds tells us nothing useful.
            Ok(_) => None,
            Err(e) => revert_reason_from_rpc_text(&e.to_string()),
        }
    }
}

/// Classify a pre-inclusion submission failure.
///
/// EIP-1193 signers surface rejection as error code 4001; anything else is
/// an RPC-level submission failure, enriched with a decoded revert reason
/// when the node echoed one back from estimation.
fn classify_send_error(message: &str) -> ClientError {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("4001")
        || lowered.contains("user denied")
        || lowered.contains("user rejected")
        || lowered.contains("rejected by user")
    {
        return ClientError::UserRejected;
    }

    match revert_reason_from_rpc_text(message) {
        Some(reason) => ClientError::Submission(reason),
        None => ClientError::Submission(message.to_string()),
    }
}

/// Pull a revert reason out of raw RPC error text.
///
/// Tries the `Error(string)` hex payload first, then the common
/// "execution reverted: <reason>" prose form.
fn revert_reason_from_rpc_text(message: &str) -> Option<String> {
    if let Some(start) = message.find("0x08c379a0") {
        let hex: String = message[start + 2..]
            .chars()
            .take_while(|c| c.is_ascii_hexdigit())
            .collect();
        if let Ok(raw) = alloy::primitives::hex::decode(&hex) {
            if let Some(reason) = abi::decode_revert_reason(&raw) {
                return Some(reason);
            }
        }
    }

    let marker = "execution reverted: ";
    if let Some(start) = message.find(marker) {
        let rest = &message[start + marker.len()..];
        let reason = rest
            .split(['\n', '"'])
            .next()
            .unwrap_or(rest)
            .trim()
            .trim_end_matches(|c: char| c == ',' || c == '}' || c == ')');
        if !reason.is_empty() {
            return Some(reason.to_string());
        }
    }

    None
}
