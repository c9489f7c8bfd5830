//! Chain Client Ports - Uniform Read and Sign Interfaces
//!
//! Normalizes the two underlying connectivity abstractions (a read-oriented
//! RPC client and a signing wallet client) into request-dispatch traits the
//! contract bindings consume. Adapters implement these with alloy-rs;
//! tests implement them with mocks.

use alloy::primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;

use crate::domain::error::ClientError;

/// Read-only chain access.
///
/// One method per JSON-RPC concern the client needs; all failures surface
/// as `ClientError::ChainCall`.
#[async_trait]
pub trait ReadClient: Send + Sync + 'static {
  /// Execute an `eth_call` against a contract and return the raw result.
  async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ClientError>;

  /// Fetch the deployed code at an address (empty for EOAs).
  async fn code_at(&self, address: Address) -> Result<Bytes, ClientError>;

  /// Chain id of the connected network.
  async fn chain_id(&self) -> Result<u64, ClientError>;

  /// Whether the RPC connection answers a lightweight request.
  async fn is_healthy(&self) -> bool;
}

/// Signing chain access bound to exactly one active account.
///
/// Construction of an implementation must fail when no account is
/// available, so holding a `SigningClient` implies `account()` is real.
#[async_trait]
pub trait SigningClient: Send + Sync + 'static {
  /// The active signing account.
  fn account(&self) -> Address;

  /// Sign and submit a transaction, returning its hash.
  ///
  /// # Errors
  /// `UserRejected` when the signer declines, `Submission` when the RPC
  /// node refuses the transaction before inclusion.
  async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash, ClientError>;

  /// Await inclusion of a submitted transaction.
  ///
  /// # Errors
  /// `ExecutionReverted` (with a best-effort reason) when the transaction
  /// was included but failed, `ChainCall` when inclusion cannot be observed.
  async fn confirm(&self, tx_hash: TxHash) -> Result<(), ClientError>;
}
