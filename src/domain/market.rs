//! Core marketplace domain types.
//!
//! Defines the entities shared across use cases and adapters: the wallet
//! session, read-side contract snapshots, owned NFTs, and the per-operation
//! transaction stage machine.

use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

use super::error::ClientError;

// ────────────────────────────────────────────
// Wallet session
// ────────────────────────────────────────────

/// The connected wallet session.
///
/// `is_contract_owner` is only meaningful while connected; disconnecting
/// always resets it to `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    /// Connected account, if any.
    pub address: Option<Address>,
    /// Whether a wallet is currently connected.
    pub connected: bool,
    /// Whether the connected account owns either contract.
    pub is_contract_owner: bool,
}

impl WalletSession {
    /// Session for a freshly connected account (ownership not yet known).
    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
            connected: true,
            is_contract_owner: false,
        }
    }
}

// ────────────────────────────────────────────
// Read-side snapshots
// ────────────────────────────────────────────

/// Static ERC-20 token metadata plus current supply and owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Token name.
    pub name: String,
    /// Token symbol.
    pub symbol: String,
    /// Token decimals (18 for the payment token).
    pub decimals: u8,
    /// Total supply in smallest units.
    pub total_supply: U256,
    /// Contract owner.
    pub owner: Address,
}

/// ERC-721 collection metadata plus mint parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name.
    pub name: String,
    /// Collection symbol.
    pub symbol: String,
    /// Current mint price in payment-token smallest units.
    pub price: U256,
    /// Number of tokens minted so far.
    pub total_supply: U256,
    /// Token id the next mint will be assigned.
    pub next_token_id: U256,
    /// Address of the ERC-20 payment token.
    pub payment_token: Address,
    /// Contract owner.
    pub owner: Address,
}

/// An NFT owned by the connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedNft {
    /// Unique token id within the collection.
    pub token_id: U256,
    /// Resolved metadata URI; empty when resolution failed.
    pub metadata_uri: String,
}

// ────────────────────────────────────────────
// Transaction stage machine
// ────────────────────────────────────────────

/// Lifecycle stage of a single orchestrated write operation.
///
/// `Idle -> Validating -> (PreflightChecking) -> AwaitingSignature ->
/// Submitted -> Confirmed`. Every failure stage is terminal; retry means a
/// fresh invocation from `Validating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStage {
    /// No operation in progress.
    Idle,
    /// Checking local inputs.
    Validating,
    /// Reading on-chain invariants before signing.
    PreflightChecking,
    /// Waiting for the signer to produce a signed transaction.
    AwaitingSignature,
    /// Accepted by the RPC node, awaiting inclusion.
    Submitted,
    /// Included and executed successfully.
    Confirmed,
    /// Included but reverted on-chain.
    Reverted,
    /// The signer declined the transaction.
    Rejected,
    /// Local input validation failed; nothing was sent.
    ValidationFailed,
    /// A pre-flight read showed the operation cannot succeed.
    PreconditionFailed,
    /// The RPC node rejected the transaction before inclusion.
    SubmissionFailed,
}

impl TxStage {
    /// Whether this stage ends the operation.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Confirmed
                | Self::Reverted
                | Self::Rejected
                | Self::ValidationFailed
                | Self::PreconditionFailed
                | Self::SubmissionFailed
        )
    }

    /// Terminal stage an error maps to.
    pub fn from_error(error: &ClientError) -> Self {
        match error {
            ClientError::Validation { .. } | ClientError::Configuration(_) => {
                Self::ValidationFailed
            }
            ClientError::Precondition(_) => Self::PreconditionFailed,
            ClientError::UserRejected => Self::Rejected,
            ClientError::ExecutionReverted(_) => Self::Reverted,
            ClientError::NoActiveAccount
            | ClientError::Submission(_)
            | ClientError::ChainCall(_) => Self::SubmissionFailed,
        }
    }
}

impl std::fmt::Display for TxStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::PreflightChecking => "preflight-checking",
            Self::AwaitingSignature => "awaiting-signature",
            Self::Submitted => "submitted",
            Self::Confirmed => "confirmed",
            Self::Reverted => "reverted",
            Self::Rejected => "rejected",
            Self::ValidationFailed => "validation-failed",
            Self::PreconditionFailed => "precondition-failed",
            Self::SubmissionFailed => "submission-failed",
        };
        write!(f, "{label}")
    }
}

/// Outcome of one orchestrated operation, reported to the initiating caller.
#[derive(Debug, Clone)]
pub struct TxReport {
    /// Operation name ("transfer", "mint", ...).
    pub operation: &'static str,
    /// Terminal stage the operation reached.
    pub stage: TxStage,
    /// Transaction hash when one was obtained.
    pub tx_hash: Option<TxHash>,
    /// Human-readable outcome message.
    pub message: String,
}

impl TxReport {
    /// Whether the operation confirmed on-chain.
    pub fn succeeded(&self) -> bool {
        self.stage == TxStage::Confirmed
    }
}
