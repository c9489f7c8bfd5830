//! Error taxonomy for orchestrated contract operations.
//!
//! Every failure a user-initiated operation can hit maps to exactly one
//! variant here, so callers can distinguish "bad input" from "chain said no"
//! without parsing message strings. Raw RPC errors never cross the use-case
//! boundary — they are wrapped into one of these variants at the adapter.

use thiserror::Error;

use super::amount::format_token_amount;
use alloy::primitives::U256;

/// A pre-flight invariant that failed before any signing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionFailure {
    /// The source address holds fewer tokens than the operation moves.
    InsufficientBalance {
        /// Balance currently held by the source address.
        available: U256,
        /// Amount the operation requires.
        required: U256,
    },
    /// The caller's allowance from the source address is too small.
    InsufficientAllowance {
        /// Allowance currently granted to the caller.
        available: U256,
        /// Amount the operation requires.
        required: U256,
    },
}

impl std::fmt::Display for PreconditionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientBalance { available, required } => write!(
                f,
                "Insufficient Balance: the source address holds {} tokens, {} required",
                format_token_amount(*available),
                format_token_amount(*required),
            ),
            Self::InsufficientAllowance { available, required } => write!(
                f,
                "Insufficient Allowance: current allowance is {} tokens, {} required",
                format_token_amount(*available),
                format_token_amount(*required),
            ),
        }
    }
}

/// Unified error type for all client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A local input failed validation. No network call was made.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Name of the offending input field.
        field: &'static str,
        /// Human-readable description of what was wrong.
        reason: String,
    },

    /// A required deployment address is missing from configuration.
    ///
    /// Distinguishes "no contract deployed for this environment" from any
    /// on-chain failure.
    #[error("no deployment address configured for {0}")]
    Configuration(&'static str),

    /// A pre-flight read showed the operation cannot succeed.
    #[error("{0}")]
    Precondition(PreconditionFailure),

    /// The signing client has no active account.
    #[error("no active signing account — set SIGNER_PRIVATE_KEY to enable writes")]
    NoActiveAccount,

    /// The signer declined to sign the transaction.
    #[error("transaction rejected by the signer")]
    UserRejected,

    /// The RPC node rejected the transaction before inclusion.
    #[error("transaction submission failed: {0}")]
    Submission(String),

    /// The transaction was included but reverted on-chain.
    #[error("transaction reverted: {0}")]
    ExecutionReverted(String),

    /// A read-only chain call failed (RPC unreachable, decode failure, ...).
    #[error("chain call failed: {0}")]
    ChainCall(String),
}

impl ClientError {
    /// Shorthand for a validation failure on a named field.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Human-readable message for user-facing reporting.
    ///
    /// Falls back through: specific reason -> generic description. Never a
    /// raw stack trace or debug dump.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { field, reason } => format!("Invalid {field}: {reason}"),
            Self::Configuration(which) => {
                format!("Missing contract address for {which} — check configuration")
            }
            Self::Precondition(failure) => failure.to_string(),
            Self::NoActiveAccount => {
                "No signing account available. Configure a signer to submit transactions."
                    .to_string()
            }
            Self::UserRejected => "Transaction was rejected in the signer.".to_string(),
            Self::Submission(reason) => format!("Transaction was not accepted: {reason}"),
            Self::ExecutionReverted(reason) => format!("Transaction reverted: {reason}"),
            Self::ChainCall(reason) => format!("Chain read failed: {reason}"),
        }
    }
}
