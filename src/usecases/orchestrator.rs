//! Transaction Outcome Reporting
//!
//! Every write operation runs the same four-phase protocol (validate →
//! optional pre-flight → submit → confirm) and ends in exactly one terminal
//! stage. This module owns the boundary where internal errors become
//! user-facing reports: stage mapping, message selection, and structured
//! outcome logging. No retries happen here or anywhere downstream — retry
//! is a fresh invocation of the operation.

use alloy::primitives::TxHash;
use tracing::{info, warn};

use crate::domain::error::ClientError;
use crate::domain::market::{TxReport, TxStage};

/// Failure of an orchestrated operation, with the transaction hash when one
/// was obtained before the failure (i.e. the revert case).
#[derive(Debug)]
pub struct OpFailure {
  /// Hash of the submitted transaction, if submission succeeded.
  pub tx_hash: Option<TxHash>,
  /// What went wrong.
  pub error: ClientError,
}

impl OpFailure {
  /// Failure after submission: the hash is known.
  pub fn after_submit(tx_hash: TxHash, error: ClientError) -> Self {
    Self {
      tx_hash: Some(tx_hash),
      error,
    }
  }
}

impl From<ClientError> for OpFailure {
  fn from(error: ClientError) -> Self {
    Self {
      tx_hash: None,
      error,
    }
  }
}

/// Internal result type the service operations produce.
pub type OpResult = Result<TxHash, OpFailure>;

/// Convert an operation outcome into the report handed to the caller.
///
/// Success keeps the operation-specific message; failure maps the error to
/// its terminal stage and renders the human-readable reason (revert reason
/// when available, generic description otherwise — never a raw debug dump).
pub fn report(operation: &'static str, success_message: &str, outcome: OpResult) -> TxReport {
  match outcome {
    Ok(tx_hash) => {
      info!(operation, tx_hash = %tx_hash, "Operation confirmed");
      TxReport {
        operation,
        stage: TxStage::Confirmed,
        tx_hash: Some(tx_hash),
        message: success_message.to_string(),
      }
    }
    Err(failure) => {
      let stage = TxStage::from_error(&failure.error);
      warn!(
        operation,
        stage = %stage,
        error = %failure.error,
        "Operation failed"
      );
      TxReport {
        operation,
        stage,
        tx_hash: failure.tx_hash,
        message: failure.error.user_message(),
      }
    }
  }
}
