//! Chain Adapters - Blockchain Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - RPC provider management and startup chain-id validation
//! - Local-key transaction signing, submission, and confirmation
//! - ABI call encoding for the fixed ERC-20/ERC-721 surface
//! - Typed contract bindings bound to the configured deployments

pub mod abi;
pub mod contracts;
pub mod erc20;
pub mod erc721;
pub mod provider;
pub mod signer;

pub use contracts::ContractAddresses;
pub use erc20::{Erc20Reader, Erc20Writer};
pub use erc721::{Erc721Reader, Erc721Writer};
pub use provider::RpcClient;
pub use signer::RpcSigner;
