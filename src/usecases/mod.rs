//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain validation with the chain ports to implement the
//! client's workflows. Each use case is a self-contained operation family.
//!
//! Use cases:
//! - `TokenService`: ERC-20 reads and orchestrated writes
//! - `NftService`: ERC-721 reads, minting, transfers, administration
//! - `SessionManager`: wallet connect/disconnect lifecycle
//! - `BalancePoller`: periodic token-balance refresh
//! - `NftInventory`: owned-NFT set enumeration

pub mod balance_poller;
pub mod nft_inventory;
pub mod nft_service;
pub mod orchestrator;
pub mod session;
pub mod token_service;
