//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use-case layer requires from
//! the outside world. Adapters implement these traits; integration tests
//! mock them.
//!
//! Port categories:
//! - `ReadClient`: read-only chain access (eth_call, code, chain id)
//! - `SigningClient`: transaction signing, submission, and confirmation

pub mod chain;

pub use chain::{ReadClient, SigningClient};
