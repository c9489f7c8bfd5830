//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies. All network I/O in this client is chain JSON-RPC,
//! so the only adapter family is `chain`.

pub mod chain;
