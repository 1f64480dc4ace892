// Path: crates/types/src/app/mod.rs
//! Core application-level data structures for a governance round.

/// The `(epoch, slot)` coordinate system used by the ledger.
pub mod chain_time;
/// The governance round record and its persisted vote plan summaries.
pub mod fund;
/// BFT leader key material.
pub mod leader;
/// Proposals, payload types and the proposal arena.
pub mod vote;

pub use chain_time::*;
pub use fund::*;
pub use leader::*;
pub use vote::*;
