// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # VIT Types
//!
//! This crate is the foundational library for the VIT genesis bootstrapper,
//! containing the vote data model, configuration objects and error types.
//!
//! ## Architectural Role
//!
//! As the base crate, `vit-types` has minimal dependencies and is itself a
//! dependency for every other crate in the workspace. This structure prevents
//! circular dependencies and provides a stable, canonical definition for shared
//! types like `ChainTime`, `Proposal`, `Fund` and the error enums.

/// The protocol ceiling on the number of proposals a single vote plan may carry.
pub const VOTE_PLAN_PROPOSALS_MAX: usize = 255;

/// The amount credited to every BFT leader account in block zero.
pub const LEADER_FUND_VALUE: u64 = 10_000_000_001;

/// A top-level, crate-wide `Result` type alias with a default error type.
pub type Result<T, E = crate::error::BootstrapError> = std::result::Result<T, E>;

/// Vote data structures: `ChainTime`, `Proposal`, `VotePlanSummary`, `Fund`, `Leader`.
pub mod app;
/// Shared configuration structures (`BootstrapConfig`, node artifacts).
pub mod config;
/// A unified set of all error types used across the workspace.
pub mod error;
/// A prelude containing useful extension traits like `OptionExt`.
pub mod prelude;
