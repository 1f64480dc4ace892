// Path: crates/genesis/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # VIT Genesis
//!
//! The bootstrap engine: it turns a round's proposals and schedule into a
//! signed, encoded block zero.
//!
//! Data flows strictly forward. The [`schedule`] is validated first, the
//! proposals are [`partition`]ed into vote plans, the [`certificate`]
//! pipeline signs each plan through the [`collaborator`] traits, and the
//! [`builder`] assembles block zero. [`bootstrap::run`] drives the whole
//! sequence over a [`context::BootstrapContext`].

pub mod bootstrap;
pub mod builder;
pub mod certificate;
pub mod collaborator;
pub mod context;
pub mod dump;
pub mod duration;
pub mod jcli;
pub mod leaders;
pub mod partition;
pub mod schedule;

pub use bootstrap::{run, BootstrapOutput, Collaborators, RoundData, ValidatedConfig};
pub use builder::{GenesisBlock, GenesisBuilder, InitialFund};
pub use collaborator::{CallPolicy, KeyAlgorithm, Ledger, Signer};
pub use context::{BootstrapContext, FinalizedStore};
pub use jcli::Jcli;
pub use schedule::{DisplayFormat, Schedule, ScheduleParams};
