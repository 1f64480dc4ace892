// Path: crates/node/src/lib.rs
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

//! # VIT Node
//!
//! Runs the node binary against a freshly bootstrapped block zero and keeps
//! watch over it until an operator asks the process to stop.

/// Best-effort shutdown through the node's REST interface.
pub mod admin;
/// Writing the node configuration file.
pub mod config;
/// Termination signal delivery.
pub mod signals;
/// The node process state machine and restart policy.
pub mod supervisor;

pub use admin::AdminClient;
pub use signals::{TerminationSignal, TerminationSignals, TerminationSource};
pub use supervisor::{supervise, NodeLaunch, NodeState, NodeSupervisor, RestartPolicy};
