// Path: crates/telemetry/src/lib.rs
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

//! # VIT Telemetry
//!
//! Observability for the bootstrapper: structured logging initialization and
//! a scope timer that reports how long each bootstrap stage took.

/// The initialization routine for global structured logging.
pub mod init;
/// A simple RAII timer for measuring the duration of a stage.
pub mod time;

pub use init::{init_tracing, LogFormat};
pub use time::StageTimer;
