// Path: crates/cli/src/lib.rs
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

//! # VIT Config CLI Library
//!
//! The pieces behind the `vitconfig` binary. This crate holds no bootstrap
//! logic of its own: it merges flags over an optional TOML file, loads the
//! round's JSON inputs, and drives `vit-genesis` and `vit-node` in order.

pub mod args;
pub mod loader;
pub mod run;
pub mod summary;
pub mod workdir;

pub use args::Cli;
pub use run::execute;
