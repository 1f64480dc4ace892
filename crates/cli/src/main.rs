// Path: crates/cli/src/main.rs
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

//! # vitconfig
//!
//! Bootstraps a VIT voting chain from a round's proposals and fund, then
//! runs and supervises its node.

use anyhow::Result;
use clap::Parser;
use vit_cli::Cli;
use vit_types::error::{BootstrapError, ErrorCode};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    vit_telemetry::init_tracing(cli.log_format.into(), "info")?;

    let result = match cli.resolve() {
        Ok(config) => vit_cli::execute(config).await,
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        match e.downcast_ref::<BootstrapError>() {
            Some(err) => tracing::error!(target: "cli", code = err.code(), error = %err, "bootstrap failed"),
            None => tracing::error!(target: "cli", error = %format!("{e:#}"), "vitconfig failed"),
        }
    }
    result
}
