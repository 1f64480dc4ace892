// Path: crates/cli/src/loader.rs
//! Reads the round's inputs from disk.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use vit_genesis::{InitialFund, RoundData};
use vit_telemetry::StageTimer;
use vit_types::app::{Fund, Proposal};
use vit_types::config::PathsConfig;

fn read_json<T: DeserializeOwned>(what: &str, path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {what} from {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {what} in {}", path.display()))
}

/// A JSON array of proposal records.
pub fn load_proposals(path: &Path) -> Result<Vec<Proposal>> {
    read_json("proposals", path)
}

/// A single fund record, or a one-element array holding it.
pub fn load_fund(path: &Path) -> Result<Fund> {
    let value: serde_json::Value = read_json("fund", path)?;
    let record = match value {
        serde_json::Value::Array(items) => {
            let count = items.len();
            let mut items = items.into_iter();
            match (items.next(), count) {
                (Some(only), 1) => only,
                _ => anyhow::bail!("{} must hold exactly one fund, found {count}", path.display()),
            }
        }
        other => other,
    };
    serde_json::from_value(record).with_context(|| format!("parsing fund in {}", path.display()))
}

/// A JSON array of `{address, value}` entries.
pub fn load_legacy_funds(path: &Path) -> Result<Vec<InitialFund>> {
    read_json("legacy funds", path)
}

/// Raw bytes to append to the block zero descriptor; empty files count as absent.
pub fn load_supplementary(path: &Path) -> Result<Option<Vec<u8>>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading genesis supplement {}", path.display()))?;
    Ok((!bytes.is_empty()).then_some(bytes))
}

/// Loads everything named in `paths`.
pub fn load_round(paths: &PathsConfig) -> Result<RoundData> {
    let _timer = StageTimer::new("load_round");
    let proposals = load_proposals(&paths.proposals)?;
    let fund = load_fund(&paths.fund)?;
    let legacy_funds = match &paths.legacy_funds {
        Some(path) => load_legacy_funds(path)?,
        None => Vec::new(),
    };
    let supplementary_genesis = match &paths.supplementary_genesis {
        Some(path) => load_supplementary(path)?,
        None => None,
    };
    tracing::info!(
        target: "cli",
        proposals = proposals.len(),
        fund_id = fund.fund_id,
        legacy_funds = legacy_funds.len(),
        supplement_bytes = supplementary_genesis.as_ref().map_or(0, Vec::len),
        "round data loaded"
    );
    Ok(RoundData {
        proposals,
        fund,
        legacy_funds,
        supplementary_genesis,
    })
}
