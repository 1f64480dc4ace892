// Path: crates/node/src/config.rs
use std::path::{Path, PathBuf};
use vit_types::config::{NodeConfig, NodeSettings};
use vit_types::error::BootstrapError;
use vit_types::prelude::IoResultExt;

/// File name of the node configuration, passed with `--config`.
pub const NODE_CONFIG_FILE: &str = "node-config.yaml";

/// Derives the node configuration from `settings` and writes it into
/// `working_dir`.
pub fn write_node_config(settings: &NodeSettings, working_dir: &Path) -> Result<PathBuf, BootstrapError> {
    let config = NodeConfig::from_settings(settings)?;
    let yaml = serde_yaml::to_string(&config)
        .map_err(|e| BootstrapError::Encode(format!("node config: {e}")))?;
    let path = working_dir.join(NODE_CONFIG_FILE);
    std::fs::write(&path, yaml).at_path(&path)?;
    tracing::debug!(target: "supervisor", path = %path.display(), "node config written");
    Ok(path)
}
