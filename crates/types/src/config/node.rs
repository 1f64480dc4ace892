// Path: crates/types/src/config/node.rs
use super::{split_listen_address, NodeSettings};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// The node's REST interface.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RestConfig {
    /// `IP:PORT` to listen on.
    pub listen: String,
    /// CORS policy.
    pub cors: CorsConfig,
}

/// CORS policy of the REST interface.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// Allowed origins.
    pub allowed_origins: Vec<String>,
    /// Preflight cache lifetime.
    pub max_age_secs: u64,
}

/// The node's P2P interface.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct P2pConfig {
    /// Listen multiaddress, `/ip4/<addr>/tcp/<port>`.
    pub listen_address: String,
    /// Accept peers on private networks.
    pub allow_private_addresses: bool,
}

/// Node log settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level.
    pub level: String,
}

/// Explorer toggle.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ExplorerConfig {
    /// Whether the explorer is enabled.
    pub enabled: bool,
}

/// The node configuration file passed with `--config`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Storage directory, relative to the node's working directory.
    pub storage: String,
    /// Start without bootstrapping from peers.
    pub skip_bootstrap: bool,
    /// REST interface.
    pub rest: RestConfig,
    /// P2P interface.
    pub p2p: P2pConfig,
    /// Logging.
    pub log: LogConfig,
    /// Explorer.
    pub explorer: ExplorerConfig,
}

impl NodeConfig {
    /// Derives the node configuration from the run's node settings.
    pub fn from_settings(settings: &NodeSettings) -> Result<Self, ConfigError> {
        let (p2p_host, p2p_port) = split_listen_address("node", &settings.p2p_listen)?;
        split_listen_address("rest", &settings.rest_listen)?;
        Ok(Self {
            storage: "storage".to_string(),
            skip_bootstrap: true,
            rest: RestConfig {
                listen: settings.rest_listen.clone(),
                cors: CorsConfig {
                    allowed_origins: settings.cors_allowed_origins.clone(),
                    max_age_secs: 0,
                },
            },
            p2p: P2pConfig {
                listen_address: format!("/ip4/{p2p_host}/tcp/{p2p_port}"),
                allow_private_addresses: true,
            },
            log: LogConfig {
                level: settings.log_level.clone(),
            },
            explorer: ExplorerConfig {
                enabled: settings.explorer,
            },
        })
    }
}

/// BFT section of a node secret file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BftSecret {
    /// The leader's bech32 secret key.
    pub signing_key: String,
}

/// A node secret file passed with `--secret`, one per leader.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SecretConfig {
    /// BFT signing key.
    pub bft: BftSecret,
}
