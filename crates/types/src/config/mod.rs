// Path: crates/types/src/config/mod.rs

//! Shared configuration structures for the bootstrap run and the node it starts.
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration artifacts consumed by the node binary.
pub mod node;
pub use node::*;

/// Address discrimination of the chain being bootstrapped.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Discrimination {
    /// Production addresses.
    #[default]
    Production,
    /// Test addresses.
    Test,
}

/// Where collected fees are sent.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeesGoTo {
    /// Fees feed the rewards pot.
    #[default]
    Rewards,
    /// Fees feed the treasury.
    Treasury,
}

/// The user-supplied schedule of the vote, before validation.
///
/// Instants are RFC3339 strings and durations use the `1h30m` notation, so a
/// TOML file and command-line flags share one representation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Block zero date; "now" when unset.
    pub genesis_time: Option<String>,
    /// Slot length, 1s to 255s.
    pub slot_duration: String,
    /// Epoch length; a multiple of the slot duration.
    pub epoch_duration: String,
    /// Vote start; the genesis time when unset.
    pub vote_start: Option<String>,
    /// Vote end; `vote_start + vote_duration` when unset.
    pub vote_end: Option<String>,
    /// Committee end; `vote_end + committee_duration` when unset.
    pub committee_end: Option<String>,
    /// Voting period length, used when `vote_end` is unset.
    pub vote_duration: String,
    /// Committee period length, used when `committee_end` is unset.
    pub committee_duration: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            genesis_time: None,
            slot_duration: "2s".to_string(),
            epoch_duration: "24h".to_string(),
            vote_start: None,
            vote_end: None,
            committee_end: None,
            vote_duration: "144h".to_string(),
            committee_duration: "24h".to_string(),
        }
    }
}

/// Linear fee settings written into block zero.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FeeConfig {
    /// Constant fee per transaction.
    pub constant: u64,
    /// Fee per input/output.
    pub coefficient: u64,
    /// Default certificate fee.
    pub certificate: u64,
    /// Pool registration certificate fee.
    pub certificate_pool_registration: u64,
    /// Stake delegation certificate fee.
    pub certificate_stake_delegation: u64,
    /// Vote plan certificate fee.
    pub certificate_vote_plan: u64,
    /// Vote cast certificate fee.
    pub certificate_vote_cast: u64,
    /// Destination of collected fees.
    pub fees_go_to: FeesGoTo,
}

/// How the BFT leaders are obtained.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LeaderConfig {
    /// Number of leaders to generate when no key files are given.
    pub count: u32,
    /// Existing secret key files; when non-empty, `count` is ignored.
    pub secret_key_files: Vec<PathBuf>,
}

impl Default for LeaderConfig {
    fn default() -> Self {
        Self {
            count: 1,
            secret_key_files: Vec::new(),
        }
    }
}

/// Listen addresses and runtime behaviour of the supervised node.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct NodeSettings {
    /// Where the proxy collaborator listens, `IP:PORT`.
    pub proxy_listen: String,
    /// Where the node's REST API listens, `IP:PORT`.
    pub rest_listen: String,
    /// Where the node's P2P interface listens, `IP:PORT`.
    pub p2p_listen: String,
    /// Origins allowed by the node's REST CORS policy.
    pub cors_allowed_origins: Vec<String>,
    /// Enable the node's explorer.
    pub explorer: bool,
    /// Node log level.
    pub log_level: String,
    /// Launch the node once block zero is ready.
    pub start_node: bool,
    /// After the node stops, keep waiting so it can be restarted by hand.
    pub allow_restart: bool,
    /// On termination, ask a manually restarted node to shut down.
    pub shutdown_on_exit: bool,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            proxy_listen: "0.0.0.0:8000".to_string(),
            rest_listen: "0.0.0.0:8001".to_string(),
            p2p_listen: "127.0.0.1:9001".to_string(),
            cors_allowed_origins: [
                "https://127.0.0.1",
                "http://127.0.0.1",
                "http://127.0.0.1:8000",
                "http://127.0.0.1:8001",
                "https://localhost",
                "http://localhost",
                "http://localhost:8000",
                "http://localhost:8001",
                "http://0.0.0.0:8000",
                "http://0.0.0.0:8001",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            explorer: false,
            log_level: "info".to_string(),
            start_node: true,
            allow_restart: true,
            shutdown_on_exit: true,
        }
    }
}

/// Input and output locations.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// JSON file with the round's proposals.
    pub proposals: PathBuf,
    /// JSON file with the round's fund record.
    pub fund: PathBuf,
    /// Optional JSON file with legacy `{address, value}` funds.
    pub legacy_funds: Option<PathBuf>,
    /// Optional YAML appended verbatim to the block zero descriptor.
    pub supplementary_genesis: Option<PathBuf>,
    /// When set, diagnostic dumps are written here.
    pub dump_raw: Option<PathBuf>,
    /// Parent of the run's working directory; the executable's directory when unset.
    pub working_dir_parent: Option<PathBuf>,
    /// Local directory searched for tool binaries before `PATH`.
    pub tool_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            proposals: PathBuf::from("assets").join("proposals.json"),
            fund: PathBuf::from("assets").join("fund.json"),
            legacy_funds: None,
            supplementary_genesis: None,
            dump_raw: None,
            working_dir_parent: None,
            tool_dir: PathBuf::from("jor_bins"),
        }
    }
}

/// The complete configuration of one bootstrap run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BootstrapConfig {
    /// The vote's temporal schedule.
    pub schedule: ScheduleConfig,
    /// BFT leader provisioning.
    pub leaders: LeaderConfig,
    /// Committee member public keys.
    pub committee: Vec<String>,
    /// Embed the signed vote plan certificates into block zero.
    pub embed_vote_plans: bool,
    /// Address discrimination.
    pub discrimination: Discrimination,
    /// Fee settings.
    pub fees: FeeConfig,
    /// Node settings.
    pub node: NodeSettings,
    /// Input and output locations.
    pub paths: PathsConfig,
    /// Display format for formatted instants (`time` format description); RFC3339 when unset.
    pub time_format: Option<String>,
    /// Deadline applied to every external tool call, in seconds.
    pub external_call_timeout_secs: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            schedule: ScheduleConfig::default(),
            leaders: LeaderConfig::default(),
            committee: Vec::new(),
            embed_vote_plans: true,
            discrimination: Discrimination::default(),
            fees: FeeConfig::default(),
            node: NodeSettings::default(),
            paths: PathsConfig::default(),
            time_format: None,
            external_call_timeout_secs: 120,
        }
    }
}

impl BootstrapConfig {
    /// Checks the settings that do not depend on the schedule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paths.proposals.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath("proposals file"));
        }
        if self.paths.fund.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath("fund file"));
        }
        if self.leaders.secret_key_files.is_empty() && self.leaders.count == 0 {
            return Err(ConfigError::ZeroLeaders);
        }
        split_listen_address("proxy", &self.node.proxy_listen)?;
        split_listen_address("rest", &self.node.rest_listen)?;
        split_listen_address("node", &self.node.p2p_listen)?;
        Ok(())
    }

    /// The number of leaders this run will carry.
    pub fn leader_count(&self) -> usize {
        if self.leaders.secret_key_files.is_empty() {
            self.leaders.count as usize
        } else {
            self.leaders.secret_key_files.len()
        }
    }
}

/// Splits an `IP:PORT` listen address.
pub fn split_listen_address(field: &'static str, value: &str) -> Result<(String, u16), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::MissingAddress(field));
    }
    let invalid = || ConfigError::InvalidAddress {
        field,
        value: value.to_string(),
    };
    let (host, port) = value.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() {
        return Err(invalid());
    }
    let port = port.parse::<u16>().map_err(|_| invalid())?;
    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg: BootstrapConfig = toml::from_str(
            r#"
            committee = ["aa", "bb"]

            [schedule]
            slot_duration = "4s"

            [node]
            rest_listen = "127.0.0.1:18001"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.schedule.slot_duration, "4s");
        assert_eq!(cfg.schedule.epoch_duration, "24h");
        assert_eq!(cfg.node.rest_listen, "127.0.0.1:18001");
        assert_eq!(cfg.node.proxy_listen, "0.0.0.0:8000");
        assert_eq!(cfg.committee.len(), 2);
        assert!(cfg.embed_vote_plans);
        assert_eq!(cfg.leader_count(), 1);
    }

    #[test]
    fn test_validate_rejects_zero_leaders() {
        let mut cfg = BootstrapConfig::default();
        cfg.leaders.count = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroLeaders));

        cfg.leaders.secret_key_files = vec![PathBuf::from("0_bft_secret.key")];
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.leader_count(), 1);
    }

    #[test]
    fn test_validate_rejects_missing_paths_and_addresses() {
        let mut cfg = BootstrapConfig::default();
        cfg.paths.fund = PathBuf::new();
        assert_eq!(cfg.validate(), Err(ConfigError::MissingPath("fund file")));

        let mut cfg = BootstrapConfig::default();
        cfg.node.p2p_listen = "localhost".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidAddress { field: "node", .. })
        ));
    }

    #[test]
    fn test_split_listen_address() {
        assert_eq!(
            split_listen_address("node", "127.0.0.1:9001").unwrap(),
            ("127.0.0.1".to_string(), 9001)
        );
        assert_eq!(
            split_listen_address("rest", ""),
            Err(ConfigError::MissingAddress("rest"))
        );
        assert!(split_listen_address("rest", ":80").is_err());
        assert!(split_listen_address("rest", "1.2.3.4:http").is_err());
    }
}
