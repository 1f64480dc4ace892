// Path: crates/cli/src/args.rs
//! Command-line flags. Every flag is optional and only overrides the value
//! loaded from `--config` (or the built-in default) when given.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use vit_telemetry::LogFormat;
use vit_types::config::{BootstrapConfig, Discrimination};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DiscriminationArg {
    Production,
    Test,
}

impl From<DiscriminationArg> for Discrimination {
    fn from(value: DiscriminationArg) -> Self {
        match value {
            DiscriminationArg::Production => Discrimination::Production,
            DiscriminationArg::Test => Discrimination::Test,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[default]
    Json,
    Text,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Text => LogFormat::Text,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "vitconfig",
    version,
    about = "Bootstraps a VIT voting chain and supervises its node.",
    long_about = "vitconfig validates the vote schedule, certifies the round's vote plans, assembles block zero and starts a BFT node on it."
)]
pub struct Cli {
    /// TOML file with the full run configuration; flags override it.
    #[clap(long, env = "VIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output encoding.
    #[clap(long, value_enum, default_value = "json", env = "VIT_LOG_FORMAT")]
    pub log_format: LogFormatArg,

    // --- Schedule ---
    /// Block zero date, RFC3339. Defaults to now.
    #[clap(long, env = "VIT_GENESIS_TIME")]
    pub genesis_time: Option<String>,
    /// Slot duration, e.g. `2s`.
    #[clap(long, env = "VIT_SLOT_DURATION")]
    pub slot_duration: Option<String>,
    /// Epoch duration, e.g. `24h`.
    #[clap(long, env = "VIT_EPOCH_DURATION")]
    pub epoch_duration: Option<String>,
    /// Vote start, RFC3339. Defaults to the genesis time.
    #[clap(long, env = "VIT_VOTE_START")]
    pub vote_start: Option<String>,
    /// Vote end, RFC3339. Defaults to vote start plus the vote duration.
    #[clap(long, env = "VIT_VOTE_END")]
    pub vote_end: Option<String>,
    /// Committee end, RFC3339. Defaults to vote end plus the committee duration.
    #[clap(long, env = "VIT_COMMITTEE_END")]
    pub committee_end: Option<String>,
    /// Voting period length.
    #[clap(long, env = "VIT_VOTE_DURATION")]
    pub vote_duration: Option<String>,
    /// Committee period length.
    #[clap(long, env = "VIT_COMMITTEE_DURATION")]
    pub committee_duration: Option<String>,
    /// Output format of displayed instants (`time` format description).
    #[clap(long, env = "VIT_TIME_FORMAT")]
    pub time_format: Option<String>,

    // --- Chain ---
    /// Number of BFT leaders to generate.
    #[clap(long, env = "VIT_LEADERS")]
    pub leaders: Option<u32>,
    /// Existing leader secret key file; repeat for several leaders.
    #[clap(long = "leader-key", env = "VIT_LEADER_KEYS", value_delimiter = ',')]
    pub leader_keys: Vec<PathBuf>,
    /// Committee member public key; repeat or comma-separate.
    #[clap(long = "committee", env = "VIT_COMMITTEE", value_delimiter = ',')]
    pub committee: Vec<String>,
    /// Embed the signed vote plan certificates into block zero.
    #[clap(long, action = ArgAction::Set, env = "VIT_EMBED_VOTE_PLANS")]
    pub embed_vote_plans: Option<bool>,
    /// Address discrimination.
    #[clap(long, value_enum, env = "VIT_DISCRIMINATION")]
    pub discrimination: Option<DiscriminationArg>,
    /// Deadline for each external tool call, in seconds.
    #[clap(long, env = "VIT_CALL_TIMEOUT")]
    pub call_timeout: Option<u64>,

    // --- Inputs and outputs ---
    /// JSON file with the round's proposals.
    #[clap(long, env = "VIT_PROPOSALS")]
    pub proposals: Option<PathBuf>,
    /// JSON file with the round's fund.
    #[clap(long, env = "VIT_FUND")]
    pub fund: Option<PathBuf>,
    /// JSON file with legacy `{address, value}` funds.
    #[clap(long, env = "VIT_LEGACY_FUNDS")]
    pub legacy_funds: Option<PathBuf>,
    /// YAML appended verbatim to the block zero descriptor.
    #[clap(long, env = "VIT_GENESIS_SUPPLEMENT")]
    pub genesis_supplement: Option<PathBuf>,
    /// Write vote plan descriptors, certificates and CSV tables here.
    #[clap(long, env = "VIT_DUMP_RAW")]
    pub dump_raw: Option<PathBuf>,
    /// Parent of the run's working directory. Defaults to the executable's directory.
    #[clap(long, env = "VIT_WORKING_DIR_PARENT")]
    pub working_dir_parent: Option<PathBuf>,
    /// Directory searched for `jcli` and `jormungandr` before `PATH`.
    #[clap(long, env = "VIT_TOOL_DIR")]
    pub tool_dir: Option<PathBuf>,

    // --- Node ---
    /// Proxy listen address, `IP:PORT`.
    #[clap(long, env = "VIT_PROXY")]
    pub proxy: Option<String>,
    /// Node REST listen address, `IP:PORT`.
    #[clap(long, env = "VIT_REST")]
    pub rest: Option<String>,
    /// Node P2P listen address, `IP:PORT`.
    #[clap(long, env = "VIT_NODE")]
    pub node: Option<String>,
    /// Allowed CORS origin; repeat or comma-separate. Replaces the defaults.
    #[clap(long = "cors", env = "VIT_CORS", value_delimiter = ',')]
    pub cors: Vec<String>,
    /// Enable the node explorer.
    #[clap(long, action = ArgAction::Set, env = "VIT_EXPLORER")]
    pub explorer: Option<bool>,
    /// Node log level.
    #[clap(long, env = "VIT_NODE_LOG_LEVEL")]
    pub node_log_level: Option<String>,
    /// Launch the node after block zero is written.
    #[clap(long, action = ArgAction::Set, env = "VIT_START_NODE")]
    pub start_node: Option<bool>,
    /// Keep running after the node stops so it can be restarted by hand.
    #[clap(long, action = ArgAction::Set, env = "VIT_ALLOW_RESTART")]
    pub allow_restart: Option<bool>,
    /// On SIGINT/SIGTERM, ask the node to shut down over REST.
    #[clap(long, action = ArgAction::Set, env = "VIT_SHUTDOWN_ON_EXIT")]
    pub shutdown_on_exit: Option<bool>,
}

impl Cli {
    /// Loads `--config` if given, then applies the flags on top.
    pub fn resolve(self) -> Result<BootstrapConfig> {
        let base = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
            }
            None => BootstrapConfig::default(),
        };
        Ok(self.apply(base))
    }

    /// Overrides the fields of `cfg` that were given on the command line.
    pub fn apply(self, mut cfg: BootstrapConfig) -> BootstrapConfig {
        let schedule = &mut cfg.schedule;
        if self.genesis_time.is_some() {
            schedule.genesis_time = self.genesis_time;
        }
        if let Some(v) = self.slot_duration {
            schedule.slot_duration = v;
        }
        if let Some(v) = self.epoch_duration {
            schedule.epoch_duration = v;
        }
        if self.vote_start.is_some() {
            schedule.vote_start = self.vote_start;
        }
        if self.vote_end.is_some() {
            schedule.vote_end = self.vote_end;
        }
        if self.committee_end.is_some() {
            schedule.committee_end = self.committee_end;
        }
        if let Some(v) = self.vote_duration {
            schedule.vote_duration = v;
        }
        if let Some(v) = self.committee_duration {
            schedule.committee_duration = v;
        }
        if self.time_format.is_some() {
            cfg.time_format = self.time_format;
        }

        if let Some(v) = self.leaders {
            cfg.leaders.count = v;
        }
        if !self.leader_keys.is_empty() {
            cfg.leaders.secret_key_files = self.leader_keys;
        }
        if !self.committee.is_empty() {
            cfg.committee = self.committee;
        }
        if let Some(v) = self.embed_vote_plans {
            cfg.embed_vote_plans = v;
        }
        if let Some(v) = self.discrimination {
            cfg.discrimination = v.into();
        }
        if let Some(v) = self.call_timeout {
            cfg.external_call_timeout_secs = v;
        }

        let paths = &mut cfg.paths;
        if let Some(v) = self.proposals {
            paths.proposals = v;
        }
        if let Some(v) = self.fund {
            paths.fund = v;
        }
        if self.legacy_funds.is_some() {
            paths.legacy_funds = self.legacy_funds;
        }
        if self.genesis_supplement.is_some() {
            paths.supplementary_genesis = self.genesis_supplement;
        }
        if self.dump_raw.is_some() {
            paths.dump_raw = self.dump_raw;
        }
        if self.working_dir_parent.is_some() {
            paths.working_dir_parent = self.working_dir_parent;
        }
        if let Some(v) = self.tool_dir {
            paths.tool_dir = v;
        }

        let node = &mut cfg.node;
        if let Some(v) = self.proxy {
            node.proxy_listen = v;
        }
        if let Some(v) = self.rest {
            node.rest_listen = v;
        }
        if let Some(v) = self.node {
            node.p2p_listen = v;
        }
        if !self.cors.is_empty() {
            node.cors_allowed_origins = self.cors;
        }
        if let Some(v) = self.explorer {
            node.explorer = v;
        }
        if let Some(v) = self.node_log_level {
            node.log_level = v;
        }
        if let Some(v) = self.start_node {
            node.start_node = v;
        }
        if let Some(v) = self.allow_restart {
            node.allow_restart = v;
        }
        if let Some(v) = self.shutdown_on_exit {
            node.shutdown_on_exit = v;
        }
        cfg
    }
}
