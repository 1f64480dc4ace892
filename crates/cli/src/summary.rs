// Path: crates/cli/src/summary.rs
use std::fmt;
use std::path::PathBuf;
use vit_genesis::BootstrapOutput;
use vit_types::config::NodeSettings;

/// An external binary used by the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInfo {
    pub path: PathBuf,
    pub version: String,
}

/// What an operator needs to know about a finished bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub os: &'static str,
    pub arch: &'static str,
    pub jcli: ToolInfo,
    pub node: ToolInfo,
    pub working_dir: PathBuf,
    pub genesis_hash: String,
    pub committee: usize,
    pub vote_plans: usize,
    pub proposals: usize,
    pub proxy_listen: String,
    pub rest_listen: String,
    pub p2p_listen: String,
}

impl RunSummary {
    /// Collects the summary of a finished bootstrap.
    pub fn new(
        jcli: ToolInfo,
        node: ToolInfo,
        working_dir: PathBuf,
        output: &BootstrapOutput,
        settings: &NodeSettings,
    ) -> Self {
        Self {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            jcli,
            node,
            working_dir,
            genesis_hash: output.store.genesis().hash.clone(),
            committee: output.committee_count,
            vote_plans: output.store.vote_plans().len(),
            proposals: output.store.proposals().len(),
            proxy_listen: settings.proxy_listen.clone(),
            rest_listen: settings.rest_listen.clone(),
            p2p_listen: settings.p2p_listen.clone(),
        }
    }

    pub fn log(&self) {
        tracing::info!(
            target: "cli",
            os = self.os,
            arch = self.arch,
            jcli = %self.jcli.path.display(),
            jcli_version = %self.jcli.version,
            node = %self.node.path.display(),
            node_version = %self.node.version,
            working_dir = %self.working_dir.display(),
            genesis_hash = %self.genesis_hash,
            committee = self.committee,
            vote_plans = self.vote_plans,
            proposals = self.proposals,
            proxy = %self.proxy_listen,
            rest = %self.rest_listen,
            p2p = %self.p2p_listen,
            "run summary"
        );
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OS/ARCH      : {}/{}", self.os, self.arch)?;
        writeln!(f, "JCLI         : {} ({})", self.jcli.path.display(), self.jcli.version)?;
        writeln!(f, "JORMUNGANDR  : {} ({})", self.node.path.display(), self.node.version)?;
        writeln!(f, "WORKING DIR  : {}", self.working_dir.display())?;
        writeln!(f, "GENESIS HASH : {}", self.genesis_hash)?;
        writeln!(f, "COMMITTEE    : {}", self.committee)?;
        writeln!(f, "VOTEPLANS    : {}", self.vote_plans)?;
        writeln!(f, "PROPOSALS    : {}", self.proposals)?;
        writeln!(f, "PROXY        : {}", self.proxy_listen)?;
        writeln!(f, "REST         : {}", self.rest_listen)?;
        write!(f, "P2P          : {}", self.p2p_listen)
    }
}
