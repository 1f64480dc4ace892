// Path: crates/cli/src/run.rs
//! Wires the stages of one `vitconfig` run together.

use crate::loader::load_round;
use crate::summary::{RunSummary, ToolInfo};
use crate::workdir::{create_working_dir, executable_dir};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use time::OffsetDateTime;
use vit_genesis::jcli::{find_executable, tool_version, JCLI, JORMUNGANDR};
use vit_genesis::{Collaborators, Jcli, ValidatedConfig};
use vit_node::config::write_node_config;
use vit_node::{supervise, AdminClient, NodeLaunch, NodeSupervisor, RestartPolicy, TerminationSignals};
use vit_telemetry::StageTimer;
use vit_types::config::BootstrapConfig;

/// Deadline of the REST shutdown request sent on termination.
const SHUTDOWN_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

async fn locate(name: &str, tool_dir: &Path) -> Result<ToolInfo> {
    let path = find_executable(name, tool_dir)?;
    let version = match tool_version(&path).await {
        Ok(version) => version,
        Err(e) => {
            tracing::warn!(target: "cli", tool = name, error = %e, "could not read tool version");
            "unknown".to_string()
        }
    };
    tracing::info!(target: "cli", tool = name, path = %path.display(), %version, "tool found");
    Ok(ToolInfo { path, version })
}

/// Runs the bootstrap described by `config`, then supervises the node until
/// the process is asked to terminate.
pub async fn execute(config: BootstrapConfig) -> Result<()> {
    let validated = ValidatedConfig::new(config, OffsetDateTime::now_utc())?;
    let settings = validated.config.node.clone();
    let paths = validated.config.paths.clone();

    let round = load_round(&paths)?;
    let jcli_info = locate(JCLI, &paths.tool_dir).await?;
    let node_info = locate(JORMUNGANDR, &paths.tool_dir).await?;

    let parent = match &paths.working_dir_parent {
        Some(dir) => dir.clone(),
        None => executable_dir()?,
    };
    let working_dir = create_working_dir(&parent)?;

    let jcli = Jcli::new(&jcli_info.path);
    let tools = Collaborators {
        signer: &jcli,
        ledger: &jcli,
    };
    let output = {
        let _timer = StageTimer::new("bootstrap");
        vit_genesis::run(validated, round, tools, &working_dir).await?
    };
    let node_config = write_node_config(&settings, &working_dir)?;

    let launch = NodeLaunch::new(&node_info.path, &working_dir, &output.block0_file, node_config)
        .with_secrets(output.secret_files.iter().cloned());
    let mut supervisor = NodeSupervisor::new(launch);
    let mut signals = TerminationSignals::install().context("installing signal handlers")?;
    if settings.start_node {
        supervisor.start()?;
    } else {
        tracing::info!(target: "cli", "node launch disabled");
    }

    let summary = RunSummary::new(jcli_info, node_info, working_dir, &output, &settings);
    summary.log();
    println!("{summary}");

    let admin = AdminClient::new(&settings.rest_listen, SHUTDOWN_REQUEST_TIMEOUT)
        .context("building the node REST client")?;
    let policy = RestartPolicy {
        allow_restart: settings.allow_restart,
        shutdown_on_exit: settings.shutdown_on_exit,
    };
    let status = supervise(&mut supervisor, policy, &admin, &mut signals).await?;
    match status {
        Some(status) if !status.success() => {
            tracing::warn!(target: "cli", %status, "node exited with failure");
        }
        Some(status) => tracing::info!(target: "cli", %status, "node exited"),
        None => {}
    }
    Ok(())
}
