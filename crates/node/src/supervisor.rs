// Path: crates/node/src/supervisor.rs
use crate::admin::AdminClient;
use crate::signals::{TerminationSignal, TerminationSource};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};
use vit_types::error::{ExternalToolError, SupervisorError};

/// File in the working directory receiving the node's standard output.
pub const STDOUT_LOG: &str = "stdout.log";
/// File in the working directory receiving the node's standard error.
pub const STDERR_LOG: &str = "stderr.log";

/// Lifecycle of the supervised node process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    NotStarted,
    Running,
    Stopped(ExitStatus),
}

/// Everything needed to launch the node.
#[derive(Debug, Clone)]
pub struct NodeLaunch {
    /// The node binary.
    pub binary: PathBuf,
    /// Working directory of the node process; the logs land here too.
    pub working_dir: PathBuf,
    /// Encoded block zero, `--genesis-block`.
    pub genesis_block: PathBuf,
    /// Node configuration, `--config`.
    pub config_file: PathBuf,
    /// Leader secret files, one `--secret` each.
    pub secret_files: Vec<PathBuf>,
    /// Extra environment for the node.
    pub env: Vec<(String, String)>,
}

impl NodeLaunch {
    /// A launch with no secrets and full backtraces enabled.
    pub fn new(
        binary: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
        genesis_block: impl Into<PathBuf>,
        config_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            binary: binary.into(),
            working_dir: working_dir.into(),
            genesis_block: genesis_block.into(),
            config_file: config_file.into(),
            secret_files: Vec::new(),
            env: vec![("RUST_BACKTRACE".to_string(), "full".to_string())],
        }
    }

    /// Adds one `--secret` per file.
    pub fn with_secrets(mut self, secret_files: impl IntoIterator<Item = PathBuf>) -> Self {
        self.secret_files.extend(secret_files);
        self
    }

    /// The node's command line, binary excluded.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--genesis-block".into(),
            self.genesis_block.clone().into(),
            "--config".into(),
            self.config_file.clone().into(),
        ];
        for secret in &self.secret_files {
            args.push("--secret".into());
            args.push(secret.clone().into());
        }
        args
    }

    /// Where the node's standard output goes.
    pub fn stdout_log(&self) -> PathBuf {
        self.working_dir.join(STDOUT_LOG)
    }

    /// Where the node's standard error goes.
    pub fn stderr_log(&self) -> PathBuf {
        self.working_dir.join(STDERR_LOG)
    }
}

fn open_log(path: &Path, tool: &str) -> Result<std::fs::File, ExternalToolError> {
    std::fs::File::create(path).map_err(|e| ExternalToolError::Launch {
        tool: tool.to_string(),
        reason: format!("cannot create {}: {e}", path.display()),
    })
}

/// Owns the node process. A supervisor launches at most once.
#[derive(Debug)]
pub struct NodeSupervisor {
    launch: NodeLaunch,
    child: Option<Child>,
    state: NodeState,
}

impl NodeSupervisor {
    /// A supervisor for a node that has not been started yet.
    pub fn new(launch: NodeLaunch) -> Self {
        Self {
            launch,
            child: None,
            state: NodeState::NotStarted,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// How the node is, or would be, launched.
    pub fn launch(&self) -> &NodeLaunch {
        &self.launch
    }

    /// Spawns the node with its output redirected to the log files and
    /// returns the process id.
    pub fn start(&mut self) -> Result<Option<u32>, SupervisorError> {
        if self.state != NodeState::NotStarted {
            return Err(SupervisorError::AlreadyStarted);
        }
        let tool = self.launch.binary.display().to_string();
        let stdout = open_log(&self.launch.stdout_log(), &tool)?;
        let stderr = open_log(&self.launch.stderr_log(), &tool)?;

        let child = Command::new(&self.launch.binary)
            .args(self.launch.args())
            .current_dir(&self.launch.working_dir)
            .envs(self.launch.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExternalToolError::Launch {
                tool: tool.clone(),
                reason: e.to_string(),
            })?;

        let pid = child.id();
        tracing::info!(
            target: "supervisor",
            event = "node_started",
            binary = %tool,
            pid = ?pid,
            secrets = self.launch.secret_files.len(),
        );
        self.child = Some(child);
        self.state = NodeState::Running;
        Ok(pid)
    }

    /// Blocks until the node exits. Waiting again on a stopped node returns
    /// the recorded status.
    pub async fn wait(&mut self) -> Result<ExitStatus, SupervisorError> {
        match self.state {
            NodeState::NotStarted => Err(SupervisorError::NotStarted),
            NodeState::Stopped(status) => Ok(status),
            NodeState::Running => {
                let Some(child) = self.child.as_mut() else {
                    return Err(SupervisorError::NotStarted);
                };
                let status = child.wait().await?;
                self.child = None;
                self.state = NodeState::Stopped(status);
                tracing::info!(target: "supervisor", event = "node_exited", %status);
                Ok(status)
            }
        }
    }

    /// Kills a running node and reaps it. On a node that is not running this
    /// is [`wait`](Self::wait).
    pub async fn stop(&mut self) -> Result<ExitStatus, SupervisorError> {
        if let (NodeState::Running, Some(child)) = (self.state, self.child.as_mut()) {
            // Fails only when the process is already gone; wait reaps it either way.
            if let Err(e) = child.start_kill() {
                tracing::debug!(target: "supervisor", error = %e, "kill failed");
            }
        }
        self.wait().await
    }
}

/// What happens once the node process is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    /// Keep the supervisor alive after the node exits so the operator can
    /// restart the node by hand.
    pub allow_restart: bool,
    /// On termination, ask the hand-started node to shut down.
    pub shutdown_on_exit: bool,
}

enum RunOutcome {
    Exited(ExitStatus),
    Signalled(TerminationSignal),
}

async fn request_shutdown(policy: RestartPolicy, admin: &AdminClient) {
    if !policy.shutdown_on_exit {
        return;
    }
    match admin.shutdown().await {
        Ok(()) => tracing::info!(target: "supervisor", url = %admin.shutdown_url(), "node shutdown requested"),
        Err(e) => tracing::debug!(target: "supervisor", error = %e, "node shutdown request failed"),
    }
}

/// Watches the node, then applies `policy`.
///
/// A termination request while the node runs asks it to shut down if
/// requested, kills it, and returns. When the node exits on its own with
/// restarts allowed, or was never started, the supervisor stays up until the
/// next request from `signals` and then, if requested, asks whatever node
/// answers on the REST address to shut down. Shutdown failures are logged and
/// ignored. Returns the node's exit status when it was started.
pub async fn supervise<S: TerminationSource>(
    supervisor: &mut NodeSupervisor,
    policy: RestartPolicy,
    admin: &AdminClient,
    signals: &mut S,
) -> Result<Option<ExitStatus>, SupervisorError> {
    let status = match supervisor.state() {
        NodeState::NotStarted => None,
        NodeState::Stopped(status) => Some(status),
        NodeState::Running => {
            let outcome = tokio::select! {
                biased;
                signal = signals.next_signal() => RunOutcome::Signalled(signal),
                status = supervisor.wait() => RunOutcome::Exited(status?),
            };
            match outcome {
                RunOutcome::Exited(status) => Some(status),
                RunOutcome::Signalled(signal) => {
                    tracing::info!(target: "supervisor", event = "shutdown", reason = %signal);
                    request_shutdown(policy, admin).await;
                    return supervisor.stop().await.map(Some);
                }
            }
        }
    };

    if status.is_some() && !policy.allow_restart {
        return Ok(status);
    }

    let launch = supervisor.launch();
    tracing::info!(
        target: "supervisor",
        "node is not running; start it manually from {} with: {} {}",
        launch.working_dir.display(),
        launch.binary.display(),
        launch
            .args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" "),
    );
    tracing::info!(target: "supervisor", "waiting for SIGINT or SIGTERM");

    let signal = signals.next_signal().await;
    tracing::info!(target: "supervisor", event = "shutdown", reason = %signal);
    request_shutdown(policy, admin).await;
    Ok(status)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::time::Duration;

    /// Hands out one scripted request per call; `None` never resolves.
    struct Scripted {
        script: VecDeque<Option<TerminationSignal>>,
        calls: usize,
    }

    impl Scripted {
        fn new(script: impl IntoIterator<Item = Option<TerminationSignal>>) -> Self {
            Self {
                script: script.into_iter().collect(),
                calls: 0,
            }
        }
    }

    impl TerminationSource for Scripted {
        fn next_signal(&mut self) -> impl Future<Output = TerminationSignal> {
            self.calls += 1;
            let next = self.script.pop_front().flatten();
            async move {
                match next {
                    Some(signal) => signal,
                    None => std::future::pending().await,
                }
            }
        }
    }

    /// A node stand-in that ignores its arguments and runs until killed.
    /// Written by a child shell so this process never holds it open for writing.
    fn long_running_node(dir: &Path) -> String {
        let script = dir.join("node.sh");
        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!(
                "printf '#!/bin/sh\\nexec sleep 30\\n' > '{0}' && chmod +x '{0}'",
                script.display()
            ))
            .status()
            .unwrap();
        assert!(status.success());
        script.to_str().unwrap().to_string()
    }

    fn launch_of(binary: &str, dir: &Path) -> NodeLaunch {
        NodeLaunch::new(binary, dir, dir.join("block0.bin"), dir.join("node-config.yaml"))
    }

    fn unreachable_admin() -> AdminClient {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);
        AdminClient::new(&addr, Duration::from_millis(500)).unwrap()
    }

    #[test]
    fn test_args_pass_each_secret() {
        let dir = Path::new("/work");
        let launch = launch_of("jormungandr", dir)
            .with_secrets([dir.join("0_bft-secret.yaml"), dir.join("1_bft-secret.yaml")]);
        let args: Vec<String> = launch
            .args()
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect();
        assert_eq!(
            args,
            vec![
                "--genesis-block",
                "/work/block0.bin",
                "--config",
                "/work/node-config.yaml",
                "--secret",
                "/work/0_bft-secret.yaml",
                "--secret",
                "/work/1_bft-secret.yaml",
            ]
        );
        assert!(launch
            .env
            .contains(&("RUST_BACKTRACE".to_string(), "full".to_string())));
    }

    #[tokio::test]
    async fn test_start_then_wait() {
        let dir = tempfile::tempdir().unwrap();
        let mut supervisor = NodeSupervisor::new(launch_of("true", dir.path()));
        assert_eq!(supervisor.state(), NodeState::NotStarted);

        supervisor.start().unwrap();
        assert_eq!(supervisor.state(), NodeState::Running);

        let status = supervisor.wait().await.unwrap();
        assert!(status.success());
        assert_eq!(supervisor.state(), NodeState::Stopped(status));
        assert!(dir.path().join(STDOUT_LOG).exists());
        assert!(dir.path().join(STDERR_LOG).exists());

        // The recorded status is returned again.
        assert_eq!(supervisor.wait().await.unwrap(), status);
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut supervisor = NodeSupervisor::new(launch_of("true", dir.path()));
        supervisor.start().unwrap();
        assert!(matches!(supervisor.start(), Err(SupervisorError::AlreadyStarted)));
        supervisor.wait().await.unwrap();
        assert!(matches!(supervisor.start(), Err(SupervisorError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn test_wait_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut supervisor = NodeSupervisor::new(launch_of("true", dir.path()));
        assert!(matches!(supervisor.wait().await, Err(SupervisorError::NotStarted)));
    }

    #[tokio::test]
    async fn test_missing_binary_fails_to_launch() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-node");
        let mut supervisor = NodeSupervisor::new(launch_of(missing.to_str().unwrap(), dir.path()));
        assert!(matches!(supervisor.start(), Err(SupervisorError::Launch(_))));
        assert_eq!(supervisor.state(), NodeState::NotStarted);
    }

    #[tokio::test]
    async fn test_node_output_lands_in_logs() {
        let dir = tempfile::tempdir().unwrap();
        let launch = launch_of("echo", dir.path()).with_secrets([dir.path().join("0_bft-secret.yaml")]);
        let mut supervisor = NodeSupervisor::new(launch);
        supervisor.start().unwrap();
        assert!(supervisor.wait().await.unwrap().success());

        let stdout = std::fs::read_to_string(dir.path().join(STDOUT_LOG)).unwrap();
        let expected = format!(
            "--genesis-block {0}/block0.bin --config {0}/node-config.yaml --secret {0}/0_bft-secret.yaml\n",
            dir.path().display()
        );
        assert_eq!(stdout, expected);
        let stderr = std::fs::read_to_string(dir.path().join(STDERR_LOG)).unwrap();
        assert!(stderr.is_empty());
    }

    #[tokio::test]
    async fn test_supervise_returns_when_restart_is_disallowed() {
        let dir = tempfile::tempdir().unwrap();
        let mut supervisor = NodeSupervisor::new(launch_of("false", dir.path()));
        supervisor.start().unwrap();
        let policy = RestartPolicy {
            allow_restart: false,
            shutdown_on_exit: true,
        };
        let mut signals = Scripted::new([None]);
        let status = supervise(&mut supervisor, policy, &unreachable_admin(), &mut signals)
            .await
            .unwrap()
            .unwrap();
        assert!(!status.success());
        assert_eq!(signals.calls, 1);
    }

    #[tokio::test]
    async fn test_supervise_waits_for_termination_after_exit_and_ignores_shutdown_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut supervisor = NodeSupervisor::new(launch_of("true", dir.path()));
        supervisor.start().unwrap();
        let policy = RestartPolicy {
            allow_restart: true,
            shutdown_on_exit: true,
        };
        // Nothing arrives while the node runs; the request after its exit ends the wait.
        let mut signals = Scripted::new([None, Some(TerminationSignal::Interrupt)]);
        let status = supervise(&mut supervisor, policy, &unreachable_admin(), &mut signals)
            .await
            .unwrap();
        assert!(status.unwrap().success());
        assert_eq!(signals.calls, 2);
    }

    #[tokio::test]
    async fn test_signal_while_running_stops_the_node() {
        let dir = tempfile::tempdir().unwrap();
        let node = long_running_node(dir.path());
        let mut supervisor = NodeSupervisor::new(launch_of(&node, dir.path()));
        supervisor.start().unwrap();
        let policy = RestartPolicy {
            allow_restart: true,
            shutdown_on_exit: true,
        };
        let mut signals = Scripted::new([Some(TerminationSignal::Terminate), None]);
        let status = tokio::time::timeout(
            Duration::from_secs(10),
            supervise(&mut supervisor, policy, &unreachable_admin(), &mut signals),
        )
        .await
        .unwrap()
        .unwrap()
        .unwrap();
        assert!(!status.success());
        assert_eq!(supervisor.state(), NodeState::Stopped(status));
        // The restart wait was skipped.
        assert_eq!(signals.calls, 1);
    }

    #[tokio::test]
    async fn test_stop_on_exited_node_returns_its_status() {
        let dir = tempfile::tempdir().unwrap();
        let mut supervisor = NodeSupervisor::new(launch_of("true", dir.path()));
        supervisor.start().unwrap();
        let status = supervisor.wait().await.unwrap();
        assert_eq!(supervisor.stop().await.unwrap(), status);
    }

    #[tokio::test]
    async fn test_never_started_node_still_waits_for_termination() {
        let dir = tempfile::tempdir().unwrap();
        let mut supervisor = NodeSupervisor::new(launch_of("true", dir.path()));
        let policy = RestartPolicy {
            allow_restart: false,
            shutdown_on_exit: false,
        };
        let mut signals = Scripted::new([None, Some(TerminationSignal::Terminate)]);
        let pending = tokio::time::timeout(
            Duration::from_millis(100),
            supervise(&mut supervisor, policy, &unreachable_admin(), &mut signals),
        )
        .await;
        assert!(pending.is_err());

        let status = supervise(&mut supervisor, policy, &unreachable_admin(), &mut signals)
            .await
            .unwrap();
        assert!(status.is_none());
        assert_eq!(signals.calls, 2);
    }
}
