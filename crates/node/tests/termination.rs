// Path: crates/node/tests/termination.rs
#![cfg(unix)]

use std::path::Path;
use std::time::Duration;
use vit_node::{supervise, AdminClient, NodeLaunch, NodeState, NodeSupervisor, RestartPolicy, TerminationSignals};

fn long_running_node(dir: &Path) -> std::path::PathBuf {
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
    script
}

fn unreachable_admin() -> AdminClient {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);
    AdminClient::new(&addr, Duration::from_millis(500)).unwrap()
}

#[tokio::test]
async fn sigterm_during_run_stops_node_without_restart_wait() {
    let dir = tempfile::tempdir().unwrap();
    let launch = NodeLaunch::new(
        long_running_node(dir.path()),
        dir.path(),
        dir.path().join("block0.bin"),
        dir.path().join("node-config.yaml"),
    );
    let mut supervisor = NodeSupervisor::new(launch);
    let mut signals = TerminationSignals::install().unwrap();
    supervisor.start().unwrap();

    let pid = std::process::id().to_string();
    let sender = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        tokio::process::Command::new("kill")
            .args(["-TERM", &pid])
            .status()
            .await
            .unwrap()
    });

    let policy = RestartPolicy {
        allow_restart: true,
        shutdown_on_exit: true,
    };
    let status = tokio::time::timeout(
        Duration::from_secs(10),
        supervise(&mut supervisor, policy, &unreachable_admin(), &mut signals),
    )
    .await
    .expect("supervise kept waiting after SIGTERM")
    .unwrap()
    .unwrap();

    assert!(sender.await.unwrap().success());
    assert!(!status.success());
    assert_eq!(supervisor.state(), NodeState::Stopped(status));
}
