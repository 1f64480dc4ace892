// Path: crates/genesis/src/jcli.rs
//! [`Signer`] and [`Ledger`] backed by the `jcli` command-line tool.
//!
//! Each call spawns one `jcli` process, feeds its input on stdin and reads
//! the result from stdout. Children are killed when their future is dropped,
//! so a call abandoned by [`CallPolicy`](crate::collaborator::CallPolicy)
//! leaves no process behind.

use crate::collaborator::{KeyAlgorithm, Ledger, Signer};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use vit_types::config::Discrimination;
use vit_types::error::ExternalToolError;

/// File name of the signer/ledger tool.
pub const JCLI: &str = "jcli";
/// File name of the node binary.
pub const JORMUNGANDR: &str = "jormungandr";

/// Locates `name` in `local_dir`, falling back to the directories on `PATH`.
pub fn find_executable(name: &str, local_dir: &Path) -> Result<PathBuf, ExternalToolError> {
    let local = local_dir.join(name);
    if local.is_file() {
        return Ok(local);
    }
    std::env::var_os("PATH")
        .into_iter()
        .flat_map(|paths| std::env::split_paths(&paths).collect::<Vec<_>>())
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ExternalToolError::NotFound {
            tool: name.to_string(),
            searched: local_dir.display().to_string(),
        })
}

/// Runs `bin` with `args`, writing `stdin` to it when given, and returns its
/// stdout. A non-zero exit is reported with the tool's stderr.
pub async fn run_tool<I, S>(
    bin: &Path,
    op: &'static str,
    args: I,
    stdin: Option<&[u8]>,
) -> Result<Vec<u8>, ExternalToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut child = Command::new(bin)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ExternalToolError::Launch {
            tool: bin.display().to_string(),
            reason: e.to_string(),
        })?;

    let pipe = child.stdin.take();
    let feed = async move {
        if let (Some(mut pipe), Some(input)) = (pipe, stdin) {
            pipe.write_all(input).await?;
            pipe.shutdown().await?;
        }
        Ok::<(), std::io::Error>(())
    };
    let (fed, output) = tokio::join!(feed, child.wait_with_output());
    let output = output.map_err(|e| ExternalToolError::CallFailed {
        op,
        reason: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExternalToolError::CallFailed {
            op,
            reason: format!("{} ({})", stderr.trim(), output.status),
        });
    }
    // A broken pipe is expected when the tool exits successfully without
    // draining its input.
    if let Err(e) = fed {
        tracing::debug!(target: "jcli", op, error = %e, "stdin not fully consumed");
    }
    Ok(output.stdout)
}

/// Returns the `--full-version` banner of `bin`.
pub async fn tool_version(bin: &Path) -> Result<String, ExternalToolError> {
    let out = run_tool(bin, "full_version", ["--full-version"], None).await?;
    crate::collaborator::output_text("full_version", &out)
}

fn trim_line(mut bytes: Vec<u8>) -> Vec<u8> {
    while bytes.last().is_some_and(|b| b.is_ascii_whitespace()) {
        bytes.pop();
    }
    bytes
}

/// The `jcli` adapter.
#[derive(Debug, Clone)]
pub struct Jcli {
    bin: PathBuf,
}

impl Jcli {
    /// Wraps the binary at `bin`.
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    /// Path of the wrapped binary.
    pub fn bin(&self) -> &Path {
        &self.bin
    }

    async fn text<I, S>(&self, op: &'static str, args: I, stdin: Option<&[u8]>) -> Result<Vec<u8>, ExternalToolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        run_tool(&self.bin, op, args, stdin).await.map(trim_line)
    }
}

#[async_trait]
impl Signer for Jcli {
    async fn generate_key(&self, algorithm: KeyAlgorithm) -> Result<Vec<u8>, ExternalToolError> {
        self.text("key_generate", ["key", "generate", "--type", algorithm.as_str()], None)
            .await
    }

    async fn public_key(&self, secret_key: &[u8]) -> Result<Vec<u8>, ExternalToolError> {
        self.text("key_to_public", ["key", "to-public"], Some(secret_key))
            .await
    }

    async fn account_address(
        &self,
        public_key: &[u8],
        discrimination: Discrimination,
    ) -> Result<Vec<u8>, ExternalToolError> {
        let pk = crate::collaborator::output_text("address_account", public_key)?;
        let mut args = vec!["address", "account"];
        if discrimination == Discrimination::Test {
            args.push("--testing");
        }
        args.push(&pk);
        self.text("address_account", args, None).await
    }

    async fn new_vote_plan_certificate(&self, descriptor: &[u8]) -> Result<Vec<u8>, ExternalToolError> {
        self.text("certificate_new_vote_plan", ["certificate", "new", "vote-plan"], Some(descriptor))
            .await
    }

    async fn certificate_id(&self, certificate: &[u8]) -> Result<Vec<u8>, ExternalToolError> {
        self.text("certificate_get_vote_plan_id", ["certificate", "get-vote-plan-id"], Some(certificate))
            .await
    }

    async fn sign_certificate(
        &self,
        certificate: &[u8],
        secret_key_files: &[PathBuf],
    ) -> Result<Vec<u8>, ExternalToolError> {
        let mut args: Vec<&OsStr> = vec![OsStr::new("certificate"), OsStr::new("sign")];
        for file in secret_key_files {
            args.push(OsStr::new("--key"));
            args.push(file.as_os_str());
        }
        self.text("certificate_sign", args, Some(certificate)).await
    }
}

#[async_trait]
impl Ledger for Jcli {
    async fn encode_genesis(&self, descriptor: &[u8]) -> Result<Vec<u8>, ExternalToolError> {
        run_tool(&self.bin, "genesis_encode", ["genesis", "encode"], Some(descriptor)).await
    }

    async fn hash_genesis(&self, block: &[u8]) -> Result<Vec<u8>, ExternalToolError> {
        self.text("genesis_hash", ["genesis", "hash"], Some(block)).await
    }

    async fn decode_genesis(&self, block: &[u8]) -> Result<Vec<u8>, ExternalToolError> {
        run_tool(&self.bin, "genesis_decode", ["genesis", "decode"], Some(block)).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_tool_feeds_stdin() {
        let cat = find_executable("cat", Path::new("/nonexistent")).unwrap();
        let out = run_tool(&cat, "echo", std::iter::empty::<&str>(), Some(b"hello\n"))
            .await
            .unwrap();
        assert_eq!(out, b"hello\n");
        assert_eq!(trim_line(out), b"hello");
    }

    #[tokio::test]
    async fn test_failed_call_reports_op() {
        let cat = find_executable("cat", Path::new("/nonexistent")).unwrap();
        let jcli = Jcli::new(cat);
        let err = jcli.encode_genesis(b"yaml").await.unwrap_err();
        assert!(matches!(err, ExternalToolError::CallFailed { op: "genesis_encode", .. }));
    }

    #[tokio::test]
    async fn test_missing_binary_is_launch_error() {
        let jcli = Jcli::new("/nonexistent/jcli");
        let err = jcli.generate_key(KeyAlgorithm::Ed25519).await.unwrap_err();
        assert!(matches!(err, ExternalToolError::Launch { .. }));
    }

    #[test]
    fn test_local_directory_is_searched_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(JCLI), b"").unwrap();
        assert_eq!(find_executable(JCLI, dir.path()).unwrap(), dir.path().join(JCLI));

        let err = find_executable("surely-not-a-real-tool", dir.path()).unwrap_err();
        assert!(matches!(err, ExternalToolError::NotFound { .. }));
    }
}
