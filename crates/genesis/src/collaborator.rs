// Path: crates/genesis/src/collaborator.rs
//! Interfaces to the external signer and ledger tooling.
//!
//! The bootstrap never performs cryptographic or encoding work itself. Every
//! call crosses one of these traits, is attempted exactly once, and runs
//! under the deadline of a [`CallPolicy`].

use async_trait::async_trait;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use vit_types::config::Discrimination;
use vit_types::error::ExternalToolError;

/// Key algorithms understood by the signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    /// Ed25519, used for BFT leaders.
    Ed25519,
}

impl KeyAlgorithm {
    /// The name the signer expects on its command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "Ed25519",
        }
    }
}

/// Key, address and certificate operations.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Generates a new secret key.
    async fn generate_key(&self, algorithm: KeyAlgorithm) -> Result<Vec<u8>, ExternalToolError>;

    /// Derives the public key of `secret_key`.
    async fn public_key(&self, secret_key: &[u8]) -> Result<Vec<u8>, ExternalToolError>;

    /// Derives the account address of `public_key`.
    async fn account_address(
        &self,
        public_key: &[u8],
        discrimination: Discrimination,
    ) -> Result<Vec<u8>, ExternalToolError>;

    /// Builds an unsigned vote plan certificate from a JSON descriptor.
    async fn new_vote_plan_certificate(&self, descriptor: &[u8]) -> Result<Vec<u8>, ExternalToolError>;

    /// Derives the vote plan id carried by `certificate`.
    async fn certificate_id(&self, certificate: &[u8]) -> Result<Vec<u8>, ExternalToolError>;

    /// Signs `certificate` with the keys stored in `secret_key_files`.
    async fn sign_certificate(
        &self,
        certificate: &[u8],
        secret_key_files: &[PathBuf],
    ) -> Result<Vec<u8>, ExternalToolError>;
}

/// Block zero encoding.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Encodes a YAML genesis descriptor into a binary block.
    async fn encode_genesis(&self, descriptor: &[u8]) -> Result<Vec<u8>, ExternalToolError>;

    /// Hashes a binary block.
    async fn hash_genesis(&self, block: &[u8]) -> Result<Vec<u8>, ExternalToolError>;

    /// Decodes a binary block into readable YAML.
    async fn decode_genesis(&self, block: &[u8]) -> Result<Vec<u8>, ExternalToolError>;
}

/// The deadline applied to every collaborator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    /// How long a single call may run.
    pub timeout: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
        }
    }
}

impl CallPolicy {
    /// A policy with the given deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Runs `call`, failing with [`ExternalToolError::Timeout`] once the
    /// deadline elapses. The future is dropped on expiry.
    pub async fn run<T, F>(&self, op: &'static str, call: F) -> Result<T, ExternalToolError>
    where
        F: Future<Output = Result<T, ExternalToolError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::error!(target: "collaborator", op, error = %e, "external call failed");
                }
                result
            }
            Err(_) => {
                tracing::error!(target: "collaborator", op, timeout = ?self.timeout, "external call timed out");
                Err(ExternalToolError::Timeout {
                    op,
                    after: self.timeout,
                })
            }
        }
    }
}

/// Decodes tool output that must be text, trimming the trailing newline.
pub fn output_text(op: &'static str, bytes: &[u8]) -> Result<String, ExternalToolError> {
    std::str::from_utf8(bytes)
        .map(|s| s.trim().to_string())
        .map_err(|e| ExternalToolError::CallFailed {
            op,
            reason: format!("non UTF-8 output: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_call_policy_times_out() {
        let policy = CallPolicy::with_timeout(Duration::from_secs(5));
        let err = policy
            .run("encode_genesis", async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, ExternalToolError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExternalToolError::Timeout { op: "encode_genesis", after } if after == Duration::from_secs(5)
        ));
    }

    #[tokio::test]
    async fn test_call_policy_passes_results_through() {
        let policy = CallPolicy::default();
        assert_eq!(policy.run("hash_genesis", async { Ok(7) }).await.unwrap(), 7);

        let err = policy
            .run("hash_genesis", async {
                Err::<(), _>(ExternalToolError::CallFailed {
                    op: "hash_genesis",
                    reason: "boom".into(),
                })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ExternalToolError::CallFailed { .. }));
    }

    #[test]
    fn test_output_text_trims() {
        assert_eq!(output_text("key_to_public", b"ed25519_pk1abc\n").unwrap(), "ed25519_pk1abc");
        assert!(output_text("key_to_public", &[0xff, 0xfe]).is_err());
    }
}
