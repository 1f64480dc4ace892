// Path: crates/genesis/tests/common/mod.rs
//! In-memory signer and ledger for driving the bootstrap without `jcli`.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use vit_genesis::certificate::external_id;
use vit_genesis::{KeyAlgorithm, Ledger, Signer};
use vit_types::app::{PayloadType, Proposal};
use vit_types::config::{BootstrapConfig, Discrimination};
use vit_types::error::ExternalToolError;

/// Deterministic signer. Every call is counted; one operation can be made
/// to fail or to hang.
#[derive(Default)]
pub struct MockSigner {
    pub calls: AtomicUsize,
    keys: AtomicUsize,
    pub fail_on: Option<&'static str>,
    pub hang_on: Option<&'static str>,
    pub sign_requests: Mutex<Vec<Vec<PathBuf>>>,
}

impl MockSigner {
    pub fn failing(op: &'static str) -> Self {
        Self {
            fail_on: Some(op),
            ..Default::default()
        }
    }

    pub fn hanging(op: &'static str) -> Self {
        Self {
            hang_on: Some(op),
            ..Default::default()
        }
    }

    async fn enter(&self, op: &'static str) -> Result<(), ExternalToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_on == Some(op) {
            tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
        }
        if self.fail_on == Some(op) {
            return Err(ExternalToolError::CallFailed {
                op,
                reason: "injected failure".into(),
            });
        }
        Ok(())
    }
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

#[async_trait]
impl Signer for MockSigner {
    async fn generate_key(&self, _algorithm: KeyAlgorithm) -> Result<Vec<u8>, ExternalToolError> {
        self.enter("key_generate").await?;
        let n = self.keys.fetch_add(1, Ordering::SeqCst);
        Ok(format!("ed25519_sk{n}\n").into_bytes())
    }

    async fn public_key(&self, secret_key: &[u8]) -> Result<Vec<u8>, ExternalToolError> {
        self.enter("key_to_public").await?;
        Ok(format!("pk_{}", text(secret_key)).into_bytes())
    }

    async fn account_address(
        &self,
        public_key: &[u8],
        discrimination: Discrimination,
    ) -> Result<Vec<u8>, ExternalToolError> {
        self.enter("address_account").await?;
        let prefix = match discrimination {
            Discrimination::Production => "ca",
            Discrimination::Test => "ta",
        };
        Ok(format!("{prefix}_{}", text(public_key)).into_bytes())
    }

    async fn new_vote_plan_certificate(&self, descriptor: &[u8]) -> Result<Vec<u8>, ExternalToolError> {
        self.enter("certificate_new_vote_plan").await?;
        serde_json::from_slice::<serde_json::Value>(descriptor).map_err(|e| {
            ExternalToolError::CallFailed {
                op: "certificate_new_vote_plan",
                reason: e.to_string(),
            }
        })?;
        Ok(format!("cert1{}", external_id(&text(descriptor), "")).into_bytes())
    }

    async fn certificate_id(&self, certificate: &[u8]) -> Result<Vec<u8>, ExternalToolError> {
        self.enter("certificate_get_vote_plan_id").await?;
        Ok(format!("{}\n", external_id(&text(certificate), "id")).into_bytes())
    }

    async fn sign_certificate(
        &self,
        certificate: &[u8],
        secret_key_files: &[PathBuf],
    ) -> Result<Vec<u8>, ExternalToolError> {
        self.enter("certificate_sign").await?;
        self.sign_requests.lock().unwrap().push(secret_key_files.to_vec());
        Ok(format!("signed{}", text(certificate)).into_bytes())
    }
}

/// Ledger whose block is the descriptor behind a fixed prefix.
#[derive(Default)]
pub struct MockLedger {
    pub calls: AtomicUsize,
    pub fail_encode: bool,
}

const BLOCK_PREFIX: &[u8] = b"BLOCK0\n";

#[async_trait]
impl Ledger for MockLedger {
    async fn encode_genesis(&self, descriptor: &[u8]) -> Result<Vec<u8>, ExternalToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_encode {
            return Err(ExternalToolError::CallFailed {
                op: "genesis_encode",
                reason: "injected failure".into(),
            });
        }
        let mut block = BLOCK_PREFIX.to_vec();
        block.extend_from_slice(descriptor);
        Ok(block)
    }

    async fn hash_genesis(&self, block: &[u8]) -> Result<Vec<u8>, ExternalToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}\n", external_id(&String::from_utf8_lossy(block), "block0")).into_bytes())
    }

    async fn decode_genesis(&self, block: &[u8]) -> Result<Vec<u8>, ExternalToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(block.strip_prefix(BLOCK_PREFIX).unwrap_or(block).to_vec())
    }
}

/// A configuration for the 2024-01-01 round used across the tests.
pub fn config() -> BootstrapConfig {
    let mut cfg = BootstrapConfig::default();
    cfg.schedule.genesis_time = Some("2024-01-01T00:00:00Z".to_string());
    cfg
}

pub fn proposals(count: usize, vote_type: PayloadType) -> Vec<Proposal> {
    (0..count)
        .map(|i| Proposal {
            id: format!("{vote_type}-{i}"),
            internal_id: (1000 + i).to_string(),
            title: format!("Proposal {i}"),
            vote_type,
            vote_options: vec!["yes".into(), "no".into()],
            ..Default::default()
        })
        .collect()
}
