// Path: crates/genesis/src/leaders.rs
//! BFT leader provisioning.

use crate::collaborator::{output_text, CallPolicy, KeyAlgorithm, Signer};
use std::path::{Path, PathBuf};
use vit_types::app::Leader;
use vit_types::config::{BftSecret, Discrimination, SecretConfig};
use vit_types::error::BootstrapError;
use vit_types::prelude::IoResultExt;

/// File holding leader `i`'s secret key.
pub fn secret_key_file_name(i: usize) -> String {
    format!("{i}_bft_secret.key")
}

/// Node secret configuration of leader `i`.
pub fn secret_config_file_name(i: usize) -> String {
    format!("{i}_bft-secret.yaml")
}

/// Writes `contents` readable by the owner only.
pub fn write_private(path: &Path, contents: &[u8]) -> Result<(), BootstrapError> {
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .mode(0o600)
            .open(path)
            .at_path(path)?;
        f.write_all(contents).at_path(path)?;
    }
    #[cfg(not(unix))]
    {
        std::fs::write(path, contents).at_path(path)?;
    }
    Ok(())
}

async fn derive_leader(
    signer: &dyn Signer,
    policy: CallPolicy,
    secret_key: String,
    secret_key_file: PathBuf,
    discrimination: Discrimination,
) -> Result<Leader, BootstrapError> {
    let pk = policy
        .run("key_to_public", signer.public_key(secret_key.as_bytes()))
        .await?;
    let account = policy
        .run("address_account", signer.account_address(&pk, discrimination))
        .await?;
    Ok(Leader {
        secret_key,
        public_key: output_text("key_to_public", &pk)?,
        account_address: output_text("address_account", &account)?,
        secret_key_file,
        node_secret_file: None,
    })
}

/// Generates `count` Ed25519 leaders and stores their keys in `working_dir`.
pub async fn generate_leaders(
    signer: &dyn Signer,
    policy: CallPolicy,
    count: usize,
    discrimination: Discrimination,
    working_dir: &Path,
) -> Result<Vec<Leader>, BootstrapError> {
    let mut leaders = Vec::with_capacity(count);
    for i in 0..count {
        let sk = policy
            .run("key_generate", signer.generate_key(KeyAlgorithm::Ed25519))
            .await?;
        let secret_key = output_text("key_generate", &sk)?;
        let file = working_dir.join(secret_key_file_name(i));
        write_private(&file, secret_key.as_bytes())?;
        let leader = derive_leader(signer, policy, secret_key, file, discrimination).await?;
        tracing::info!(target: "genesis", leader = i, public_key = %leader.public_key, "leader generated");
        leaders.push(leader);
    }
    Ok(leaders)
}

/// Builds leaders from existing secret key files.
pub async fn load_leaders(
    signer: &dyn Signer,
    policy: CallPolicy,
    files: &[PathBuf],
    discrimination: Discrimination,
) -> Result<Vec<Leader>, BootstrapError> {
    let mut leaders = Vec::with_capacity(files.len());
    for file in files {
        let raw = std::fs::read_to_string(file).at_path(file)?;
        let leader = derive_leader(signer, policy, raw.trim().to_string(), file.clone(), discrimination).await?;
        tracing::info!(target: "genesis", file = %file.display(), public_key = %leader.public_key, "leader loaded");
        leaders.push(leader);
    }
    Ok(leaders)
}

/// Writes one node secret file per leader and records its path.
pub fn write_secret_configs(leaders: &mut [Leader], working_dir: &Path) -> Result<Vec<PathBuf>, BootstrapError> {
    let mut files = Vec::with_capacity(leaders.len());
    for (i, leader) in leaders.iter_mut().enumerate() {
        let secret = SecretConfig {
            bft: BftSecret {
                signing_key: leader.secret_key.clone(),
            },
        };
        let yaml = serde_yaml::to_string(&secret)
            .map_err(|e| BootstrapError::Encode(format!("secret config: {e}")))?;
        let path = working_dir.join(secret_config_file_name(i));
        write_private(&path, yaml.as_bytes())?;
        leader.node_secret_file = Some(path.clone());
        files.push(path);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_configs_are_written_per_leader() {
        let dir = tempfile::tempdir().unwrap();
        let mut leaders = vec![Leader {
            secret_key: "ed25519_sk1abc".into(),
            public_key: "ed25519_pk1abc".into(),
            account_address: "ca1abc".into(),
            secret_key_file: dir.path().join(secret_key_file_name(0)),
            node_secret_file: None,
        }];
        let files = write_secret_configs(&mut leaders, dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("0_bft-secret.yaml")]);
        assert_eq!(leaders[0].node_secret_file.as_ref(), Some(&files[0]));

        let yaml = std::fs::read_to_string(&files[0]).unwrap();
        assert_eq!(yaml, "bft:\n  signing_key: ed25519_sk1abc\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_private_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0_bft_secret.key");
        write_private(&path, b"sk").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
