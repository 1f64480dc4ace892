// Path: crates/types/src/app/leader.rs
use std::fmt;
use std::path::PathBuf;

/// A BFT leader: a key-holder authorized to produce blocks.
#[derive(Clone, PartialEq, Eq)]
pub struct Leader {
    /// Bech32-encoded secret key, as produced by the signer tooling.
    pub secret_key: String,
    /// Bech32-encoded public key; unique across leaders and committee.
    pub public_key: String,
    /// Account address credited in block zero.
    pub account_address: String,
    /// File holding `secret_key`, used for certificate signing.
    pub secret_key_file: PathBuf,
    /// Node secret configuration, written once the genesis block exists.
    pub node_secret_file: Option<PathBuf>,
}

// Secret material stays out of logs.
impl fmt::Debug for Leader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leader")
            .field("secret_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("account_address", &self.account_address)
            .field("secret_key_file", &self.secret_key_file)
            .field("node_secret_file", &self.node_secret_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let leader = Leader {
            secret_key: "ed25519_sk1supersecret".into(),
            public_key: "ed25519_pk1abc".into(),
            account_address: "ca1xyz".into(),
            secret_key_file: PathBuf::from("0_bft_secret.key"),
            node_secret_file: None,
        };
        let rendered = format!("{leader:?}");
        assert!(!rendered.contains("supersecret"));
        assert!(rendered.contains("ed25519_pk1abc"));
    }
}
