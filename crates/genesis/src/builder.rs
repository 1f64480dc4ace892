// Path: crates/genesis/src/builder.rs
//! The block zero descriptor and its assembly into a genesis block.

use crate::collaborator::{output_text, CallPolicy, Ledger};
use crate::schedule::Schedule;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use vit_telemetry::StageTimer;
use vit_types::config::{Discrimination, FeeConfig, FeesGoTo};
use vit_types::error::BootstrapError;

/// An `{address, value}` pair credited in block zero.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct InitialFund {
    /// Account or legacy address.
    pub address: String,
    /// Amount credited.
    pub value: u64,
}

/// Fees charged per certificate kind.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PerCertificateFees {
    /// Stake pool registration.
    pub certificate_pool_registration: u64,
    /// Stake delegation.
    pub certificate_stake_delegation: u64,
}

/// Fees charged per vote certificate kind.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PerVoteCertificateFees {
    /// Vote plan creation.
    pub certificate_vote_plan: u64,
    /// Vote cast.
    pub certificate_vote_cast: u64,
}

/// The linear fee schedule.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct LinearFees {
    /// Flat part of every transaction fee.
    pub constant: u64,
    /// Charged per input and output.
    pub coefficient: u64,
    /// Default charge for any certificate.
    pub certificate: u64,
    /// Overrides of `certificate` per certificate kind.
    pub per_certificate_fees: PerCertificateFees,
    /// Overrides of `certificate` per vote certificate kind.
    pub per_vote_certificate_fees: PerVoteCertificateFees,
}

impl From<&FeeConfig> for LinearFees {
    fn from(fees: &FeeConfig) -> Self {
        Self {
            constant: fees.constant,
            coefficient: fees.coefficient,
            certificate: fees.certificate,
            per_certificate_fees: PerCertificateFees {
                certificate_pool_registration: fees.certificate_pool_registration,
                certificate_stake_delegation: fees.certificate_stake_delegation,
            },
            per_vote_certificate_fees: PerVoteCertificateFees {
                certificate_vote_plan: fees.certificate_vote_plan,
                certificate_vote_cast: fees.certificate_vote_cast,
            },
        }
    }
}

/// Consensus parameters of the chain.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BlockchainConfiguration {
    /// Chain start, in Unix seconds.
    pub block0_date: i64,
    /// Address discrimination of the chain.
    pub discrimination: Discrimination,
    /// Consensus protocol, always `bft`.
    pub block0_consensus: String,
    /// Slots in one epoch.
    pub slots_per_epoch: u32,
    /// Slot length in seconds.
    pub slot_duration: u8,
    /// Public keys of the BFT leaders.
    pub consensus_leader_ids: Vec<String>,
    /// Committee member ids.
    pub committees: Vec<String>,
    /// Fee schedule.
    pub linear_fees: LinearFees,
    /// Where collected fees are sent.
    pub fees_go_to: FeesGoTo,
}

/// One entry of the `initial` section. Exactly one field is set.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Initial {
    /// Account funds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund: Option<Vec<InitialFund>>,
    /// Legacy UTxO funds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_fund: Option<Vec<InitialFund>>,
    /// A signed certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,
}

/// The YAML document encoded into block zero.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Block0Config {
    /// Consensus parameters.
    pub blockchain_configuration: BlockchainConfiguration,
    /// Funds and certificates applied at genesis, in order.
    pub initial: Vec<Initial>,
}

/// The encoded genesis block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenesisBlock {
    /// The YAML handed to the ledger, supplementary data included.
    pub descriptor: Vec<u8>,
    /// Binary block zero.
    pub bytes: Vec<u8>,
    /// Block zero hash.
    pub hash: String,
    /// Human readable decoding of `bytes`.
    pub decoded: Vec<u8>,
}

/// A strongly-typed builder for the block zero descriptor.
///
/// Leader and committee keys are deduplicated as they arrive. A duplicate
/// is logged and skipped; it never fails the build.
#[derive(Debug, Clone)]
pub struct GenesisBuilder {
    config: BlockchainConfiguration,
    leader_keys: HashSet<String>,
    committee_keys: HashSet<String>,
    legacy_funds: Vec<InitialFund>,
    leader_funds: Vec<InitialFund>,
    certificates: Vec<String>,
}

impl GenesisBuilder {
    /// Creates a builder for a BFT chain following `schedule`.
    pub fn new(schedule: &Schedule, discrimination: Discrimination, fees: &FeeConfig) -> Self {
        Self {
            config: BlockchainConfiguration {
                block0_date: schedule.block0_date(),
                discrimination,
                block0_consensus: "bft".to_string(),
                slots_per_epoch: schedule.slots_per_epoch,
                slot_duration: schedule.slot_duration,
                consensus_leader_ids: Vec::new(),
                committees: Vec::new(),
                linear_fees: LinearFees::from(fees),
                fees_go_to: fees.fees_go_to,
            },
            leader_keys: HashSet::new(),
            committee_keys: HashSet::new(),
            legacy_funds: Vec::new(),
            leader_funds: Vec::new(),
            certificates: Vec::new(),
        }
    }

    /// Adds a consensus leader. Returns `false` for a duplicate key.
    ///
    /// A committee entry with the same key is withdrawn.
    pub fn add_consensus_leader(&mut self, public_key: &str) -> bool {
        if !self.leader_keys.insert(public_key.to_string()) {
            tracing::warn!(target: "genesis", public_key, "duplicate leader key skipped");
            return false;
        }
        if self.committee_keys.remove(public_key) {
            self.config.committees.retain(|k| k != public_key);
            tracing::warn!(target: "genesis", public_key, "committee key is a leader key, dropped from committee");
        }
        self.config.consensus_leader_ids.push(public_key.to_string());
        true
    }

    /// Adds a committee member. Returns `false` when the key is already a
    /// leader or committee key.
    pub fn add_committee(&mut self, public_key: &str) -> bool {
        if self.leader_keys.contains(public_key) {
            tracing::warn!(target: "genesis", public_key, "committee key is a leader key, skipped");
            return false;
        }
        if !self.committee_keys.insert(public_key.to_string()) {
            tracing::warn!(target: "genesis", public_key, "duplicate committee key skipped");
            return false;
        }
        self.config.committees.push(public_key.to_string());
        true
    }

    /// Credits a legacy address.
    pub fn add_legacy_fund(&mut self, address: impl Into<String>, value: u64) -> &mut Self {
        self.legacy_funds.push(InitialFund {
            address: address.into(),
            value,
        });
        self
    }

    /// Credits an account address.
    pub fn add_initial_fund(&mut self, address: impl Into<String>, value: u64) -> &mut Self {
        self.leader_funds.push(InitialFund {
            address: address.into(),
            value,
        });
        self
    }

    /// Embeds a signed certificate.
    pub fn add_certificate(&mut self, certificate: impl Into<String>) -> &mut Self {
        self.certificates.push(certificate.into());
        self
    }

    /// Number of consensus leaders.
    pub fn leader_count(&self) -> usize {
        self.config.consensus_leader_ids.len()
    }

    /// Number of committee members.
    pub fn committee_count(&self) -> usize {
        self.config.committees.len()
    }

    /// Number of embedded certificates.
    pub fn certificate_count(&self) -> usize {
        self.certificates.len()
    }

    /// The descriptor: legacy funds, then leader funds, then certificates.
    pub fn descriptor(&self) -> Block0Config {
        let mut initial = Vec::new();
        if !self.legacy_funds.is_empty() {
            initial.push(Initial {
                legacy_fund: Some(self.legacy_funds.clone()),
                ..Default::default()
            });
        }
        if !self.leader_funds.is_empty() {
            initial.push(Initial {
                fund: Some(self.leader_funds.clone()),
                ..Default::default()
            });
        }
        initial.extend(self.certificates.iter().map(|cert| Initial {
            cert: Some(cert.clone()),
            ..Default::default()
        }));
        Block0Config {
            blockchain_configuration: self.config.clone(),
            initial,
        }
    }

    /// Renders the descriptor as YAML.
    pub fn to_yaml(&self) -> Result<Vec<u8>, BootstrapError> {
        serde_yaml::to_string(&self.descriptor())
            .map(String::into_bytes)
            .map_err(|e| BootstrapError::Encode(format!("block0 descriptor: {e}")))
    }

    /// Encodes, hashes and decodes block zero.
    ///
    /// Non-empty `supplementary` bytes are appended verbatim to the YAML
    /// before encoding.
    pub async fn assemble(
        &self,
        ledger: &dyn Ledger,
        policy: CallPolicy,
        supplementary: Option<&[u8]>,
    ) -> Result<GenesisBlock, BootstrapError> {
        let _timer = StageTimer::new("genesis assembly");
        let mut descriptor = self.to_yaml()?;
        if let Some(extra) = supplementary.filter(|b| !b.is_empty()) {
            if !descriptor.ends_with(b"\n") {
                descriptor.push(b'\n');
            }
            descriptor.extend_from_slice(extra);
        }

        let bytes = policy
            .run("genesis_encode", ledger.encode_genesis(&descriptor))
            .await?;
        let hash = policy.run("genesis_hash", ledger.hash_genesis(&bytes)).await?;
        let hash = output_text("genesis_hash", &hash)?;
        let decoded = policy
            .run("genesis_decode", ledger.decode_genesis(&bytes))
            .await?;

        tracing::info!(
            target: "genesis",
            hash = %hash,
            leaders = self.leader_count(),
            committee = self.committee_count(),
            certificates = self.certificate_count(),
            "block0 assembled"
        );
        Ok(GenesisBlock {
            descriptor,
            bytes,
            hash,
            decoded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleParams;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use vit_types::config::ScheduleConfig;
    use vit_types::error::ExternalToolError;

    fn schedule() -> Schedule {
        let params = ScheduleParams::from_config(&ScheduleConfig {
            genesis_time: Some("2024-01-01T00:00:00Z".into()),
            ..Default::default()
        })
        .unwrap();
        Schedule::validate(&params, time::OffsetDateTime::UNIX_EPOCH).unwrap()
    }

    #[derive(Default)]
    struct EchoLedger {
        encoded: Mutex<Vec<u8>>,
    }

    #[async_trait]
    impl Ledger for EchoLedger {
        async fn encode_genesis(&self, descriptor: &[u8]) -> Result<Vec<u8>, ExternalToolError> {
            *self.encoded.lock().unwrap() = descriptor.to_vec();
            Ok(b"BLOCK0".to_vec())
        }
        async fn hash_genesis(&self, _block: &[u8]) -> Result<Vec<u8>, ExternalToolError> {
            Ok(b"feedbeef\n".to_vec())
        }
        async fn decode_genesis(&self, block: &[u8]) -> Result<Vec<u8>, ExternalToolError> {
            Ok(block.to_vec())
        }
    }

    #[test]
    fn test_duplicate_keys_are_dropped() {
        let mut b = GenesisBuilder::new(&schedule(), Discrimination::Production, &FeeConfig::default());
        assert!(b.add_committee("shared"));
        assert!(b.add_consensus_leader("leader"));
        assert!(!b.add_consensus_leader("leader"));
        assert!(b.add_consensus_leader("shared"));
        assert!(!b.add_committee("leader"));
        assert!(b.add_committee("c1"));
        assert!(!b.add_committee("c1"));
        assert!(b.add_committee("c2"));

        assert_eq!(b.leader_count(), 2);
        assert_eq!(b.committee_count(), 2);
        assert_eq!(b.descriptor().blockchain_configuration.committees, vec!["c1", "c2"]);
    }

    #[test]
    fn test_descriptor_yaml_shape() {
        let fees = FeeConfig {
            certificate_vote_plan: 5,
            fees_go_to: FeesGoTo::Treasury,
            ..Default::default()
        };
        let mut b = GenesisBuilder::new(&schedule(), Discrimination::Test, &fees);
        b.add_consensus_leader("ed25519_pk1leader");
        b.add_initial_fund("ca1leader", 10).add_legacy_fund("Ae2legacy", 7);
        b.add_certificate("signedcert1abc");

        let yaml = String::from_utf8(b.to_yaml().unwrap()).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        let chain = &value["blockchain_configuration"];
        assert_eq!(chain["block0_date"].as_i64(), Some(1_704_067_200));
        assert_eq!(chain["block0_consensus"].as_str(), Some("bft"));
        assert_eq!(chain["discrimination"].as_str(), Some("test"));
        assert_eq!(chain["slots_per_epoch"].as_u64(), Some(43_200));
        assert_eq!(chain["slot_duration"].as_u64(), Some(2));
        assert_eq!(chain["fees_go_to"].as_str(), Some("treasury"));
        assert_eq!(
            chain["linear_fees"]["per_vote_certificate_fees"]["certificate_vote_plan"].as_u64(),
            Some(5)
        );

        let initial = value["initial"].as_sequence().unwrap();
        assert_eq!(initial.len(), 3);
        assert_eq!(initial[0]["legacy_fund"][0]["value"].as_u64(), Some(7));
        assert_eq!(initial[1]["fund"][0]["address"].as_str(), Some("ca1leader"));
        assert_eq!(initial[2]["cert"].as_str(), Some("signedcert1abc"));
        assert!(initial[2].get("fund").is_none());
    }

    #[tokio::test]
    async fn test_assemble_appends_supplementary_data() {
        let mut b = GenesisBuilder::new(&schedule(), Discrimination::Production, &FeeConfig::default());
        b.add_consensus_leader("ed25519_pk1leader");
        let ledger = EchoLedger::default();
        let extra = b"- legacy_fund:\n  - address: Ae2x\n    value: 1\n";

        let block = b
            .assemble(&ledger, CallPolicy::default(), Some(extra))
            .await
            .unwrap();
        assert_eq!(block.bytes, b"BLOCK0");
        assert_eq!(block.hash, "feedbeef");
        assert!(block.descriptor.ends_with(extra));
        assert_eq!(*ledger.encoded.lock().unwrap(), block.descriptor);

        let plain = b.assemble(&ledger, CallPolicy::default(), Some(b"")).await.unwrap();
        assert_eq!(plain.descriptor, b.to_yaml().unwrap());
    }
}
