// Path: crates/genesis/src/certificate.rs
//! The vote plan certificate pipeline.
//!
//! Staging hashes every proposal and lays the batches out as [`VotePlan`]
//! arena entries. Certification then drives the signer once per plan and
//! links the resulting ids back into the fund and proposal records.
//! The first failing call aborts the whole run.

use crate::collaborator::{output_text, CallPolicy, Signer};
use crate::dump::RawDump;
use crate::partition::Batch;
use crate::schedule::{DisplayFormat, Schedule};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vit_telemetry::StageTimer;
use vit_types::app::{
    ChainTime, Fund, PayloadType, ProposalStore, VotePlanIndex, VotePlanSummary, VoteWindow,
};
use vit_types::error::{BootstrapError, ConsistencyError, ExternalToolError};
use vit_types::VOTE_PLAN_PROPOSALS_MAX;

type Blake2b256 = Blake2b<U32>;

/// The content hash identifying a proposal on chain: hex of
/// `blake2b-256(id ++ internal_id)`.
pub fn external_id(id: &str, internal_id: &str) -> String {
    let mut hasher = Blake2b256::new();
    hasher.update(id.as_bytes());
    hasher.update(internal_id.as_bytes());
    hex::encode(hasher.finalize())
}

/// A proposal entry of a vote plan descriptor.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DescriptorProposal {
    /// The proposal's content hash.
    pub external_id: String,
    /// Number of vote options.
    pub options: u8,
    /// On-chain action.
    pub action: String,
}

/// The JSON document handed to the signer to create a certificate.
#[derive(Serialize, Debug)]
pub struct VotePlanDescriptor<'a> {
    /// Payload type of every proposal in the plan.
    pub payload_type: PayloadType,
    /// Start of voting.
    pub vote_start: ChainTime,
    /// End of voting.
    pub vote_end: ChainTime,
    /// End of tallying.
    pub committee_end: ChainTime,
    /// The plan's proposals, in vote plan order.
    pub proposals: &'a [DescriptorProposal],
}

impl VotePlanDescriptor<'_> {
    /// Serializes the descriptor as indented JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, BootstrapError> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut ser)
            .map_err(|e| BootstrapError::Encode(format!("vote plan descriptor: {e}")))?;
        Ok(out)
    }
}

/// One vote plan of the round's arena.
///
/// Created during staging without id or certificate; both are written once
/// by [`VotePlan::certify`], after which the plan does not change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VotePlan {
    /// Position in the arena.
    pub index: VotePlanIndex,
    /// Payload type of the plan.
    pub payload: PayloadType,
    /// Chain-time boundaries.
    pub window: VoteWindow,
    /// Proposal entries, in vote plan order.
    pub proposals: Vec<DescriptorProposal>,
    vote_plan_id: Option<String>,
    certificate: Option<String>,
}

impl VotePlan {
    /// The descriptor to certify.
    pub fn descriptor(&self) -> VotePlanDescriptor<'_> {
        VotePlanDescriptor {
            payload_type: self.payload,
            vote_start: self.window.vote_start,
            vote_end: self.window.vote_end,
            committee_end: self.window.committee_end,
            proposals: &self.proposals,
        }
    }

    /// Records the plan's id and signed certificate. Write-once.
    pub fn certify(&mut self, vote_plan_id: String, certificate: String) -> Result<(), ConsistencyError> {
        if self.vote_plan_id.is_some() || self.certificate.is_some() {
            return Err(ConsistencyError::VotePlanAlreadyCertified(self.index.0));
        }
        self.vote_plan_id = Some(vote_plan_id);
        self.certificate = Some(certificate);
        Ok(())
    }

    /// The id assigned by the signer, once certified.
    pub fn vote_plan_id(&self) -> Option<&str> {
        self.vote_plan_id.as_deref()
    }

    /// The signed certificate, once certified.
    pub fn certificate(&self) -> Option<&str> {
        self.certificate.as_deref()
    }
}

/// Hashes the members of every batch and builds the uncertified arena.
///
/// Every proposal receives its external id here; the returned plans are
/// ordered by arena index.
pub fn stage(
    batches: &[Batch],
    store: &mut ProposalStore,
    window: VoteWindow,
) -> Result<Vec<VotePlan>, ConsistencyError> {
    let mut plans = Vec::with_capacity(batches.len());
    for batch in batches {
        if batch.members.len() > VOTE_PLAN_PROPOSALS_MAX {
            return Err(ConsistencyError::OverCapacity {
                index: batch.index.0,
                count: batch.members.len(),
            });
        }
        let mut entries = Vec::with_capacity(batch.members.len());
        for &position in &batch.members {
            let proposal = store
                .get(position)
                .ok_or(ConsistencyError::UnknownProposal(position))?;
            let hash = external_id(&proposal.id, &proposal.internal_id);
            let entry = DescriptorProposal {
                external_id: hash.clone(),
                options: proposal.option_count()?,
                action: proposal.vote_action.clone(),
            };
            store.assign_external_id(position, hash)?;
            entries.push(entry);
        }
        plans.push(VotePlan {
            index: batch.index,
            payload: batch.payload,
            window,
            proposals: entries,
            vote_plan_id: None,
            certificate: None,
        });
    }
    Ok(plans)
}

/// Drives the signer over the staged arena.
pub struct CertificatePipeline<'a> {
    signer: &'a dyn Signer,
    policy: CallPolicy,
    signer_key_files: Vec<PathBuf>,
    dump: Option<&'a RawDump>,
}

impl<'a> CertificatePipeline<'a> {
    /// A pipeline signing with `signer_key_file`.
    ///
    /// The signer accepts a single co-signer per certificate, so only one
    /// leader key is ever passed.
    pub fn new(signer: &'a dyn Signer, policy: CallPolicy, signer_key_file: PathBuf) -> Self {
        Self {
            signer,
            policy,
            signer_key_files: vec![signer_key_file],
            dump: None,
        }
    }

    /// Persists descriptors and certificates into `dump` as they are produced.
    pub fn with_dump(mut self, dump: Option<&'a RawDump>) -> Self {
        self.dump = dump;
        self
    }

    /// Certifies one plan: create, identify, sign, then record.
    pub async fn certify_plan(&self, plan: &mut VotePlan) -> Result<(), BootstrapError> {
        let descriptor = plan.descriptor().to_json()?;

        let unsigned = self
            .policy
            .run("certificate_new_vote_plan", self.signer.new_vote_plan_certificate(&descriptor))
            .await?;
        let id_bytes = self
            .policy
            .run("certificate_get_vote_plan_id", self.signer.certificate_id(&unsigned))
            .await?;
        let vote_plan_id = output_text("certificate_get_vote_plan_id", &id_bytes)?;
        if vote_plan_id.is_empty() {
            return Err(ExternalToolError::CallFailed {
                op: "certificate_get_vote_plan_id",
                reason: "empty vote plan id".to_string(),
            }
            .into());
        }
        let signed = self
            .policy
            .run(
                "certificate_sign",
                self.signer.sign_certificate(&unsigned, &self.signer_key_files),
            )
            .await?;
        let certificate = output_text("certificate_sign", &signed)?;

        if let Some(dump) = self.dump {
            dump.write_vote_plan(&vote_plan_id, &descriptor, certificate.as_bytes())?;
        }

        tracing::info!(
            target: "certificate",
            index = plan.index.0,
            payload = %plan.payload,
            proposals = plan.proposals.len(),
            vote_plan_id = %vote_plan_id,
            "vote plan certified"
        );
        plan.certify(vote_plan_id, certificate)?;
        Ok(())
    }

    /// Certifies every plan in arena order and links the results into
    /// `fund` and `store`.
    pub async fn run(
        &self,
        plans: &mut [VotePlan],
        store: &mut ProposalStore,
        fund: &mut Fund,
        schedule: &Schedule,
        display: &DisplayFormat,
    ) -> Result<(), BootstrapError> {
        let _timer = StageTimer::new("certificate pipeline");
        fund.reserve_vote_plans(plans.len());
        let vote_start = display.format(schedule.vote_start)?;
        let vote_end = display.format(schedule.vote_end)?;
        let committee_end = display.format(schedule.committee_end)?;

        for plan in plans.iter_mut() {
            self.certify_plan(plan).await?;
            let summary = VotePlanSummary {
                vote_plan_id: plan.vote_plan_id().unwrap_or_default().to_string(),
                vote_start: vote_start.clone(),
                vote_end: vote_end.clone(),
                committee_end: committee_end.clone(),
                payload: plan.payload,
                ..Default::default()
            };
            fund.record_vote_plan(plan.index, summary)?;
            link(plan, store)?;
        }
        Ok(())
    }
}

/// Points every proposal of `plan` at the plan and records its position.
pub fn link(plan: &VotePlan, store: &mut ProposalStore) -> Result<(), ConsistencyError> {
    for (position, entry) in plan.proposals.iter().enumerate() {
        let index = u8::try_from(position).map_err(|_| ConsistencyError::OverCapacity {
            index: plan.index.0,
            count: plan.proposals.len(),
        })?;
        store.link(&entry.external_id, index, plan.index)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::partition;
    use vit_types::app::Proposal;

    fn store(n: usize) -> ProposalStore {
        ProposalStore::new(
            (0..n)
                .map(|i| Proposal {
                    id: format!("p{i}"),
                    internal_id: i.to_string(),
                    vote_options: vec!["yes".into(), "no".into(), "blank".into()],
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn test_external_id_is_stable_hex() {
        let a = external_id("42", "7");
        assert_eq!(a, external_id("42", "7"));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, external_id("42", "8"));
    }

    #[test]
    fn test_stage_hashes_every_member() {
        let mut s = store(4);
        let batches = partition(&s, 3);
        let plans = stage(&batches, &mut s, VoteWindow::default()).unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].proposals.len(), 3);
        assert_eq!(plans[1].proposals[0].external_id, external_id("p3", "3"));
        assert_eq!(plans[1].proposals[0].options, 3);
        assert_eq!(plans[1].proposals[0].action, "off_chain");
        assert!(s.iter().all(|p| p.external_id.is_some()));
        assert!(plans.iter().all(|p| p.vote_plan_id().is_none()));
    }

    #[test]
    fn test_descriptor_json_shape() {
        let mut s = store(1);
        let window = VoteWindow {
            vote_start: ChainTime { epoch: 0, slot_id: 0 },
            vote_end: ChainTime { epoch: 6, slot_id: 0 },
            committee_end: ChainTime { epoch: 7, slot_id: 0 },
        };
        let plans = stage(&partition(&s, 255), &mut s, window).unwrap();
        let json = plans[0].descriptor().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["payload_type"], "public");
        assert_eq!(value["vote_end"]["epoch"], 6);
        assert_eq!(value["committee_end"]["slot_id"], 0);
        assert_eq!(value["proposals"][0]["options"], 3);
        assert_eq!(value["proposals"][0]["external_id"], external_id("p0", "0"));
        assert!(String::from_utf8(json).unwrap().starts_with("{\n \"payload_type\""));
    }

    #[test]
    fn test_certify_and_link_are_write_once() {
        let mut s = store(2);
        let mut plans = stage(&partition(&s, 255), &mut s, VoteWindow::default()).unwrap();
        let plan = &mut plans[0];
        plan.certify("vp1".into(), "signedcert1".into()).unwrap();
        assert_eq!(
            plan.certify("vp2".into(), "x".into()),
            Err(ConsistencyError::VotePlanAlreadyCertified(0))
        );
        assert_eq!(plan.vote_plan_id(), Some("vp1"));

        link(plan, &mut s).unwrap();
        assert!(s.iter().all(|p| p.is_linked()));
        assert_eq!(s.get(1).unwrap().index, Some(1));
        assert!(matches!(
            link(plan, &mut s),
            Err(ConsistencyError::AlreadyAssigned { .. })
        ));
    }
}
