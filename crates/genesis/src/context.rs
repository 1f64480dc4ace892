// Path: crates/genesis/src/context.rs
//! Per-run state of the bootstrap.
//!
//! [`BootstrapContext`] owns the proposals, the fund and the vote plan arena
//! while the pipeline mutates them. Once genesis is assembled it is consumed
//! into a [`FinalizedStore`], the only form handed to readers such as the
//! proxy.

use crate::builder::{GenesisBlock, GenesisBuilder};
use crate::certificate::{stage, CertificatePipeline, VotePlan};
use crate::partition::partition;
use crate::schedule::{DisplayFormat, Schedule};
use vit_types::app::{Fund, Proposal, ProposalStore, VotePlanSummary};
use vit_types::error::{BootstrapError, ConfigError, ConsistencyError};

/// Mutable state of one bootstrap run.
#[derive(Debug, Default)]
pub struct BootstrapContext {
    proposals: ProposalStore,
    fund: Fund,
    vote_plans: Vec<VotePlan>,
}

impl BootstrapContext {
    /// Takes ownership of the loaded round data.
    pub fn new(proposals: Vec<Proposal>, fund: Fund) -> Self {
        Self {
            proposals: ProposalStore::new(proposals),
            fund,
            vote_plans: Vec::new(),
        }
    }

    pub fn proposals(&self) -> &ProposalStore {
        &self.proposals
    }

    pub fn fund(&self) -> &Fund {
        &self.fund
    }

    pub fn vote_plans(&self) -> &[VotePlan] {
        &self.vote_plans
    }

    /// Partitions the proposals and hashes them into an uncertified arena.
    /// Returns the number of vote plans.
    pub fn stage(&mut self, capacity: usize, schedule: &Schedule) -> Result<usize, ConsistencyError> {
        let batches = partition(&self.proposals, capacity);
        self.vote_plans = stage(&batches, &mut self.proposals, schedule.window)?;
        tracing::info!(
            target: "partition",
            proposals = self.proposals.len(),
            vote_plans = self.vote_plans.len(),
            "proposals partitioned"
        );
        Ok(self.vote_plans.len())
    }

    /// Certifies the staged arena.
    pub async fn certify(
        &mut self,
        pipeline: &CertificatePipeline<'_>,
        schedule: &Schedule,
        display: &DisplayFormat,
    ) -> Result<(), BootstrapError> {
        pipeline
            .run(&mut self.vote_plans, &mut self.proposals, &mut self.fund, schedule, display)
            .await
    }

    /// Fills the fund's empty display fields from the schedule.
    pub fn apply_fund_defaults(&mut self, schedule: &Schedule, display: &DisplayFormat) -> Result<(), ConfigError> {
        let fund = &mut self.fund;
        if fund.start_time.is_empty() {
            fund.start_time = display.format(schedule.vote_start)?;
        }
        if fund.end_time.is_empty() {
            fund.end_time = display.format(schedule.vote_end)?;
        }
        if fund.voting_power_info.is_empty() {
            fund.voting_power_info = fund.start_time.clone();
        }
        if fund.rewards_info.is_empty() {
            fund.rewards_info = display.format(schedule.rewards_time()?)?;
        }
        Ok(())
    }

    /// Stages every signed certificate into block zero.
    pub fn embed_certificates(&self, builder: &mut GenesisBuilder) -> Result<(), ConsistencyError> {
        for plan in &self.vote_plans {
            let cert = plan
                .certificate()
                .ok_or(ConsistencyError::NotCertified(plan.index.0))?;
            builder.add_certificate(cert);
        }
        Ok(())
    }

    /// Seals the run. Fails unless every vote plan is certified and every
    /// proposal is linked to one.
    pub fn finalize(self, genesis: GenesisBlock) -> Result<FinalizedStore, ConsistencyError> {
        if let Some(plan) = self.vote_plans.iter().find(|p| p.vote_plan_id().is_none()) {
            return Err(ConsistencyError::NotCertified(plan.index.0));
        }
        if let Some(p) = self.proposals.iter().find(|p| !p.is_linked()) {
            return Err(ConsistencyError::Unlinked(p.id.clone()));
        }
        Ok(FinalizedStore {
            proposals: self.proposals,
            fund: self.fund,
            vote_plans: self.vote_plans,
            genesis,
        })
    }
}

/// The sealed round data. Read-only.
#[derive(Debug, Clone)]
pub struct FinalizedStore {
    proposals: ProposalStore,
    fund: Fund,
    vote_plans: Vec<VotePlan>,
    genesis: GenesisBlock,
}

impl FinalizedStore {
    pub fn proposals(&self) -> &ProposalStore {
        &self.proposals
    }

    pub fn fund(&self) -> &Fund {
        &self.fund
    }

    pub fn vote_plans(&self) -> &[VotePlan] {
        &self.vote_plans
    }

    pub fn genesis(&self) -> &GenesisBlock {
        &self.genesis
    }

    /// The persisted vote plan summary a proposal points at.
    pub fn vote_plan_of(&self, proposal: &Proposal) -> Option<&VotePlanSummary> {
        proposal.vote_plan.and_then(|index| self.fund.vote_plan(index))
    }
}
