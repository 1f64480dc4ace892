// Path: crates/types/src/app/fund.rs
use crate::app::{PayloadType, VotePlanIndex};
use crate::error::ConsistencyError;
use serde::{Deserialize, Serialize};

/// The persisted, display-oriented summary of one vote plan.
///
/// This is what proposals point at (through [`VotePlanIndex`]) and what the
/// proxy serves; timestamps are pre-formatted with the round's display format.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VotePlanSummary {
    /// 1-based position of the plan within the round.
    pub vp_internal_id: String,
    /// The identifier assigned by the ledger tooling.
    pub vote_plan_id: String,
    /// Formatted vote start instant.
    pub vote_start: String,
    /// Formatted vote end instant.
    pub vote_end: String,
    /// Formatted committee end instant.
    pub committee_end: String,
    /// The payload kind of every proposal in the plan.
    pub payload: PayloadType,
    /// The owning fund.
    pub fund_id: i64,
}

/// The single governance-round record.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Fund {
    /// Identifier of the round.
    pub fund_id: i64,
    /// Display name of the round.
    #[serde(default)]
    pub fund_name: String,
    /// Free-form description of the round's goal.
    #[serde(default)]
    pub fund_goal: String,
    /// Formatted start of voting; defaulted from the schedule when empty.
    #[serde(default)]
    pub start_time: String,
    /// Formatted end of voting; defaulted from the schedule when empty.
    #[serde(default)]
    pub end_time: String,
    /// Formatted start of the next round, if known.
    #[serde(default)]
    pub next_start_time: String,
    /// Formatted snapshot instant for voting power.
    #[serde(default)]
    pub voting_power_info: String,
    /// Formatted instant at which rewards are published.
    #[serde(default)]
    pub rewards_info: String,
    /// Vote plans produced this run, index-aligned with the vote plan arena.
    #[serde(skip_deserializing)]
    pub vote_plans: Vec<VotePlanSummary>,
}

impl Fund {
    /// Sizes the vote plan summaries for a run producing `count` plans.
    ///
    /// Each slot is later populated exactly once through [`Fund::record_vote_plan`].
    pub fn reserve_vote_plans(&mut self, count: usize) {
        self.vote_plans = vec![VotePlanSummary::default(); count];
    }

    /// Stores the summary for the plan at `index`. Write-once.
    pub fn record_vote_plan(
        &mut self,
        index: VotePlanIndex,
        mut summary: VotePlanSummary,
    ) -> Result<(), ConsistencyError> {
        let fund_id = self.fund_id;
        let slot = self
            .vote_plans
            .get_mut(index.0)
            .ok_or(ConsistencyError::UnknownVotePlan(index.0))?;
        if !slot.vote_plan_id.is_empty() {
            return Err(ConsistencyError::VotePlanAlreadyCertified(index.0));
        }
        summary.fund_id = fund_id;
        summary.vp_internal_id = (index.0 + 1).to_string();
        *slot = summary;
        Ok(())
    }

    /// Returns the summary a proposal's back-reference points at.
    pub fn vote_plan(&self, index: VotePlanIndex) -> Option<&VotePlanSummary> {
        self.vote_plans.get(index.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_vote_plan_is_write_once() {
        let mut fund = Fund {
            fund_id: 9,
            ..Default::default()
        };
        fund.reserve_vote_plans(2);
        let summary = VotePlanSummary {
            vote_plan_id: "abc".into(),
            payload: PayloadType::Private,
            ..Default::default()
        };
        fund.record_vote_plan(VotePlanIndex(1), summary.clone()).unwrap();

        let stored = fund.vote_plan(VotePlanIndex(1)).unwrap();
        assert_eq!(stored.vp_internal_id, "2");
        assert_eq!(stored.fund_id, 9);
        assert_eq!(stored.payload, PayloadType::Private);

        assert!(matches!(
            fund.record_vote_plan(VotePlanIndex(1), summary.clone()),
            Err(ConsistencyError::VotePlanAlreadyCertified(1))
        ));
        assert!(matches!(
            fund.record_vote_plan(VotePlanIndex(2), summary),
            Err(ConsistencyError::UnknownVotePlan(2))
        ));
    }
}
