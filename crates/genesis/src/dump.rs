// Path: crates/genesis/src/dump.rs
//! Diagnostic dumps of the round's data.
//!
//! Nothing here is needed for a correct genesis. When enabled, each vote plan
//! leaves its descriptor and signed certificate behind, and the finished fund,
//! vote plans and proposals are written as flat CSV tables.

use serde::Serialize;
use std::path::{Path, PathBuf};
use vit_types::app::{Fund, PayloadType, ProposalStore};
use vit_types::error::BootstrapError;
use vit_types::prelude::IoResultExt;

/// Output file of the fund table.
pub const FUNDS_CSV: &str = "sql_funds.csv";
/// Output file of the vote plan table.
pub const VOTE_PLANS_CSV: &str = "sql_voteplans.csv";
/// Output file of the proposal table.
pub const PROPOSALS_CSV: &str = "sql_proposals.csv";

#[derive(Serialize)]
struct FundRow<'a> {
    id: i64,
    fund_name: &'a str,
    fund_goal: &'a str,
    voting_power_info: &'a str,
    rewards_info: &'a str,
    fund_start_time: &'a str,
    fund_end_time: &'a str,
    next_fund_start_time: &'a str,
}

#[derive(Serialize)]
struct VotePlanRow<'a> {
    id: &'a str,
    chain_voteplan_id: &'a str,
    chain_vote_start_time: &'a str,
    chain_vote_end_time: &'a str,
    chain_committee_end_time: &'a str,
    chain_voteplan_payload: PayloadType,
    fund_id: i64,
}

#[derive(Serialize)]
struct ProposalRow<'a> {
    id: &'a str,
    proposal_id: &'a str,
    proposal_title: &'a str,
    chain_proposal_id: &'a str,
    chain_proposal_index: Option<u8>,
    chain_vote_options: String,
    chain_voteplan_id: &'a str,
    chain_vote_action: &'a str,
    chain_vote_type: PayloadType,
}

/// A dump directory.
#[derive(Debug, Clone)]
pub struct RawDump {
    dir: PathBuf,
}

impl RawDump {
    /// Creates `dir` if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, BootstrapError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).at_path(&dir)?;
        Ok(Self { dir })
    }

    /// The dump directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `voteplan_<id>.json` and `voteplan_<id>.cert`.
    ///
    /// The id must be non-empty hex so the files stay inside the dump directory.
    pub fn write_vote_plan(
        &self,
        vote_plan_id: &str,
        descriptor: &[u8],
        certificate: &[u8],
    ) -> Result<(), BootstrapError> {
        if vote_plan_id.is_empty() || !vote_plan_id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(BootstrapError::Encode(format!("vote plan id {vote_plan_id:?} is not hex")));
        }
        let json = self.dir.join(format!("voteplan_{vote_plan_id}.json"));
        std::fs::write(&json, descriptor).at_path(&json)?;
        let cert = self.dir.join(format!("voteplan_{vote_plan_id}.cert"));
        std::fs::write(&cert, certificate).at_path(&cert)?;
        Ok(())
    }

    /// Writes the three CSV tables.
    pub fn write_tables(&self, fund: &Fund, proposals: &ProposalStore) -> Result<(), BootstrapError> {
        self.write_csv(
            FUNDS_CSV,
            [FundRow {
                id: fund.fund_id,
                fund_name: &fund.fund_name,
                fund_goal: &fund.fund_goal,
                voting_power_info: &fund.voting_power_info,
                rewards_info: &fund.rewards_info,
                fund_start_time: &fund.start_time,
                fund_end_time: &fund.end_time,
                next_fund_start_time: &fund.next_start_time,
            }],
        )?;

        self.write_csv(
            VOTE_PLANS_CSV,
            fund.vote_plans.iter().map(|vp| VotePlanRow {
                id: &vp.vp_internal_id,
                chain_voteplan_id: &vp.vote_plan_id,
                chain_vote_start_time: &vp.vote_start,
                chain_vote_end_time: &vp.vote_end,
                chain_committee_end_time: &vp.committee_end,
                chain_voteplan_payload: vp.payload,
                fund_id: vp.fund_id,
            }),
        )?;

        self.write_csv(
            PROPOSALS_CSV,
            proposals.iter().map(|p| ProposalRow {
                id: &p.id,
                proposal_id: &p.internal_id,
                proposal_title: &p.title,
                chain_proposal_id: p.external_id.as_deref().unwrap_or_default(),
                chain_proposal_index: p.index,
                chain_vote_options: p.vote_options.join(","),
                chain_voteplan_id: p
                    .vote_plan
                    .and_then(|i| fund.vote_plan(i))
                    .map(|vp| vp.vote_plan_id.as_str())
                    .unwrap_or_default(),
                chain_vote_action: &p.vote_action,
                chain_vote_type: p.vote_type,
            }),
        )?;

        tracing::info!(target: "dump", dir = %self.dir.display(), "round data dumped");
        Ok(())
    }

    fn write_csv<R: Serialize>(
        &self,
        name: &str,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<(), BootstrapError> {
        let path = self.dir.join(name);
        let encode = |e: csv::Error| BootstrapError::Encode(format!("{name}: {e}"));
        let mut writer = csv::Writer::from_path(&path).map_err(encode)?;
        for row in rows {
            writer.serialize(row).map_err(encode)?;
        }
        writer.flush().at_path(&path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vit_types::app::{Proposal, VotePlanIndex, VotePlanSummary};

    #[test]
    fn test_tables_link_proposals_to_plans() {
        let dir = tempfile::tempdir().unwrap();
        let dump = RawDump::create(dir.path().join("raw")).unwrap();

        let mut fund = Fund {
            fund_id: 3,
            fund_name: "Fund 3".into(),
            ..Default::default()
        };
        fund.reserve_vote_plans(1);
        fund.record_vote_plan(
            VotePlanIndex(0),
            VotePlanSummary {
                vote_plan_id: "vp-abc".into(),
                ..Default::default()
            },
        )
        .unwrap();

        let mut store = ProposalStore::new(vec![Proposal {
            id: "p0".into(),
            internal_id: "0".into(),
            vote_options: vec!["yes".into(), "no".into()],
            ..Default::default()
        }]);
        store.assign_external_id(0, "ext0".into()).unwrap();
        store.link("ext0", 0, VotePlanIndex(0)).unwrap();

        dump.write_tables(&fund, &store).unwrap();

        let funds = std::fs::read_to_string(dump.dir().join(FUNDS_CSV)).unwrap();
        assert!(funds.starts_with("id,fund_name,"));
        assert!(funds.contains("3,Fund 3,"));

        let plans = std::fs::read_to_string(dump.dir().join(VOTE_PLANS_CSV)).unwrap();
        assert!(plans.contains("1,vp-abc,"));

        let mut reader = csv::Reader::from_path(dump.dir().join(PROPOSALS_CSV)).unwrap();
        let headers = reader.headers().unwrap().clone();
        let row = reader.records().next().unwrap().unwrap();
        let field = |name: &str| {
            let i = headers.iter().position(|h| h == name).unwrap();
            row.get(i).unwrap().to_string()
        };
        assert_eq!(field("chain_proposal_id"), "ext0");
        assert_eq!(field("chain_voteplan_id"), "vp-abc");
        assert_eq!(field("chain_vote_options"), "yes,no");
        assert_eq!(field("chain_vote_type"), "public");
    }

    #[test]
    fn test_vote_plan_files_are_named_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let dump = RawDump::create(dir.path()).unwrap();
        dump.write_vote_plan("abc", b"{}", b"signedcert1").unwrap();
        assert_eq!(std::fs::read(dir.path().join("voteplan_abc.json")).unwrap(), b"{}");
        assert_eq!(std::fs::read(dir.path().join("voteplan_abc.cert")).unwrap(), b"signedcert1");
    }

    #[test]
    fn test_non_hex_vote_plan_id_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dump = RawDump::create(dir.path().join("dump")).unwrap();
        for id in ["../evil", "", "ab/cd", "0x1f"] {
            let err = dump.write_vote_plan(id, b"{}", b"cert").unwrap_err();
            assert!(matches!(err, BootstrapError::Encode(_)), "{id:?} gave {err:?}");
        }
        assert_eq!(std::fs::read_dir(dump.dir()).unwrap().count(), 0);
        assert!(!dir.path().join("voteplan_.json").exists());
        assert!(!dir.path().join("evil.json").exists());
    }
}
