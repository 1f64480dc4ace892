// Path: crates/genesis/src/bootstrap.rs
//! The end-to-end bootstrap: schedule, leaders, vote plans, block zero.
//!
//! Every stage returns a typed error and the first failure ends the run.
//! Configuration is validated before the first collaborator call, and no
//! partially built state escapes: callers only ever receive a
//! [`FinalizedStore`].

use crate::builder::{GenesisBuilder, InitialFund};
use crate::certificate::CertificatePipeline;
use crate::collaborator::{CallPolicy, Ledger, Signer};
use crate::context::{BootstrapContext, FinalizedStore};
use crate::dump::RawDump;
use crate::leaders::{generate_leaders, load_leaders, write_secret_configs};
use crate::schedule::{DisplayFormat, Schedule, ScheduleParams};
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::OffsetDateTime;
use vit_types::app::{Fund, Leader, Proposal};
use vit_types::config::BootstrapConfig;
use vit_types::error::BootstrapError;
use vit_types::prelude::{IoResultExt, OptionExt};
use vit_types::{LEADER_FUND_VALUE, VOTE_PLAN_PROPOSALS_MAX};

/// Binary block zero, passed to the node with `--genesis-block`.
pub const BLOCK0_BIN: &str = "VIT-block0.bin";
/// Decoded block zero, kept for inspection.
pub const BLOCK0_YAML: &str = "VIT-block0.yaml";

/// Loaded round data.
#[derive(Debug, Clone, Default)]
pub struct RoundData {
    /// Proposals, in loader order.
    pub proposals: Vec<Proposal>,
    /// The round's fund record.
    pub fund: Fund,
    /// Legacy addresses credited in block zero.
    pub legacy_funds: Vec<InitialFund>,
    /// Raw YAML appended to the block zero descriptor.
    pub supplementary_genesis: Option<Vec<u8>>,
}

/// The external tools a run talks to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Keys, addresses and vote plan certificates.
    pub signer: &'a dyn Signer,
    /// Encodes, hashes and decodes block zero.
    pub ledger: &'a dyn Ledger,
}

/// Everything a successful run produced.
#[derive(Debug)]
pub struct BootstrapOutput {
    /// The sealed round data.
    pub store: FinalizedStore,
    /// The validated schedule.
    pub schedule: Schedule,
    /// The chain's leaders, with their secret files.
    pub leaders: Vec<Leader>,
    /// Node secret configuration files, one per leader.
    pub secret_files: Vec<PathBuf>,
    /// Path of [`BLOCK0_BIN`].
    pub block0_file: PathBuf,
    /// Number of committee members in block zero.
    pub committee_count: usize,
}

/// Configuration checked before any external call.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    /// The checked configuration.
    pub config: BootstrapConfig,
    /// Chain clock derived from the schedule section.
    pub schedule: Schedule,
    /// How instants are rendered into the fund and vote plan records.
    pub display: DisplayFormat,
    /// Deadline of every external tool call.
    pub policy: CallPolicy,
}

impl ValidatedConfig {
    /// Validates `config`, resolving an unset genesis time to `now`.
    pub fn new(config: BootstrapConfig, now: OffsetDateTime) -> Result<Self, BootstrapError> {
        config.validate()?;
        let params = ScheduleParams::from_config(&config.schedule)?;
        let schedule = Schedule::validate(&params, now)?;
        let display = DisplayFormat::parse(config.time_format.as_deref())?;
        let policy = CallPolicy::with_timeout(Duration::from_secs(config.external_call_timeout_secs.max(1)));
        Ok(Self {
            config,
            schedule,
            display,
            policy,
        })
    }
}

/// Runs the bootstrap in `working_dir`.
pub async fn run(
    validated: ValidatedConfig,
    round: RoundData,
    tools: Collaborators<'_>,
    working_dir: &Path,
) -> Result<BootstrapOutput, BootstrapError> {
    let ValidatedConfig {
        config,
        schedule,
        display,
        policy,
    } = validated;

    let mut leaders = if config.leaders.secret_key_files.is_empty() {
        generate_leaders(
            tools.signer,
            policy,
            config.leader_count(),
            config.discrimination,
            working_dir,
        )
        .await?
    } else {
        load_leaders(
            tools.signer,
            policy,
            &config.leaders.secret_key_files,
            config.discrimination,
        )
        .await?
    };
    let mut builder = GenesisBuilder::new(&schedule, config.discrimination, &config.fees);
    // Duplicate leaders get no consensus slot, so they get no funds or secrets either.
    leaders.retain(|leader| builder.add_consensus_leader(&leader.public_key));
    let signer_key = leaders
        .first()
        .map(|l| l.secret_key_file.clone())
        .required(vit_types::error::ConfigError::ZeroLeaders)?;

    for member in &config.committee {
        builder.add_committee(member);
    }
    for fund in &round.legacy_funds {
        builder.add_legacy_fund(fund.address.clone(), fund.value);
    }
    for leader in &leaders {
        builder.add_initial_fund(leader.account_address.clone(), LEADER_FUND_VALUE);
    }

    let dump = config
        .paths
        .dump_raw
        .as_ref()
        .map(RawDump::create)
        .transpose()?;

    let mut ctx = BootstrapContext::new(round.proposals, round.fund);
    ctx.stage(VOTE_PLAN_PROPOSALS_MAX, &schedule)?;
    let pipeline = CertificatePipeline::new(tools.signer, policy, signer_key).with_dump(dump.as_ref());
    ctx.certify(&pipeline, &schedule, &display).await?;
    if config.embed_vote_plans {
        ctx.embed_certificates(&mut builder)?;
    }
    ctx.apply_fund_defaults(&schedule, &display)?;

    if let Some(dump) = &dump {
        dump.write_tables(ctx.fund(), ctx.proposals())?;
    }

    let genesis = builder
        .assemble(tools.ledger, policy, round.supplementary_genesis.as_deref())
        .await?;
    let block0_file = working_dir.join(BLOCK0_BIN);
    std::fs::write(&block0_file, &genesis.bytes).at_path(&block0_file)?;
    let block0_yaml = working_dir.join(BLOCK0_YAML);
    std::fs::write(&block0_yaml, &genesis.decoded).at_path(&block0_yaml)?;

    let secret_files = write_secret_configs(&mut leaders, working_dir)?;
    let committee_count = builder.committee_count();
    let store = ctx.finalize(genesis)?;

    tracing::info!(
        target: "genesis",
        hash = %store.genesis().hash,
        committee = committee_count,
        vote_plans = store.vote_plans().len(),
        proposals = store.proposals().len(),
        "bootstrap complete"
    );

    Ok(BootstrapOutput {
        store,
        schedule,
        leaders,
        secret_files,
        block0_file,
        committee_count,
    })
}
