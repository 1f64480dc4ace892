// Path: crates/types/src/app/vote.rs
use crate::error::ConsistencyError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The voting protocol variant a proposal uses.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PayloadType {
    /// Votes are cast in the clear.
    #[default]
    Public,
    /// Votes are encrypted and decrypted by the committee at tally time.
    Private,
}

impl PayloadType {
    /// The identifier used by the ledger tooling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stable index into the round's vote plan arena.
///
/// Proposals refer to their vote plan by index rather than by handle, so the
/// proposal and vote plan records never own each other.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct VotePlanIndex(pub usize);

/// An externally loaded proposal record.
///
/// `external_id`, `index` and `vote_plan` are written exactly once, by the
/// certificate pipeline; the loader never supplies them.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Proposal {
    /// The proposal's stable identifier.
    pub id: String,
    /// The identifier assigned by the proposal management system.
    pub internal_id: String,
    /// Human readable title, carried through to the dumps.
    #[serde(default)]
    pub title: String,
    /// The payload kind votes on this proposal use.
    #[serde(default)]
    pub vote_type: PayloadType,
    /// The options a voter may choose from.
    pub vote_options: Vec<String>,
    /// The on-chain action taken if the proposal passes (e.g. `off_chain`).
    #[serde(default = "default_vote_action")]
    pub vote_action: String,
    /// Hex-encoded content hash, derived from `id` and `internal_id`.
    #[serde(skip_deserializing)]
    pub external_id: Option<String>,
    /// Position of the proposal within its vote plan.
    #[serde(skip_deserializing)]
    pub index: Option<u8>,
    /// Back-reference to the vote plan carrying this proposal.
    #[serde(skip_deserializing)]
    pub vote_plan: Option<VotePlanIndex>,
}

fn default_vote_action() -> String {
    "off_chain".to_string()
}

impl Proposal {
    /// The number of options, as carried in a vote plan descriptor.
    pub fn option_count(&self) -> Result<u8, ConsistencyError> {
        u8::try_from(self.vote_options.len()).map_err(|_| ConsistencyError::TooManyOptions {
            proposal: self.id.clone(),
            count: self.vote_options.len(),
        })
    }

    /// Whether the pipeline has fully linked this proposal to a vote plan.
    pub fn is_linked(&self) -> bool {
        self.external_id.is_some() && self.index.is_some() && self.vote_plan.is_some()
    }
}

/// The ordered collection of proposals for a round.
///
/// Owned by the bootstrap context; lookups by external id go through an index
/// maintained alongside the records.
#[derive(Clone, Debug, Default)]
pub struct ProposalStore {
    proposals: Vec<Proposal>,
    by_external_id: HashMap<String, usize>,
}

impl ProposalStore {
    /// Creates a store from loader output, preserving its order.
    pub fn new(proposals: Vec<Proposal>) -> Self {
        Self {
            proposals,
            by_external_id: HashMap::new(),
        }
    }

    /// The number of proposals.
    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    /// Whether the store holds no proposals.
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    /// All proposals, in loader order.
    pub fn all(&self) -> &[Proposal] {
        &self.proposals
    }

    /// Iterates the proposals in loader order.
    pub fn iter(&self) -> std::slice::Iter<'_, Proposal> {
        self.proposals.iter()
    }

    /// Returns the proposal at `position`.
    pub fn get(&self, position: usize) -> Option<&Proposal> {
        self.proposals.get(position)
    }

    /// Records the content hash of the proposal at `position`.
    ///
    /// Writing the same value twice is accepted; a different value, or a value
    /// already claimed by another proposal, is a consistency error.
    pub fn assign_external_id(
        &mut self,
        position: usize,
        external_id: String,
    ) -> Result<(), ConsistencyError> {
        let proposal = self
            .proposals
            .get_mut(position)
            .ok_or(ConsistencyError::UnknownProposal(position))?;
        if let Some(existing) = &proposal.external_id {
            if *existing != external_id {
                return Err(ConsistencyError::AlreadyAssigned {
                    proposal: proposal.id.clone(),
                    field: "external_id",
                });
            }
            return Ok(());
        }
        if let Some(&other) = self.by_external_id.get(&external_id) {
            if other != position {
                return Err(ConsistencyError::DuplicateExternalId(external_id));
            }
        }
        proposal.external_id = Some(external_id.clone());
        self.by_external_id.insert(external_id, position);
        Ok(())
    }

    /// Resolves a proposal position by its external id.
    pub fn position_of(&self, external_id: &str) -> Option<usize> {
        self.by_external_id.get(external_id).copied()
    }

    /// Links the proposal identified by `external_id` to its vote plan. Write-once.
    pub fn link(
        &mut self,
        external_id: &str,
        index: u8,
        vote_plan: VotePlanIndex,
    ) -> Result<(), ConsistencyError> {
        let position = self
            .position_of(external_id)
            .ok_or_else(|| ConsistencyError::UnknownExternalId(external_id.to_string()))?;
        let proposal = self
            .proposals
            .get_mut(position)
            .ok_or(ConsistencyError::UnknownProposal(position))?;
        if proposal.index.is_some() || proposal.vote_plan.is_some() {
            return Err(ConsistencyError::AlreadyAssigned {
                proposal: proposal.id.clone(),
                field: "vote_plan",
            });
        }
        proposal.index = Some(index);
        proposal.vote_plan = Some(vote_plan);
        Ok(())
    }
}
