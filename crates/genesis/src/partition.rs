// Path: crates/genesis/src/partition.rs
//! Splits the round's proposals into capacity-bounded vote plan batches.
//!
//! Proposals are grouped by payload type and each group is cut into
//! contiguous slices of `capacity`. Batches of one group occupy a contiguous
//! range of arena indices, so indices never collide across groups.

use std::collections::BTreeMap;
use vit_types::app::{PayloadType, ProposalStore, VotePlanIndex};
use vit_types::VOTE_PLAN_PROPOSALS_MAX;

/// One vote plan's worth of proposals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Arena slot the batch will certify.
    pub index: VotePlanIndex,
    /// Payload type shared by every member.
    pub payload: PayloadType,
    /// Positions in the [`ProposalStore`], in assignment order.
    pub members: Vec<usize>,
}

/// `ceil(group_size / capacity)`.
pub fn batches_needed(group_size: usize, capacity: usize) -> usize {
    group_size.div_ceil(capacity.max(1))
}

/// Partitions `store` into batches of at most `capacity` proposals.
///
/// `capacity` is clamped to `1..=255`. The total number of batches is the
/// sum of [`batches_needed`] over the payload groups; an empty store yields
/// no batches.
pub fn partition(store: &ProposalStore, capacity: usize) -> Vec<Batch> {
    let capacity = capacity.clamp(1, VOTE_PLAN_PROPOSALS_MAX);

    let mut groups: BTreeMap<PayloadType, Vec<usize>> = BTreeMap::new();
    for (position, proposal) in store.iter().enumerate() {
        groups.entry(proposal.vote_type).or_default().push(position);
    }

    let mut batches = Vec::new();
    for (payload, members) in groups {
        let needed = batches_needed(members.len(), capacity);
        let first = batches.len();
        for chunk in members.chunks(capacity) {
            batches.push(Batch {
                index: VotePlanIndex(batches.len()),
                payload,
                members: chunk.to_vec(),
            });
        }
        debug_assert_eq!(batches.len() - first, needed);
        tracing::debug!(
            target: "partition",
            %payload,
            proposals = members.len(),
            vote_plans = needed,
            "payload group partitioned"
        );
    }
    batches
}
