// Path: crates/types/src/app/chain_time.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position on the ledger's clock, expressed as a slot within an epoch.
///
/// Values are derived from wall-clock instants and never mutated afterwards.
/// For every value produced by [`ChainTime::from_unix`], `slot_id < slots_per_epoch`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChainTime {
    /// The epoch number, counted from block zero.
    pub epoch: u64,
    /// The slot within the epoch.
    pub slot_id: u32,
}

impl ChainTime {
    /// Converts a unix timestamp into a `ChainTime` relative to block zero.
    ///
    /// Integer arithmetic only, so the result is reproducible bit-for-bit.
    /// The caller guarantees `target >= genesis` and that the distance is a
    /// whole number of slots; a target before genesis saturates to `0.0`.
    pub fn from_unix(genesis: i64, slot_duration: u8, slots_per_epoch: u32, target: i64) -> Self {
        debug_assert!(slot_duration > 0 && slots_per_epoch > 0);
        let slot_duration = i64::from(slot_duration.max(1));
        let slots_per_epoch = i64::from(slots_per_epoch.max(1));

        let slots_total = (target - genesis).div_euclid(slot_duration).max(0);
        let epoch = slots_total.div_euclid(slots_per_epoch);
        let slot = slots_total.rem_euclid(slots_per_epoch);

        Self {
            epoch: epoch as u64,
            slot_id: slot as u32,
        }
    }

    /// The total number of slots elapsed since block zero.
    pub fn slots_since_genesis(&self, slots_per_epoch: u32) -> u64 {
        self.epoch * u64::from(slots_per_epoch) + u64::from(self.slot_id)
    }

    /// Reconstructs the unix timestamp at the start of this slot.
    pub fn to_unix(&self, genesis: i64, slot_duration: u8, slots_per_epoch: u32) -> i64 {
        genesis + (self.slots_since_genesis(slots_per_epoch) as i64) * i64::from(slot_duration)
    }
}

impl fmt::Display for ChainTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.epoch, self.slot_id)
    }
}

/// The three chain-time boundaries shared by every vote plan of a round.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoteWindow {
    /// First slot in which votes are accepted.
    pub vote_start: ChainTime,
    /// First slot after the voting period.
    pub vote_end: ChainTime,
    /// First slot after the committee (tally) period.
    pub committee_end: ChainTime,
}
