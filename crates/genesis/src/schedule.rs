// Path: crates/genesis/src/schedule.rs
//! Validation and derivation of the vote's temporal schedule.
//!
//! The user supplies up to six instants and durations as strings. This module
//! parses them, applies the defaulting rules and checks every boundary against
//! genesis time and slot granularity. The resulting [`Schedule`] is immutable
//! and carries the three [`ChainTime`] boundaries shared by all vote plans.

use crate::duration::parse_duration;
use std::time::Duration;
use time::format_description::{well_known::Rfc3339, OwnedFormatItem};
use time::OffsetDateTime;
use vit_types::app::{ChainTime, VoteWindow};
use vit_types::config::ScheduleConfig;
use vit_types::error::ConfigError;

const MAX_SLOT_SECS: u64 = 255;

/// Parsed, not yet validated, schedule inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleParams {
    /// Block zero date; "now" when unset.
    pub genesis_time: Option<OffsetDateTime>,
    /// Slot length.
    pub slot_duration: Duration,
    /// Epoch length.
    pub epoch_duration: Duration,
    /// Explicit vote start.
    pub vote_start: Option<OffsetDateTime>,
    /// Explicit vote end.
    pub vote_end: Option<OffsetDateTime>,
    /// Explicit committee end.
    pub committee_end: Option<OffsetDateTime>,
    /// Fallback voting period length.
    pub vote_duration: Duration,
    /// Fallback committee period length.
    pub committee_duration: Duration,
}

fn parse_instant(field: &'static str, value: &Option<String>) -> Result<Option<OffsetDateTime>, ConfigError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => OffsetDateTime::parse(raw, &Rfc3339)
            .map(Some)
            .map_err(|e| ConfigError::InvalidTimestamp {
                field,
                value: raw.to_string(),
                reason: e.to_string(),
            }),
    }
}

fn parse_span(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    parse_duration(value).map_err(|reason| ConfigError::InvalidDuration {
        field,
        value: value.to_string(),
        reason,
    })
}

impl ScheduleParams {
    /// Parses the string form used by the configuration file and flags.
    pub fn from_config(cfg: &ScheduleConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            genesis_time: parse_instant("genesis_time", &cfg.genesis_time)?,
            slot_duration: parse_span("slot_duration", &cfg.slot_duration)?,
            epoch_duration: parse_span("epoch_duration", &cfg.epoch_duration)?,
            vote_start: parse_instant("vote_start", &cfg.vote_start)?,
            vote_end: parse_instant("vote_end", &cfg.vote_end)?,
            committee_end: parse_instant("committee_end", &cfg.committee_end)?,
            vote_duration: parse_span("vote_duration", &cfg.vote_duration)?,
            committee_duration: parse_span("committee_duration", &cfg.committee_duration)?,
        })
    }
}

/// A validated schedule.
///
/// `genesis_time <= vote_start <= vote_end <= committee_end`, and every
/// boundary lies a whole number of slots after `genesis_time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Block zero date, whole seconds.
    pub genesis_time: OffsetDateTime,
    /// First instant of the voting period.
    pub vote_start: OffsetDateTime,
    /// End of the voting period.
    pub vote_end: OffsetDateTime,
    /// End of the committee period.
    pub committee_end: OffsetDateTime,
    /// Slot length in seconds, `1..=255`.
    pub slot_duration: u8,
    /// Number of slots in one epoch.
    pub slots_per_epoch: u32,
    /// Epoch length.
    pub epoch_duration: Duration,
    /// The boundaries in chain time.
    pub window: VoteWindow,
}

fn check_whole_seconds(field: &'static str, d: Duration) -> Result<(), ConfigError> {
    if d.is_zero() {
        return Err(ConfigError::ZeroDuration { field });
    }
    if d.subsec_nanos() != 0 {
        return Err(ConfigError::SubSecond { field });
    }
    Ok(())
}

fn check_slot_multiple(field: &'static str, d: Duration, slot: Duration) -> Result<(), ConfigError> {
    check_whole_seconds(field, d)?;
    if d.as_secs() % slot.as_secs() != 0 {
        return Err(ConfigError::NotSlotMultiple {
            field,
            value: d,
            slot,
        });
    }
    Ok(())
}

fn rfc3339(t: OffsetDateTime) -> String {
    t.format(&Rfc3339).unwrap_or_else(|_| t.to_string())
}

fn offset_by(field: &'static str, base: OffsetDateTime, d: Duration) -> Result<OffsetDateTime, ConfigError> {
    time::Duration::try_from(d)
        .ok()
        .and_then(|d| base.checked_add(d))
        .ok_or_else(|| ConfigError::InvalidTimestamp {
            field,
            value: format!("{} + {d:?}", rfc3339(base)),
            reason: "out of range".to_string(),
        })
}

struct Boundary {
    field: &'static str,
    value: OffsetDateTime,
    bound_field: &'static str,
    bound: OffsetDateTime,
}

impl Schedule {
    /// Validates `params` and derives the defaulted boundaries.
    ///
    /// `now` stands in for an unset genesis time and is truncated to whole
    /// seconds. Durations are checked in the order slot, epoch, vote,
    /// committee; the vote and committee durations are checked even when the
    /// matching end instant is given explicitly.
    pub fn validate(params: &ScheduleParams, now: OffsetDateTime) -> Result<Self, ConfigError> {
        let slot = params.slot_duration;
        check_whole_seconds("slot_duration", slot)?;
        if slot.as_secs() > MAX_SLOT_SECS {
            return Err(ConfigError::SlotDurationTooLong(slot));
        }
        check_slot_multiple("epoch_duration", params.epoch_duration, slot)?;
        check_slot_multiple("vote_duration", params.vote_duration, slot)?;
        check_slot_multiple("committee_duration", params.committee_duration, slot)?;

        let slot_duration = u8::try_from(slot.as_secs()).map_err(|_| ConfigError::SlotDurationTooLong(slot))?;
        let slots_per_epoch = u32::try_from(params.epoch_duration.as_secs() / slot.as_secs())
            .map_err(|_| ConfigError::TooManySlotsPerEpoch(params.epoch_duration))?;

        let genesis_time = match params.genesis_time {
            Some(t) if t.nanosecond() != 0 => {
                return Err(ConfigError::InvalidTimestamp {
                    field: "genesis_time",
                    value: rfc3339(t),
                    reason: "smallest unit is [1s]".to_string(),
                })
            }
            Some(t) => t,
            None => now.replace_nanosecond(0).unwrap_or(now),
        };
        let vote_start = params.vote_start.unwrap_or(genesis_time);
        let vote_end = match params.vote_end {
            Some(t) => t,
            None => offset_by("vote_end", vote_start, params.vote_duration)?,
        };
        let committee_end = match params.committee_end {
            Some(t) => t,
            None => offset_by("committee_end", vote_end, params.committee_duration)?,
        };

        let boundaries = [
            Boundary {
                field: "vote_start",
                value: vote_start,
                bound_field: "genesis_time",
                bound: genesis_time,
            },
            Boundary {
                field: "vote_end",
                value: vote_end,
                bound_field: "vote_start",
                bound: vote_start,
            },
            Boundary {
                field: "committee_end",
                value: committee_end,
                bound_field: "vote_end",
                bound: vote_end,
            },
        ];
        let slot_nanos = i128::from(slot_duration) * 1_000_000_000;
        for b in &boundaries {
            if b.value < b.bound {
                return Err(ConfigError::OutOfOrder {
                    field: b.field,
                    value: rfc3339(b.value),
                    bound_field: b.bound_field,
                    bound: rfc3339(b.bound),
                });
            }
            if (b.value - genesis_time).whole_nanoseconds() % slot_nanos != 0 {
                return Err(ConfigError::Misaligned {
                    field: b.field,
                    value: rfc3339(b.value),
                    slot,
                    genesis: rfc3339(genesis_time),
                });
            }
        }

        let genesis = genesis_time.unix_timestamp();
        let to_chain = |t: OffsetDateTime| {
            ChainTime::from_unix(genesis, slot_duration, slots_per_epoch, t.unix_timestamp())
        };
        let window = VoteWindow {
            vote_start: to_chain(vote_start),
            vote_end: to_chain(vote_end),
            committee_end: to_chain(committee_end),
        };

        tracing::debug!(
            target: "schedule",
            slots_per_epoch,
            vote_start = %window.vote_start,
            vote_end = %window.vote_end,
            committee_end = %window.committee_end,
            "schedule validated"
        );

        Ok(Self {
            genesis_time,
            vote_start,
            vote_end,
            committee_end,
            slot_duration,
            slots_per_epoch,
            epoch_duration: params.epoch_duration,
            window,
        })
    }

    /// The block zero date in unix seconds.
    pub fn block0_date(&self) -> i64 {
        self.genesis_time.unix_timestamp()
    }

    /// The instant the round's rewards are published: one epoch after the
    /// committee period ends.
    pub fn rewards_time(&self) -> Result<OffsetDateTime, ConfigError> {
        offset_by("rewards_info", self.committee_end, self.epoch_duration)
    }
}

/// How instants are rendered into the fund and vote plan records.
#[derive(Debug, Clone, Default)]
pub enum DisplayFormat {
    /// RFC3339.
    #[default]
    Rfc3339,
    /// A `time` format description, e.g. `[year]-[month]-[day] [hour]:[minute]:[second]`.
    Custom(OwnedFormatItem),
}

impl DisplayFormat {
    /// Parses an optional format description; `None` selects RFC3339.
    pub fn parse(description: Option<&str>) -> Result<Self, ConfigError> {
        match description.map(str::trim) {
            None | Some("") => Ok(Self::Rfc3339),
            Some(raw) => time::format_description::parse_owned::<1>(raw)
                .map(Self::Custom)
                .map_err(|e| ConfigError::InvalidTimeFormat {
                    value: raw.to_string(),
                    reason: e.to_string(),
                }),
        }
    }

    /// Renders `t`.
    pub fn format(&self, t: OffsetDateTime) -> Result<String, ConfigError> {
        let formatted = match self {
            Self::Rfc3339 => t.format(&Rfc3339),
            Self::Custom(items) => t.format(items),
        };
        formatted.map_err(|e| ConfigError::InvalidTimeFormat {
            value: t.to_string(),
            reason: e.to_string(),
        })
    }
}
