// Path: crates/types/src/error/mod.rs
//! Core error types for the VIT genesis bootstrapper.
//!
//! Three families map onto how a failure is handled: [`ConfigError`] is fatal
//! and raised before any external tool runs, [`ExternalToolError`] is fatal and
//! aborts the run, and [`ConsistencyError`] guards the write-once links between
//! proposals and vote plans. Duplicate keys are not errors at all; they are
//! logged and skipped where they are detected.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Malformed or out-of-range configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A duration that must be positive is zero.
    #[error("[{field}] - cannot be 0")]
    ZeroDuration {
        /// The offending setting.
        field: &'static str,
    },
    /// A duration is not a whole number of seconds.
    #[error("[{field}] - smallest unit is [1s]")]
    SubSecond {
        /// The offending setting.
        field: &'static str,
    },
    /// The slot duration exceeds the protocol maximum.
    #[error("[slot_duration: {0:?}] - max allowed value is [255s]")]
    SlotDurationTooLong(Duration),
    /// A duration is not a multiple of the slot duration.
    #[error("[{field}: {value:?}] - should be multiple of [slot_duration: {slot:?}]")]
    NotSlotMultiple {
        /// The offending setting.
        field: &'static str,
        /// Its value.
        value: Duration,
        /// The slot duration.
        slot: Duration,
    },
    /// An epoch holds more slots than the ledger can address.
    #[error("[epoch_duration: {0:?}] - too many slots per epoch")]
    TooManySlotsPerEpoch(Duration),
    /// A boundary instant precedes the boundary it must follow.
    #[error("{field}: [{value}] can't be smaller than {bound_field}: [{bound}]")]
    OutOfOrder {
        /// The offending boundary.
        field: &'static str,
        /// Its value.
        value: String,
        /// The boundary it must not precede.
        bound_field: &'static str,
        /// That boundary's value.
        bound: String,
    },
    /// A boundary instant is not a whole number of slots after genesis.
    #[error("{field}: [{value}] needs to have slot_duration: [{slot:?}] steps from genesis_time: [{genesis}]")]
    Misaligned {
        /// The offending boundary.
        field: &'static str,
        /// Its value.
        value: String,
        /// The slot duration.
        slot: Duration,
        /// The genesis time.
        genesis: String,
    },
    /// A timestamp could not be parsed or computed.
    #[error("{field}: invalid timestamp [{value}]: {reason}")]
    InvalidTimestamp {
        /// The offending setting.
        field: &'static str,
        /// The raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A duration string could not be parsed.
    #[error("{field}: invalid duration [{value}]: {reason}")]
    InvalidDuration {
        /// The offending setting.
        field: &'static str,
        /// The raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The display time format description is invalid.
    #[error("invalid time format [{value}]: {reason}")]
    InvalidTimeFormat {
        /// The raw format description.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A required input path is empty.
    #[error("[{0}] - not provided")]
    MissingPath(&'static str),
    /// A required listen address is empty.
    #[error("[{0}] - not set")]
    MissingAddress(&'static str),
    /// A listen address is not of the form `IP:PORT`.
    #[error("{field}: [{value}] - expected IP:PORT")]
    InvalidAddress {
        /// The offending setting.
        field: &'static str,
        /// The raw value.
        value: String,
    },
    /// No BFT leader would be configured.
    #[error("[leaders: 0] - wrong value")]
    ZeroLeaders,
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::ZeroDuration { .. } => "CONFIG_ZERO_DURATION",
            Self::SubSecond { .. } => "CONFIG_SUB_SECOND_DURATION",
            Self::SlotDurationTooLong(_) => "CONFIG_SLOT_DURATION_TOO_LONG",
            Self::NotSlotMultiple { .. } => "CONFIG_NOT_SLOT_MULTIPLE",
            Self::TooManySlotsPerEpoch(_) => "CONFIG_TOO_MANY_SLOTS_PER_EPOCH",
            Self::OutOfOrder { .. } => "CONFIG_SCHEDULE_OUT_OF_ORDER",
            Self::Misaligned { .. } => "CONFIG_SCHEDULE_MISALIGNED",
            Self::InvalidTimestamp { .. } => "CONFIG_INVALID_TIMESTAMP",
            Self::InvalidDuration { .. } => "CONFIG_INVALID_DURATION",
            Self::InvalidTimeFormat { .. } => "CONFIG_INVALID_TIME_FORMAT",
            Self::MissingPath(_) => "CONFIG_MISSING_PATH",
            Self::MissingAddress(_) => "CONFIG_MISSING_ADDRESS",
            Self::InvalidAddress { .. } => "CONFIG_INVALID_ADDRESS",
            Self::ZeroLeaders => "CONFIG_ZERO_LEADERS",
        }
    }
}

/// A failure of an external collaborator (signer, ledger or node binary).
#[derive(Error, Debug)]
pub enum ExternalToolError {
    /// The tool binary could not be located.
    #[error("{tool} not found in [{searched}] or PATH")]
    NotFound {
        /// Binary name.
        tool: String,
        /// The local directory searched first.
        searched: String,
    },
    /// The tool could not be started.
    #[error("failed to launch {tool}: {reason}")]
    Launch {
        /// Binary name or path.
        tool: String,
        /// The underlying cause.
        reason: String,
    },
    /// The call ran but reported failure.
    #[error("{op} failed: {reason}")]
    CallFailed {
        /// The collaborator operation.
        op: &'static str,
        /// Tool output or the underlying cause.
        reason: String,
    },
    /// The call did not complete within its deadline.
    #[error("{op} timed out after {after:?}")]
    Timeout {
        /// The collaborator operation.
        op: &'static str,
        /// The deadline that elapsed.
        after: Duration,
    },
}

impl ErrorCode for ExternalToolError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "TOOL_NOT_FOUND",
            Self::Launch { .. } => "TOOL_LAUNCH_FAILED",
            Self::CallFailed { .. } => "TOOL_CALL_FAILED",
            Self::Timeout { .. } => "TOOL_TIMEOUT",
        }
    }
}

/// A violation of the write-once links between proposals and vote plans.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    /// No proposal at the given position.
    #[error("no proposal at position {0}")]
    UnknownProposal(usize),
    /// No proposal carries the given external id.
    #[error("no proposal with external id {0}")]
    UnknownExternalId(String),
    /// Two proposals hash to the same external id.
    #[error("external id {0} is claimed by more than one proposal")]
    DuplicateExternalId(String),
    /// A write-once field was written twice.
    #[error("proposal {proposal}: {field} is already assigned")]
    AlreadyAssigned {
        /// The proposal id.
        proposal: String,
        /// The field.
        field: &'static str,
    },
    /// No vote plan at the given arena index.
    #[error("no vote plan at index {0}")]
    UnknownVotePlan(usize),
    /// A vote plan's certificate or id was written twice.
    #[error("vote plan {0} is already certified")]
    VotePlanAlreadyCertified(usize),
    /// A proposal offers more options than a vote plan can carry.
    #[error("proposal {proposal}: {count} options exceed the maximum of 255")]
    TooManyOptions {
        /// The proposal id.
        proposal: String,
        /// The option count.
        count: usize,
    },
    /// A proposal left the pipeline without a vote plan.
    #[error("proposal {0} is not linked to a vote plan")]
    Unlinked(String),
    /// A vote plan left the pipeline without an id or certificate.
    #[error("vote plan {0} has no certificate")]
    NotCertified(usize),
    /// A batch holds more proposals than a vote plan can carry.
    #[error("vote plan {index} holds {count} proposals, maximum is 255")]
    OverCapacity {
        /// The arena index.
        index: usize,
        /// The proposal count.
        count: usize,
    },
}

impl ErrorCode for ConsistencyError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownProposal(_) => "CONSISTENCY_UNKNOWN_PROPOSAL",
            Self::UnknownExternalId(_) => "CONSISTENCY_UNKNOWN_EXTERNAL_ID",
            Self::DuplicateExternalId(_) => "CONSISTENCY_DUPLICATE_EXTERNAL_ID",
            Self::AlreadyAssigned { .. } => "CONSISTENCY_ALREADY_ASSIGNED",
            Self::UnknownVotePlan(_) => "CONSISTENCY_UNKNOWN_VOTE_PLAN",
            Self::VotePlanAlreadyCertified(_) => "CONSISTENCY_VOTE_PLAN_ALREADY_CERTIFIED",
            Self::TooManyOptions { .. } => "CONSISTENCY_TOO_MANY_OPTIONS",
            Self::Unlinked(_) => "CONSISTENCY_UNLINKED_PROPOSAL",
            Self::NotCertified(_) => "CONSISTENCY_VOTE_PLAN_NOT_CERTIFIED",
            Self::OverCapacity { .. } => "CONSISTENCY_OVER_CAPACITY",
        }
    }
}

/// Errors raised by the node supervisor.
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// `start` was called on a node that is running or has run.
    #[error("node already started")]
    AlreadyStarted,
    /// `wait` was called before `start`.
    #[error("node not started")]
    NotStarted,
    /// The node process could not be launched.
    #[error(transparent)]
    Launch(#[from] ExternalToolError),
    /// Waiting on the process or installing a signal handler failed.
    #[error("supervisor I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorCode for SupervisorError {
    fn code(&self) -> &'static str {
        match self {
            Self::AlreadyStarted => "SUPERVISOR_ALREADY_STARTED",
            Self::NotStarted => "SUPERVISOR_NOT_STARTED",
            Self::Launch(_) => "SUPERVISOR_LAUNCH_FAILED",
            Self::Io(_) => "SUPERVISOR_IO_ERROR",
        }
    }
}

/// The umbrella error of a bootstrap run. Every variant is fatal.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Invalid configuration, detected before any external call.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// An external collaborator failed.
    #[error("external tool error: {0}")]
    External(#[from] ExternalToolError),
    /// Proposal/vote plan linkage was violated.
    #[error("data consistency error: {0}")]
    Consistency(#[from] ConsistencyError),
    /// Reading or writing an artifact failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The artifact path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Serializing an artifact failed.
    #[error("encode error: {0}")]
    Encode(String),
}

impl ErrorCode for BootstrapError {
    fn code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.code(),
            Self::External(e) => e.code(),
            Self::Consistency(e) => e.code(),
            Self::Io { .. } => "BOOTSTRAP_IO_ERROR",
            Self::Encode(_) => "BOOTSTRAP_ENCODE_ERROR",
        }
    }
}
