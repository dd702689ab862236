//! Error taxonomy for the time index.
//!
//! Every failure falls into one of three classes, exposed via
//! [`TimeTreeError::kind`] so a transport façade can map errors to status
//! codes without matching on individual variants:
//!
//! - [`ErrorKind::InvalidArgument`]: the caller passed something
//!   unparseable or out of range.
//! - [`ErrorKind::NotFound`]: a referenced node (custom root, event
//!   entity) does not exist in the store.
//! - [`ErrorKind::Conflict`]: a structural invariant of the sibling
//!   chain was found violated. The core never retries these; retry
//!   policy belongs to the caller's transaction layer.

use thiserror::Error;

use crate::graph::NodeId;
use crate::resolution::Resolution;

/// Coarse error class, one per failure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Conflict,
}

/// Errors raised by time tree and event index operations.
#[derive(Debug, Error)]
pub enum TimeTreeError {
    /// The resolution name did not parse.
    #[error(
        "unknown resolution '{raw}': expected one of year, month, day, \
         hour, minute, second, millisecond"
    )]
    UnknownResolution { raw: String },

    /// The timezone identifier is not a known IANA zone.
    #[error("unknown timezone '{raw}'")]
    UnknownTimezone { raw: String },

    /// A calendar unit value outside the valid range for its resolution.
    #[error("{resolution} value {value} is out of range")]
    ValueOutOfRange { resolution: Resolution, value: i64 },

    /// The epoch timestamp is not representable in the target timezone.
    #[error("timestamp {0} is not representable in the target timezone")]
    InvalidTimestamp(i64),

    /// A range query where the end precedes the start.
    #[error("invalid range: end {end} precedes start {start}")]
    InvalidRange { start: i64, end: i64 },

    /// An event attachment tried to reuse a structural edge type name.
    #[error("'{0}' is a structural edge type and cannot be used for event attachment")]
    StructuralEdgeType(String),

    /// The caller-designated custom root node does not exist.
    #[error("custom root node {0} does not exist")]
    RootNotFound(NodeId),

    /// A referenced node (e.g. an event entity) does not exist.
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    /// A sibling chain was found structurally broken (missing link,
    /// missing value). Surfaced from the store, never repaired here.
    #[error("structural conflict: {0}")]
    Conflict(String),
}

impl TimeTreeError {
    /// The taxonomy class this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownResolution { .. }
            | Self::UnknownTimezone { .. }
            | Self::ValueOutOfRange { .. }
            | Self::InvalidTimestamp(_)
            | Self::InvalidRange { .. }
            | Self::StructuralEdgeType(_) => ErrorKind::InvalidArgument,
            Self::RootNotFound(_) | Self::NodeNotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TimeTreeError>;
