//! Error types for snmp-discovery.
//!
//! All errors are `#[non_exhaustive]` to allow adding new variants without breaking changes.
//!
//! The variants fall into four groups that callers care about:
//!
//! - caller input problems ([`Error::InvalidInput`]), rejected before any I/O
//! - timeouts ([`Error::Timeout`] when the agent never answered, [`Error::Deadline`]
//!   when a bounded operation ran past its limit)
//! - protocol problems ([`Error::Snmp`], [`Error::Transport`], [`Error::NonIncreasingOid`])
//! - local failures ([`Error::Io`], [`Error::SessionClosed`], [`Error::InvalidOid`])
//!
//! [`Error::class()`] collapses them into the outward [`ErrorClass`].

use std::net::SocketAddr;
use std::time::Duration;

use crate::oid::Oid;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Empty OID string.
    Empty,
    /// Invalid arc value.
    InvalidArc,
    /// OID has too many arcs (exceeds MAX_OID_LEN).
    TooManyArcs { count: usize, max: usize },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty OID"),
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
        }
    }
}

/// Request field rejected by input validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Ip,
    Community,
    Port,
}

impl std::fmt::Display for InputField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ip => write!(f, "ip"),
            Self::Community => write!(f, "community"),
            Self::Port => write!(f, "port"),
        }
    }
}

/// SNMP error status codes (RFC 3416).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    /// Unknown/future error status code.
    Unknown(i64),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_code(value: i64) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            other => Self::Unknown(other),
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::NoAccess => write!(f, "noAccess"),
            Self::WrongType => write!(f, "wrongType"),
            Self::WrongLength => write!(f, "wrongLength"),
            Self::WrongEncoding => write!(f, "wrongEncoding"),
            Self::WrongValue => write!(f, "wrongValue"),
            Self::NoCreation => write!(f, "noCreation"),
            Self::InconsistentValue => write!(f, "inconsistentValue"),
            Self::ResourceUnavailable => write!(f, "resourceUnavailable"),
            Self::CommitFailed => write!(f, "commitFailed"),
            Self::UndoFailed => write!(f, "undoFailed"),
            Self::AuthorizationError => write!(f, "authorizationError"),
            Self::NotWritable => write!(f, "notWritable"),
            Self::InconsistentName => write!(f, "inconsistentName"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// Outward classification of a failed discovery call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Missing or malformed caller input. Nothing was sent.
    InvalidInput,
    /// The device did not answer in time.
    Timeout,
    /// Any other failure.
    Failure,
}

impl ErrorClass {
    /// HTTP status a REST shell should answer with.
    pub fn status_code(self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            Self::Timeout => 504,
            Self::Failure => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Timeout => "timeout",
            Self::Failure => "failure",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Caller supplied an unusable request.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        field: InputField,
        reason: &'static str,
    },

    /// I/O error while resolving or talking to the device.
    #[error("I/O error{}: {source}", target.map(|t| format!(" communicating with {}", t)).unwrap_or_default())]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },

    /// No response after the configured retries.
    #[error("timeout after {elapsed:?} waiting for {target} (retries={retries})")]
    Timeout {
        target: SocketAddr,
        elapsed: Duration,
        retries: u32,
    },

    /// A bounded operation did not finish within its limit.
    #[error("{label} after {limit:?}")]
    Deadline { label: &'static str, limit: Duration },

    /// SNMP protocol error returned by agent.
    #[error("SNMP error from {target}: {status} at index {index}")]
    Snmp {
        target: SocketAddr,
        status: ErrorStatus,
        index: u32,
        oid: Option<Oid>,
    },

    /// The SNMP library could not complete or decode the exchange.
    #[error("SNMP exchange with {target} failed: {message}")]
    Transport { target: SocketAddr, message: String },

    /// Invalid OID format.
    #[error("invalid OID: {kind}")]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>,
    },

    /// Non-increasing OID detected during a walk or table fetch (agent misbehavior).
    ///
    /// Continuing would loop forever against a non-conformant agent.
    #[error("walk detected non-increasing OID: {previous} >= {current}")]
    NonIncreasingOid { previous: Oid, current: Oid },

    /// The session was already released.
    #[error("session to {target} is closed")]
    SessionClosed { target: SocketAddr },
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(field: InputField, reason: &'static str) -> Self {
        Self::InvalidInput { field, reason }
    }

    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// True for both no-response timeouts and expired deadlines.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Deadline { .. })
    }

    /// True only when a Timeout Orchestrator bound expired.
    pub fn is_deadline(&self) -> bool {
        matches!(self, Self::Deadline { .. })
    }

    /// Outward classification.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidInput { .. } => ErrorClass::InvalidInput,
            Self::Timeout { .. } | Self::Deadline { .. } => ErrorClass::Timeout,
            _ => ErrorClass::Failure,
        }
    }

    /// Get the target address if this error has one.
    pub fn target(&self) -> Option<SocketAddr> {
        match self {
            Self::Io { target, .. } => *target,
            Self::Timeout { target, .. } => Some(*target),
            Self::Snmp { target, .. } => Some(*target),
            Self::Transport { target, .. } => Some(*target),
            Self::SessionClosed { target } => Some(*target),
            _ => None,
        }
    }
}
