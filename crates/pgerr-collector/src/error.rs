//! Collector error types.

use thiserror::Error;

/// Structural failures while parsing a log line.
///
/// Each one increments the parse-failure counter. Lines that are merely
/// uninteresting (continuations, `LOG`/`WARNING` severities, missing
/// SQLSTATE) are not errors; see [`crate::types::SkipReason`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid log format: expected {expected} '|'-delimited fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid RDS log format: missing :[pid] marker")]
    MissingPidMarker,

    #[error("invalid RDS log format: cannot locate user@database field")]
    MissingUserDatabase,

    #[error("invalid RDS log format: missing @ in user@database field")]
    MissingAt,
}

/// Errors raised by the collector lifecycle and metric registration.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("collector already started")]
    AlreadyStarted,

    #[error("collector has been stopped and cannot be restarted")]
    Stopped,

    #[error("log receiver already consumed")]
    ReceiverTaken,

    #[error("no tokio runtime available: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),

    #[error("metrics registration failed: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Convenience alias for collector results.
pub type CollectorResult<T> = Result<T, CollectorError>;
