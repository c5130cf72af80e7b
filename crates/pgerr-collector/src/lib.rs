//! PostgreSQL error-log collector.
//!
//! Consumes raw error-log lines (pipe-delimited or RDS stderr layout),
//! drops multi-line continuations, classifies ERROR/FATAL/PANIC lines by
//! SQLSTATE, and counts them in Prometheus counters.

pub mod collector;
pub mod continuation;
pub mod error;
pub mod metrics;
pub mod mock;
pub mod normalize;
pub mod parsers;
pub mod receiver;
pub mod severity;
pub mod types;

// Re-export key types for convenience
pub use collector::{COLLECTOR_NAME, CollectorState, ErrorLogs, ErrorLogsArguments, Pipeline};
pub use error::{CollectorError, CollectorResult, ParseError};
pub use metrics::{ErrorMetrics, ErrorSink};
pub use mock::RecordingSink;
pub use receiver::LogsReceiver;
pub use severity::Severity;
pub use types::{LineFormat, LineOutcome, LogEntry, ParsedEvent, SkipReason};
