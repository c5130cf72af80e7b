//! Core collector types: input entries, parser output, classified events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::severity::Severity;

// ── Line Format ───────────────────────────────────────────────

/// Supported `log_line_prefix` layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineFormat {
    /// `%m|%u|%d|%r|%p|%l|%e|%s|%v|%x|%c|%i|%P|%a|%Q|`: 15 pipe-delimited
    /// prefix fields followed by the message. Carries SQLSTATE and query id.
    #[default]
    Pipe,
    /// RDS default `%m:%r:%u@%d:[%p]:%l:%e:%s:%v:%x:%c:%q%a`. Only severity,
    /// user and database are extracted.
    Rds,
}

impl LineFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pipe => "pipe",
            Self::Rds => "rds",
        }
    }
}

impl std::fmt::Display for LineFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Log Entry ─────────────────────────────────────────────────

/// One raw line handed to the collector by a log shipper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Raw line, possibly wrapped in a `{"body": ...}` envelope.
    pub line: String,
    /// When the line was received.
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            timestamp: Utc::now(),
        }
    }
}

// ── Parser Output ─────────────────────────────────────────────

/// Fields extracted from one line, borrowed from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub severity: Severity,
    pub user: &'a str,
    pub database: &'a str,
    /// Five-character SQLSTATE; always `None` for [`LineFormat::Rds`].
    pub sql_state: Option<&'a str>,
    /// 0 when absent or unparsable.
    pub query_id: i64,
}

/// Why a line produced no event without being a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// DETAIL/HINT/CONTEXT/... or tab-indented line of a multi-line error.
    Continuation,
    /// Severity other than ERROR, FATAL or PANIC.
    UnsupportedSeverity,
    /// Pipe layout with an empty SQLSTATE field; it cannot be categorized.
    MissingSqlState,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Continuation => "continuation",
            Self::UnsupportedSeverity => "unsupported_severity",
            Self::MissingSqlState => "missing_sqlstate",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of parsing a structurally valid line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome<'a> {
    Parsed(ParsedLine<'a>),
    Skipped(SkipReason),
}

/// What the pipeline did with a line that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Recorded,
    Skipped(SkipReason),
}

// ── Classified Event ──────────────────────────────────────────

/// SQLSTATE fields; present only when the line carried a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlStateInfo {
    pub code: String,
    /// Condition name, empty for unknown codes.
    pub name: &'static str,
    pub class: String,
    /// Class category, empty for unknown classes.
    pub category: &'static str,
}

impl SqlStateInfo {
    pub fn classify(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: pgerr_sqlstate::name(code),
            class: pgerr_sqlstate::class(code).to_string(),
            category: pgerr_sqlstate::category(code),
        }
    }
}

/// An accepted error line, enriched and ready to be counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedEvent {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_state: Option<SqlStateInfo>,
    pub user: String,
    pub database: String,
    pub query_id: i64,
    pub instance_key: String,
    pub system_id: String,
}

impl ParsedEvent {
    pub fn new(line: &ParsedLine<'_>, instance_key: &str, system_id: &str) -> Self {
        Self {
            severity: line.severity,
            sql_state: line.sql_state.map(SqlStateInfo::classify),
            user: line.user.to_string(),
            database: line.database.to_string(),
            query_id: line.query_id,
            instance_key: instance_key.to_string(),
            system_id: system_id.to_string(),
        }
    }

    /// Query id as a label value: empty for 0, decimal otherwise.
    pub fn query_id_label(&self) -> String {
        if self.query_id == 0 {
            String::new()
        } else {
            self.query_id.to_string()
        }
    }
}
