//! Error severities the collector counts, and extraction from a message.

use serde::{Deserialize, Serialize};

/// Severity of a counted error line.
///
/// Only these three levels are ever counted; `LOG`, `WARNING`, `INFO`,
/// `NOTICE` and anything else is filtered out before an event exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Fatal,
    Panic,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Self::Error, Self::Fatal, Self::Panic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
            Self::Panic => "PANIC",
        }
    }

    /// Accept a severity token. Case-sensitive: `error` is rejected.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "ERROR" => Some(Self::Error),
            "FATAL" => Some(Self::Fatal),
            "PANIC" => Some(Self::Panic),
            _ => None,
        }
    }

    /// Severity of a `SEVERITY:  message` remainder, if it is one we count.
    pub fn from_message(message: &str) -> Option<Self> {
        Self::parse(extract_severity(message))
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything before the first `:`, trimmed. Empty when there is no colon.
///
/// `"ERROR:  canceling statement"` yields `"ERROR"`.
pub fn extract_severity(message: &str) -> &str {
    match message.find(':') {
        Some(idx) => message[..idx].trim(),
        None => "",
    }
}
