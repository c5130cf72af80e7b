//! RDS stderr layout.
//!
//! `log_line_prefix = '%m:%r:%u@%d:[%p]:%l:%e:%s:%v:%x:%c:%q%a'`
//!
//! ```text
//! 2025-01-12 10:30:45 UTC:10.0.1.5:54321:app-user@books_store:[9112]:4:57014:2025-01-12 10:29:15 UTC:25/112:0:693c34cb.2398::psqlERROR:  canceling statement
//! ```
//!
//! Timestamps and remote addresses contain colons of their own, so the
//! bracketed pid is the only reliable anchor: `user@database` is the last
//! colon-separated token before it.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ParseError;
use crate::severity::Severity;
use crate::types::{ParseOutcome, ParsedLine, SkipReason};

const PID_MARKER: &str = ":[";

static RE_SEVERITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(ERROR|FATAL|PANIC):").unwrap());

/// Parse one RDS-layout line.
pub fn parse(line: &str) -> Result<ParseOutcome<'_>, ParseError> {
    let pid_idx = line.find(PID_MARKER).ok_or(ParseError::MissingPidMarker)?;
    let before_pid = &line[..pid_idx];

    let last_colon = before_pid
        .rfind(':')
        .ok_or(ParseError::MissingUserDatabase)?;
    let user_at_database = &before_pid[last_colon + 1..];

    let (user, database) = user_at_database
        .split_once('@')
        .ok_or(ParseError::MissingAt)?;

    // The application name runs straight into the message, so look for the
    // earliest severity keyword after the pid.
    let Some(severity) = RE_SEVERITY
        .captures(&line[pid_idx..])
        .and_then(|caps| Severity::parse(&caps[1]))
    else {
        return Ok(ParseOutcome::Skipped(SkipReason::UnsupportedSeverity));
    };

    Ok(ParseOutcome::Parsed(ParsedLine {
        severity,
        user: user.trim(),
        database: database.trim(),
        sql_state: None,
        query_id: 0,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(line: &str) -> ParsedLine<'_> {
        match parse(line).unwrap() {
            ParseOutcome::Parsed(p) => p,
            other => panic!("expected parsed line, got {other:?}"),
        }
    }

    #[test]
    fn statement_timeout() {
        let line = "2025-01-12 10:30:45 UTC:10.0.1.5:54321:app-user@books_store:[9112]:4:57014:2025-01-12 10:29:15 UTC:25/112:0:693c34cb.2398::psqlERROR:  canceling statement due to statement timeout";
        let p = parsed(line);
        assert_eq!(p.severity, Severity::Error);
        assert_eq!(p.user, "app-user");
        assert_eq!(p.database, "books_store");
        assert_eq!(p.sql_state, None);
        assert_eq!(p.query_id, 0);
    }

    #[test]
    fn fatal_too_many_connections() {
        let line = "2025-01-12 10:32:31 UTC:10.0.1.10:45678:conn_limited@books_store:[9449]:4:53300:2025-01-12 10:32:31 UTC:91/57:0:693c34db.24e9::api_workerFATAL:  too many connections for role \"conn_limited\"";
        let p = parsed(line);
        assert_eq!(p.severity, Severity::Fatal);
        assert_eq!(p.user, "conn_limited");
        assert_eq!(p.database, "books_store");
    }

    #[test]
    fn panic_severity() {
        let line = "2025-01-12 10:30:45 UTC:10.0.1.7:40000:postgres@postgres:[77]:1:XX000:2025-01-12 10:30:00 UTC:3/9:0:abc.1::psqlPANIC:  could not write to file";
        let p = parsed(line);
        assert_eq!(p.severity, Severity::Panic);
        assert_eq!(p.user, "postgres");
    }

    #[test]
    fn bracketed_local_remote_hits_pid_anchor_first() {
        // `%r` renders unix-socket clients as `[local]`, which also matches
        // the `:[` anchor.
        let line = "2025-01-12 10:30:45 UTC:[local]:postgres@postgres:[77]:1:XX000:s:3/9:0:abc.1::psqlPANIC:  x";
        assert_eq!(parse(line), Err(ParseError::MissingAt));
    }

    #[test]
    fn earliest_severity_wins() {
        let line = "ts:10.0.0.1:1:u@d:[1]:1:0:s:v:0:c::appFATAL:  role check failed after ERROR: earlier";
        assert_eq!(parsed(line).severity, Severity::Fatal);
    }

    #[test]
    fn user_and_database_are_trimmed() {
        let line = "ts:10.0.0.1:1: u @ d :[1]:1:0:s:v:0:c::appERROR:  x";
        let p = parsed(line);
        assert_eq!(p.user, "u");
        assert_eq!(p.database, "d");
    }

    #[test]
    fn missing_pid_marker() {
        assert_eq!(
            parse("2025-01-12 10:30:45 UTC:app-user@books_store:9112:ERROR:  x"),
            Err(ParseError::MissingPidMarker)
        );
        assert_eq!(parse("invalid|log|line"), Err(ParseError::MissingPidMarker));
    }

    #[test]
    fn missing_colon_before_pid() {
        assert_eq!(
            parse("app-user@books_store:[9112]:ERROR:  x"),
            Err(ParseError::MissingUserDatabase)
        );
    }

    #[test]
    fn missing_at_sign() {
        assert_eq!(
            parse("2025-01-12 10:30:45 UTC:10.0.1.5:54321:app-user:[9112]:4:ERROR:  x"),
            Err(ParseError::MissingAt)
        );
    }

    #[test]
    fn unsupported_severity_is_skipped() {
        let line = "2025-01-12 10:30:45 UTC:10.0.1.5:54321:app-user@books_store:[9112]:4:00000:2025-01-12 10:29:15 UTC:25/112:0:693c34cb.2398::psqlLOG:  connection received";
        assert_eq!(
            parse(line),
            Ok(ParseOutcome::Skipped(SkipReason::UnsupportedSeverity))
        );
    }
}
