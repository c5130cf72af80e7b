//! Pipe-delimited layout with query id support.
//!
//! `log_line_prefix = '%m|%u|%d|%r|%p|%l|%e|%s|%v|%x|%c|%i|%P|%a|%Q|'`
//!
//! ```text
//! 2025-12-12 15:29:16.068 GMT|app-user|books_store|[local]|9112|4|57014|2025-12-12 15:29:15 GMT|25/112|0|693c34cb.2398|SELECT|0|psql|5457019535816659310|ERROR:  canceling statement due to statement timeout
//! ```

use crate::error::ParseError;
use crate::severity::Severity;
use crate::types::{ParseOutcome, ParsedLine, SkipReason};

/// 15 prefix fields plus the message remainder.
pub const FIELD_COUNT: usize = 16;

const USER: usize = 1;
const DATABASE: usize = 2;
const SQLSTATE: usize = 6;
const QUERY_ID: usize = 14;
const MESSAGE: usize = 15;

/// Parse one pipe-delimited line.
///
/// The message may itself contain `|`; everything after the 15th delimiter
/// belongs to it.
pub fn parse(line: &str) -> Result<ParseOutcome<'_>, ParseError> {
    let fields: Vec<&str> = line.splitn(FIELD_COUNT, '|').collect();
    if fields.len() < FIELD_COUNT {
        return Err(ParseError::FieldCount {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }

    let Some(severity) = Severity::from_message(fields[MESSAGE]) else {
        return Ok(ParseOutcome::Skipped(SkipReason::UnsupportedSeverity));
    };

    let sql_state = fields[SQLSTATE].trim();
    if sql_state.is_empty() {
        return Ok(ParseOutcome::Skipped(SkipReason::MissingSqlState));
    }

    Ok(ParseOutcome::Parsed(ParsedLine {
        severity,
        user: fields[USER].trim(),
        database: fields[DATABASE].trim(),
        sql_state: Some(sql_state),
        query_id: fields[QUERY_ID].trim().parse().unwrap_or(0),
    }))
}
