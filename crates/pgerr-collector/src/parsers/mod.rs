//! Line parsers for the supported `log_line_prefix` layouts.
//!
//! Both layouts sit behind [`parse_line`]; the layout is chosen by
//! configuration rather than guessed per line, since a line that fails one
//! layout is a failure to report, not a hint to try another.

pub mod pipe;
pub mod rds;

use crate::error::ParseError;
use crate::types::{LineFormat, ParseOutcome};

/// Parse a single normalized, non-continuation line.
pub fn parse_line(line: &str, format: LineFormat) -> Result<ParseOutcome<'_>, ParseError> {
    match format {
        LineFormat::Pipe => pipe::parse(line),
        LineFormat::Rds => rds::parse(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;

    const PIPE_LINE: &str = "2025-12-12 15:29:23.258 GMT|app-user|books_store|[local]|9185|9|40P01|2025-12-12 15:29:19 GMT|36/148|837|693c34cf.23e1|UPDATE|0|psql|3188095831510673590|ERROR:  deadlock detected";
    const RDS_LINE: &str = "2025-01-12 10:31:23 UTC:10.0.1.5:54321:app-user@books_store:[9185]:9:40P01:2025-01-12 10:29:19 UTC:36/148:837:693c34cf.23e1::webappERROR:  deadlock detected";

    #[test]
    fn dispatches_pipe() {
        match parse_line(PIPE_LINE, LineFormat::Pipe).unwrap() {
            ParseOutcome::Parsed(p) => {
                assert_eq!(p.severity, Severity::Error);
                assert_eq!(p.sql_state, Some("40P01"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn dispatches_rds() {
        match parse_line(RDS_LINE, LineFormat::Rds).unwrap() {
            ParseOutcome::Parsed(p) => {
                assert_eq!(p.severity, Severity::Error);
                assert_eq!(p.sql_state, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wrong_layout_fails() {
        assert!(parse_line(RDS_LINE, LineFormat::Pipe).is_err());
        assert!(parse_line(PIPE_LINE, LineFormat::Rds).is_err());
    }
}
