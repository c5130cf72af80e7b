//! Multi-line error continuation detection.
//!
//! PostgreSQL follows an error line with supplementary lines (detail, hint,
//! context, the failing statement) that carry no prefix of their own. They
//! are expected, so they are dropped without counting as parse failures.

const CONTINUATION_KEYWORDS: [&str; 6] = [
    "DETAIL:",
    "HINT:",
    "CONTEXT:",
    "STATEMENT:",
    "QUERY:",
    "LOCATION:",
];

/// True for tab-indented lines and lines starting with a continuation keyword.
pub fn is_continuation_line(line: &str) -> bool {
    if line.starts_with('\t') {
        return true;
    }

    let trimmed = line.trim();
    CONTINUATION_KEYWORDS
        .iter()
        .any(|keyword| trimmed.starts_with(keyword))
}
