//! Unwrap transport envelopes around raw log lines.
//!
//! CloudWatch/OTLP shippers deliver lines as
//! `{"body":"2026-01-15 15:39:17 UTC:...","attributes":{...}}`.

use std::borrow::Cow;

use serde::Deserialize;

#[derive(Deserialize)]
struct Envelope<'a> {
    #[serde(borrow, default)]
    body: Option<Cow<'a, str>>,
}

/// Return the log text inside a JSON envelope, or the line itself.
///
/// Never fails: undecodable JSON, a missing `body` or an empty one all
/// pass the original line through.
pub fn normalize(line: &str) -> Cow<'_, str> {
    if !line.starts_with('{') {
        return Cow::Borrowed(line);
    }
    match serde_json::from_str::<Envelope<'_>>(line) {
        Ok(Envelope { body: Some(body) }) if !body.is_empty() => body,
        _ => Cow::Borrowed(line),
    }
}
