//! PostgreSQL SQLSTATE classification.
//!
//! A pure lookup table: every function here is total. Unknown codes map to
//! an empty name/category instead of an error, so callers can use the result
//! directly as a metric label.

pub mod classes;
pub mod codes;

use serde::Serialize;

pub use classes::category_for_class;
pub use codes::condition_name;

/// Everything known about one SQLSTATE code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlStateEntry {
    /// Condition name, e.g. `query_canceled`.
    pub name: &'static str,
    /// Two-character class, e.g. `57`.
    pub class: String,
    /// Human-readable class category, e.g. `Operator Intervention`.
    pub category: &'static str,
}

/// Two-character class of a code. Codes shorter than two characters are
/// returned as-is.
pub fn class(code: &str) -> &str {
    code.get(..2).unwrap_or(code)
}

/// Condition name for `code`, or `""` when the code is unknown.
/// Input is case-insensitive.
pub fn name(code: &str) -> &'static str {
    condition_name(&code.to_ascii_uppercase()).unwrap_or("")
}

/// Category of the class `code` belongs to, or `""` when the class is unknown.
///
/// Codes missing from the name table still get a category as long as their
/// class is known.
pub fn category(code: &str) -> &'static str {
    let code = code.to_ascii_uppercase();
    category_for_class(class(&code)).unwrap_or("")
}

/// Look up a code in the static table.
///
/// Returns `None` only when neither the code nor its class is known.
pub fn lookup(code: &str) -> Option<SqlStateEntry> {
    let upper = code.to_ascii_uppercase();
    let name = condition_name(&upper);
    let category = category_for_class(class(&upper));
    if name.is_none() && category.is_none() {
        return None;
    }
    Some(SqlStateEntry {
        name: name.unwrap_or(""),
        class: class(&upper).to_string(),
        category: category.unwrap_or(""),
    })
}
