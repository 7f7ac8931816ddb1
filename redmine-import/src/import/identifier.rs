//! Project identifier normalization for the Redmine API

/// Placeholder used when a display name normalizes to nothing.
pub const FALLBACK_IDENTIFIER: &str = "project";

/// Convert a display name into a valid Redmine project identifier
///
/// Redmine identifiers may only contain `a-z`, `0-9` and `-`. Spaces and
/// underscores become hyphens, periods and commas are dropped, and every
/// remaining character outside the allowed set is removed. A name that
/// normalizes to nothing (e.g. fully non-Latin text) yields a fixed
/// placeholder instead of an error.
///
/// No uniqueness suffix is added: distinct names that normalize to the same
/// identifier resolve to the same project, and every placeholder name shares
/// one project. Callers dedup on the returned identifier.
pub fn normalize(display_name: &str) -> String {
    let identifier: String = display_name
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' | '_' => Some('-'),
            '.' | ',' => None,
            'a'..='z' | '0'..='9' | '-' => Some(c),
            _ => None,
        })
        .collect();

    if identifier.is_empty() {
        FALLBACK_IDENTIFIER.to_string()
    } else {
        identifier
    }
}
