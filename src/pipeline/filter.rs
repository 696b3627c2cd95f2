//! Token filter: tell data tokens apart from table headers and boilerplate.
//!
//! Column headers and repeated notices in the housing listing reuse a small
//! vocabulary ("Building", "Room Type", "Sq. Ft.", "Updated …"). A token is
//! rejected when its lowercased, trimmed text contains any blocked word as a
//! substring. Substring matching also drops legitimate values that happen to
//! contain a blocked word (a building called "Commons Room" is lost); that
//! precision/recall trade-off is accepted.
//!
//! "college" is matched exactly rather than as a substring because college
//! names ("Cowell College") are data.

/// Exact (normalised) text of the first column header.
pub const COLLEGE_HEADER: &str = "college";

/// Substrings that mark a token as a header or notice.
pub const BLOCKED_WORDS: [&str; 12] = [
    "building",
    "dorm",
    "room",
    "type",
    "square",
    "sq. ft.",
    "sq ft",
    "foot",
    "feet",
    "independent",
    "updated",
    "you",
];

/// Returns `true` when `token` carries table data.
///
/// Total over all inputs: empty and whitespace-only tokens are simply
/// rejected.
pub fn is_data_token(token: &str) -> bool {
    let normalised = token.trim().to_lowercase();

    if normalised.is_empty() || normalised == COLLEGE_HEADER {
        return false;
    }

    !BLOCKED_WORDS
        .iter()
        .any(|word| normalised.contains(word))
}

/// Keep only the data tokens of a page, preserving their order.
pub fn data_tokens<I>(tokens: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = String>,
{
    tokens
        .into_iter()
        .filter(|t| is_data_token(t))
        .filter(|t| !t.is_empty())
}
