//! ABOUTME: Shared expression-grammar constants for §3.4 (variable refs, condition safety)
//! ABOUTME: Tokenization itself lives in flowforge-validator; this crate only owns the vocabulary

/// Substrings that make a condition string unsafe regardless of context (§3.4).
pub const FORBIDDEN_CONDITION_SUBSTRINGS: &[&str] = &[
    "import", "exec", "eval", "__", "lambda", "open", "file", "`", ";",
];

/// Comparison operators allowed in a condition (§3.4).
pub const COMPARISON_OPERATORS: &[&str] = &[">=", "<=", "==", "!=", ">", "<"];

/// Logical operators allowed in a condition (§3.4).
pub const LOGICAL_OPERATORS: &[&str] = &["and", "or", "not"];

/// Membership operators allowed in a condition (§3.4).
pub const MEMBERSHIP_OPERATORS: &[&str] = &["in", "is"];

#[must_use]
pub fn contains_forbidden_substring(condition: &str) -> Option<&'static str> {
    FORBIDDEN_CONDITION_SUBSTRINGS
        .iter()
        .find(|pat| condition.contains(*pat))
        .copied()
}
