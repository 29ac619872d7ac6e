//! ABOUTME: Identifier syntax and credential-substring detection shared by Parameter/Node validation
//! ABOUTME: Kept dependency-free (no regex) since the grammar is a simple character class

/// Validates the identifier grammar from §3.1: `^[a-z_][a-z0-9_]*$`, 1-64 chars.
#[must_use]
pub fn is_valid_identifier(s: &str) -> bool {
    if s.is_empty() || s.len() > 64 {
        return false;
    }
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first == '_' || first.is_ascii_lowercase()) {
        return false;
    }
    chars.all(|c| c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// Credential substrings from §3.2, matched case-insensitively against a parameter name.
pub const CREDENTIAL_SUBSTRINGS: &[&str] = &[
    "api_key",
    "apikey",
    "token",
    "password",
    "secret",
    "database_url",
    "db_url",
    "connection_string",
    "auth",
    "bearer",
    "private_key",
];

/// Reserved tool names the Validator rejects outright (§3.5 rule 8).
pub const RESERVED_TOOL_NAMES: &[&str] =
    &["conditional_route", "parallel_execute", "orchestrator_route"];

#[must_use]
pub fn looks_like_credential(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    CREDENTIAL_SUBSTRINGS.iter().any(|pat| lower.contains(pat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn valid_identifiers() {
        assert!(is_valid_identifier("customer_id"));
        assert!(is_valid_identifier("_private"));
        assert!(is_valid_identifier("a1"));
    }

    #[test]
    fn invalid_identifiers() {
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1abc"));
        assert!(!is_valid_identifier("Abc"));
        assert!(!is_valid_identifier("a-b"));
        assert!(!is_valid_identifier("a.b"));
        assert!(!is_valid_identifier(&"a".repeat(65)));
    }

    #[test]
    fn credential_detection_is_case_insensitive() {
        assert!(looks_like_credential("DATABASE_URL"));
        assert!(looks_like_credential("customer_api_key"));
        assert!(looks_like_credential("Bearer_Token"));
        assert!(!looks_like_credential("customer_id"));
    }

    #[test]
    fn reserved_tool_names_listed() {
        assert_eq!(RESERVED_TOOL_NAMES.len(), 3);
        assert!(RESERVED_TOOL_NAMES.contains(&"conditional_route"));
    }

    proptest::proptest! {
        #[test]
        fn never_panics_on_arbitrary_input(s in ".{0,200}") {
            let _ = is_valid_identifier(&s);
            let _ = looks_like_credential(&s);
        }

        #[test]
        fn every_char_of_an_accepted_identifier_is_in_the_grammar(
            first in "[a-z_]",
            rest in "[a-z0-9_]{0,63}",
        ) {
            let candidate = format!("{first}{rest}");
            prop_assert!(is_valid_identifier(&candidate));
        }

        #[test]
        fn uppercase_always_rejects(s in "[A-Za-z_][A-Za-z0-9_]{0,30}") {
            if s.chars().any(|c| c.is_ascii_uppercase()) {
                prop_assert!(!is_valid_identifier(&s));
            }
        }
    }
}
