//! ABOUTME: Shared helpers for extracting `{{var}}` references and normalizing free text
//! ABOUTME: Used by both flowforge-validator (scope checking) and flowforge-generator (emission)

use std::sync::LazyLock;

use regex::Regex;

/// Matches `{{ identifier }}` per §3.4 — deliberately rejects the dotted form
/// `{{x.y}}` by requiring the captured group to be a bare identifier with no
/// further characters before the closing braces.
static VAR_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([a-z_][a-z0-9_]*)\s*\}\}").unwrap());

/// Matches a dotted-access attempt like `{{x.y}}` so the Validator can raise a
/// specific diagnostic instead of silently failing to find a reference.
static DOTTED_VAR_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*[a-z_][a-z0-9_]*\.[a-z0-9_.\[\]]+\s*\}\}").unwrap());

/// Extract every `{{identifier}}` reference in `text`, in order of appearance,
/// duplicates included (callers that need a set should collect into one).
#[must_use]
pub fn extract_variable_refs(text: &str) -> Vec<String> {
    VAR_REF
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect()
}

/// Whether `text` contains a forbidden dotted/indexed variable reference.
#[must_use]
pub fn has_dotted_variable_ref(text: &str) -> bool {
    DOTTED_VAR_REF.is_match(text)
}

/// Collapses runs of whitespace to single spaces and trims the ends —
/// applied by the Parser when normalizing free-text sections.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_simple_refs() {
        let refs = extract_variable_refs("fetch {{customer_id}} and {{amount}}");
        assert_eq!(refs, vec!["customer_id", "amount"]);
    }

    #[test]
    fn ignores_dotted_refs_as_simple() {
        assert!(extract_variable_refs("{{x.y}}").is_empty());
        assert!(has_dotted_variable_ref("{{x.y}}"));
    }

    #[test]
    fn tolerates_internal_whitespace() {
        assert_eq!(extract_variable_refs("{{  amount  }}"), vec!["amount"]);
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_whitespace("  a   b\tc\n"), "a b c");
    }

    proptest::proptest! {
        #[test]
        fn extraction_never_panics(s in ".{0,200}") {
            let _ = extract_variable_refs(&s);
        }
    }
}
