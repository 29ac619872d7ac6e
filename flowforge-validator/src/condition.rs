//! ABOUTME: Tokenizer and safety check for conditional-routing expression strings (§3.4)
//! ABOUTME: Rejects anything outside the whitelisted comparison/logical/membership grammar

use std::sync::LazyLock;

use regex::Regex;

use flowforge_core::expr::contains_forbidden_substring;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)
        \{\{\s*[a-z_][a-z0-9_]*\s*\}\}    # variable reference
        | \d+(?:\.\d+)?                    # number literal
        | '[^']*'                          # single-quoted string
        | "[^"]*"                          # double-quoted string
        | >=|<=|==|!=|>|<                  # comparison operators
        | \b(?:and|or|not|in|is)\b         # logical / membership keywords
        | \(|\)                            # grouping
        "#,
    )
    .expect("static token regex is valid")
});

/// Check a condition string for forbidden substrings and whitelisted-grammar coverage.
///
/// Returns `Err(reason)` describing the first violation found. Does not check
/// that referenced variables are in scope — see [`crate::scope`] for that.
pub fn check_condition_safety(condition: &str) -> Result<(), String> {
    if let Some(bad) = contains_forbidden_substring(condition) {
        return Err(format!("condition contains forbidden substring `{bad}`"));
    }

    let mut pos = 0;
    let bytes = condition.as_bytes();
    while pos < condition.len() {
        while pos < condition.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= condition.len() {
            break;
        }
        match TOKEN_RE.find_at(condition, pos) {
            Some(m) if m.start() == pos => pos = m.end(),
            _ => {
                let snippet: String = condition[pos..].chars().take(20).collect();
                return Err(format!("unrecognized token near `{snippet}`"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_simple_comparison() {
        assert!(check_condition_safety("{{amount}} > 500").is_ok());
    }

    #[test]
    fn accepts_logical_combination() {
        assert!(
            check_condition_safety("{{priority}} == 'high' and {{flag}}").is_ok()
        );
    }

    #[test]
    fn accepts_membership_and_parens() {
        assert!(check_condition_safety("({{status}} in 'active') or not {{archived}}").is_ok());
    }

    #[test]
    fn rejects_forbidden_substring() {
        assert!(check_condition_safety("__import__('os')").is_err());
    }

    #[test]
    fn rejects_bare_identifier_outside_braces() {
        assert!(check_condition_safety("amount > 500").is_err());
    }

    #[test]
    fn rejects_unknown_symbol() {
        assert!(check_condition_safety("{{amount}} ~ 500").is_err());
    }

    proptest::proptest! {
        #[test]
        fn never_panics_on_arbitrary_input(s in ".{0,200}") {
            let _ = check_condition_safety(&s);
        }

        /// Any condition embedding one of the forbidden substrings is rejected
        /// regardless of what whitelisted grammar surrounds it (§3.4).
        #[test]
        fn forbidden_substring_always_rejects(
            prefix in "[a-z_]{0,10}",
            suffix in "[a-z_]{0,10}",
            forbidden in proptest::sample::select(flowforge_core::expr::FORBIDDEN_CONDITION_SUBSTRINGS),
        ) {
            let condition = ["{{", prefix.as_str(), "}} > 1 and ", forbidden, " ", suffix.as_str()].concat();
            prop_assert!(check_condition_safety(&condition).is_err());
        }

        /// A condition built entirely from whitelisted comparison/logical tokens
        /// and bare variable references is always accepted, provided neither
        /// generated name happens to collide with a forbidden substring.
        #[test]
        fn whitelisted_comparison_chain_always_accepts(
            left in "[a-z_][a-z0-9_]{0,10}",
            right in "[a-z_][a-z0-9_]{0,10}",
            op in proptest::sample::select(flowforge_core::expr::COMPARISON_OPERATORS),
        ) {
            let condition = ["{{", left.as_str(), "}} ", op, " {{", right.as_str(), "}}"].concat();
            prop_assume!(flowforge_core::expr::contains_forbidden_substring(&condition).is_none());
            prop_assert!(check_condition_safety(&condition).is_ok());
        }
    }
}
