//! ABOUTME: Static Rust source fragments embedded verbatim into every generated agent (§4.5 part 4)
//! ABOUTME: Self-contained: the emitted program depends only on serde_json, never on flowforge's own crates

/// `{{var}}` substitution and the whitelisted-grammar condition evaluator,
/// copied into every generated file so the emitted agent has no compile-time
/// dependency on this compiler.
pub const RUNTIME_PRELUDE: &str = r#"
/// Runtime scope: variable name -> last-bound JSON value.
pub type Scope = std::collections::HashMap<String, serde_json::Value>;

/// Render `{{name}}` placeholders in `template` against `scope`, stringifying
/// non-string values with `to_string()`.
pub fn substitute_vars(template: &str, scope: &Scope) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let name = after[..end].trim();
        match scope.get(name) {
            Some(serde_json::Value::String(s)) => out.push_str(s),
            Some(other) => out.push_str(&other.to_string()),
            None => out.push_str(&format!("{{{{{name}}}}}")),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone)]
enum Token {
    Var(String),
    Str(String),
    Num(f64),
    Op(&'static str),
    Keyword(&'static str),
    LParen,
    RParen,
}

fn tokenize_condition(condition: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = condition.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '(' {
            tokens.push(Token::LParen);
            i += 1;
        } else if c == ')' {
            tokens.push(Token::RParen);
            i += 1;
        } else if c == '{' && chars.get(i + 1) == Some(&'{') {
            let end = condition[i..].find("}}").map(|o| i + o).unwrap_or(chars.len());
            let name: String = chars[i + 2..end].iter().collect::<String>().trim().to_string();
            tokens.push(Token::Var(name));
            i = end + 2;
        } else if c == '\'' || c == '"' {
            let quote = c;
            let mut j = i + 1;
            while j < chars.len() && chars[j] != quote {
                j += 1;
            }
            let s: String = chars[i + 1..j].iter().collect();
            tokens.push(Token::Str(s));
            i = j + 1;
        } else if c.is_ascii_digit() {
            let mut j = i;
            while j < chars.len() && (chars[j].is_ascii_digit() || chars[j] == '.') {
                j += 1;
            }
            let n: String = chars[i..j].iter().collect();
            tokens.push(Token::Num(n.parse().unwrap_or(0.0)));
            i = j;
        } else if c == '>' || c == '<' || c == '=' || c == '!' {
            if chars.get(i + 1) == Some(&'=') {
                let op = match c {
                    '>' => ">=",
                    '<' => "<=",
                    '=' => "==",
                    _ => "!=",
                };
                tokens.push(Token::Op(op));
                i += 2;
            } else {
                tokens.push(Token::Op(if c == '>' { ">" } else { "<" }));
                i += 1;
            }
        } else {
            let mut j = i;
            while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            let word: String = chars[i..j].iter().collect();
            match word.as_str() {
                "and" => tokens.push(Token::Keyword("and")),
                "or" => tokens.push(Token::Keyword("or")),
                "not" => tokens.push(Token::Keyword("not")),
                "in" => tokens.push(Token::Keyword("in")),
                "is" => tokens.push(Token::Keyword("is")),
                _ => {}
            }
            i = if j > i { j } else { i + 1 };
        }
    }
    tokens
}

fn token_truth(tok: &Token, scope: &Scope) -> serde_json::Value {
    match tok {
        Token::Var(name) => scope.get(name).cloned().unwrap_or(serde_json::Value::Null),
        Token::Str(s) => serde_json::Value::String(s.clone()),
        Token::Num(n) => serde_json::json!(n),
        _ => serde_json::Value::Null,
    }
}

fn as_f64(v: &serde_json::Value) -> Option<f64> {
    v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok()))
}

/// Evaluate a flattened `left op right` (optionally `not`-prefixed, optionally
/// chained with one `and`/`or`) condition against `scope`. Supports only the
/// comparison, logical, and membership operator set the Validator whitelists.
pub fn eval_condition(condition: &str, scope: &Scope) -> bool {
    let tokens = tokenize_condition(condition);
    eval_tokens(&tokens, scope)
}

fn eval_tokens(tokens: &[Token], scope: &Scope) -> bool {
    // Split on top-level `and`/`or` first (left-to-right, `and` binds tighter).
    if let Some(pos) = find_keyword(tokens, "or") {
        return eval_tokens(&tokens[..pos], scope) || eval_tokens(&tokens[pos + 1..], scope);
    }
    if let Some(pos) = find_keyword(tokens, "and") {
        return eval_tokens(&tokens[..pos], scope) && eval_tokens(&tokens[pos + 1..], scope);
    }
    let (negate, tokens) = match tokens.first() {
        Some(Token::Keyword("not")) => (true, &tokens[1..]),
        _ => (false, tokens),
    };
    let result = eval_comparison(tokens, scope);
    if negate { !result } else { result }
}

fn find_keyword(tokens: &[Token], kw: &str) -> Option<usize> {
    tokens.iter().position(|t| matches!(t, Token::Keyword(k) if *k == kw))
}

fn eval_comparison(tokens: &[Token], scope: &Scope) -> bool {
    if tokens.is_empty() {
        return false;
    }
    if tokens.len() == 1 {
        return !matches!(token_truth(&tokens[0], scope), serde_json::Value::Null | serde_json::Value::Bool(false));
    }
    if let Some(pos) = tokens.iter().position(|t| matches!(t, Token::Keyword("in"))) {
        let left = token_truth(&tokens[pos - 1], scope);
        let right = token_truth(&tokens[pos + 1], scope);
        return right.to_string().contains(&left.to_string().trim_matches('"').to_string());
    }
    if let Some(pos) = tokens.iter().position(|t| matches!(t, Token::Op(_))) {
        let left = token_truth(&tokens[pos - 1], scope);
        let right = token_truth(&tokens[pos + 1], scope);
        let op = match &tokens[pos] {
            Token::Op(o) => *o,
            _ => unreachable!(),
        };
        return match (as_f64(&left), as_f64(&right)) {
            (Some(l), Some(r)) => match op {
                ">" => l > r,
                ">=" => l >= r,
                "<" => l < r,
                "<=" => l <= r,
                "==" => (l - r).abs() < f64::EPSILON,
                "!=" => (l - r).abs() >= f64::EPSILON,
                _ => false,
            },
            _ => match op {
                "==" => left == right,
                "!=" => left != right,
                _ => false,
            },
        };
    }
    false
}
"#;
