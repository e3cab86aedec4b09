//! Placeholder substitution engine.
//!
//! Replaces `{name}` tokens in a template against a supplied mapping.
//! The engine is deliberately non-strict: a `{name}` whose key is
//! absent stays in the output verbatim, so templates can be partially
//! specialized across pipeline stages. Substitution never fails.
//!
//! Token rules:
//! - a token opens at a `{` not immediately preceded by another `{`
//! - the name may not contain braces or newlines and must be non-empty
//! - the closing `}` may not be immediately followed by another `}`
//!
//! Anything violating these rules — `{{escaped}}`, `{}`, `{multi
//! line}` — is copied through unchanged.

use std::collections::HashMap;

/// A substitution value: a scalar or a sequence. Sequences are
/// concatenated as text.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    Text(String),
    List(Vec<String>),
}

impl TemplateValue {
    fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::List(items) => items.concat(),
        }
    }
}

impl From<String> for TemplateValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for TemplateValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<String>> for TemplateValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// The name → value mapping fed to [`substitute`].
pub type TemplateVars = HashMap<String, TemplateValue>;

/// Substitute `{name}` tokens in `template` against `vars`.
pub fn substitute(template: &str, vars: &TemplateVars) -> String {
    let bytes = template.as_bytes();
    let len = bytes.len();
    let mut out = String::with_capacity(len);
    let mut i = 0;

    while i < len {
        let Some(off) = template[i..].find('{') else {
            out.push_str(&template[i..]);
            break;
        };
        let open = i + off;
        out.push_str(&template[i..open]);

        // `{{` escape: an opening brace preceded by another brace
        // never starts a token.
        let escaped = open > 0 && bytes[open - 1] == b'{';
        if !escaped {
            // Scan the candidate name up to the closing brace.
            let mut close = open + 1;
            while close < len && !matches!(bytes[close], b'{' | b'}' | b'\n') {
                close += 1;
            }
            let is_token = close < len
                && bytes[close] == b'}'
                && close > open + 1
                && (close + 1 >= len || bytes[close + 1] != b'}');
            if is_token {
                let name = &template[open + 1..close];
                match vars.get(name) {
                    Some(value) => out.push_str(&value.render()),
                    None => out.push_str(&template[open..=close]),
                }
                i = close + 1;
                continue;
            }
        }

        out.push('{');
        i = open + 1;
    }

    out
}
