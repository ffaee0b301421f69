//! Named placeholder substitution for message text
//!
//! Stored message text uses `{name}` placeholders. `{{` and `}}` produce
//! literal braces. Every placeholder must be present in the variable map.

use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

// Escaped braces come first so `{{name}}` stays literal
const PLACEHOLDER_PATTERN: &str = r"\{\{|\}\}|\{([^{}]*)\}";

/// Substitute `{name}` placeholders in `text` with values from `variables`
pub fn render(text: &str, variables: &HashMap<String, String>) -> Result<String> {
    let re = Regex::new(PLACEHOLDER_PATTERN)
        .map_err(|e| Error::Template(format!("Invalid placeholder pattern: {}", e)))?;
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in re.captures_iter(text) {
        let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        push_literal(&mut out, &text[last..whole.start])?;
        last = whole.end;

        let Some(field) = caps.get(1) else {
            // `{{` or `}}`
            out.push_str(&text[whole.start..whole.start + 1]);
            continue;
        };

        let name = field.as_str();
        if name.is_empty() {
            return Err(Error::Template(
                "positional placeholder '{}' is not supported".to_string(),
            ));
        }
        if name.contains(':') || name.contains('!') {
            return Err(Error::Template(format!(
                "format spec in placeholder '{{{}}}' is not supported",
                name
            )));
        }

        let value = variables
            .get(name)
            .ok_or_else(|| Error::Template(format!("no value for placeholder '{}'", name)))?;
        out.push_str(value);
    }

    push_literal(&mut out, &text[last..])?;
    Ok(out)
}

fn push_literal(out: &mut String, segment: &str) -> Result<()> {
    if segment.contains('{') {
        return Err(Error::Template("unmatched '{' in message text".to_string()));
    }
    if segment.contains('}') {
        return Err(Error::Template("unmatched '}' in message text".to_string()));
    }
    out.push_str(segment);
    Ok(())
}

/// Text form of a resolved recipient attribute
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
