//! Path template interpolation
//!
//! Endpoint paths may embed context keys in single braces, e.g.
//! `/metadata/{table}/{key}`. Rendering substitutes each placeholder with the
//! matching context value; a placeholder with no matching key is a hierarchy
//! misconfiguration and fails the stream.

use crate::context::{value_to_param, Context};
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Regex for matching path placeholders: {variable}
static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("valid placeholder regex"));

/// Render a path template with the given context
pub fn render_path(template: &str, ctx: &Context) -> Result<String> {
    let mut result = template.to_string();
    let mut missing = Vec::new();

    for cap in PLACEHOLDER_REGEX.captures_iter(template) {
        let full_match = cap.get(0).expect("match").as_str();
        let key = cap.get(1).expect("group").as_str();

        match ctx.get(key) {
            Some(value) => {
                result = result.replace(full_match, &value_to_param(value));
            }
            None => missing.push(key.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(result)
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Check if a path contains placeholders
pub fn has_placeholders(path: &str) -> bool {
    PLACEHOLDER_REGEX.is_match(path)
}

/// Extract all placeholder names from a path template
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|cap| cap.get(1).expect("group").as_str().to_string())
        .collect()
}
