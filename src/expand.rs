//! Deferred placeholder expansion.
//!
//! Resolves `${NAME}` and bare `$NAME` references against environment
//! bindings. Braced references are resolved first, then bare ones, so a `$`
//! directly followed by `{` is never read as the start of a bare name.
//!
//! Unbound references are left verbatim, delimiters included:
//!
//! ```
//! use lambda_reload::expand::expand_with;
//!
//! let lookup = |name: &str| (name == "STAGE").then(|| "dev".to_string());
//! assert_eq!(expand_with("fn-${STAGE}-${MISSING}", lookup), "fn-dev-${MISSING}");
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

static BRACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid braced regex"));

static BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("valid bare regex"));

/// Expand placeholders against the process environment.
pub fn expand(value: &str) -> String {
    expand_with(value, env_lookup)
}

/// Expand placeholders using a caller-supplied lookup.
pub fn expand_with<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if !value.contains('$') {
        return value.to_string();
    }

    let braced = replace_refs(&BRACED, value, &lookup);
    replace_refs(&BARE, &braced, &lookup)
}

/// Expand an optional value. `None` passes through untouched.
pub fn expand_opt(value: Option<&str>) -> Option<String> {
    value.map(expand)
}

/// Recursively expand every string inside a structured value.
pub fn expand_deep(value: Value) -> Value {
    expand_deep_with(value, &env_lookup)
}

/// Recursively expand every string inside a structured value using `lookup`.
///
/// Sequences and mappings keep their shape; booleans, numbers and null are
/// returned as they came in.
pub fn expand_deep_with<F>(value: Value, lookup: &F) -> Value
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::String(s) => Value::String(expand_with(&s, lookup)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| expand_deep_with(item, lookup))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, expand_deep_with(item, lookup)))
                .collect(),
        ),
        scalar @ (Value::Null | Value::Bool(_) | Value::Number(_)) => scalar,
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn replace_refs<F>(pattern: &Regex, input: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    pattern
        .replace_all(input, |caps: &Captures<'_>| match lookup(&caps[1]) {
            Some(bound) => bound,
            // Keep the whole match, delimiters included
            None => caps[0].to_string(),
        })
        .into_owned()
}
