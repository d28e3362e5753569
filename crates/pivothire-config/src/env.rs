use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Matches `{{ env.NAME }}` and `{{ env.NAME | default("value") }}`
fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#).expect("must be valid regex")
    })
}

/// Expand environment placeholders in raw config text
///
/// Comment lines are copied through untouched so that commented-out
/// settings never require their variables to be set.
pub fn expand_env(input: &str) -> Result<String, String> {
    let mut expanded = Vec::new();

    for line in input.split('\n') {
        if line.trim_start().starts_with('#') {
            expanded.push(line.to_owned());
        } else {
            expanded.push(expand_line(line)?);
        }
    }

    Ok(expanded.join("\n"))
}

fn expand_line(line: &str) -> Result<String, String> {
    let mut failure = None;

    let replaced = placeholder().replace_all(line, |caps: &Captures<'_>| {
        let key = &caps[1];
        let fallback = caps.get(2).map(|m| m.as_str());

        match resolve(key, fallback) {
            Ok(value) => value,
            Err(e) => {
                failure.get_or_insert(e);
                String::new()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(replaced.into_owned()),
    }
}

fn resolve(key: &str, fallback: Option<&str>) -> Result<String, String> {
    let Some(name) = key.strip_prefix("env.").filter(|n| !n.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(name), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_owned()),
        (Err(_), None) => Err(format!("environment variable not found: `{name}`")),
    }
}
