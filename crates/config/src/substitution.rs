use anyhow::{Context, Result};
use regex::Regex;
use std::env;
use tracing::{debug, warn};

const PLACEHOLDER_PATTERN: &str = r"\$\{(\w+)\}|\$(\w+)";

fn placeholder_regex() -> Result<Regex> {
    Regex::new(PLACEHOLDER_PATTERN).context("Invalid placeholder pattern")
}

/// Substitute environment variables in the format ${VAR_NAME} or $VAR_NAME
pub fn substitute_env_vars(content: &str) -> Result<String> {
    substitute_with(content, |name| env::var(name).ok())
}

/// Substitute placeholders using a custom lookup.
///
/// Unresolved placeholders are left in place so the validator can report them.
pub fn substitute_with<F>(content: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let re = placeholder_regex()?;
    let mut missing_vars = Vec::new();

    let result = re.replace_all(content, |caps: &regex::Captures<'_>| {
        let var_name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();

        match lookup(var_name) {
            Some(value) => {
                debug!("Substituting environment variable: {} = \"{}\"", var_name, value);
                value
            }
            None => {
                warn!("Environment variable '{}' not set", var_name);
                missing_vars.push(var_name.to_string());
                caps[0].to_string()
            }
        }
    });

    if !missing_vars.is_empty() {
        debug!(
            "Environment variables not set (may fail validation): {:?}",
            missing_vars
        );
    }

    Ok(result.into_owned())
}

/// Check if a string contains unresolved environment variable placeholders
pub fn has_unresolved_env_vars(content: &str) -> bool {
    placeholder_regex()
        .map(|re| re.is_match(content))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "QUESTDB_HOST" => Some("questdb.internal".to_string()),
            "PORT" => Some("9000".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_substitute_both_forms() {
        let out = substitute_with("http://${QUESTDB_HOST}:$PORT", lookup).unwrap();
        assert_eq!(out, "http://questdb.internal:9000");
    }

    #[test]
    fn test_missing_var_keeps_placeholder() {
        let out = substitute_with("base_url: ${NOT_SET}", lookup).unwrap();
        assert_eq!(out, "base_url: ${NOT_SET}");
        assert!(has_unresolved_env_vars(&out));
    }

    #[test]
    fn test_plain_text_untouched() {
        assert!(!has_unresolved_env_vars("http://localhost:9000"));
        assert_eq!(substitute_with("EURUSD", lookup).unwrap(), "EURUSD");
    }
}
