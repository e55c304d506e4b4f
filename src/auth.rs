use anyhow::{Result, bail};

/// Environment variables consulted for the API token, in order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["PIVOTAL_TRACKER_TOKEN", "TRACKER_TOKEN"];

/// Resolve the Tracker API token for the CLI.
///
/// Priority:
/// 1. `api_token` from the config file
/// 2. `PIVOTAL_TRACKER_TOKEN` environment variable
/// 3. `TRACKER_TOKEN` environment variable
///
/// Empty values are skipped.
pub fn resolve_token(configured: Option<&str>) -> Result<String> {
    resolve_token_with(configured, |name| std::env::var(name).ok())
}

fn resolve_token_with(
    configured: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    if let Some(token) = configured
        && !token.trim().is_empty()
    {
        return Ok(token.trim().to_owned());
    }

    for name in TOKEN_ENV_VARS {
        if let Some(token) = lookup(name)
            && !token.trim().is_empty()
        {
            tracing::debug!("auth: using token from {name}");
            return Ok(token.trim().to_owned());
        }
    }

    bail!(
        "no Tracker API token found. \
         Set api_token in the config file or export PIVOTAL_TRACKER_TOKEN / TRACKER_TOKEN."
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn configured_token_wins() {
        let token = resolve_token_with(Some("from-file"), env(&[("TRACKER_TOKEN", "from-env")]));
        assert_eq!(token.unwrap(), "from-file");
    }

    #[test]
    fn env_vars_in_priority_order() {
        let token = resolve_token_with(
            None,
            env(&[("PIVOTAL_TRACKER_TOKEN", "first"), ("TRACKER_TOKEN", "second")]),
        );
        assert_eq!(token.unwrap(), "first");
    }

    #[test]
    fn empty_values_are_skipped() {
        let token = resolve_token_with(
            Some(""),
            env(&[("PIVOTAL_TRACKER_TOKEN", " "), ("TRACKER_TOKEN", "second")]),
        );
        assert_eq!(token.unwrap(), "second");
    }

    #[test]
    fn missing_token_names_the_variables() {
        let err = resolve_token_with(None, env(&[])).unwrap_err();
        assert!(err.to_string().contains("PIVOTAL_TRACKER_TOKEN"));
    }
}
