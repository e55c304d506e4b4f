use serde::Deserialize;

use crate::shape::OutputShape;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Settings read from `config.toml` / `.tracker.toml` by the `tracker` CLI.
///
/// Every field is optional so a repo-local file can override only what it
/// needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// API token. Prefer the environment variables over storing it here.
    pub api_token: Option<String>,
    pub project_id: Option<String>,
    pub output: Option<OutputShape>,
    /// Alternative service root, e.g. for a proxy.
    pub base_url: Option<String>,
}

impl AppConfig {
    pub fn output_shape(&self) -> OutputShape {
        self.output.unwrap_or_default()
    }

    /// Overlay `local` on top of `self`: fields set in `local` win.
    pub fn merge(self, local: Self) -> Self {
        Self {
            api_token: local.api_token.or(self.api_token),
            project_id: local.project_id.or(self.project_id),
            output: local.output.or(self.output),
            base_url: local.base_url.or(self.base_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_fields_override_global() {
        let global = AppConfig {
            api_token: Some("global-token".into()),
            project_id: Some("1".into()),
            output: Some(OutputShape::Map),
            base_url: None,
        };
        let local = AppConfig {
            project_id: Some("2".into()),
            ..AppConfig::default()
        };
        let merged = global.merge(local);
        assert_eq!(merged.api_token.as_deref(), Some("global-token"));
        assert_eq!(merged.project_id.as_deref(), Some("2"));
        assert_eq!(merged.output_shape(), OutputShape::Map);
    }

    #[test]
    fn output_defaults_to_struct() {
        assert_eq!(AppConfig::default().output_shape(), OutputShape::Struct);
    }
}
