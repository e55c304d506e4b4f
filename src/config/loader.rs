use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::types::AppConfig;

/// Name of the per-repository config file.
pub const LOCAL_CONFIG_NAME: &str = ".tracker.toml";

/// Discover and load the CLI config.
///
/// Priority:
/// 1. `--config` flag (explicit path)
/// 2. `.tracker.toml` in the current Git repository root
/// 3. `$TRACKER_CONFIG` environment variable
/// 4. `$XDG_CONFIG_HOME/tracker/config.toml`
/// 5. `~/.config/tracker/config.toml`
///
/// When both a global and a repo-local config exist, fields set in the local
/// file win and the rest come from the global one.
pub fn load_config(explicit_path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit_path {
        return read_config(path);
    }

    let global_path = find_global_config();
    let local_path = find_repo_local_config();

    let config = match (global_path, local_path) {
        (Some(global), Some(local)) => read_config(&global)?.merge(read_config(&local)?),
        (Some(path), None) | (None, Some(path)) => read_config(&path)?,
        (None, None) => AppConfig::default(),
    };
    Ok(config)
}

/// Parse a single config file.
pub fn read_config(path: &Path) -> Result<AppConfig> {
    tracing::debug!("config: reading {}", path.display());
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parsing TOML from {}", path.display()))
}

fn find_repo_local_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_local_config_from(&cwd)
}

/// Walk up from `start` looking for `.tracker.toml`, stopping at the first
/// directory that holds a `.git` entry.
pub fn find_local_config_from(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(LOCAL_CONFIG_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if dir.join(".git").exists() {
            return None;
        }
        if !dir.pop() {
            return None;
        }
    }
}

fn find_global_config() -> Option<PathBuf> {
    // $TRACKER_CONFIG
    if let Ok(path) = std::env::var("TRACKER_CONFIG") {
        let p = PathBuf::from(&path);
        if p.is_file() {
            return Some(p);
        }
    }

    // $XDG_CONFIG_HOME/tracker/config.toml
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let p = PathBuf::from(xdg).join("tracker/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // ~/.config/tracker/config.toml
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        let p = home.join(".config/tracker/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    None
}
