//! Layered configuration: defaults, then the global file, then `.wt.toml`
//! in the current directory, then `WORKTREE_BASE_DIR`.
//!
//! Later layers replace scalar values. Lists from every layer are
//! concatenated with duplicates dropped.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const BASE_DIR_ENV: &str = "WORKTREE_BASE_DIR";
pub const LOCAL_CONFIG_FILE: &str = ".wt.toml";

/// An extra tmux window opened in each new session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WindowSpec {
    pub name: String,
    #[serde(default)]
    pub command: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    worktrees_location: Option<String>,
    #[serde(default)]
    copy_files: Vec<String>,
    #[serde(default)]
    windows: Vec<WindowSpec>,
    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub worktrees_location: PathBuf,
    /// Glob patterns, relative to the main checkout, copied into new worktrees.
    pub copy_files: Vec<String>,
    pub windows: Vec<WindowSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worktrees_location: home_dir().join("projects").join("worktrees"),
            copy_files: Vec::new(),
            windows: Vec::new(),
        }
    }
}

impl Config {
    /// Load from the standard locations. Problems with a file are logged and
    /// that file is skipped; this never fails.
    pub fn load() -> Self {
        let mut paths: Vec<PathBuf> = global_config_path().into_iter().collect();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(LOCAL_CONFIG_FILE));
        }
        Self::load_from(&paths)
    }

    pub fn load_from(paths: &[PathBuf]) -> Self {
        let mut config = Self::default();
        for path in paths {
            match read_layer(path) {
                Ok(Some(layer)) => {
                    debug!(path = %path.display(), "loaded config layer");
                    config.apply(layer);
                }
                Ok(None) => {}
                Err(e) => warn!("{e}; ignoring this file"),
            }
        }
        if let Ok(dir) = std::env::var(BASE_DIR_ENV)
            && !dir.trim().is_empty()
        {
            config.worktrees_location = PathBuf::from(dir.trim());
        }
        config.worktrees_location = expand_path(&config.worktrees_location);
        config
    }

    fn apply(&mut self, layer: PartialConfig) {
        if let Some(location) = layer.worktrees_location
            && !location.trim().is_empty()
        {
            self.worktrees_location = PathBuf::from(location.trim());
        }
        extend_unique(&mut self.copy_files, layer.copy_files);
        extend_unique(&mut self.windows, layer.windows);
    }
}

fn read_layer(path: &Path) -> Result<Option<PartialConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    let layer = toml::from_str(&raw).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;
    warn_unknown_keys(path, &layer);
    Ok(Some(layer))
}

fn warn_unknown_keys(path: &Path, layer: &PartialConfig) {
    for key in layer.unknown.keys() {
        warn!(path = %path.display(), "unknown config key '{key}' ignored");
    }
}

fn extend_unique<T: PartialEq>(dst: &mut Vec<T>, src: Vec<T>) {
    for item in src {
        if !dst.contains(&item) {
            dst.push(item);
        }
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default()
}

/// `$XDG_CONFIG_HOME/wt/config.toml`, falling back to `~/.config`.
pub fn global_config_path() -> Option<PathBuf> {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => dirs::home_dir()?.join(".config"),
    };
    Some(base.join("wt").join("config.toml"))
}

/// Expand a leading `~` and make the path absolute.
fn expand_path(path: &Path) -> PathBuf {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    };
    if expanded.is_absolute() {
        return expanded;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(expanded),
        Err(_) => expanded,
    }
}
