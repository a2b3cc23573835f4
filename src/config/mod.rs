//! User configuration stored in `~/.ocmgr/config.toml`.
//!
//! ```toml
//! [github]
//! repo = "owner/opencode-profiles"
//! auth = "gh"
//!
//! [defaults]
//! merge_strategy = "prompt"
//! editor = "nvim"
//!
//! [store]
//! path = "~/.ocmgr/profiles"
//! ```
pub mod toml_loader;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::profiles::Strategy;

/// Environment variable overriding the configuration directory.
pub const HOME_ENV: &str = "OCMGR_HOME";

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Accepted values for `github.auth`.
pub const AUTH_METHODS: &[&str] = &["gh", "env", "ssh", "token"];

/// Accepted values for `defaults.merge_strategy`.
pub const MERGE_STRATEGIES: &[&str] = &["prompt", "overwrite", "merge", "skip"];

/// Every key accepted by [`Settings::set`], in display order.
pub const KEYS: &[&str] = &[
    "github.repo",
    "github.auth",
    "defaults.merge_strategy",
    "defaults.editor",
    "store.path",
];

/// `[github]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSettings {
    /// Remote profile repository as `owner/repo`.
    pub repo: String,
    /// Authentication method.
    pub auth: String,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            repo: String::new(),
            auth: "gh".to_string(),
        }
    }
}

/// `[defaults]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    /// Preferred conflict strategy.
    pub merge_strategy: String,
    /// Editor used to open profiles.
    pub editor: String,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            merge_strategy: "prompt".to_string(),
            editor: "nvim".to_string(),
        }
    }
}

/// `[store]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Profile store directory; a leading `~` is expanded on use.
    pub path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: "~/.ocmgr/profiles".to_string(),
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `[github]` section.
    pub github: GithubSettings,
    /// `[defaults]` section.
    pub defaults: DefaultSettings,
    /// `[store]` section.
    pub store: StoreSettings,
}

impl Settings {
    /// Load settings from `path`; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings: Self = toml_loader::load_config(path)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(settings)
    }

    /// Write settings to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        toml_loader::save_config(path, self)
    }

    /// Update one dotted key after validating its value.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnknownKey`] for a key not in [`KEYS`].
    /// - [`ConfigError::InvalidValue`] for an auth method or merge strategy
    ///   outside the accepted set.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let check = |allowed: &[&str]| {
            if allowed.contains(&value) {
                Ok(value.to_string())
            } else {
                Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    allowed: allowed.join(", "),
                })
            }
        };
        match key {
            "github.repo" => self.github.repo = value.to_string(),
            "github.auth" => self.github.auth = check(AUTH_METHODS)?,
            "defaults.merge_strategy" => self.defaults.merge_strategy = check(MERGE_STRATEGIES)?,
            "defaults.editor" => self.defaults.editor = value.to_string(),
            "store.path" => self.store.path = value.to_string(),
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                    valid: KEYS.join(", "),
                });
            }
        }
        Ok(())
    }

    /// Return the current value of a dotted key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "github.repo" => Some(&self.github.repo),
            "github.auth" => Some(&self.github.auth),
            "defaults.merge_strategy" => Some(&self.defaults.merge_strategy),
            "defaults.editor" => Some(&self.defaults.editor),
            "store.path" => Some(&self.store.path),
            _ => None,
        }
    }

    /// Render the settings grouped by section, as shown by `config show`.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut section = "";
        for key in KEYS {
            let Some((table, field)) = key.split_once('.') else {
                continue;
            };
            if table != section {
                if !section.is_empty() {
                    out.push('\n');
                }
                writeln!(out, "[{table}]").unwrap_or(());
                section = table;
            }
            writeln!(out, "  {field:<16} = {}", self.get(key).unwrap_or("")).unwrap_or(());
        }
        out
    }

    /// Store directory with `~` expanded.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        expand_path(&self.store.path)
    }

    /// The configured merge strategy, if it parses.
    #[must_use]
    pub fn merge_strategy(&self) -> Option<Strategy> {
        self.defaults.merge_strategy.parse().ok()
    }
}

/// Return the user's home directory from `HOME` (or `USERPROFILE`).
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Expand a leading `~` to the home directory. Paths without one, or when no
/// home directory is known, are returned unchanged.
#[must_use]
pub fn expand_path(raw: &str) -> PathBuf {
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/")
    };
    match (rest, home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

/// Directory holding `config.toml`: `$OCMGR_HOME`, else `~/.ocmgr`.
///
/// # Errors
///
/// Returns [`ConfigError::NoHome`] if neither is available.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    home_dir()
        .map(|home| home.join(".ocmgr"))
        .ok_or(ConfigError::NoHome)
}

/// Full path of the configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::NoHome`] if the configuration directory is unknown.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE))
}
