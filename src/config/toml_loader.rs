//! TOML file loading and saving for configuration types.
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Deserialize `path` into `T`.
///
/// A missing file yields whatever `T` deserializes from an empty document,
/// so types with `#[serde(default)]` come back with their defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file exists but cannot be read, or
/// [`ConfigError::Parse`] if it is not valid TOML for `T`.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = if path.exists() {
        std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        String::new()
    };

    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}

/// Serialize `value` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Serialize`] if `value` cannot be rendered, or
/// [`ConfigError::Io`] if the file cannot be written.
pub fn save_config<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string()))?;
    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, content).map_err(io_error)
}
