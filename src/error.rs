//! Domain-specific error types for the profile manager.
//!
//! Internal modules return typed errors ([`ProfileError`], [`ConfigError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ProfileError  : identifier validation, chain resolution, store lookups,
//!                 content filters, materialization, cancellation
//! ConfigError   : config.toml loading, saving and key updates
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error used to carry an underlying cause across the lookup seam.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by profile resolution and materialization.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// A profile name does not match the identifier pattern.
    #[error("invalid profile name '{name}': {reason}")]
    InvalidIdentifier {
        /// The rejected name.
        name: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// A parent-chain walk revisited a profile already on the current path.
    #[error("circular dependency detected: {0}")]
    CircularDependency(String),

    /// The metadata loader failed while resolving a profile's parent chain.
    #[error("resolving profile '{name}': {source}")]
    ResolutionFailed {
        /// Profile whose metadata could not be loaded.
        name: String,
        /// Underlying loader error.
        source: BoxError,
    },

    /// The store has no profile with this name.
    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    /// A profile with this name already exists in the store.
    #[error("profile '{0}' already exists")]
    AlreadyExists(String),

    /// A filter token is not one of the recognised content directories.
    #[error("invalid content directory '{token}'; must be one of: {valid}")]
    InvalidContentDir {
        /// The offending token.
        token: String,
        /// Comma-separated list of valid content directory names.
        valid: String,
    },

    /// Two options that cannot be combined were supplied together.
    #[error("{first} and {second} are mutually exclusive")]
    MutuallyExclusiveOptions {
        /// First conflicting option.
        first: String,
        /// Second conflicting option.
        second: String,
    },

    /// `profile.toml` is missing, unreadable or malformed.
    #[error("invalid profile metadata {}: {message}", .path.display())]
    Metadata {
        /// Path of the metadata file.
        path: PathBuf,
        /// Human-readable description of the problem.
        message: String,
    },

    /// A filesystem operation on a single path failed.
    #[error("{}: {source}", .path.display())]
    FileIo {
        /// Path the operation was acting on.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The operator aborted the operation.
    #[error("operation cancelled by user")]
    Cancelled,
}

impl ProfileError {
    /// Return `true` if this error records an explicit operator abort rather
    /// than a failure.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Build an [`ProfileError::FileIo`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.into(),
            source,
        }
    }
}

/// Errors that arise from configuration loading and updates.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading or writing the config file.
    #[error("IO error on config file {}: {source}", .path.display())]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for the expected schema.
    #[error("invalid config file {}: {message}", .path.display())]
    Parse {
        /// Path of the config file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The configuration could not be serialized.
    #[error("cannot serialize config: {0}")]
    Serialize(String),

    /// `config set` was called with a key that does not exist.
    #[error("unrecognized key '{key}'; valid keys: {valid}")]
    UnknownKey {
        /// The rejected key.
        key: String,
        /// Comma-separated list of valid keys.
        valid: String,
    },

    /// A key was given a value outside its allowed set.
    #[error("invalid value '{value}' for {key}; must be one of: {allowed}")]
    InvalidValue {
        /// Key being set.
        key: String,
        /// The rejected value.
        value: String,
        /// Comma-separated list of allowed values.
        allowed: String,
    },

    /// The user's home directory could not be determined.
    #[error("cannot determine home directory; set HOME or OCMGR_HOME")]
    NoHome,
}
