//! Profile composition and materialization.
//!
//! Requested profile names are resolved into an ordered chain
//! ([`resolver`]), then each profile in the chain is materialized onto the
//! same target ([`layering`] driving [`copier`]), with existing files
//! handled by the [`conflict`] policy and the walk restricted to the
//! [`content`] directories.
//!
//! Nothing in this module prints; results and typed errors are returned to
//! the command layer for reporting.
pub mod conflict;
pub mod content;
pub mod copier;
pub mod fs;
pub mod layering;
pub mod name;
pub mod resolver;

use std::path::PathBuf;

use crate::error::ProfileError;

/// Metadata and location lookups the core needs from a profile store.
#[cfg_attr(test, mockall::automock)]
pub trait ProfileLookup {
    /// Return the parent ("extends") of `name`, or `None` when it has none.
    ///
    /// # Errors
    ///
    /// Fails if the profile does not exist or its metadata is unreadable.
    fn parent(&self, name: &str) -> Result<Option<String>, ProfileError>;

    /// Return the directory holding the profile's content.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::ProfileNotFound`] for an unknown name.
    fn root(&self, name: &str) -> Result<PathBuf, ProfileError>;
}

/// Resolve `requested` through a [`ProfileLookup`].
///
/// # Errors
///
/// See [`resolver::resolve`].
pub fn resolve_chain<S: AsRef<str>>(
    lookup: &dyn ProfileLookup,
    requested: &[S],
) -> Result<Vec<String>, ProfileError> {
    resolver::resolve(requested, |name| lookup.parent(name))
}

pub use conflict::{ConflictChoice, ConflictHandler, Strategy};
pub use content::{ContentDir, ContentFilter};
pub use copier::{CopyOptions, CopyResult, FileError, copy_profile};
pub use layering::{ChainReport, apply_chain};
