//! Materialization of a single profile onto a target directory.
//!
//! [`copy_profile`] walks the content directories of a profile, applies the
//! include/exclude filter, and for every file either writes it (new files),
//! or consults the conflict policy (existing files). Per-file failures are
//! collected into the [`CopyResult`] instead of aborting the walk.
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ProfileError;

use super::conflict::{self, ConflictHandler, Decision, Strategy};
use super::content::{ContentDir, ContentFilter};
use super::fs::{SYMLINKED_DIR, copy_file};

/// Options shared by every materialization in one run.
#[derive(Default)]
pub struct CopyOptions<'a> {
    /// How existing destination files are treated.
    pub strategy: Strategy,
    /// Report what would happen without touching the target.
    pub dry_run: bool,
    /// Which content directories to copy.
    pub filter: ContentFilter,
    /// Decision function consulted under [`Strategy::Prompt`].
    pub on_conflict: Option<Box<dyn ConflictHandler + 'a>>,
}

impl<'a> CopyOptions<'a> {
    /// Options with the given strategy, no filter and no handler.
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Set dry-run mode.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the content filter.
    #[must_use]
    pub fn filter(mut self, filter: ContentFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Install the conflict handler used under [`Strategy::Prompt`].
    #[must_use]
    pub fn on_conflict(mut self, handler: impl ConflictHandler + 'a) -> Self {
        self.on_conflict = Some(Box::new(handler));
        self
    }
}

impl fmt::Debug for CopyOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyOptions")
            .field("strategy", &self.strategy)
            .field("dry_run", &self.dry_run)
            .field("filter", &self.filter)
            .field("on_conflict", &self.on_conflict.is_some())
            .finish()
    }
}

/// A file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    /// Path relative to the profile root.
    pub path: PathBuf,
    /// Human-readable description of the failure.
    pub message: String,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Outcome of materializing one profile. All paths are relative to the
/// profile root (and therefore to the target root).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyResult {
    /// Files written, or that would be written under dry-run.
    pub copied: Vec<PathBuf>,
    /// Existing files left untouched.
    pub skipped: Vec<PathBuf>,
    /// Files that failed, in walk order.
    pub errored: Vec<FileError>,
    /// The walk stopped early on an explicit cancel.
    pub cancelled: bool,
}

impl CopyResult {
    /// Return `true` if no file failed and the walk ran to completion.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.errored.is_empty() && !self.cancelled
    }

    /// Convert a cancelled result into [`ProfileError::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Cancelled`] if the walk was cancelled.
    pub const fn check_cancelled(&self) -> Result<(), ProfileError> {
        if self.cancelled {
            Err(ProfileError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn record_error(&mut self, path: &Path, message: impl fmt::Display) {
        tracing::debug!(path = %path.display(), %message, "file failed");
        self.errored.push(FileError {
            path: path.to_path_buf(),
            message: message.to_string(),
        });
    }
}

/// Whether the walk should go on after an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Materialize the content directories of `profile_root` onto `target_root`.
///
/// New files are always written. Existing files go through the conflict
/// policy for `opts.strategy`. Under `opts.dry_run` the walk and every
/// decision (including prompting) still happen, but nothing under
/// `target_root` is created or modified.
///
/// Only files are copied; intermediate directories are created as a side
/// effect of writing them. Top-level entries that are not content
/// directories, or that the filter rejects, are never descended into.
///
/// Symbolic links to files are copied as regular files. Symbolic links to
/// directories are never followed and are recorded in `errored`.
///
/// # Errors
///
/// Returns [`ProfileError::FileIo`] only if `profile_root` itself cannot be
/// listed. Everything else is reported through the returned [`CopyResult`].
/// That includes cancellation: an `Ok` result may still have
/// [`CopyResult::cancelled`] set, so callers that need an error should use
/// [`CopyResult::check_cancelled`].
pub fn copy_profile(
    profile_root: &Path,
    target_root: &Path,
    opts: &mut CopyOptions<'_>,
) -> Result<CopyResult, ProfileError> {
    let mut entries: Vec<_> = std::fs::read_dir(profile_root)
        .map_err(|e| ProfileError::io(profile_root, e))?
        .collect();
    entries.sort_by_key(|entry| entry.as_ref().map(std::fs::DirEntry::file_name).ok());

    let mut result = CopyResult::default();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                result.record_error(profile_root, e);
                continue;
            }
        };
        let name = entry.file_name();
        let Some(dir) = name.to_str().and_then(ContentDir::from_name) else {
            tracing::debug!(entry = ?name, "ignoring non-content entry");
            continue;
        };
        if !opts.filter.allows(dir) {
            tracing::debug!(%dir, "filtered out");
            continue;
        }

        let rel = PathBuf::from(&name);
        if visit(profile_root, target_root, &rel, opts, &mut result) == Flow::Stop {
            result.cancelled = true;
            break;
        }
    }

    tracing::debug!(
        profile = %profile_root.display(),
        copied = result.copied.len(),
        skipped = result.skipped.len(),
        errored = result.errored.len(),
        cancelled = result.cancelled,
        "materialized profile"
    );
    Ok(result)
}

/// Visit one entry below a content directory, recursing into directories.
fn visit(
    profile_root: &Path,
    target_root: &Path,
    rel: &Path,
    opts: &mut CopyOptions<'_>,
    result: &mut CopyResult,
) -> Flow {
    let src = profile_root.join(rel);
    let file_type = match std::fs::symlink_metadata(&src) {
        Ok(meta) => meta.file_type(),
        Err(e) => {
            result.record_error(rel, e);
            return Flow::Continue;
        }
    };
    // Links to files are copied as files; links to directories could loop.
    if file_type.is_symlink() && src.is_dir() {
        result.record_error(rel, SYMLINKED_DIR);
        return Flow::Continue;
    }
    if file_type.is_dir() {
        let entries = match std::fs::read_dir(&src) {
            Ok(rd) => rd,
            Err(e) => {
                result.record_error(rel, e);
                return Flow::Continue;
            }
        };
        let mut children = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => children.push(rel.join(entry.file_name())),
                Err(e) => result.record_error(rel, e),
            }
        }
        children.sort();
        for child in children {
            if visit(profile_root, target_root, &child, opts, result) == Flow::Stop {
                return Flow::Stop;
            }
        }
        return Flow::Continue;
    }

    let dest = target_root.join(rel);
    let decision = if dest.exists() {
        match conflict::decide(opts.strategy, opts.on_conflict.as_deref_mut(), &src, &dest) {
            Ok(decision) => decision,
            Err(e) => {
                result.record_error(rel, format!("{e:#}"));
                return Flow::Continue;
            }
        }
    } else {
        Decision::Overwrite
    };

    match decision {
        Decision::Overwrite => {
            if !opts.dry_run
                && let Err(e) = copy_file(&src, &dest)
            {
                result.record_error(rel, e);
                return Flow::Continue;
            }
            result.copied.push(rel.to_path_buf());
        }
        Decision::Skip => result.skipped.push(rel.to_path_buf()),
        Decision::Cancel => {
            tracing::debug!(path = %rel.display(), "cancelled by conflict handler");
            return Flow::Stop;
        }
    }
    Flow::Continue
}
