//! Summary entry types recorded by the [`Logger`](super::Logger).
use std::fmt;

use crate::profiles::CopyResult;

/// Outcome of applying one profile, for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEntry {
    /// Profile name.
    pub name: String,
    /// Final status of the profile.
    pub status: ProfileStatus,
    /// Number of files written (or that would be written).
    pub copied: usize,
    /// Number of existing files left untouched.
    pub skipped: usize,
    /// Number of files that failed.
    pub errored: usize,
}

impl ProfileEntry {
    /// Build an entry from a materialization result.
    #[must_use]
    pub fn from_result(name: &str, result: &CopyResult, dry_run: bool) -> Self {
        let status = if result.cancelled {
            ProfileStatus::Cancelled
        } else if !result.errored.is_empty() {
            ProfileStatus::Failed
        } else if dry_run {
            ProfileStatus::DryRun
        } else {
            ProfileStatus::Ok
        };
        Self {
            name: name.to_string(),
            status,
            copied: result.copied.len(),
            skipped: result.skipped.len(),
            errored: result.errored.len(),
        }
    }

    /// Entry for a profile that failed before any file was processed.
    #[must_use]
    pub fn failed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: ProfileStatus::Failed,
            copied: 0,
            skipped: 0,
            errored: 0,
        }
    }
}

/// Status of an applied profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStatus {
    /// Every file was processed without error.
    Ok,
    /// Processed in dry-run mode; nothing was written.
    DryRun,
    /// Stopped early by the operator.
    Cancelled,
    /// At least one file failed, or the profile could not be applied.
    Failed,
}

impl fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "ok",
            Self::DryRun => "dry-run",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        })
    }
}
