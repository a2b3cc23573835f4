//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{ProfileEntry, ProfileStatus};
use super::utils::log_file_path;

/// Structured logger with dry-run awareness and summary collection.
///
/// All messages are always written to a persistent log file at
/// `$XDG_CACHE_HOME/ocmgr/<command>.log` (default `~/.cache/ocmgr/<command>.log`)
/// with timestamps and ANSI codes stripped, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    profiles: Mutex<Vec<ProfileEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary. The log file
    /// itself is created by [`init_subscriber`](super::subscriber::init_subscriber);
    /// this constructor does not write to it.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            profiles: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded profile entries.
    #[must_use]
    pub fn entries(&self) -> Vec<ProfileEntry> {
        self.profiles.lock().map_or_else(|_| vec![], |g| g.clone())
    }
}

// Output goes through the global subscriber.
#[allow(clippy::unused_self)]
impl Logger {
    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }
}

impl Logger {
    /// Record a profile outcome for the summary.
    pub fn record_profile(&self, entry: ProfileEntry) {
        if let Ok(mut guard) = self.profiles.lock() {
            guard.push(entry);
        }
    }

    /// Return `true` if any recorded profile has failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Count the number of failed profiles.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.profiles.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|p| p.status == ProfileStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded profiles.
    pub fn print_summary(&self) {
        let entries = self.entries();
        if entries.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut copied = 0usize;
        let mut skipped = 0usize;
        let mut errored = 0usize;

        for entry in &entries {
            let (icon, color) = match entry.status {
                ProfileStatus::Ok => ("✓", "\x1b[32m"),
                ProfileStatus::DryRun => ("~", "\x1b[37m"),
                ProfileStatus::Cancelled => ("○", "\x1b[33m"),
                ProfileStatus::Failed => ("✗", "\x1b[31m"),
            };
            copied += entry.copied;
            skipped += entry.skipped;
            errored += entry.errored;

            self.info(&format!(
                "{color}{icon} {}\x1b[0m ({} copied, {} skipped, {} errors)",
                entry.name, entry.copied, entry.skipped, entry.errored
            ));
        }

        self.info(&format!(
            "{} profiles: \x1b[32m{copied} copied\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[31m{errored} errors\x1b[0m",
            entries.len()
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}
