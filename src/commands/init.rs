//! Command: apply profiles to a project's `.opencode` directory.
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, InitOpts};
use crate::error::ProfileError;
use crate::exec;
use crate::logging::{Logger, ProfileEntry};
use crate::profiles::fs::{detect_plugin_deps, files_identical};
use crate::profiles::{
    ChainReport, ConflictChoice, ConflictHandler, ContentFilter, CopyOptions, CopyResult,
    Strategy, apply_chain, resolve_chain,
};

use super::CommandSetup;

/// Directory inside the project that profiles are materialized into.
pub const OPENCODE_DIR: &str = ".opencode";

/// Run the init command.
///
/// # Errors
///
/// Returns an error if the flags are inconsistent, the chain cannot be
/// resolved, a profile cannot be applied, or any file failed to copy.
/// A cancellation is returned as [`ProfileError::Cancelled`].
pub fn run(global: &GlobalOpts, opts: &InitOpts, log: &Logger) -> Result<()> {
    let strategy = strategy_from_flags(opts.force, opts.merge)?;
    let setup = CommandSetup::init(global, log)?;
    if let Some(configured) = setup.settings.merge_strategy()
        && configured != strategy
    {
        log.debug(&format!(
            "configured merge_strategy is {configured}; using {strategy} from flags"
        ));
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(&interrupted);

    let target = target_dir(&opts.target)?;
    let mut copy_opts = CopyOptions::new(strategy).dry_run(opts.dry_run);
    if strategy == Strategy::Prompt {
        copy_opts = copy_opts.on_conflict(TerminalPrompt::new(
            io::stdin().lock(),
            io::stderr(),
            &target,
        ));
    }
    apply(&setup, opts, &target, copy_opts, Some(&interrupted), log)
}

/// Resolve, pre-load and apply the requested profiles onto `target`.
///
/// `copy_opts` supplies the strategy, dry-run flag and conflict handler; the
/// content filter is taken from `opts`.
///
/// # Errors
///
/// See [`run`].
pub fn apply(
    setup: &CommandSetup,
    opts: &InitOpts,
    target: &Path,
    copy_opts: CopyOptions<'_>,
    interrupt: Option<&AtomicBool>,
    log: &Logger,
) -> Result<()> {
    let filter = ContentFilter::from_flags(opts.only.as_deref(), opts.exclude.as_deref())?;
    let mut copy_opts = copy_opts.filter(filter);
    let dry_run = copy_opts.dry_run;

    log.stage("Resolving profiles");
    let chain = resolve_chain(&setup.store, &opts.profiles)?;
    if chain != opts.profiles {
        log.info(&format!("Resolved dependency chain: {}", chain.join(" → ")));
    }
    for name in &chain {
        setup
            .store
            .get(name)
            .with_context(|| format!("loading profile '{name}'"))?;
    }

    log.stage(&format!("Applying profiles to {}", target.display()));
    log.debug(&format!("options: {copy_opts:?}"));
    let report = apply_chain(&chain, &setup.store, target, &mut copy_opts, interrupt);
    report_chain(&report, dry_run, log);

    if let Some(err) = report.error {
        log.print_summary();
        return Err(err.into());
    }

    if detect_plugin_deps(target) {
        if dry_run {
            log.dry_run(&format!("plugins need dependencies: bun install in {}", target.display()));
        } else {
            log.info(&format!(
                "Plugins detected. To install their dependencies, run: cd {} && bun install",
                target.display()
            ));
        }
    }

    log.print_summary();
    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} profile(s) had errors");
    }
    Ok(())
}

/// Map the `--force` / `--merge` flags to a strategy.
///
/// # Errors
///
/// Returns [`ProfileError::MutuallyExclusiveOptions`] if both are set.
pub fn strategy_from_flags(force: bool, merge: bool) -> Result<Strategy, ProfileError> {
    match (force, merge) {
        (true, true) => Err(ProfileError::MutuallyExclusiveOptions {
            first: "--force".to_string(),
            second: "--merge".to_string(),
        }),
        (true, false) => Ok(Strategy::Overwrite),
        (false, true) => Ok(Strategy::Merge),
        (false, false) => Ok(Strategy::Prompt),
    }
}

/// Canonicalize the project directory and return its `.opencode` path.
///
/// # Errors
///
/// Returns an error if the project directory does not exist.
pub fn target_dir(project: &Path) -> Result<PathBuf> {
    let project = dunce::canonicalize(project)
        .with_context(|| format!("target directory {} does not exist", project.display()))?;
    Ok(project.join(OPENCODE_DIR))
}

fn install_interrupt_handler(flag: &Arc<AtomicBool>) {
    let flag = Arc::clone(flag);
    let installed = ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        tracing::warn!("interrupted; stopping before the next profile (Ctrl-C again to quit)");
    });
    if let Err(e) = installed {
        tracing::debug!("cannot install Ctrl-C handler: {e}");
    }
}

fn report_chain(report: &ChainReport, dry_run: bool, log: &Logger) {
    for (name, result) in &report.results {
        report_profile(name, result, dry_run, log);
        log.record_profile(ProfileEntry::from_result(name, result, dry_run));
    }

    if let Some(ProfileError::ProfileNotFound(name)) = &report.error {
        log.record_profile(ProfileEntry::failed(name));
    }
}

fn report_profile(name: &str, result: &CopyResult, dry_run: bool, log: &Logger) {
    let prefix = if dry_run { "[dry run] " } else { "" };
    log.info(&format!("{prefix}Applying profile '{name}' …"));

    if !result.copied.is_empty() {
        log.info(&format!("{prefix}✓ Copied {} files", result.copied.len()));
        for path in &result.copied {
            if dry_run {
                log.dry_run(&format!("would copy {}", path.display()));
            } else {
                log.debug(&format!("copied {}", path.display()));
            }
        }
    }
    if !result.skipped.is_empty() {
        log.info(&format!("{prefix}→ Skipped {} files", result.skipped.len()));
        for path in &result.skipped {
            log.debug(&format!("skipped {}", path.display()));
        }
    }
    if !result.errored.is_empty() {
        log.info(&format!("{prefix}✗ {} errors", result.errored.len()));
        for err in &result.errored {
            log.error(&err.to_string());
        }
    }
    if result.cancelled {
        log.warn(&format!("{prefix}stopped during '{name}'"));
    }
}

/// Line-based conflict prompt.
///
/// Shows the conflicting path relative to the target, then reads one of
/// `o`, `s`, `c` or `a` per line. Compare renders a diff (or reports that
/// the files are identical) before asking again. End of input aborts.
#[derive(Debug)]
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
    target: PathBuf,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    /// Prompt on `output`, reading answers from `input`.
    #[must_use]
    pub fn new(input: R, output: W, target: &Path) -> Self {
        Self {
            input,
            output,
            target: target.to_path_buf(),
        }
    }

    fn compare(&mut self, src: &Path, dest: &Path) -> Result<()> {
        if files_identical(src, dest).unwrap_or(false) {
            writeln!(self.output, "Files are identical.")?;
            return Ok(());
        }
        match exec::diff_files(dest, src) {
            Ok(Some(diff)) => write!(self.output, "{diff}")?,
            Ok(None) => writeln!(self.output, "diff is not installed; cannot compare")?,
            Err(e) => writeln!(self.output, "cannot compare: {e:#}")?,
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> ConflictHandler for TerminalPrompt<R, W> {
    fn choose(&mut self, src: &Path, dest: &Path) -> Result<ConflictChoice> {
        let rel = dest.strip_prefix(&self.target).unwrap_or(dest);
        writeln!(self.output, "\nConflict: {}", rel.display())?;
        writeln!(self.output, "  [o]verwrite  [s]kip  [c]ompare  [a]bort")?;
        loop {
            write!(self.output, "Choice: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line).context("reading choice")? == 0 {
                return Ok(ConflictChoice::Cancel);
            }
            match line.trim().to_ascii_lowercase().as_str() {
                "o" | "overwrite" => return Ok(ConflictChoice::Overwrite),
                "s" | "skip" => return Ok(ConflictChoice::Skip),
                "a" | "abort" => return Ok(ConflictChoice::Cancel),
                "c" | "compare" => {
                    self.compare(src, dest)?;
                    return Ok(ConflictChoice::Compare);
                }
                _ => writeln!(self.output, "Invalid choice. Enter o, s, c or a.")?,
            }
        }
    }
}
