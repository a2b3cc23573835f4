//! Command: capture a project's `.opencode` directory as a new profile.
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::Path;

use anyhow::{Context as _, Result, bail};

use crate::cli::{GlobalOpts, SnapshotOpts};
use crate::logging::Logger;
use crate::profiles::fs::copy_tree;
use crate::profiles::{ContentDir, name};
use crate::store::{Profile, Store};

use super::CommandSetup;
use super::init::OPENCODE_DIR;

/// Package-manager and VCS artifacts never captured into a profile.
pub const SKIP_NAMES: &[&str] = &["node_modules", "package.json", "bun.lock", ".gitignore"];

/// Run the snapshot command.
///
/// # Errors
///
/// Returns an error if the source has no `.opencode` directory, the profile
/// already exists, or copying fails.
pub fn run(global: &GlobalOpts, opts: &SnapshotOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let source = dunce::canonicalize(&opts.source)
        .with_context(|| format!("source directory {} does not exist", opts.source.display()))?;

    log.stage(&format!("Capturing {}", source.join(OPENCODE_DIR).display()));
    let counts = snapshot(
        &setup.store,
        &opts.name,
        &source,
        opts.description.as_deref(),
        &opts.tags,
    )?;
    let count = |dir: ContentDir| counts.get(&dir).copied().unwrap_or(0);
    log.info(&format!(
        "Snapshot '{}' created with {} agents, {} commands, {} skills, {} plugins",
        opts.name,
        count(ContentDir::Agents),
        count(ContentDir::Commands),
        count(ContentDir::Skills),
        count(ContentDir::Plugins),
    ));
    Ok(())
}

/// Copy the content directories of `source/.opencode` into a new profile
/// named `profile_name` and return the number of files per directory.
///
/// The profile is removed again if anything fails after it was created.
///
/// # Errors
///
/// Returns an error if the name is invalid, `source/.opencode` is missing,
/// the profile already exists, or a file cannot be copied.
pub fn snapshot(
    store: &Store,
    profile_name: &str,
    source: &Path,
    description: Option<&str>,
    tags: &[String],
) -> Result<BTreeMap<ContentDir, usize>> {
    name::validate(profile_name)?;
    let opencode = source.join(OPENCODE_DIR);
    if !opencode.is_dir() {
        bail!("no .opencode directory found in {}", source.display());
    }
    if store.exists(profile_name) {
        bail!(
            "profile '{profile_name}' already exists; delete it first with \
             'ocmgr profile delete {profile_name}' or choose a different name"
        );
    }

    let mut profile = store.create(profile_name)?;
    capture(&opencode, &mut profile, description, tags).inspect_err(|_| {
        if let Err(e) = std::fs::remove_dir_all(&profile.path) {
            tracing::debug!(path = %profile.path.display(), "cleanup failed: {e}");
        }
    })
}

fn capture(
    opencode: &Path,
    profile: &mut Profile,
    description: Option<&str>,
    tags: &[String],
) -> Result<BTreeMap<ContentDir, usize>> {
    let skip = |file_name: &OsStr| SKIP_NAMES.iter().any(|s| file_name == *s);
    let mut counts = BTreeMap::new();
    for dir in ContentDir::ALL {
        let src = opencode.join(dir.as_str());
        if !src.is_dir() {
            continue;
        }
        let copied = copy_tree(&src, &profile.path.join(dir.as_str()), &skip)?;
        tracing::debug!(dir = dir.as_str(), copied, "captured content directory");
        counts.insert(dir, copied);
    }

    if let Some(description) = description {
        profile.meta.description = description.trim().to_string();
    }
    profile.meta.tags = tags
        .iter()
        .map(String::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect();
    profile.save()?;
    Ok(counts)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let oc = dir.path().join(OPENCODE_DIR);
        std::fs::create_dir_all(oc.join("agents")).unwrap();
        std::fs::create_dir_all(oc.join("plugins/node_modules/dep")).unwrap();
        std::fs::create_dir_all(oc.join("skills/go")).unwrap();
        std::fs::write(oc.join("agents/a.md"), "a").unwrap();
        std::fs::write(oc.join("agents/b.md"), "b").unwrap();
        std::fs::write(oc.join("skills/go/SKILL.md"), "s").unwrap();
        std::fs::write(oc.join("plugins/hook.ts"), "export {}").unwrap();
        std::fs::write(oc.join("plugins/package.json"), "{}").unwrap();
        std::fs::write(oc.join("plugins/bun.lock"), "").unwrap();
        std::fs::write(oc.join("plugins/node_modules/dep/x.js"), "").unwrap();
        std::fs::write(oc.join(".gitignore"), "node_modules").unwrap();
        std::fs::write(oc.join("opencode.json"), "{}").unwrap();
        dir
    }

    fn store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn captures_content_and_counts_files() {
        let source = project();
        let (_tmp, store) = store();

        let counts = snapshot(
            &store,
            "mine",
            source.path(),
            Some(" my setup "),
            &["go".to_string(), " ".to_string()],
        )
        .unwrap();

        assert_eq!(counts[&ContentDir::Agents], 2);
        assert_eq!(counts[&ContentDir::Skills], 1);
        assert_eq!(counts[&ContentDir::Plugins], 1);
        assert!(!counts.contains_key(&ContentDir::Commands));

        let dir = store.profile_dir("mine");
        assert!(dir.join("plugins/hook.ts").exists());
        assert!(!dir.join("plugins/node_modules").exists());
        assert!(!dir.join("plugins/package.json").exists());
        assert!(!dir.join("plugins/bun.lock").exists());
        assert!(!dir.join("opencode.json").exists(), "only content dirs are captured");

        let profile = store.get("mine").unwrap();
        assert_eq!(profile.meta.description, "my setup");
        assert_eq!(profile.meta.tags, ["go"]);
    }

    #[test]
    fn missing_opencode_dir_fails() {
        let source = tempfile::tempdir().unwrap();
        let (_tmp, store) = store();
        let err = snapshot(&store, "mine", source.path(), None, &[]).unwrap_err();
        assert!(err.to_string().starts_with("no .opencode directory found in"));
        assert!(!store.exists("mine"));
    }

    #[test]
    fn existing_profile_is_not_replaced() {
        let source = project();
        let (_tmp, store) = store();
        store.create("mine").unwrap();
        let err = snapshot(&store, "mine", source.path(), None, &[]).unwrap_err();
        assert!(err.to_string().contains("ocmgr profile delete mine"));
    }

    #[test]
    fn invalid_name_is_rejected() {
        let source = project();
        let (_tmp, store) = store();
        assert!(snapshot(&store, "../escape", source.path(), None, &[]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn failed_capture_removes_partial_profile() {
        let source = project();
        let (_tmp, store) = store();
        std::os::unix::fs::symlink(
            source.path().join("nowhere"),
            source.path().join(OPENCODE_DIR).join("agents/broken.md"),
        )
        .unwrap();

        assert!(snapshot(&store, "mine", source.path(), None, &[]).is_err());
        assert!(!store.exists("mine"), "partial profile should be removed");
    }
}
