//! Command: inspect and manage profiles in the store.
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};

use crate::cli::{GlobalOpts, ProfileCommand};
use crate::error::ProfileError;
use crate::logging::Logger;
use crate::profiles::ContentDir;
use crate::store::{Profile, ProfileContents, Store};

use super::CommandSetup;

/// Descriptions longer than this are truncated in `profile list`.
const DESCRIPTION_WIDTH: usize = 42;

/// Run a `profile` subcommand.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the operation fails.
pub fn run(global: &GlobalOpts, command: &ProfileCommand, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let store = &setup.store;
    match command {
        ProfileCommand::List => emit(&render_list(&store.list()?)),
        ProfileCommand::Show { name } => {
            let profile = store.get(name)?;
            let contents = store.contents(name)?;
            emit(&render_show(&profile, &contents));
        }
        ProfileCommand::Create { name } => {
            let profile = store.create(name)?;
            log.info(&format!(
                "Created profile '{name}' at {}",
                profile.path.display()
            ));
            log.info("Add files to agents/, commands/, skills/, plugins/ directories.");
        }
        ProfileCommand::Delete { name, force } => {
            let mut stdin = io::stdin().lock();
            delete(store, name, *force, &mut stdin, &mut io::stderr(), log)?;
        }
        ProfileCommand::Import { source } => {
            let profile = import(store, source)?;
            log.info(&format!(
                "✓ Imported profile '{}' to {}",
                profile.id(),
                profile.path.display()
            ));
        }
        ProfileCommand::Export { name, dir } => {
            let dest = export(store, name, dir)?;
            log.info(&format!("✓ Exported profile '{name}' to {}", dest.display()));
        }
    }
    Ok(())
}

/// Import the profile directory at `source` into `store`.
///
/// Only local directories are accepted; a GitHub URL is rejected with a hint
/// to clone it first.
///
/// # Errors
///
/// Returns an error if `source` is a URL or does not exist, has no valid
/// `profile.toml`, names a profile the store already has, or cannot be
/// copied.
pub fn import(store: &Store, source: &Path) -> Result<Profile> {
    let raw = source.to_string_lossy();
    if raw.starts_with("https://") || raw.starts_with("http://") {
        bail!(
            "importing from a URL is not supported; clone the repository and \
             import the profile directory instead"
        );
    }
    let source = dunce::canonicalize(source)
        .with_context(|| format!("source directory {} does not exist", source.display()))?;
    let profile = store.import(&source).map_err(|e| match e {
        ProfileError::AlreadyExists(name) => anyhow::anyhow!(
            "profile '{name}' already exists; delete it first with 'ocmgr profile delete {name}'"
        ),
        other => other.into(),
    })?;
    Ok(profile)
}

/// Export profile `name` from `store` into `dir/name` and return that path.
///
/// # Errors
///
/// Returns an error if the profile does not exist or cannot be copied.
pub fn export(store: &Store, name: &str, dir: &Path) -> Result<PathBuf> {
    let dir = std::path::absolute(dir)
        .with_context(|| format!("resolving target {}", dir.display()))?;
    Ok(store.export(name, &dir)?)
}

/// Delete `name`, asking for confirmation on `output` unless `force` is set.
///
/// Returns `true` if the profile was deleted, `false` if the operator
/// declined.
///
/// # Errors
///
/// Returns an error if the profile does not exist, the answer cannot be
/// read, or removal fails.
pub fn delete(
    store: &Store,
    name: &str,
    force: bool,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    log: &Logger,
) -> Result<bool> {
    store.get(name)?;
    if !force {
        write!(
            output,
            "Delete profile '{name}'? This cannot be undone. [y/N] "
        )?;
        output.flush()?;
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y") {
            log.info("Aborted.");
            return Ok(false);
        }
    }
    store.delete(name)?;
    log.info(&format!("Deleted profile '{name}'"));
    Ok(true)
}

#[allow(clippy::print_stdout)]
fn emit(text: &str) {
    print!("{text}");
}

/// Render the `profile list` table.
#[must_use]
pub fn render_list(profiles: &[Profile]) -> String {
    if profiles.is_empty() {
        return "No profiles found. Create one with: ocmgr profile create <name>\n".to_string();
    }

    let rows: Vec<[String; 4]> = profiles
        .iter()
        .map(|p| {
            [
                p.id().to_string(),
                p.meta.version.clone(),
                truncate(&p.meta.description, DESCRIPTION_WIDTH),
                p.meta.tags.join(", "),
            ]
        })
        .collect();
    let header = ["NAME", "VERSION", "DESCRIPTION", "TAGS"].map(String::from);

    let mut widths = [0usize; 3];
    for row in std::iter::once(&header).chain(&rows) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let [w0, w1, w2] = widths;
    let mut out = String::new();
    for [name, version, description, tags] in std::iter::once(&header).chain(&rows) {
        let line = format!("{name:<w0$}  {version:<w1$}  {description:<w2$}  {tags}");
        writeln!(out, "{}", line.trim_end()).unwrap_or(());
    }
    out
}

/// Render the `profile show` report.
#[must_use]
pub fn render_show(profile: &Profile, contents: &ProfileContents) -> String {
    let meta = &profile.meta;
    let mut out = String::new();
    writeln!(out, "Profile: {}", meta.name).unwrap_or(());
    for (label, value) in [
        ("Description", meta.description.as_str()),
        ("Version", meta.version.as_str()),
        ("Author", meta.author.as_str()),
    ] {
        if !value.is_empty() {
            writeln!(out, "{label}: {value}").unwrap_or(());
        }
    }
    if !meta.tags.is_empty() {
        writeln!(out, "Tags: {}", meta.tags.join(", ")).unwrap_or(());
    }
    if let Some(parent) = profile.parent() {
        writeln!(out, "Extends: {parent}").unwrap_or(());
    }

    out.push_str("\nContents:\n");
    for (dir, files) in &contents.dirs {
        let unit = if *dir == ContentDir::Skills {
            "skills"
        } else {
            "files"
        };
        writeln!(out, "  {dir}/ ({} {unit})", files.len()).unwrap_or(());
        for file in files {
            writeln!(out, "    {}", file.display()).unwrap_or(());
        }
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use crate::store::ProfileMeta;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn profile(name: &str, version: &str, description: &str, tags: &[&str]) -> Profile {
        Profile {
            meta: ProfileMeta {
                name: name.to_string(),
                version: version.to_string(),
                description: description.to_string(),
                tags: tags.iter().map(ToString::to_string).collect(),
                ..ProfileMeta::default()
            },
            path: PathBuf::from(name),
        }
    }

    // -----------------------------------------------------------------------
    // list
    // -----------------------------------------------------------------------

    #[test]
    fn list_empty_store_hint() {
        insta::assert_snapshot!(
            render_list(&[]),
            @"No profiles found. Create one with: ocmgr profile create <name>"
        );
    }

    #[test]
    fn list_aligns_columns() {
        let rendered = render_list(&[
            profile("base", "1.0.0", "Shared agents", &["core"]),
            profile("go", "2.1.0", "Go tooling", &["go", "backend"]),
        ]);
        insta::assert_snapshot!(rendered, @r"
        NAME  VERSION  DESCRIPTION    TAGS
        base  1.0.0    Shared agents  core
        go    2.1.0    Go tooling     go, backend
        ");
    }

    #[test]
    fn list_truncates_long_descriptions() {
        let long = "a".repeat(50);
        let rendered = render_list(&[profile("x", "1", &long, &[])]);
        assert!(rendered.contains(&format!("{}...", "a".repeat(42))));
        assert!(!rendered.contains(&"a".repeat(43)));
    }

    // -----------------------------------------------------------------------
    // show
    // -----------------------------------------------------------------------

    #[test]
    fn show_lists_metadata_and_contents() {
        let mut go = profile("go", "1.0.0", "Go tooling", &["go"]);
        go.meta.extends = Some("base".to_string());
        let mut contents = ProfileContents::default();
        contents.dirs.insert(
            ContentDir::Agents,
            vec![PathBuf::from("a.md"), PathBuf::from("b.md")],
        );
        contents
            .dirs
            .insert(ContentDir::Skills, vec![PathBuf::from("go-test.md")]);

        insta::assert_snapshot!(render_show(&go, &contents), @r"
        Profile: go
        Description: Go tooling
        Version: 1.0.0
        Tags: go
        Extends: base

        Contents:
          agents/ (2 files)
            a.md
            b.md
          skills/ (1 skills)
            go-test.md
        ");
    }

    #[test]
    fn show_omits_empty_fields() {
        let rendered = render_show(&profile("bare", "", "", &[]), &ProfileContents::default());
        assert!(!rendered.contains("Version"));
        assert!(!rendered.contains("Extends"));
        assert!(rendered.ends_with("Contents:\n"));
    }

    // -----------------------------------------------------------------------
    // delete
    // -----------------------------------------------------------------------

    fn store_with(name: &str) -> (tempfile::TempDir, Store) {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        store.create(name).unwrap();
        (tmp, store)
    }

    #[test]
    fn delete_declined_keeps_profile() {
        let (log, _logs, _guard) = isolated_logger();
        let (_tmp, store) = store_with("keep");
        let mut out = Vec::new();

        let deleted = delete(&store, "keep", false, &mut Cursor::new("n\n"), &mut out, &log).unwrap();

        assert!(!deleted);
        assert!(store.exists("keep"));
        assert!(String::from_utf8(out).unwrap().contains("[y/N]"));
    }

    #[test]
    fn delete_confirmed_removes_profile() {
        let (log, _logs, _guard) = isolated_logger();
        let (_tmp, store) = store_with("gone");

        let deleted =
            delete(&store, "gone", false, &mut Cursor::new("y\n"), &mut Vec::new(), &log).unwrap();

        assert!(deleted);
        assert!(!store.exists("gone"));
    }

    #[test]
    fn delete_force_does_not_prompt() {
        let (log, _logs, _guard) = isolated_logger();
        let (_tmp, store) = store_with("gone");
        let mut out = Vec::new();

        assert!(delete(&store, "gone", true, &mut Cursor::new(""), &mut out, &log).unwrap());
        assert!(out.is_empty());
    }

    // -----------------------------------------------------------------------
    // import / export
    // -----------------------------------------------------------------------

    #[test]
    fn import_rejects_urls() {
        let (_tmp, store) = store_with("other");
        let err = import(
            &store,
            Path::new("https://github.com/me/profiles/tree/main/profiles/go"),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("importing from a URL is not supported"));
    }

    #[test]
    fn import_existing_suggests_delete() {
        let (_tmp, store) = store_with("taken");
        let elsewhere = tempfile::tempdir().unwrap();
        let source = elsewhere.path().join("incoming");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("profile.toml"), "[profile]\nname = \"taken\"\n").unwrap();

        let err = import(&store, &source).unwrap_err();
        assert!(err.to_string().contains("ocmgr profile delete taken"));
    }

    #[test]
    fn import_missing_source_fails() {
        let (_tmp, store) = store_with("other");
        let elsewhere = tempfile::tempdir().unwrap();
        let err = import(&store, &elsewhere.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn list_shows_directory_identifier() {
        let mut renamed = profile("pretty-name", "1.0.0", "", &[]);
        renamed.path = PathBuf::from("/store/go");
        let rendered = render_list(&[renamed]);
        assert!(rendered.lines().nth(1).unwrap().starts_with("go  "));
    }

    #[test]
    fn delete_unknown_fails_before_prompting() {
        let (log, _logs, _guard) = isolated_logger();
        let (_tmp, store) = store_with("other");
        let mut out = Vec::new();

        let err = delete(&store, "ghost", false, &mut Cursor::new("y\n"), &mut out, &log)
            .unwrap_err();

        assert_eq!(err.to_string(), "profile 'ghost' not found");
        assert!(out.is_empty());
    }
}
