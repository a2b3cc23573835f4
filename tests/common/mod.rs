// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed profile store plus a project
// directory, and a fluent builder so each integration test can set up an
// isolated environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ocmgr_cli::commands::CommandSetup;
use ocmgr_cli::commands::init::{OPENCODE_DIR, target_dir};
use ocmgr_cli::config::Settings;
use ocmgr_cli::store::Store;

/// An isolated store and project backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped (via the underlying
/// [`tempfile::TempDir`]).
pub struct IntegrationTestContext {
    /// Temporary directory holding `store/` and `project/`.
    pub root: tempfile::TempDir,
    /// Profile store under `root/store`.
    pub store: Store,
}

impl IntegrationTestContext {
    /// Create a new context with an empty store and an empty project.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let store = Store::open(root.path().join("store")).expect("open store");
        std::fs::create_dir_all(root.path().join("project")).expect("create project dir");
        Self { root, store }
    }

    /// Path to the project directory.
    pub fn project(&self) -> PathBuf {
        self.root.path().join("project")
    }

    /// Canonical `.opencode` directory of the project.
    pub fn target(&self) -> PathBuf {
        target_dir(&self.project()).expect("resolve target")
    }

    /// Command setup using default settings and this context's store.
    pub fn setup(&self) -> CommandSetup {
        CommandSetup {
            settings: Settings::default(),
            store: self.store.clone(),
        }
    }

    /// Read a file below the project's `.opencode` directory.
    pub fn read_target(&self, rel: &str) -> String {
        std::fs::read_to_string(self.target().join(rel)).expect("read target file")
    }
}

/// Fluent builder for [`IntegrationTestContext`].
///
/// Allows individual tests to populate the store and the project before the
/// context is finalised.
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context with an empty store.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Scaffold profile `name`, optionally extending `parent`.
    pub fn with_profile(self, name: &str, parent: Option<&str>) -> Self {
        let mut profile = self.ctx.store.create(name).expect("create profile");
        profile.meta.extends = parent.map(str::to_string);
        profile.save().expect("save profile");
        self
    }

    /// Write `content` to `rel` inside profile `name`.
    pub fn with_profile_file(self, name: &str, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.store.profile_dir(name).join(rel), content);
        self
    }

    /// Write `content` to `rel` inside the project's `.opencode` directory.
    pub fn with_project_file(self, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.project().join(OPENCODE_DIR).join(rel), content);
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}
