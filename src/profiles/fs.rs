//! File-system primitives used by the materializer and snapshot command.
use std::ffi::OsStr;
use std::fmt::Write as _;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::ProfileError;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns [`ProfileError::FileIo`] if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), ProfileError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ProfileError::io(parent, e))?;
    }
    Ok(())
}

/// Copy `src` to `dst`, creating parent directories and preserving the
/// source's permission bits. An existing `dst` is truncated and replaced.
///
/// # Errors
///
/// Returns [`ProfileError::FileIo`] naming whichever path failed.
pub fn copy_file(src: &Path, dst: &Path) -> Result<(), ProfileError> {
    let meta = std::fs::metadata(src).map_err(|e| ProfileError::io(src, e))?;
    ensure_parent_dir(dst)?;
    std::fs::copy(src, dst).map_err(|e| ProfileError::io(dst, e))?;
    std::fs::set_permissions(dst, meta.permissions()).map_err(|e| ProfileError::io(dst, e))?;
    Ok(())
}

/// Message recorded for a symbolic link that points at a directory.
pub const SYMLINKED_DIR: &str = "symbolic link to a directory is not followed";

/// Recursively copy a directory tree, skipping any entry whose file name
/// matches `skip`, and return the number of files copied.
///
/// Symbolic links to files are copied as regular files. Symbolic links to
/// directories are rejected rather than followed.
///
/// # Errors
///
/// Returns [`ProfileError::FileIo`] if a directory cannot be created or
/// read, a file cannot be copied, or a symbolic link points at a directory.
pub fn copy_tree(
    src: &Path,
    dst: &Path,
    skip: &dyn Fn(&OsStr) -> bool,
) -> Result<usize, ProfileError> {
    std::fs::create_dir_all(dst).map_err(|e| ProfileError::io(dst, e))?;
    let mut copied = 0;
    for entry in std::fs::read_dir(src).map_err(|e| ProfileError::io(src, e))? {
        let entry = entry.map_err(|e| ProfileError::io(src, e))?;
        if skip(&entry.file_name()) {
            continue;
        }
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| ProfileError::io(&src_path, e))?;
        if file_type.is_symlink() && src_path.is_dir() {
            return Err(ProfileError::io(&src_path, io::Error::other(SYMLINKED_DIR)));
        }
        if file_type.is_dir() {
            copied += copy_tree(&src_path, &dst_path, skip)?;
        } else {
            copy_file(&src_path, &dst_path)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Compute the lowercase hex SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    let mut hex = String::with_capacity(64);
    for b in hasher.finalize() {
        // write! to a String is infallible
        write!(hex, "{b:02x}").unwrap_or(());
    }
    Ok(hex)
}

/// Return `true` if the two files have identical contents.
///
/// # Errors
///
/// Returns an I/O error if either file cannot be read.
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    if std::fs::metadata(a)?.len() != std::fs::metadata(b)?.len() {
        return Ok(false);
    }
    Ok(sha256_file(a)? == sha256_file(b)?)
}

/// Return `true` if `target` holds any TypeScript file under `plugins/`,
/// meaning plugin dependencies may need installing.
#[must_use]
pub fn detect_plugin_deps(target: &Path) -> bool {
    fn walk(dir: &Path) -> bool {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return false;
        };
        entries.flatten().any(|entry| {
            let path = entry.path();
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                walk(&path)
            } else {
                path.extension().is_some_and(|ext| ext == "ts")
            }
        })
    }
    walk(&target.join("plugins"))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // copy_file
    // -----------------------------------------------------------------------

    #[test]
    fn copy_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.md");
        std::fs::write(&src, "hello").unwrap();
        let dst = dir.path().join("out/deep/nested/a.md");

        copy_file(&src, &dst).unwrap();

        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "hello");
    }

    #[test]
    fn copy_file_truncates_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.md");
        let dst = dir.path().join("b.md");
        std::fs::write(&src, "short").unwrap();
        std::fs::write(&dst, "a much longer previous body").unwrap();

        copy_file(&src, &dst).unwrap();

        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "short");
    }

    #[cfg(unix)]
    #[test]
    fn copy_file_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("run.sh");
        std::fs::write(&src, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o750)).unwrap();
        let dst = dir.path().join("out/run.sh");

        copy_file(&src, &dst).unwrap();

        let mode = std::fs::metadata(&dst).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o750);
    }

    #[test]
    fn copy_file_missing_source_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("missing.md");
        let err = copy_file(&src, &dir.path().join("x.md")).unwrap_err();
        assert!(err.to_string().contains("missing.md"));
    }

    // -----------------------------------------------------------------------
    // copy_tree
    // -----------------------------------------------------------------------

    #[test]
    fn copy_tree_honours_skip() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("plugins/node_modules/dep")).unwrap();
        std::fs::write(src.path().join("plugins/node_modules/dep/index.js"), "").unwrap();
        std::fs::write(src.path().join("plugins/tool.ts"), "export {}").unwrap();
        std::fs::write(src.path().join("plugins/package.json"), "{}").unwrap();

        let out = dst.path().join("copy");
        let copied = copy_tree(src.path(), &out, &|name| {
            name == "node_modules" || name == "package.json"
        })
        .unwrap();

        assert_eq!(copied, 1);
        assert!(out.join("plugins/tool.ts").exists());
        assert!(!out.join("plugins/node_modules").exists());
        assert!(!out.join("plugins/package.json").exists());
    }

    #[cfg(unix)]
    #[test]
    fn copy_tree_rejects_directory_symlink() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("agents")).unwrap();
        std::fs::write(src.path().join("agents/x.md"), "x").unwrap();
        std::os::unix::fs::symlink(src.path().join("agents"), src.path().join("agents/loop"))
            .unwrap();

        let err = copy_tree(src.path(), &dst.path().join("copy"), &|_| false).unwrap_err();

        assert!(err.to_string().contains(SYMLINKED_DIR));
        assert!(!dst.path().join("copy/agents/loop/loop").exists());
    }

    #[cfg(unix)]
    #[test]
    fn copy_tree_copies_file_symlink_as_file() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("real.md"), "body").unwrap();
        std::os::unix::fs::symlink(src.path().join("real.md"), src.path().join("link.md")).unwrap();

        let out = dst.path().join("copy");
        assert_eq!(copy_tree(src.path(), &out, &|_| false).unwrap(), 2);

        assert!(!std::fs::symlink_metadata(out.join("link.md")).unwrap().is_symlink());
        assert_eq!(std::fs::read_to_string(out.join("link.md")).unwrap(), "body");
    }

    // -----------------------------------------------------------------------
    // Digests
    // -----------------------------------------------------------------------

    #[test]
    fn sha256_known_value() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("hello");
        std::fs::write(&file, "hello world").unwrap();
        assert_eq!(
            sha256_file(&file).unwrap(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn files_identical_compares_content() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let c = dir.path().join("c");
        std::fs::write(&a, "same").unwrap();
        std::fs::write(&b, "same").unwrap();
        std::fs::write(&c, "diff").unwrap();

        assert!(files_identical(&a, &b).unwrap());
        assert!(!files_identical(&a, &c).unwrap());
        assert!(files_identical(&a, &dir.path().join("missing")).is_err());
    }

    // -----------------------------------------------------------------------
    // detect_plugin_deps
    // -----------------------------------------------------------------------

    #[test]
    fn detects_nested_typescript_plugins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("plugins/sub")).unwrap();
        std::fs::write(dir.path().join("plugins/sub/hook.ts"), "").unwrap();
        assert!(detect_plugin_deps(dir.path()));
    }

    #[test]
    fn ignores_non_typescript_and_other_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("plugins")).unwrap();
        std::fs::create_dir_all(dir.path().join("agents")).unwrap();
        std::fs::write(dir.path().join("plugins/readme.md"), "").unwrap();
        std::fs::write(dir.path().join("agents/x.ts"), "").unwrap();
        assert!(!detect_plugin_deps(dir.path()));
    }

    #[test]
    fn missing_plugins_dir_is_false() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!detect_plugin_deps(dir.path()));
    }
}
