//! On-disk profile store.
//!
//! Every direct subdirectory of the store that holds a `profile.toml` is a
//! profile:
//!
//! ```text
//! ~/.ocmgr/profiles/
//! ├── base/
//! │   ├── profile.toml
//! │   ├── agents/
//! │   └── commands/
//! └── go/
//!     ├── profile.toml      # extends = "base"
//!     └── skills/
//! ```
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::profiles::fs::copy_tree;
use crate::profiles::{ContentDir, ProfileLookup, name};

/// Name of the metadata file inside each profile directory.
pub const METADATA_FILE: &str = "profile.toml";

/// Version written into newly scaffolded profiles.
const SCAFFOLD_VERSION: &str = "1.0.0";

/// The `[profile]` table of `profile.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileMeta {
    /// Profile name.
    pub name: String,
    /// One-line description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Free-form version string.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Author.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    /// Search tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Parent profile applied before this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MetadataFile {
    profile: ProfileMeta,
}

/// A profile loaded from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Parsed metadata.
    pub meta: ProfileMeta,
    /// Directory holding the profile.
    pub path: PathBuf,
}

impl Profile {
    /// Load the profile in `dir` from its `profile.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Metadata`] if the file is missing, unreadable,
    /// malformed or has an empty `name`.
    pub fn load(dir: &Path) -> Result<Self, ProfileError> {
        let path = dir.join(METADATA_FILE);
        let metadata_error = |message: String| ProfileError::Metadata {
            path: path.clone(),
            message,
        };
        let content = std::fs::read_to_string(&path).map_err(|e| metadata_error(e.to_string()))?;
        let file: MetadataFile =
            toml::from_str(&content).map_err(|e| metadata_error(e.message().to_string()))?;
        if file.profile.name.trim().is_empty() {
            return Err(metadata_error("missing required field `name`".to_string()));
        }
        Ok(Self {
            meta: file.profile,
            path: dir.to_path_buf(),
        })
    }

    /// Write the metadata back to `profile.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Metadata`] if serialization fails, or
    /// [`ProfileError::FileIo`] if the file cannot be written.
    pub fn save(&self) -> Result<(), ProfileError> {
        let path = self.path.join(METADATA_FILE);
        let file = MetadataFile {
            profile: self.meta.clone(),
        };
        let content = toml::to_string(&file).map_err(|e| ProfileError::Metadata {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ProfileError::io(&path, e))
    }

    /// Identifier the store knows this profile by: its directory name.
    ///
    /// This is what [`Store::get`] accepts, which may differ from
    /// `meta.name` in a hand-edited `profile.toml`.
    #[must_use]
    pub fn id(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.meta.name)
    }

    /// Return the parent profile name, ignoring surrounding whitespace and
    /// treating an empty value as no parent.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.meta
            .extends
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Files of a profile grouped by content directory, relative to each
/// content directory and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileContents {
    /// Files per content directory; directories with no files are absent.
    pub dirs: BTreeMap<ContentDir, Vec<PathBuf>>,
}

impl ProfileContents {
    /// Total number of files across every content directory.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.dirs.values().map(Vec::len).sum()
    }
}

/// A directory of profiles.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open the store at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::FileIo`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ProfileError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| ProfileError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// Root directory of the store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory a profile named `name` lives (or would live) in.
    #[must_use]
    pub fn profile_dir(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// List every valid profile, sorted by [`Profile::id`]. Subdirectories
    /// whose name is not a valid identifier, or without a readable
    /// `profile.toml`, are skipped. A `name` that differs from the
    /// directory is reported as a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::FileIo`] if the store cannot be read.
    pub fn list(&self) -> Result<Vec<Profile>, ProfileError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| ProfileError::io(&self.dir, e))?;
        let mut profiles: Vec<Profile> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter_map(|path| {
                let id = path.file_name()?.to_str()?;
                if let Err(e) = name::validate(id) {
                    tracing::debug!(path = %path.display(), error = %e, "skipping directory");
                    return None;
                }
                match Profile::load(&path) {
                    Ok(profile) => Some(profile),
                    Err(e) => {
                        tracing::debug!(path = %path.display(), error = %e, "skipping invalid profile");
                        None
                    }
                }
            })
            .inspect(|profile| {
                if profile.meta.name != profile.id() {
                    tracing::warn!(
                        "profile '{}' declares name '{}' in {METADATA_FILE}; use '{}' to refer to it",
                        profile.id(),
                        profile.meta.name,
                        profile.id()
                    );
                }
            })
            .collect();
        profiles.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(profiles)
    }

    /// Load the profile named `name`.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::InvalidIdentifier`] for a malformed name.
    /// - [`ProfileError::ProfileNotFound`] if no such directory exists.
    /// - [`ProfileError::Metadata`] if its `profile.toml` is invalid.
    pub fn get(&self, name: &str) -> Result<Profile, ProfileError> {
        name::validate(name)?;
        let dir = self.profile_dir(name);
        if !dir.is_dir() {
            return Err(ProfileError::ProfileNotFound(name.to_string()));
        }
        Profile::load(&dir)
    }

    /// Return `true` if a profile directory named `name` exists.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        name::validate(name).is_ok() && self.profile_dir(name).is_dir()
    }

    /// Scaffold a new profile: the four content directories and a minimal
    /// `profile.toml`.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::InvalidIdentifier`] for a malformed name.
    /// - [`ProfileError::AlreadyExists`] if the directory already exists.
    /// - [`ProfileError::FileIo`] if anything cannot be created.
    pub fn create(&self, name: &str) -> Result<Profile, ProfileError> {
        name::validate(name)?;
        let dir = self.profile_dir(name);
        if dir.exists() {
            return Err(ProfileError::AlreadyExists(name.to_string()));
        }
        for content in ContentDir::ALL {
            let sub = dir.join(content.as_str());
            std::fs::create_dir_all(&sub).map_err(|e| ProfileError::io(&sub, e))?;
        }
        let profile = Profile {
            meta: ProfileMeta {
                name: name.to_string(),
                version: SCAFFOLD_VERSION.to_string(),
                ..ProfileMeta::default()
            },
            path: dir,
        };
        profile.save()?;
        tracing::debug!(profile = name, path = %profile.path.display(), "created profile");
        Ok(profile)
    }

    /// Remove the profile named `name` and everything in it.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::InvalidIdentifier`] for a malformed name.
    /// - [`ProfileError::ProfileNotFound`] if it does not exist.
    /// - [`ProfileError::FileIo`] if removal fails.
    pub fn delete(&self, name: &str) -> Result<(), ProfileError> {
        name::validate(name)?;
        let dir = self.profile_dir(name);
        if !dir.is_dir() {
            return Err(ProfileError::ProfileNotFound(name.to_string()));
        }
        std::fs::remove_dir_all(&dir).map_err(|e| ProfileError::io(&dir, e))
    }

    /// Copy the profile directory `source` into the store, under the name
    /// its `profile.toml` declares. `.git` directories are not copied.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::Metadata`] if `source` has no valid `profile.toml`.
    /// - [`ProfileError::InvalidIdentifier`] if the declared name is invalid.
    /// - [`ProfileError::AlreadyExists`] if the store already has it.
    /// - [`ProfileError::FileIo`] if copying fails; the partial copy is
    ///   removed.
    pub fn import(&self, source: &Path) -> Result<Profile, ProfileError> {
        let incoming = Profile::load(source)?;
        let id = incoming.meta.name.trim();
        name::validate(id)?;
        let dest = self.profile_dir(id);
        if dest.exists() {
            return Err(ProfileError::AlreadyExists(id.to_string()));
        }
        copy_tree(source, &dest, &is_vcs_dir).inspect_err(|_| {
            if let Err(e) = std::fs::remove_dir_all(&dest) {
                tracing::debug!(path = %dest.display(), "cleanup failed: {e}");
            }
        })?;
        tracing::debug!(profile = id, source = %source.display(), "imported profile");
        Profile::load(&dest)
    }

    /// Copy profile `name` to `dir/name` and return that path. Files already
    /// present there are overwritten.
    ///
    /// # Errors
    ///
    /// Fails like [`Store::get`], or with [`ProfileError::FileIo`] if
    /// copying fails.
    pub fn export(&self, name: &str, dir: &Path) -> Result<PathBuf, ProfileError> {
        let profile = self.get(name)?;
        let dest = dir.join(name);
        let copied = copy_tree(&profile.path, &dest, &is_vcs_dir)?;
        tracing::debug!(profile = name, dest = %dest.display(), copied, "exported profile");
        Ok(dest)
    }

    /// List the files in each content directory of `name`.
    ///
    /// # Errors
    ///
    /// Fails like [`Store::get`], or with [`ProfileError::FileIo`] if a
    /// content directory cannot be read.
    pub fn contents(&self, name: &str) -> Result<ProfileContents, ProfileError> {
        let profile = self.get(name)?;
        let mut contents = ProfileContents::default();
        for dir in ContentDir::ALL {
            let root = profile.path.join(dir.as_str());
            if !root.is_dir() {
                continue;
            }
            let mut files = Vec::new();
            collect_files(&root, &root, &mut files)?;
            if !files.is_empty() {
                files.sort();
                contents.dirs.insert(dir, files);
            }
        }
        Ok(contents)
    }
}

fn is_vcs_dir(file_name: &OsStr) -> bool {
    file_name == ".git"
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ProfileError> {
    for entry in std::fs::read_dir(dir).map_err(|e| ProfileError::io(dir, e))? {
        let entry = entry.map_err(|e| ProfileError::io(dir, e))?;
        let path = entry.path();
        let is_real_dir = entry
            .file_type()
            .map_err(|e| ProfileError::io(&path, e))?
            .is_dir();
        if is_real_dir {
            collect_files(root, &path, out)?;
        } else if let Ok(rel) = path.strip_prefix(root) {
            out.push(rel.to_path_buf());
        }
    }
    Ok(())
}

impl ProfileLookup for Store {
    fn parent(&self, name: &str) -> Result<Option<String>, ProfileError> {
        Ok(self.get(name)?.parent().map(str::to_string))
    }

    fn root(&self, name: &str) -> Result<PathBuf, ProfileError> {
        self.get(name).map(|profile| profile.path)
    }
}
