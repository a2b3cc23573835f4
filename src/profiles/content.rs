//! Content directory classification and include/exclude filters.
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ProfileError;

/// One of the four top-level directories of a profile that hold copyable
/// content. Everything else in a profile (notably `profile.toml`) is
/// metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentDir {
    /// `agents/`
    Agents,
    /// `commands/`
    Commands,
    /// `skills/`
    Skills,
    /// `plugins/`
    Plugins,
}

impl ContentDir {
    /// Every content directory, in canonical order.
    pub const ALL: [Self; 4] = [Self::Agents, Self::Commands, Self::Skills, Self::Plugins];

    /// Directory name as it appears on disk.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Agents => "agents",
            Self::Commands => "commands",
            Self::Skills => "skills",
            Self::Plugins => "plugins",
        }
    }

    /// Look up a content directory by its on-disk name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == name)
    }

    /// Comma-separated list of every valid name, for diagnostics.
    #[must_use]
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|d| d.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ContentDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentDir {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ProfileError::InvalidContentDir {
            token: s.to_string(),
            valid: Self::valid_names(),
        })
    }
}

/// Return `true` if `name` is one of the recognised content directories.
#[must_use]
pub fn is_content_dir(name: &str) -> bool {
    ContentDir::from_name(name).is_some()
}

/// Parse a comma-separated list of content directory names.
///
/// Whitespace around each token is trimmed and empty segments are dropped,
/// so `"agents, ,skills"` yields `{agents, skills}` and `""` yields an empty
/// set.
///
/// # Errors
///
/// Returns [`ProfileError::InvalidContentDir`] naming the first token that is
/// not a recognised content directory.
///
/// # Examples
///
/// ```
/// use ocmgr_cli::profiles::content::{ContentDir, parse_filter_list};
///
/// let dirs = parse_filter_list(" agents,skills ,").unwrap();
/// assert!(dirs.contains(&ContentDir::Agents));
/// assert!(dirs.contains(&ContentDir::Skills));
/// assert_eq!(dirs.len(), 2);
///
/// assert!(parse_filter_list("agents,docs").is_err());
/// ```
pub fn parse_filter_list(raw: &str) -> Result<BTreeSet<ContentDir>, ProfileError> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}

/// Which content directories a materialization may touch.
///
/// Include and exclude lists are mutually exclusive; [`ContentFilter::new`]
/// is the only constructor that accepts both and it rejects the combination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContentFilter {
    /// Every content directory is copied.
    #[default]
    All,
    /// Only the listed directories are copied.
    Include(BTreeSet<ContentDir>),
    /// Every directory except the listed ones is copied.
    Exclude(BTreeSet<ContentDir>),
}

impl ContentFilter {
    /// Build a filter from optional include and exclude sets.
    ///
    /// Empty sets count as "not supplied".
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::MutuallyExclusiveOptions`] if both sets are
    /// non-empty.
    pub fn new(
        include: BTreeSet<ContentDir>,
        exclude: BTreeSet<ContentDir>,
    ) -> Result<Self, ProfileError> {
        match (include.is_empty(), exclude.is_empty()) {
            (true, true) => Ok(Self::All),
            (false, true) => Ok(Self::Include(include)),
            (true, false) => Ok(Self::Exclude(exclude)),
            (false, false) => Err(ProfileError::MutuallyExclusiveOptions {
                first: "--only".to_string(),
                second: "--exclude".to_string(),
            }),
        }
    }

    /// Parse the raw `--only` / `--exclude` flag values into a filter.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::MutuallyExclusiveOptions`] when both values
    /// are non-blank (checked before either is parsed), or
    /// [`ProfileError::InvalidContentDir`] for an unrecognised token.
    pub fn from_flags(only: Option<&str>, exclude: Option<&str>) -> Result<Self, ProfileError> {
        let only = only.map(str::trim).filter(|s| !s.is_empty());
        let exclude = exclude.map(str::trim).filter(|s| !s.is_empty());
        if only.is_some() && exclude.is_some() {
            return Err(ProfileError::MutuallyExclusiveOptions {
                first: "--only".to_string(),
                second: "--exclude".to_string(),
            });
        }
        Self::new(
            only.map(parse_filter_list).transpose()?.unwrap_or_default(),
            exclude.map(parse_filter_list).transpose()?.unwrap_or_default(),
        )
    }

    /// Return `true` if files under `dir` should be materialized.
    #[must_use]
    pub fn allows(&self, dir: ContentDir) -> bool {
        match self {
            Self::All => true,
            Self::Include(set) => set.contains(&dir),
            Self::Exclude(set) => !set.contains(&dir),
        }
    }
}
