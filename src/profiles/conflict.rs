//! Conflict policy: what to do when a destination file already exists.
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How conflicts are resolved for one materialization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Replace every existing file.
    Overwrite,
    /// Keep every existing file; only new files are written.
    Merge,
    /// Ask a [`ConflictHandler`] for each existing file.
    #[default]
    Prompt,
}

impl Strategy {
    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Merge => "merge",
            Self::Prompt => "prompt",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    /// Parse a strategy name. `skip` is accepted as an alias for `merge`,
    /// matching the values allowed for `defaults.merge_strategy`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "merge" | "skip" => Ok(Self::Merge),
            "prompt" => Ok(Self::Prompt),
            other => Err(format!(
                "unknown strategy '{other}'; must be one of: prompt, overwrite, merge, skip"
            )),
        }
    }
}

/// A choice returned by an interactive conflict handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    /// Replace the destination with the source.
    Overwrite,
    /// Leave the destination untouched.
    Skip,
    /// Show the differences and ask again.
    Compare,
    /// Abort the whole operation, including queued profiles.
    Cancel,
}

/// Terminal outcome of the conflict policy for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Write the file.
    Overwrite,
    /// Record the file as skipped.
    Skip,
    /// Stop the walk.
    Cancel,
}

/// Caller-supplied decision function used under [`Strategy::Prompt`].
///
/// Rendering a comparison on [`ConflictChoice::Compare`] is the handler's
/// job; the policy only re-invokes it afterwards.
pub trait ConflictHandler {
    /// Decide what to do with `src`, whose destination `dest` already exists.
    ///
    /// # Errors
    ///
    /// Implementations may fail (for example when input cannot be read);
    /// the materializer records the failure against the file and moves on.
    fn choose(&mut self, src: &Path, dest: &Path) -> anyhow::Result<ConflictChoice>;
}

impl<F> ConflictHandler for F
where
    F: FnMut(&Path, &Path) -> anyhow::Result<ConflictChoice>,
{
    fn choose(&mut self, src: &Path, dest: &Path) -> anyhow::Result<ConflictChoice> {
        self(src, dest)
    }
}

/// Decide the outcome for a file whose destination already exists.
///
/// Overwrite and merge never consult the handler. Under prompt, a missing
/// handler means skip, and [`ConflictChoice::Compare`] loops back into the
/// handler until it returns a terminal choice.
///
/// # Errors
///
/// Propagates any error returned by the handler.
pub fn decide(
    strategy: Strategy,
    handler: Option<&mut (dyn ConflictHandler + '_)>,
    src: &Path,
    dest: &Path,
) -> anyhow::Result<Decision> {
    match strategy {
        Strategy::Overwrite => Ok(Decision::Overwrite),
        Strategy::Merge => Ok(Decision::Skip),
        Strategy::Prompt => {
            let Some(handler) = handler else {
                return Ok(Decision::Skip);
            };
            loop {
                match handler.choose(src, dest)? {
                    ConflictChoice::Overwrite => return Ok(Decision::Overwrite),
                    ConflictChoice::Skip => return Ok(Decision::Skip),
                    ConflictChoice::Cancel => return Ok(Decision::Cancel),
                    ConflictChoice::Compare => {}
                }
            }
        }
    }
}
