//! Parent-chain resolution.
//!
//! Expands a list of requested profile names into the order they must be
//! applied in: every profile's ancestors first, root-most first, with each
//! name appearing exactly once across the whole result.
use std::collections::HashSet;

use crate::error::{BoxError, ProfileError};

use super::name;

/// Resolve `requested` into a flattened, de-duplicated application order.
///
/// `load` returns the parent ("extends") of a profile, or `None` when it has
/// none. Parent values are trimmed and an empty value also means "no
/// parent". Requests are processed left to right; each one's chain is
/// appended root-first, skipping names already in the result.
///
/// Resolution performs no I/O of its own beyond what `load` does.
///
/// # Errors
///
/// - [`ProfileError::InvalidIdentifier`] if any requested or parent name is
///   malformed.
/// - [`ProfileError::CircularDependency`] naming the full cycle when a walk
///   revisits a profile.
/// - [`ProfileError::ResolutionFailed`] wrapping any `load` failure.
///
/// # Examples
///
/// ```
/// use ocmgr_cli::profiles::resolver::resolve;
///
/// let load = |name: &str| -> Result<Option<String>, std::io::Error> {
///     Ok((name == "go").then(|| "base".to_string()))
/// };
/// assert_eq!(resolve(&["go"], load).unwrap(), ["base", "go"]);
/// assert_eq!(resolve(&["base", "go"], load).unwrap(), ["base", "go"]);
/// ```
pub fn resolve<S, F, E>(requested: &[S], mut load: F) -> Result<Vec<String>, ProfileError>
where
    S: AsRef<str>,
    F: FnMut(&str) -> Result<Option<String>, E>,
    E: Into<BoxError>,
{
    let mut result = Vec::new();
    let mut seen = HashSet::new();

    for name in requested {
        for entry in walk_chain(name.as_ref(), &mut load)? {
            if seen.insert(entry.clone()) {
                result.push(entry);
            }
        }
    }

    tracing::debug!(requested = requested.len(), resolved = ?result, "resolved profile chain");
    Ok(result)
}

/// Walk the parent chain of a single profile and return it root-first.
fn walk_chain<F, E>(start: &str, load: &mut F) -> Result<Vec<String>, ProfileError>
where
    F: FnMut(&str) -> Result<Option<String>, E>,
    E: Into<BoxError>,
{
    let mut visiting = HashSet::new();
    let mut chain: Vec<String> = Vec::new();
    let mut current = Some(start.to_string());

    while let Some(profile) = current {
        if !visiting.insert(profile.clone()) {
            chain.push(profile);
            return Err(ProfileError::CircularDependency(chain.join(" → ")));
        }
        name::validate(&profile)?;

        let parent = load(&profile).map_err(|e| ProfileError::ResolutionFailed {
            name: profile.clone(),
            source: e.into(),
        })?;
        chain.push(profile);

        current = parent
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
    }

    chain.reverse();
    Ok(chain)
}
