//! Apply a resolved chain of profiles, in order, onto one target.
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::ProfileError;

use super::ProfileLookup;
use super::copier::{CopyOptions, CopyResult, copy_profile};

/// Per-profile results of [`apply_chain`], plus the error that stopped it.
#[derive(Debug, Default)]
pub struct ChainReport {
    /// One entry per profile that was materialized (fully or partially),
    /// in chain order.
    pub results: Vec<(String, CopyResult)>,
    /// Why the chain stopped early, if it did.
    pub error: Option<ProfileError>,
}

impl ChainReport {
    /// Return `true` if the chain stopped on an explicit cancel.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.error.as_ref().is_some_and(ProfileError::is_cancelled)
    }

    /// Convert into a `Result`, discarding the partial results on error.
    ///
    /// # Errors
    ///
    /// Returns the error that stopped the chain, if any.
    pub fn into_result(self) -> Result<Vec<(String, CopyResult)>, ProfileError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.results),
        }
    }
}

/// Materialize every profile in `chain` onto `target`, in order.
///
/// Later profiles are applied after earlier ones, so their files meet the
/// earlier profiles' output as ordinary conflicts under `opts.strategy`.
///
/// The chain stops at the first profile whose root cannot be looked up, the
/// first cancelled materialization, or when `interrupt` is set between two
/// profiles. Results gathered up to that point are always returned.
pub fn apply_chain<S: AsRef<str>>(
    chain: &[S],
    lookup: &dyn ProfileLookup,
    target: &Path,
    opts: &mut CopyOptions<'_>,
    interrupt: Option<&AtomicBool>,
) -> ChainReport {
    let mut report = ChainReport::default();

    for name in chain {
        let name = name.as_ref();
        if interrupt.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
            tracing::debug!(profile = name, "interrupted before profile");
            report.error = Some(ProfileError::Cancelled);
            break;
        }

        let root = match lookup.root(name) {
            Ok(root) => root,
            Err(err) => {
                report.error = Some(err);
                break;
            }
        };

        tracing::debug!(profile = name, root = %root.display(), "applying profile");
        match copy_profile(&root, target, opts) {
            Ok(result) => {
                let cancelled = result.check_cancelled();
                report.results.push((name.to_string(), result));
                if let Err(err) = cancelled {
                    report.error = Some(err);
                    break;
                }
            }
            Err(err) => {
                report.error = Some(err);
                break;
            }
        }
    }

    report
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::profiles::MockProfileLookup;
    use crate::profiles::conflict::{ConflictChoice, Strategy};
    use mockall::predicate::eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Create a profile directory holding `files`.
    fn profile(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (rel, body) in files {
            let path = dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, body).unwrap();
        }
        dir
    }

    fn expect_root(mock: &mut MockProfileLookup, name: &'static str, root: PathBuf) {
        mock.expect_root()
            .with(eq(name))
            .times(1)
            .returning(move |_| Ok(root.clone()));
    }

    #[test]
    fn later_profile_overrides_earlier() {
        let a = profile(&[("agents/x.md", "A"), ("agents/only-a.md", "a")]);
        let b = profile(&[("agents/x.md", "B")]);
        let target = tempfile::tempdir().unwrap();
        let mut lookup = MockProfileLookup::new();
        expect_root(&mut lookup, "a", a.path().to_path_buf());
        expect_root(&mut lookup, "b", b.path().to_path_buf());

        let report = apply_chain(
            &["a", "b"],
            &lookup,
            target.path(),
            &mut CopyOptions::new(Strategy::Overwrite),
            None,
        );

        let results = report.into_result().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(
            std::fs::read_to_string(target.path().join("agents/x.md")).unwrap(),
            "B"
        );
        assert!(target.path().join("agents/only-a.md").exists());
    }

    #[test]
    fn merge_keeps_first_profile_file() {
        let a = profile(&[("agents/x.md", "A")]);
        let b = profile(&[("agents/x.md", "B")]);
        let target = tempfile::tempdir().unwrap();
        let mut lookup = MockProfileLookup::new();
        expect_root(&mut lookup, "a", a.path().to_path_buf());
        expect_root(&mut lookup, "b", b.path().to_path_buf());

        let report = apply_chain(
            &["a", "b"],
            &lookup,
            target.path(),
            &mut CopyOptions::new(Strategy::Merge),
            None,
        );

        let results = report.into_result().unwrap();
        assert_eq!(results[1].1.skipped.len(), 1);
        assert_eq!(
            std::fs::read_to_string(target.path().join("agents/x.md")).unwrap(),
            "A"
        );
    }

    #[test]
    fn unknown_profile_stops_chain_keeping_prior_results() {
        let a = profile(&[("agents/x.md", "A")]);
        let target = tempfile::tempdir().unwrap();
        let mut lookup = MockProfileLookup::new();
        expect_root(&mut lookup, "a", a.path().to_path_buf());
        lookup
            .expect_root()
            .with(eq("ghost"))
            .times(1)
            .returning(|name| Err(ProfileError::ProfileNotFound(name.to_string())));

        let report = apply_chain(
            &["a", "ghost", "never"],
            &lookup,
            target.path(),
            &mut CopyOptions::new(Strategy::Overwrite),
            None,
        );

        assert_eq!(report.results.len(), 1);
        assert!(matches!(report.error, Some(ProfileError::ProfileNotFound(ref n)) if n == "ghost"));
        assert!(!report.is_cancelled());
    }

    #[test]
    fn cancel_in_second_profile_skips_third() {
        let a = profile(&[("agents/x.md", "A"), ("commands/c.md", "A")]);
        let b = profile(&[("agents/x.md", "B"), ("skills/s.md", "B")]);
        let target = tempfile::tempdir().unwrap();
        let mut lookup = MockProfileLookup::new();
        expect_root(&mut lookup, "a", a.path().to_path_buf());
        expect_root(&mut lookup, "b", b.path().to_path_buf());
        lookup.expect_root().with(eq("c")).never();

        let mut opts = CopyOptions::new(Strategy::Prompt).on_conflict(
            |_: &Path, _: &Path| -> anyhow::Result<ConflictChoice> { Ok(ConflictChoice::Cancel) },
        );
        let report = apply_chain(&["a", "b", "c"], &lookup, target.path(), &mut opts, None);

        assert!(report.is_cancelled());
        assert_eq!(report.results.len(), 2);
        let (first, first_result) = &report.results[0];
        assert_eq!(first, "a");
        assert_eq!(first_result.copied.len(), 2);
        assert!(!first_result.cancelled);
        let (second, second_result) = &report.results[1];
        assert_eq!(second, "b");
        assert!(second_result.cancelled);
        assert!(second_result.copied.is_empty());
        assert!(!target.path().join("skills/s.md").exists());
    }

    #[test]
    fn interrupt_flag_stops_before_next_profile() {
        let target = tempfile::tempdir().unwrap();
        let mut lookup = MockProfileLookup::new();
        lookup.expect_root().never();
        let flag = AtomicBool::new(true);

        let report = apply_chain(
            &["a"],
            &lookup,
            target.path(),
            &mut CopyOptions::new(Strategy::Overwrite),
            Some(&flag),
        );

        assert!(report.is_cancelled());
        assert!(report.results.is_empty());
    }

    #[test]
    fn empty_chain_is_ok() {
        let target = tempfile::tempdir().unwrap();
        let lookup = MockProfileLookup::new();
        let report = apply_chain::<&str>(
            &[],
            &lookup,
            target.path(),
            &mut CopyOptions::default(),
            None,
        );
        assert!(report.into_result().unwrap().is_empty());
    }
}
