//! Profile identifier validation.
use crate::error::ProfileError;

/// Validate a profile identifier.
///
/// A valid name starts with an ASCII letter or digit and continues with
/// letters, digits, `-`, `_` or `.`. Path separators and `..` are rejected
/// so a name can always be joined onto the store directory safely.
///
/// # Errors
///
/// Returns [`ProfileError::InvalidIdentifier`] describing the first rule the
/// name breaks.
///
/// # Examples
///
/// ```
/// use ocmgr_cli::profiles::name::validate;
///
/// assert!(validate("go-backend").is_ok());
/// assert!(validate("v1.2").is_ok());
/// assert!(validate("../etc").is_err());
/// assert!(validate("-leading").is_err());
/// ```
pub fn validate(name: &str) -> Result<(), ProfileError> {
    let reject = |reason: &str| {
        Err(ProfileError::InvalidIdentifier {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    let Some(first) = name.chars().next() else {
        return reject("must not be empty");
    };
    if name.contains('/') || name.contains('\\') {
        return reject("must not contain path separators");
    }
    if name.contains("..") {
        return reject("must not contain '..'");
    }
    if !first.is_ascii_alphanumeric() {
        return reject("must start with a letter or digit");
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return reject(&format!("invalid character '{bad}'"));
    }
    Ok(())
}
