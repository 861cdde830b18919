//! Key validation.
//!
//! Keys double as file names for [`LocalBackend`](crate::backend::LocalBackend),
//! so they're held to the rules of a single, visible path segment.

use crate::error::{ErrorKind, Result};

/// Validates a storage key and returns it trimmed.
///
/// A key is a non-empty run of ASCII letters, digits, `-`, `_` and `.` that
/// doesn't start with a dot. Leading dots are reserved for in-flight writes.
///
/// # Examples
///
/// ```
/// use sharehub_storage::validate_key;
///
/// assert_eq!(validate_key(" uploadedFiles ").unwrap(), "uploadedFiles");
/// assert!(validate_key("gallery.v2").is_ok());
/// assert!(validate_key("../etc/passwd").is_err());
/// assert!(validate_key(".hidden").is_err());
/// assert!(validate_key("").is_err());
/// ```
pub fn validate(key: impl AsRef<str>) -> Result<String> {
    let raw = key.as_ref();
    let key = raw.trim();
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
    if key.is_empty() || key.starts_with('.') || !key.chars().all(allowed) {
        exn::bail!(ErrorKind::InvalidKey(raw.to_string()));
    }
    Ok(key.to_string())
}
