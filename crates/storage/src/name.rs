//! Artifact name validation.
//!
//! The preload store is flat: an artifact is addressed by a bare file name,
//! never by a path. Validation happens before any I/O so that a crafted
//! override name can never reach outside the store root.

use crate::error::{ErrorKind, Result};

/// Check that `name` can be stored as-is and return it.
///
/// Rejected: empty names, `.`/`..`, anything containing a separator (`/` or
/// `\`) or a NUL byte, and names starting with `.`, which the local backend
/// reserves for in-flight writes.
///
/// ```
/// use preload_storage::validate_name;
///
/// assert!(validate_name("photo-0123.png").is_ok());
/// assert!(validate_name("sub/photo.png").is_err());
/// assert!(validate_name("..").is_err());
/// assert!(validate_name(".hidden.png").is_err());
/// ```
pub fn validate(name: &str) -> Result<&str> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\', '\0']) {
        exn::bail!(ErrorKind::InvalidName(name.to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo-0123.png")]
    #[case("logo.svg")]
    #[case("no-extension")]
    #[case("with space.png")]
    fn test_valid_names(#[case] name: &str) {
        assert_eq!(validate(name).unwrap(), name);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("..")]
    #[case(".png")]
    #[case("/photo.png")]
    #[case("sub/photo.png")]
    #[case("photo.png/")]
    #[case("..\\photo.png")]
    #[case("a\0b.png")]
    fn test_invalid_names(#[case] name: &str) {
        let err = validate(name).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidName(_)));
    }
}
