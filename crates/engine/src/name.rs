//! Artifact naming.
//!
//! Two cache-key policies are supported:
//!
//! - **Locator** ([`derive_file_name`]): the name is a pure function of the
//!   locator and overrides, so it is known before any network access and an
//!   existing artifact short-circuits the fetch. A changed resource behind a
//!   stable URL is not detected.
//! - **Content** ([`derive_content_file_name`]): the name is derived from the
//!   fetched bytes, so changed content gets a new name, at the cost of always
//!   fetching.
//!
//! Both use a BLAKE3 digest truncated to 128 bits and rendered as hex.

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use percent_encoding::percent_decode_str;
use preload_storage::validate_name;

/// Hex characters kept from the digest (128 bits).
pub const HASH_LENGTH: usize = 32;

/// Derive the locator-keyed artifact name.
///
/// - With `name`: `{name}.{extension}`.
/// - Without: `{stem}-{hash}.{extension}`, where `stem` and the inferred
///   extension come from the last path segment of `locator` and `hash` is the
///   digest of the entire locator string (query included).
///
/// `file_ending` replaces the inferred extension; leading dots are ignored so
/// `"png"` and `".png"` are equivalent.
///
/// # Errors
/// [`MissingExtension`](ErrorKind::MissingExtension) when the locator has no
/// extension and `file_ending` is not given;
/// [`InvalidFileName`](ErrorKind::InvalidFileName) when an override would
/// escape the preload directory.
///
/// ```
/// use preload_engine::derive_file_name;
///
/// let name = derive_file_name("https://example.com/img/photo.png", None, None).unwrap();
/// assert!(name.starts_with("photo-") && name.ends_with(".png"));
/// assert_eq!(derive_file_name("https://example.com/img/photo.png", Some("webp"), Some("hero")).unwrap(), "hero.webp");
/// assert!(derive_file_name("https://example.com/img/photo", None, None).is_err());
/// ```
pub fn derive_file_name(locator: &str, file_ending: Option<&str>, name: Option<&str>) -> Result<String> {
    let (stem, inferred) = split_extension(last_segment(locator));
    let extension = normalize_extension(file_ending)
        .or(inferred)
        .ok_or_raise(|| ErrorKind::MissingExtension(locator.to_string()))?;
    let file_name = match name {
        Some(name) => format!("{name}.{extension}"),
        None => match (file_stem(stem), digest(locator.as_bytes())) {
            (stem, hash) if stem.is_empty() => format!("{hash}.{extension}"),
            (stem, hash) => format!("{stem}-{hash}.{extension}"),
        },
    };
    checked(file_name)
}

/// Derive the content-keyed artifact name from a fetched payload.
///
/// The extension is taken from `file_ending`, then the response
/// `content_type`, then the locator; the base name is `name` or the digest of
/// `payload`.
pub fn derive_content_file_name(
    payload: &[u8],
    content_type: Option<&str>,
    locator: &str,
    file_ending: Option<&str>,
    name: Option<&str>,
) -> Result<String> {
    let extension = normalize_extension(file_ending)
        .or_else(|| content_type.and_then(extension_for_mime))
        .or_else(|| split_extension(last_segment(locator)).1)
        .ok_or_raise(|| ErrorKind::MissingExtension(locator.to_string()))?;
    let file_name = match name {
        Some(name) => format!("{name}.{extension}"),
        None => format!("{}.{extension}", digest(payload)),
    };
    checked(file_name)
}

/// Map an image `Content-Type` to the extension it is served with.
///
/// Parameters (`; charset=...`) and case are ignored. Returns [`None`] for
/// anything that isn't a recognised image type.
pub fn extension_for_mime(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match essence.as_str() {
        "image/avif" => Some("avif"),
        "image/bmp" => Some("bmp"),
        "image/gif" => Some("gif"),
        "image/jpeg" => Some("jpeg"),
        "image/png" => Some("png"),
        "image/svg+xml" => Some("svg"),
        "image/tiff" => Some("tiff"),
        "image/webp" => Some("webp"),
        "image/x-icon" | "image/vnd.microsoft.icon" => Some("ico"),
        _ => None,
    }
}

/// Truncated BLAKE3 digest, hex encoded.
pub fn digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().as_str()[..HASH_LENGTH].to_string()
}

/// Final path segment of a locator, without query string or fragment.
fn last_segment(locator: &str) -> &str {
    let without_query = locator.split(['?', '#']).next().unwrap_or_default();
    // `https://example.com` names a host, not a file.
    let path = match without_query.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |start| &rest[start..]),
        None => without_query,
    };
    path.rsplit('/').next().unwrap_or_default()
}

/// Split `photo.png` into (`photo`, `Some("png")`). The extension is whatever
/// follows the last dot, and must be non-empty.
fn split_extension(segment: &str) -> (&str, Option<&str>) {
    match segment.rsplit_once('.') {
        Some((stem, extension)) if !extension.is_empty() => (stem, Some(extension)),
        _ => (segment, None),
    }
}

/// Turn a raw path segment stem into one a static file server will map back
/// to the stored artifact: percent-decoded, separators and `%` replaced, no
/// leading dots.
fn file_stem(stem: &str) -> String {
    let decoded = percent_decode_str(stem).decode_utf8_lossy();
    let replaced: String =
        decoded.chars().map(|c| if matches!(c, '/' | '\\' | '\0' | '%') { '_' } else { c }).collect();
    replaced.trim_start_matches('.').to_string()
}

fn normalize_extension(extension: Option<&str>) -> Option<&str> {
    extension.map(|e| e.trim().trim_matches('.')).filter(|e| !e.is_empty())
}

fn checked(file_name: String) -> Result<String> {
    validate_name(&file_name).or_raise(|| ErrorKind::InvalidFileName(file_name.clone()))?;
    Ok(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_derived_name_shape() {
        let locator = "https://example.com/img/photo.png";
        let name = derive_file_name(locator, None, None).unwrap();
        assert_eq!(name, format!("photo-{}.png", digest(locator.as_bytes())));
        assert_eq!(name.len(), "photo-".len() + HASH_LENGTH + ".png".len());
    }

    #[test]
    fn test_derived_name_is_deterministic() {
        let locator = "https://example.com/img/photo.png";
        let first = derive_file_name(locator, Some("webp"), None).unwrap();
        for _ in 0..10 {
            assert_eq!(derive_file_name(locator, Some("webp"), None).unwrap(), first);
        }
    }

    #[test]
    fn test_same_stem_different_locators() {
        let a = derive_file_name("https://a.example.com/photo.png", None, None).unwrap();
        let b = derive_file_name("https://b.example.com/photo.png", None, None).unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("photo-") && b.starts_with("photo-"));
    }

    #[test]
    fn test_query_string_is_hashed_not_named() {
        let small = derive_file_name("https://example.com/photo.jpg?w=200", None, None).unwrap();
        let large = derive_file_name("https://example.com/photo.jpg?w=800", None, None).unwrap();
        assert!(small.starts_with("photo-") && small.ends_with(".jpg"));
        assert_ne!(small, large);
    }

    #[rstest]
    #[case("https://example.com/img/photo.png", Some("webp"), None, Some("webp"))]
    #[case("https://example.com/img/photo.png", Some(".webp"), None, Some("webp"))]
    #[case("https://example.com/img/photo", Some("png"), None, Some("png"))]
    #[case("https://example.com/archive.tar.gz", None, None, Some("gz"))]
    #[case("https://example.com/img/photo", None, None, None)]
    #[case("https://example.com/img/photo.", None, None, None)]
    #[case("https://example.com/img/", None, None, None)]
    #[case("https://example.com/img/photo", Some(" . "), None, None)]
    fn test_extension(
        #[case] locator: &str,
        #[case] ending: Option<&str>,
        #[case] name: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        match (derive_file_name(locator, ending, name), expected) {
            (Ok(file_name), Some(extension)) => assert!(file_name.ends_with(&format!(".{extension}"))),
            (Err(err), None) => assert!(matches!(&*err, ErrorKind::MissingExtension(_))),
            (result, _) => panic!("unexpected result for {locator}: {:?}", result.map_err(|e| e.to_string())),
        }
    }

    #[test]
    fn test_override_name() {
        assert_eq!(derive_file_name("https://example.com/a/photo.png", None, Some("hero")).unwrap(), "hero.png");
        assert_eq!(derive_file_name("https://example.com/a/photo", Some("jpg"), Some("hero")).unwrap(), "hero.jpg");
        let err = derive_file_name("https://example.com/a/photo", None, Some("hero")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingExtension(_)));
    }

    #[rstest]
    #[case("../escape")]
    #[case("nested/name")]
    fn test_override_name_cannot_escape(#[case] name: &str) {
        let err = derive_file_name("https://example.com/photo.png", None, Some(name)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidFileName(_)));
    }

    #[test]
    fn test_hidden_file_has_no_stem() {
        let locator = "https://example.com/.png";
        assert_eq!(derive_file_name(locator, None, None).unwrap(), format!("{}.png", digest(locator.as_bytes())));
    }

    #[rstest]
    #[case("https://example.com/img/.hidden.png", "hidden")]
    #[case("https://example.com/img/..photo.png", "photo")]
    #[case("https://example.com/img/a\\b.png", "a_b")]
    #[case("https://example.com/img/my%20photo.png", "my photo")]
    #[case("https://example.com/img/a%2Fb.png", "a_b")]
    #[case("https://example.com/img/100%25.png", "100_")]
    #[case("https://example.com/img/50%.png", "50_")]
    fn test_derived_stem_is_servable(#[case] locator: &str, #[case] stem: &str) {
        let name = derive_file_name(locator, None, None).unwrap();
        assert_eq!(name, format!("{stem}-{}.png", digest(locator.as_bytes())));
    }

    #[test]
    fn test_dots_only_stem() {
        let locator = "https://example.com/img/...png";
        assert_eq!(derive_file_name(locator, None, None).unwrap(), format!("{}.png", digest(locator.as_bytes())));
    }

    #[rstest]
    #[case("https://example.com", None)]
    #[case("https://example.com/", None)]
    #[case("https://example.com/a/b.svg?v=1#top", Some("svg"))]
    #[case("//cdn.example.com/logo.svg", Some("svg"))]
    fn test_last_segment(#[case] locator: &str, #[case] expected: Option<&str>) {
        assert_eq!(split_extension(last_segment(locator)).1, expected);
    }

    #[test]
    fn test_unparseable_locator_still_named() {
        let name = derive_file_name("not a url/with space.svg?x#y", None, None).unwrap();
        assert!(name.starts_with("with space-") && name.ends_with(".svg"));
    }

    #[rstest]
    #[case("image/png", Some("png"))]
    #[case("image/jpeg", Some("jpeg"))]
    #[case("image/svg+xml; charset=utf-8", Some("svg"))]
    #[case(" IMAGE/WEBP ", Some("webp"))]
    #[case("image/x-icon", Some("ico"))]
    #[case("text/html", None)]
    #[case("", None)]
    fn test_extension_for_mime(#[case] content_type: &str, #[case] expected: Option<&str>) {
        assert_eq!(extension_for_mime(content_type), expected);
    }

    #[test]
    fn test_content_name_prefers_override_then_mime_then_locator() {
        let payload = b"\x89PNG\r\n";
        let hash = digest(payload);
        let locator = "https://example.com/photo.jpg";
        assert_eq!(
            derive_content_file_name(payload, Some("image/png"), locator, Some("avif"), None).unwrap(),
            format!("{hash}.avif")
        );
        assert_eq!(derive_content_file_name(payload, Some("image/png"), locator, None, None).unwrap(), format!("{hash}.png"));
        assert_eq!(derive_content_file_name(payload, Some("text/plain"), locator, None, None).unwrap(), format!("{hash}.jpg"));
        assert_eq!(derive_content_file_name(payload, None, locator, None, Some("hero")).unwrap(), "hero.jpg");
    }

    #[test]
    fn test_content_name_missing_extension() {
        let err = derive_content_file_name(b"data", None, "https://example.com/photo", None, None).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingExtension(_)));
    }
}
