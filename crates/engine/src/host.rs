//! Host path resolution.
//!
//! The served location of a preloaded artifact is
//! `{host_path}/assets/preloaded/{file_name}`, where the host path is an
//! origin (possibly empty) followed by the configured base.

/// Which origin to prefix served paths with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Site {
    /// Site-relative paths.
    #[default]
    None,
    /// The site from the build configuration.
    Configured,
    /// An explicit origin, e.g. `https://cdn.example.com`.
    Explicit(String),
}
impl Site {
    /// Pick the origin for this choice. A configured choice with nothing
    /// configured resolves to no origin.
    pub fn origin<'a>(&'a self, configured_site: Option<&'a str>) -> &'a str {
        match self {
            Self::None => "",
            Self::Configured => configured_site.unwrap_or_default(),
            Self::Explicit(origin) => origin,
        }
    }
}
impl From<Option<String>> for Site {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::None, Self::Explicit)
    }
}

/// Build the host path from a site choice and the configured base.
///
/// The result has no trailing slash, so callers can append
/// `/assets/preloaded/...` directly. With no origin and an empty (or `/`)
/// base, the result is the empty string and served paths are root-relative.
///
/// ```
/// use preload_engine::{Site, resolve_host};
///
/// let site = Site::Explicit("https://example.com/".to_string());
/// assert_eq!(resolve_host(&site, None, "docs"), "https://example.com/docs");
/// assert_eq!(resolve_host(&Site::None, Some("https://example.com"), "/"), "");
/// ```
pub fn resolve_host(site: &Site, configured_site: Option<&str>, configured_base: &str) -> String {
    let origin = site.origin(configured_site).trim();
    let base = configured_base.trim().trim_matches('/');

    let mut host = String::with_capacity(origin.len() + base.len() + 2);
    host.push_str(origin.trim_end_matches('/'));
    host.push('/');
    if !base.is_empty() {
        host.push_str(base);
        host.push('/');
    }
    // Drop the final separator; it is re-added when joining the file path.
    host.pop();
    host
}
