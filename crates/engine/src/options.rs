use crate::host::Site;

/// What the artifact name is derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheKey {
    /// Hash the locator. The name is known before fetching, so a cache hit
    /// costs no network access.
    #[default]
    Locator,
    /// Hash the fetched bytes. Always fetches; a changed resource behind the
    /// same locator gets a new artifact.
    Content,
}

/// Per-call options for [`Preloader`](crate::Preloader).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadOptions {
    pub site: Site,
    /// Base name (without extension) used instead of the derived one.
    pub override_name: Option<String>,
    /// Extension used instead of the inferred one.
    pub override_file_ending: Option<String>,
    /// Fetch and overwrite even if the artifact already exists.
    pub skip_cache: bool,
    pub cache_key: CacheKey,
}
impl PreloadOptions {
    pub fn with_site(mut self, site: Site) -> Self {
        self.site = site;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.override_name = Some(name.into());
        self
    }

    pub fn with_file_ending(mut self, file_ending: impl Into<String>) -> Self {
        self.override_file_ending = Some(file_ending.into());
        self
    }

    pub fn skip_cache(mut self, skip_cache: bool) -> Self {
        self.skip_cache = skip_cache;
        self
    }

    pub fn with_cache_key(mut self, cache_key: CacheKey) -> Self {
        self.cache_key = cache_key;
        self
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.override_name.as_deref()
    }

    pub(crate) fn file_ending(&self) -> Option<&str> {
        self.override_file_ending.as_deref()
    }
}
