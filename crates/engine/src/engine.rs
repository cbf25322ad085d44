//! The preload cache.
//!
//! The preload directory *is* the cache: no index is kept in memory and every
//! call re-checks the store. An artifact is written at most once per derived
//! name unless a refetch is forced.

use crate::error::{ErrorKind, Result};
use crate::fetch::{Fetched, FetcherHandle, HttpFetcher};
use crate::host::{Site, resolve_host};
use crate::name::{derive_content_file_name, derive_file_name};
use crate::options::{CacheKey, PreloadOptions};
use exn::ResultExt;
use preload_config::{BuildConfig, PRELOAD_SEGMENT};
use preload_storage::backend::LocalBackend;
use preload_storage::{BackendHandle, validate_name};
use std::future::Future;
use std::sync::Arc;
use tracing::instrument;
use url::Url;

/// Fetch-once cache of remote assets.
///
/// Holds the build configuration, the store backing the preload directory and
/// the fetcher used by [`preload()`](Self::preload). All three are fixed at
/// construction; the same `Preloader` can serve any number of concurrent
/// calls.
#[derive(Clone)]
pub struct Preloader {
    config: Arc<BuildConfig>,
    store: BackendHandle,
    fetcher: FetcherHandle,
}

impl Preloader {
    pub fn new(config: impl Into<Arc<BuildConfig>>, store: BackendHandle, fetcher: FetcherHandle) -> Self {
        Self { config: config.into(), store, fetcher }
    }

    /// Preload into `{public_dir}/assets/preloaded` over HTTP.
    ///
    /// Nothing is created on disk until the first artifact is written.
    pub fn from_config(config: impl Into<Arc<BuildConfig>>) -> Result<Self> {
        let config = config.into();
        let store = LocalBackend::new("preloaded", config.preload_dir()).or_raise(|| ErrorKind::Storage)?;
        let fetcher = HttpFetcher::new()?;
        Ok(Self::new(config, Arc::new(store), Arc::new(fetcher)))
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn store(&self) -> &BackendHandle {
        &self.store
    }

    /// The URL prefix served paths start with, for the given site choice.
    pub fn resolve_host(&self, site: &Site) -> String {
        resolve_host(site, self.config.site.as_deref(), &self.config.base)
    }

    /// `{host}/assets/preloaded/{file_name}`
    pub fn served_path(&self, site: &Site, file_name: &str) -> String {
        format!("{}/{PRELOAD_SEGMENT}/{file_name}", self.resolve_host(site))
    }

    /// Persist the result of `fetch` as `file_name`, unless an artifact of
    /// that name already exists, and return its served path.
    ///
    /// `fetch` is only invoked on a miss or when
    /// [`skip_cache`](PreloadOptions::skip_cache) is set. Every failure is
    /// returned to the caller; nothing is retried.
    ///
    /// ```no_run
    /// # use preload_engine::{Fetched, PreloadOptions, Preloader, error::Result};
    /// # async fn example(preloader: &Preloader) -> Result<()> {
    /// let thumbnail = || async {
    ///     // Render, resize, call a POST endpoint...
    ///     Ok(Fetched::new(vec![0x89, b'P', b'N', b'G']))
    /// };
    /// let path = preloader.preload_fetch(thumbnail, "hero-thumb.png", &PreloadOptions::default()).await?;
    /// println!("<img src=\"{path}\">");
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self, fetch, options))]
    pub async fn preload_fetch<F, Fut>(&self, fetch: F, file_name: &str, options: &PreloadOptions) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Fetched>>,
    {
        validate_name(file_name).or_raise(|| ErrorKind::InvalidFileName(file_name.to_string()))?;
        let cached = self.store.exists(file_name).await.or_raise(|| ErrorKind::Storage)?;
        if cached && !options.skip_cache {
            tracing::debug!(store = self.store.name(), "Artifact already preloaded; skipping fetch");
        } else {
            let payload = fetch().await?.into_payload()?;
            self.store.write(file_name, &payload).await.or_raise(|| ErrorKind::Storage)?;
            tracing::info!(store = self.store.name(), bytes = payload.len(), refetch = cached, "Preloaded artifact");
        }
        Ok(self.served_path(&options.site, file_name))
    }

    /// Preload `locator` and return the path to reference it by.
    ///
    /// Never fails. Outside a production build, and for locators that are
    /// already root-relative, the locator is returned untouched without any
    /// I/O. Any failure along the way is logged and also yields the original
    /// locator.
    #[instrument(skip(self, options))]
    pub async fn preload(&self, locator: &str, options: &PreloadOptions) -> String {
        if !self.config.mode.is_production() || is_local(locator) {
            tracing::trace!(mode = %self.config.mode, "Passing locator through");
            return locator.to_string();
        }
        match self.try_preload(locator, options).await {
            Ok(served) => served,
            Err(err) => {
                tracing::warn!(error = ?err, "Preloading failed; keeping the original locator");
                locator.to_string()
            },
        }
    }

    /// The fallible part of [`preload()`](Self::preload), without the
    /// production or local-path checks.
    pub async fn try_preload(&self, locator: &str, options: &PreloadOptions) -> Result<String> {
        self.store.init().await.or_raise(|| ErrorKind::Storage)?;
        let url = Url::parse(locator).or_raise(|| ErrorKind::InvalidLocator(locator.to_string()))?;
        match options.cache_key {
            CacheKey::Locator => {
                let file_name = derive_file_name(locator, options.file_ending(), options.name())?;
                self.preload_fetch(|| self.fetcher.fetch(&url), &file_name, options).await
            },
            CacheKey::Content => {
                let fetched = self.fetcher.fetch(&url).await?;
                let content_type = fetched.content_type.clone();
                let payload = fetched.into_payload()?;
                let file_name = derive_content_file_name(
                    &payload,
                    content_type.as_deref(),
                    locator,
                    options.file_ending(),
                    options.name(),
                )?;
                self.preload_fetch(|| async move { Ok(Fetched::new(payload)) }, &file_name, options).await
            },
        }
    }
}

/// Root-relative locators already point at something the build serves.
fn is_local(locator: &str) -> bool {
    locator.starts_with('/')
}
