//! Build-time preloading of remote assets.
//!
//! During a production build, every remote asset referenced by a page is
//! downloaded once into `{public_dir}/assets/preloaded/` and the reference is
//! rewritten to point at the local copy. Repeated builds reuse what is
//! already there. In development nothing is fetched and references are left
//! alone.
//!
//! ```no_run
//! use preload_engine::{BuildConfig, PreloadOptions, Preloader, Site};
//!
//! # async fn example() -> preload_engine::error::Result<()> {
//! let config = BuildConfig::load(None).expect("configuration");
//! let preloader = Preloader::from_config(config)?;
//!
//! let options = PreloadOptions::default().with_site(Site::Configured);
//! let src = preloader.preload("https://example.com/img/photo.png", &options).await;
//! // "https://my.site/assets/preloaded/photo-<hash>.png", or the original
//! // locator if anything went wrong.
//! # Ok(())
//! # }
//! ```

mod engine;
pub mod error;
mod fetch;
mod host;
pub mod lifecycle;
mod name;
mod options;

pub use crate::engine::Preloader;
pub use crate::fetch::{Fetched, Fetcher, FetcherHandle, HttpFetcher};
pub use crate::host::{Site, resolve_host};
pub use crate::name::{HASH_LENGTH, derive_content_file_name, derive_file_name, digest, extension_for_mime};
pub use crate::options::{CacheKey, PreloadOptions};
pub use preload_config::{BuildConfig, Mode};
