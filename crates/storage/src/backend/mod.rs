//! Storage backend trait and implementations.
//!
//! The preload cache treats its directory as an append-mostly store keyed by
//! file name. [`StorageBackend`] is the seam between that cache and wherever
//! the bytes actually live.

mod local;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::local::LocalBackend;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockBackend;
use crate::error::Result;
use crate::file::FileInfo;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::pin::Pin;

pub(crate) type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

/// Unified interface for artifact stores.
///
/// All operations are asynchronous; many preloads may be in flight at once
/// and each suspends independently at its own I/O. No locking is performed:
/// two writers racing on the same name both succeed and the last write wins,
/// but a reader never observes a partially written artifact.
///
/// Every `name` is checked with [`validate_name`](crate::validate_name)
/// before use.
///
/// # Examples
///
/// ```
/// use preload_storage::{backend::StorageBackend, error::Result};
///
/// async fn cached_size(backend: &dyn StorageBackend) -> Result<u64> {
///     let name = "photo-0123.png";
///     if backend.exists(name).await? {
///         Ok(backend.stat(name).await?.size)
///     } else {
///         Ok(0)
///     }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// Make sure the store exists.
    ///
    /// Idempotent: calling this on a store that is already initialized is not
    /// an error.
    async fn init(&self) -> Result<()>;

    /// List all artifacts whose name starts with `prefix`.
    ///
    /// Default implementation collects [`list_stream()`](Self::list_stream)
    /// into a [`Vec`].
    async fn list(&self, prefix: Option<&str>) -> Result<Vec<FileInfo>> {
        self.list_stream(prefix).try_collect().await
    }

    /// Stream metadata of all artifacts whose name starts with `prefix`.
    ///
    /// Listing a store that has not been initialized yet yields nothing
    /// rather than an error.
    ///
    /// ```
    /// use futures::TryStreamExt;
    /// # use preload_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut stream = backend.list_stream(Some("photo-"));
    /// while let Some(info) = stream.try_next().await? {
    ///     println!("{}: {} bytes", info.name, info.size);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn list_stream<'a>(&'a self, prefix: Option<&'a str>) -> FileInfoStream<'a>;

    async fn exists(&self, name: &str) -> Result<bool>;

    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if there is no
    /// such artifact.
    async fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Store an artifact, replacing any existing one of the same name. The
    /// store itself is created if needed.
    async fn write(&self, name: &str, data: &[u8]) -> Result<()>;

    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if there is no
    /// such artifact.
    async fn delete(&self, name: &str) -> Result<()>;

    /// Artifact metadata without reading its contents.
    async fn stat(&self, name: &str) -> Result<FileInfo>;
}
