use super::FileInfoStream;
use crate::error::{ErrorKind, Result};
use crate::{FileInfo, StorageBackend, validate_name};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Artifacts live in a [`BTreeMap`] behind a [`RwLock`], so listings come
/// back sorted by name. Writes are counted, which lets cache tests assert that
/// a hit performed no persistence at all.
///
/// Only compiled with the `mock` feature (or inside this crate's tests).
///
/// # Examples
///
#[cfg_attr(feature = "mock", doc = "```")]
#[cfg_attr(not(feature = "mock"), doc = "```ignore")]
/// use preload_storage::backend::{MockBackend, StorageBackend};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([("photo-0123.png", b"\x89PNG".to_vec())]);
/// assert!(backend.exists("photo-0123.png").await?);
///
/// backend.write("logo.svg", b"<svg/>").await?;
/// assert_eq!(backend.writes(), 1);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    artifacts: RwLock<BTreeMap<String, (OffsetDateTime, Vec<u8>)>>,
    writes: AtomicUsize,
}

impl MockBackend {
    /// Panics if any name is invalid. If test setup is wrong, then the test
    /// should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        let now = OffsetDateTime::now_utc();
        let artifacts = files
            .into_iter()
            .map(|(name, data)| {
                let name = name.into();
                if validate_name(&name).is_err() {
                    panic!("MockBackend::with_files: invalid name {name:?}");
                }
                (name, (now, data.into()))
            })
            .collect();
        Self { name: "mock".to_string(), artifacts: RwLock::new(artifacts), writes: AtomicUsize::new(0) }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of successful [`write()`](StorageBackend::write) calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        Self::with_files(Vec::<(String, Vec<u8>)>::new())
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn init(&self) -> Result<()> {
        Ok(())
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a str>) -> FileInfoStream<'a> {
        Box::pin(async_stream::stream! {
            // Snapshot under the read lock, then drop it before yielding.
            let listing: Vec<FileInfo> = self
                .artifacts
                .read()
                .await
                .iter()
                .filter(|(name, _)| prefix.is_none_or(|p| name.starts_with(p)))
                .map(|(name, (modified, data))| FileInfo::new(name.clone(), data.len() as u64, *modified))
                .collect();
            for info in listing {
                yield Ok(info);
            }
        })
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let name = validate_name(name)?;
        Ok(self.artifacts.read().await.contains_key(name))
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>> {
        let name = validate_name(name)?;
        match self.artifacts.read().await.get(name) {
            Some((_, data)) => Ok(data.clone()),
            None => exn::bail!(ErrorKind::NotFound(name.to_string())),
        }
    }

    async fn write(&self, name: &str, data: &[u8]) -> Result<()> {
        let name = validate_name(name)?;
        self.artifacts.write().await.insert(name.to_string(), (OffsetDateTime::now_utc(), data.to_vec()));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        match self.artifacts.write().await.remove(name) {
            Some(_) => Ok(()),
            None => exn::bail!(ErrorKind::NotFound(name.to_string())),
        }
    }

    async fn stat(&self, name: &str) -> Result<FileInfo> {
        let name = validate_name(name)?;
        match self.artifacts.read().await.get(name) {
            Some((modified, data)) => Ok(FileInfo::new(name, data.len() as u64, *modified)),
            None => exn::bail!(ErrorKind::NotFound(name.to_string())),
        }
    }
}
