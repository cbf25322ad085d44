//! Local filesystem storage backend.
//!
//! Artifacts are plain files directly inside the store root, accessed via
//! `tokio::fs`. Writes land in a hidden partial file first and are renamed
//! into place, so a concurrent reader sees either the old artifact or the new
//! one, never a truncated file.

use super::FileInfoStream;
use crate::error::{ErrorKind, Result};
use crate::{FileInfo, StorageBackend, validate_name};
use async_stream::stream;
use async_trait::async_trait;
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::{self, DirEntry};

/// Keeps partial file names unique between concurrent writes in this process.
static PARTIAL_WRITES: AtomicU64 = AtomicU64::new(0);

/// Local filesystem storage backend.
///
/// Construction performs no writes: the root is created lazily by
/// [`init()`](StorageBackend::init) or the first
/// [`write()`](StorageBackend::write).
///
/// ```no_run
/// use preload_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("preloaded", "/srv/site/public/assets/preloaded")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}
impl LocalBackend {
    /// # Errors
    ///
    /// Returns [`InvalidRoot`](ErrorKind::InvalidRoot) if `root` is not
    /// absolute, or if it exists but is not a directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() || (root.exists() && !root.is_dir()) {
            exn::bail!(ErrorKind::InvalidRoot(root));
        }
        Ok(Self { name: name.into(), root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn artifact_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self.root.join(validate_name(name)?))
    }

    /// `.{name}.{pid}-{n}.part`, beside the artifact so the rename stays on
    /// one filesystem.
    fn partial_path(&self, name: &str) -> PathBuf {
        let n = PARTIAL_WRITES.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(".{name}.{}-{n}.part", std::process::id()))
    }

    fn io_error(err: IoError, name: &str) -> ErrorKind {
        match err.kind() {
            IoErrorKind::NotFound => ErrorKind::NotFound(name.to_string()),
            IoErrorKind::PermissionDenied => ErrorKind::PermissionDenied(name.to_string()),
            _ => ErrorKind::Io(err),
        }
    }

    /// Metadata for a directory entry, or [`None`] if the entry is not an
    /// artifact (a subdirectory, a partial write, a name we never wrote).
    async fn entry_info(entry: DirEntry) -> Result<Option<FileInfo>> {
        let Ok(name) = entry.file_name().into_string() else {
            return Ok(None);
        };
        if validate_name(&name).is_err() {
            return Ok(None);
        }
        let metadata = entry.metadata().await.map_err(|e| Self::io_error(e, &name))?;
        if !metadata.is_file() {
            return Ok(None);
        }
        let modified = metadata.modified().map_err(ErrorKind::Io)?;
        Ok(Some(FileInfo::new(name, metadata.len(), modified)))
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await.map_err(ErrorKind::Io)?;
        tracing::trace!(backend = %self.name, root = %self.root.display(), "Storage root ready");
        Ok(())
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a str>) -> FileInfoStream<'a> {
        Box::pin(stream! {
            match fs::read_dir(&self.root).await {
                // An uninitialized store is an empty store.
                Err(err) if err.kind() == IoErrorKind::NotFound => {},
                Err(err) => yield Err(exn::Exn::from(ErrorKind::Io(err))),
                Ok(mut entries) => loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break,
                        Err(err) => {
                            yield Err(exn::Exn::from(ErrorKind::Io(err)));
                            break;
                        },
                    };
                    match Self::entry_info(entry).await {
                        Ok(Some(info)) if prefix.is_none_or(|p| info.name.starts_with(p)) => yield Ok(info),
                        Ok(_) => {},
                        Err(err) => yield Err(err),
                    }
                },
            }
        })
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.artifact_path(name)?;
        match fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(err) if err.kind() == IoErrorKind::NotFound => Ok(false),
            Err(err) => Err(Self::io_error(err, name).into()),
        }
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.artifact_path(name)?;
        Ok(fs::read(&path).await.map_err(|e| Self::io_error(e, name))?)
    }

    async fn write(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.artifact_path(name)?;
        fs::create_dir_all(&self.root).await.map_err(ErrorKind::Io)?;
        let partial = self.partial_path(name);
        let written = match fs::write(&partial, data).await {
            Ok(()) => fs::rename(&partial, &path).await,
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            // Best effort; a stray partial file is never listed.
            let _ = fs::remove_file(&partial).await;
            exn::bail!(Self::io_error(err, name));
        }
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let path = self.artifact_path(name)?;
        Ok(fs::remove_file(&path).await.map_err(|e| Self::io_error(e, name))?)
    }

    async fn stat(&self, name: &str) -> Result<FileInfo> {
        let path = self.artifact_path(name)?;
        let metadata = fs::metadata(&path).await.map_err(|e| Self::io_error(e, name))?;
        if !metadata.is_file() {
            exn::bail!(ErrorKind::NotFound(name.to_string()));
        }
        let modified = metadata.modified().map_err(ErrorKind::Io)?;
        Ok(FileInfo::new(name, metadata.len(), modified))
    }
}
