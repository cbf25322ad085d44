//! Build lifecycle steps around the cache.
//!
//! The engine never calls these itself. A host build clears the store before
//! rendering (when `clear_preloaded` is set) and copies it into the output
//! directory afterwards.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use futures::TryStreamExt;
use preload_storage::StorageBackend;

/// Remove every artifact from `store`, returning how many were removed.
///
/// A store that was never initialized is already empty.
pub async fn clear(store: &dyn StorageBackend) -> Result<usize> {
    // Collect first: deleting while walking a directory is not portable.
    let artifacts = store.list(None).await.or_raise(|| ErrorKind::Lifecycle)?;
    for artifact in &artifacts {
        store.delete(&artifact.name).await.or_raise(|| ErrorKind::Lifecycle)?;
    }
    tracing::info!(store = store.name(), removed = artifacts.len(), "Cleared preloaded artifacts");
    Ok(artifacts.len())
}

/// Copy every artifact from `source` into `target` under the same name,
/// returning how many were copied. Existing artifacts in `target` are
/// overwritten.
pub async fn copy_tree(source: &dyn StorageBackend, target: &dyn StorageBackend) -> Result<usize> {
    let mut copied = 0;
    let mut artifacts = source.list_stream(None);
    while let Some(artifact) = artifacts.try_next().await.or_raise(|| ErrorKind::Lifecycle)? {
        let data = source.read(&artifact.name).await.or_raise(|| ErrorKind::Lifecycle)?;
        target.write(&artifact.name, &data).await.or_raise(|| ErrorKind::Lifecycle)?;
        tracing::trace!(name = %artifact.name, bytes = data.len(), "Copied artifact");
        copied += 1;
    }
    tracing::info!(from = source.name(), to = target.name(), copied, "Copied preloaded artifacts");
    Ok(copied)
}
