use time::OffsetDateTime;

/// Metadata about a single stored artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Artifact name, which is also its cache key
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub modified: OffsetDateTime,
}
impl FileInfo {
    pub fn new(name: impl Into<String>, size: u64, modified: impl Into<OffsetDateTime>) -> Self {
        Self { name: name.into(), size, modified: modified.into() }
    }

    /// The extension the artifact is served with, if any.
    pub fn extension(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(_, extension)| extension).filter(|extension| !extension.is_empty())
    }
}
