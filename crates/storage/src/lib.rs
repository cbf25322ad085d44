//! Storage for preloaded artifacts.
//!
//! The preload directory is a flat, name-keyed store: an artifact's identity
//! is its file name. Backends hide whether that store lives on the local
//! filesystem or (in tests) in memory.

pub mod backend;
pub mod error;
pub mod file;
mod name;

pub use crate::backend::StorageBackend;
pub use crate::file::FileInfo;
pub use crate::name::validate as validate_name;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
