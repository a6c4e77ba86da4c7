//! Storage abstraction for session persistence.

mod file;
mod local;
mod memory;

pub use file::FileStorage;
pub use local::{LocalSession, ResumeMeta, SessionExport, create_default_session};
pub use memory::MemoryStorage;

use crate::session::SessionSnapshot;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for session storage backends.
///
/// Implementations can keep snapshots in memory or on the filesystem.
pub trait Storage: Send + Sync {
    /// Save a snapshot under `key`.
    fn save(&self, key: &str, snapshot: &SessionSnapshot) -> BoxFuture<'_, StorageResult<()>>;

    /// Load the snapshot stored under `key`.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<SessionSnapshot>>;

    /// Delete the snapshot under `key`. Missing keys are not an error.
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all stored keys.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a snapshot exists.
    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
