//! # Persistence Backend Trait

use super::errors::PersistenceResult;

/// Durable storage for catalog artifacts.
///
/// Paths are relative to the backend root and use `/` as separator.
/// Implementations provide no concurrency control of their own; the catalog
/// store serializes access.
pub trait PersistenceBackend: Send + Sync + std::fmt::Debug {
    /// Replace the artifact at `path` with `data`
    fn write(&self, path: &str, data: &[u8]) -> PersistenceResult<()>;

    /// Read the artifact at `path`
    fn read(&self, path: &str) -> PersistenceResult<Vec<u8>>;

    /// Delete the artifact at `path`
    fn delete(&self, path: &str) -> PersistenceResult<()>;

    /// Check if an artifact or directory exists at `path`
    fn exists(&self, path: &str) -> PersistenceResult<bool>;

    /// Create an empty directory (and missing parents)
    fn create_dir(&self, path: &str) -> PersistenceResult<()>;

    /// Remove a directory and everything below it
    fn remove_dir(&self, path: &str) -> PersistenceResult<()>;
}
