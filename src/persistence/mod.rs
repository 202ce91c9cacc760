//! # Persistence Module
//!
//! Serializes catalog artifacts to and from durable storage.
//!
//! Two backends are provided:
//! - `LocalBackend`: host filesystem, atomic temp-file-and-rename writes
//! - `MemoryBackend`: process memory, for embedding and tests

mod backend;
mod errors;
mod local;
mod memory;

pub use backend::PersistenceBackend;
pub use errors::{PersistenceError, PersistenceResult};
pub use local::LocalBackend;
pub use memory::MemoryBackend;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Read and decode a JSON artifact.
///
/// Undecodable content is reported as `Corrupted`, never as `NotFound`.
pub fn load_json<T, B>(backend: &B, path: &str) -> PersistenceResult<T>
where
    T: DeserializeOwned,
    B: PersistenceBackend + ?Sized,
{
    let bytes = backend.read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| PersistenceError::Corrupted {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

/// Encode a value as pretty JSON and write it as one artifact.
pub fn store_json<T, B>(backend: &B, path: &str, value: &T) -> PersistenceResult<()>
where
    T: Serialize + ?Sized,
    B: PersistenceBackend + ?Sized,
{
    let content = serde_json::to_vec_pretty(value).map_err(|e| {
        PersistenceError::Internal(format!("Failed to serialize '{}': {}", path, e))
    })?;
    backend.write(path, &content)
}
