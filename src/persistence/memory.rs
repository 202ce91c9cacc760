//! # In-Memory Backend
//!
//! Keeps artifacts in process memory. Writes and removals can be made to fail
//! on demand, which lets callers exercise their persistence-failure paths.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use super::backend::PersistenceBackend;
use super::errors::{PersistenceError, PersistenceResult};

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
    /// Writes to paths ending with this suffix fail
    failing_suffix: Option<String>,
    /// Removals of paths ending with this suffix fail
    failing_removal_suffix: Option<String>,
}

/// In-memory persistence backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write and directory creation to a path ending with
    /// `suffix` fail. An empty suffix fails all writes.
    pub fn fail_writes_ending_with(&self, suffix: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.failing_suffix = Some(suffix.into());
        }
    }

    /// Make every file deletion and directory removal of a path ending with
    /// `suffix` fail. The artifact stays in place.
    pub fn fail_removals_ending_with(&self, suffix: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.failing_removal_suffix = Some(suffix.into());
        }
    }

    /// Stop injecting failures
    pub fn clear_failures(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.failing_suffix = None;
            state.failing_removal_suffix = None;
        }
    }

    /// Number of stored artifacts (directories excluded)
    pub fn artifact_count(&self) -> usize {
        self.state.lock().map(|s| s.files.len()).unwrap_or(0)
    }

    fn lock(&self) -> PersistenceResult<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| PersistenceError::Internal("Lock poisoned".into()))
    }
}

fn injected_failure(path: &str, operation: &str) -> PersistenceError {
    PersistenceError::Io {
        path: path.to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("injected {} failure", operation),
        ),
    }
}

fn matches_suffix(suffix: &Option<String>, path: &str) -> bool {
    suffix.as_deref().map_or(false, |suffix| path.ends_with(suffix))
}

impl MemoryState {
    fn should_fail(&self, path: &str) -> bool {
        matches_suffix(&self.failing_suffix, path)
    }

    fn should_fail_removal(&self, path: &str) -> bool {
        matches_suffix(&self.failing_removal_suffix, path)
    }
}

impl PersistenceBackend for MemoryBackend {
    fn write(&self, path: &str, data: &[u8]) -> PersistenceResult<()> {
        let mut state = self.lock()?;
        if state.should_fail(path) {
            return Err(injected_failure(path, "write"));
        }
        state.files.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn read(&self, path: &str) -> PersistenceResult<Vec<u8>> {
        let state = self.lock()?;
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(path.to_string()))
    }

    fn delete(&self, path: &str) -> PersistenceResult<()> {
        let mut state = self.lock()?;
        if state.should_fail_removal(path) {
            return Err(injected_failure(path, "delete"));
        }
        state
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::NotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> PersistenceResult<bool> {
        let state = self.lock()?;
        Ok(state.files.contains_key(path) || state.dirs.contains(path))
    }

    fn create_dir(&self, path: &str) -> PersistenceResult<()> {
        let mut state = self.lock()?;
        if state.should_fail(path) {
            return Err(injected_failure(path, "write"));
        }
        state.dirs.insert(path.to_string());
        Ok(())
    }

    fn remove_dir(&self, path: &str) -> PersistenceResult<()> {
        let mut state = self.lock()?;
        if state.should_fail_removal(path) {
            return Err(injected_failure(path, "delete"));
        }
        if !state.dirs.remove(path) {
            return Err(PersistenceError::NotFound(path.to_string()));
        }
        let prefix = format!("{}/", path);
        state.files.retain(|name, _| !name.starts_with(&prefix));
        state.dirs.retain(|name| !name.starts_with(&prefix));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_delete() {
        let backend = MemoryBackend::new();

        backend.write("a.json", b"1").unwrap();
        assert_eq!(backend.read("a.json").unwrap(), b"1");
        assert_eq!(backend.artifact_count(), 1);

        backend.delete("a.json").unwrap();
        assert!(backend.read("a.json").unwrap_err().is_not_found());
    }

    #[test]
    fn test_remove_dir_removes_children() {
        let backend = MemoryBackend::new();

        backend.create_dir("coll").unwrap();
        backend.write("coll/doc.json", b"{}").unwrap();
        backend.write("other.json", b"{}").unwrap();

        backend.remove_dir("coll").unwrap();
        assert!(!backend.exists("coll").unwrap());
        assert!(!backend.exists("coll/doc.json").unwrap());
        assert!(backend.exists("other.json").unwrap());
    }

    #[test]
    fn test_injected_failures() {
        let backend = MemoryBackend::new();

        backend.fail_writes_ending_with("catalog.json");
        assert!(backend.write("catalog.json", b"{}").is_err());
        assert!(backend.write("x.schema.json", b"{}").is_ok());

        backend.clear_failures();
        assert!(backend.write("catalog.json", b"{}").is_ok());
    }

    #[test]
    fn test_injected_removal_failures() {
        let backend = MemoryBackend::new();
        backend.write("x.index.json", b"{}").unwrap();
        backend.create_dir("coll").unwrap();

        backend.fail_removals_ending_with(".index.json");
        let err = backend.delete("x.index.json").unwrap_err();
        assert!(!err.is_not_found());
        assert!(backend.exists("x.index.json").unwrap());
        assert!(backend.remove_dir("coll").is_ok());

        backend.fail_removals_ending_with("coll");
        backend.create_dir("coll").unwrap();
        assert!(backend.remove_dir("coll").is_err());
        assert!(backend.exists("coll").unwrap());

        backend.clear_failures();
        assert!(backend.delete("x.index.json").is_ok());
    }
}
