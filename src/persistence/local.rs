//! # Local Filesystem Backend

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::backend::PersistenceBackend;
use super::errors::{PersistenceError, PersistenceResult};

/// Suffix of the staging file used by atomic writes
const TEMP_SUFFIX: &str = ".tmp";

/// Local filesystem persistence backend
#[derive(Debug)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Create a backend rooted at `root`, creating the directory if missing
    pub fn open(root: impl Into<PathBuf>) -> PersistenceResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| PersistenceError::from_io(root.display().to_string(), e))?;
        Ok(Self { root })
    }

    /// Returns the root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl PersistenceBackend for LocalBackend {
    /// Writes atomically:
    /// 1. Write to temp file
    /// 2. fsync temp file
    /// 3. Rename temp to final
    fn write(&self, path: &str, data: &[u8]) -> PersistenceResult<()> {
        let full_path = self.full_path(path);
        let temp_path = self.full_path(&format!("{}{}", path, TEMP_SUFFIX));

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::from_io(path, e))?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| PersistenceError::from_io(path, e))?;

        file.write_all(data)
            .map_err(|e| PersistenceError::from_io(path, e))?;
        file.sync_all()
            .map_err(|e| PersistenceError::from_io(path, e))?;

        if let Err(e) = fs::rename(&temp_path, &full_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(PersistenceError::from_io(path, e));
        }

        // Make the rename itself durable
        if let Some(parent) = full_path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Ok(())
    }

    fn read(&self, path: &str) -> PersistenceResult<Vec<u8>> {
        fs::read(self.full_path(path)).map_err(|e| PersistenceError::from_io(path, e))
    }

    fn delete(&self, path: &str) -> PersistenceResult<()> {
        fs::remove_file(self.full_path(path)).map_err(|e| PersistenceError::from_io(path, e))
    }

    fn exists(&self, path: &str) -> PersistenceResult<bool> {
        Ok(self.full_path(path).exists())
    }

    fn create_dir(&self, path: &str) -> PersistenceResult<()> {
        fs::create_dir_all(self.full_path(path)).map_err(|e| PersistenceError::from_io(path, e))
    }

    fn remove_dir(&self, path: &str) -> PersistenceResult<()> {
        fs::remove_dir_all(self.full_path(path)).map_err(|e| PersistenceError::from_io(path, e))
    }
}
