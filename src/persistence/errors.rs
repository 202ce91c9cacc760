//! # Persistence Errors

use thiserror::Error;

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Persistence backend errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupted artifact '{path}': {reason}")]
    Corrupted { path: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PersistenceError {
    /// Wrap an I/O error, mapping `NotFound` to its own variant
    pub fn from_io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            PersistenceError::NotFound(path)
        } else {
            PersistenceError::Io { path, source }
        }
    }

    /// Returns whether the artifact was simply absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistenceError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_from_io_maps_not_found() {
        let err = PersistenceError::from_io("catalog.json", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());

        let err = PersistenceError::from_io(
            "catalog.json",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("catalog.json"));
    }
}
