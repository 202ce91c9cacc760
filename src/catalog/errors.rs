//! Catalog error types
//!
//! Every failure maps onto one `ErrorKind`. The outer layer turns kinds into
//! status codes; the store itself never retries or rolls back committed state.
//!
//! Kinds:
//! - AlreadyExists (409): name collision on create or rename
//! - NotFound (404): operation targets an absent collection
//! - ValidationFailed (400): bad name or bad schema, no state mutated
//! - PersistenceFailed (500): artifact read/write failed or is corrupted

use std::fmt;

use thiserror::Error;

use crate::persistence::PersistenceError;
use crate::schema::SchemaError;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failure categories exposed across the catalog boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    ValidationFailed,
    PersistenceFailed,
}

impl ErrorKind {
    /// Returns the stable code string
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::ValidationFailed => "VALIDATION_FAILED",
            ErrorKind::PersistenceFailed => "PERSISTENCE_FAILED",
        }
    }

    /// HTTP status code conventionally used for this kind
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::AlreadyExists => 409,
            ErrorKind::NotFound => 404,
            ErrorKind::ValidationFailed => 400,
            ErrorKind::PersistenceFailed => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Catalog store errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Collection already exists: '{0}'")]
    AlreadyExists(String),

    #[error("Could not find Collection: '{0}'")]
    NotFound(String),

    #[error("Invalid collection name: `{0}`, must be non-empty and match regex Pattern: `^[a-z0-9-]*$`")]
    InvalidName(String),

    #[error("Cannot rename collection '{0}' to the same name")]
    SameName(String),

    #[error(transparent)]
    InvalidSchema(#[from] SchemaError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Returns the boundary error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            CatalogError::NotFound(_) => ErrorKind::NotFound,
            CatalogError::InvalidName(_)
            | CatalogError::SameName(_)
            | CatalogError::InvalidSchema(_) => ErrorKind::ValidationFailed,
            CatalogError::Persistence(_) | CatalogError::Internal(_) => {
                ErrorKind::PersistenceFailed
            }
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}
