//! Collection Catalog subsystem
//!
//! Tracks the set of named collections. Each collection has an immutable id,
//! creation and update timestamps, an optional schema, and three side
//! artifacts (schema, placeholder index, data directory).
//!
//! # Invariants
//!
//! - At most one record per name
//! - Every record has its schema artifact, index artifact and data directory
//! - Ids are never reused or reassigned
//! - Stored schemas passed validation at every depth
//! - All operations on one store are serialized

mod errors;
mod name;
mod record;
mod store;

pub use errors::{CatalogError, CatalogResult, ErrorKind};
pub use name::{CollectionName, NAME_PATTERN};
pub use record::{
    data_directory, index_artifact, schema_artifact, CatalogFile, CollectionInfo,
    CollectionRecord, CollectionView, CATALOG_ARTIFACT,
};
pub use store::{CatalogStore, Outcome};
