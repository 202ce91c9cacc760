//! Catalog records and persisted artifact shapes
//!
//! Artifact layout under the backend root:
//! - `catalog.json`: `{"collections": [CollectionRecord, ...]}`
//! - `<id>.schema.json`: `{"schema": {...}}`
//! - `<id>.index.json`: `{"index": []}` (placeholder, never read)
//! - `<id>/`: document data directory

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::schema::Schema;

use super::name::CollectionName;

/// Path of the catalog artifact
pub const CATALOG_ARTIFACT: &str = "catalog.json";

/// Path of a collection's schema artifact
pub fn schema_artifact(id: &Uuid) -> String {
    format!("{}.schema.json", id)
}

/// Path of a collection's index artifact
pub fn index_artifact(id: &Uuid) -> String {
    format!("{}.index.json", id)
}

/// Path of a collection's data directory
pub fn data_directory(id: &Uuid) -> String {
    id.to_string()
}

/// One entry in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub name: CollectionName,
    /// Assigned once at creation, never reused
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Absent until the first rename or schema update
    pub updated_at: Option<DateTime<Utc>>,
}

impl CollectionRecord {
    /// Create a record with a fresh id
    pub fn new(name: CollectionName) -> Self {
        Self {
            name,
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Latest timestamp recorded on this record
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    /// Stamp `updated_at` strictly after every earlier timestamp of the record
    pub fn touch(&mut self) {
        let previous = self.last_modified();
        let now = Utc::now();
        self.updated_at = Some(if now > previous {
            now
        } else {
            previous + Duration::nanoseconds(1)
        });
    }

    pub fn info(&self) -> CollectionInfo {
        CollectionInfo {
            name: self.name.clone(),
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Listing projection of a record; never persisted on its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionInfo {
    pub name: CollectionName,
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A record merged with its schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionView {
    #[serde(rename = "collection_name")]
    pub name: CollectionName,
    #[serde(rename = "collection_id")]
    pub id: Uuid,
    pub schema: Schema,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CollectionView {
    pub fn new(record: &CollectionRecord, schema: Schema) -> Self {
        Self {
            name: record.name.clone(),
            id: record.id,
            schema,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// The catalog artifact: every record, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFile {
    pub collections: Vec<CollectionRecord>,
}

impl CatalogFile {
    /// Position of the record named `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.collections.iter().position(|r| r.name == *name)
    }

    pub fn find(&self, name: &str) -> Option<&CollectionRecord> {
        self.position(name).map(|i| &self.collections[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
}

/// The per-collection schema artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaFile {
    pub schema: Schema,
}

/// The per-collection index artifact
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexFile {
    pub index: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str) -> CollectionRecord {
        CollectionRecord::new(CollectionName::parse(name).unwrap())
    }

    #[test]
    fn test_new_record_has_no_update() {
        let r = record("books");
        assert!(r.updated_at.is_none());
        assert_eq!(r.last_modified(), r.created_at);
    }

    #[test]
    fn test_fresh_ids() {
        assert_ne!(record("a").id, record("a").id);
    }

    #[test]
    fn test_touch_is_strictly_monotonic() {
        let mut r = record("books");
        r.touch();
        let first = r.updated_at.unwrap();
        assert!(first > r.created_at);

        r.touch();
        assert!(r.updated_at.unwrap() > first);
    }

    #[test]
    fn test_touch_after_future_timestamp() {
        let mut r = record("books");
        r.created_at = Utc::now() + Duration::hours(1);
        r.touch();
        assert!(r.updated_at.unwrap() > r.created_at);
    }

    #[test]
    fn test_record_serialized_shape() {
        let r = record("books");
        let value = serde_json::to_value(&r).unwrap();

        assert_eq!(value["name"], "books");
        assert_eq!(value["id"], r.id.to_string());
        assert!(value["created_at"].is_string());
        assert!(value["updated_at"].is_null());

        let back: CollectionRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = CatalogFile {
            collections: vec![record("a"), record("b")],
        };
        assert_eq!(catalog.position("b"), Some(1));
        assert!(catalog.contains("a"));
        assert!(catalog.find("c").is_none());
    }

    #[test]
    fn test_view_uses_boundary_field_names() {
        let r = record("books");
        let view = CollectionView::new(&r, Schema::new());
        let value = serde_json::to_value(&view).unwrap();

        assert_eq!(value["collection_name"], "books");
        assert_eq!(value["collection_id"], r.id.to_string());
        assert_eq!(value["schema"], json!({}));
    }

    #[test]
    fn test_artifact_paths() {
        let id = Uuid::new_v4();
        assert_eq!(schema_artifact(&id), format!("{}.schema.json", id));
        assert_eq!(index_artifact(&id), format!("{}.index.json", id));
        assert_eq!(data_directory(&id), id.to_string());
    }
}
