//! Catalog Lifecycle Tests
//!
//! End-to-end collection lifecycle against a filesystem-backed store:
//! absent -> active via create, active -> active via rename or schema update,
//! active -> absent via delete.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};
use docstore::catalog::{
    data_directory, index_artifact, schema_artifact, CatalogError, CatalogStore, ErrorKind,
};
use docstore::persistence::{LocalBackend, PersistenceBackend};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn open_store() -> (TempDir, CatalogStore<LocalBackend>) {
    let tmp = TempDir::new().unwrap();
    let backend = LocalBackend::open(tmp.path().join("data")).unwrap();
    let store = CatalogStore::open(backend).unwrap();
    (tmp, store)
}

fn names(store: &CatalogStore<LocalBackend>) -> Vec<String> {
    store
        .list()
        .unwrap()
        .into_iter()
        .map(|info| info.name.to_string())
        .collect()
}

// =============================================================================
// Create / Read
// =============================================================================

#[test]
fn test_create_returns_view_with_fresh_id_and_timestamp() {
    let (_tmp, store) = open_store();

    let (view, message) = store
        .create("books", Some(&json!({"title": {"type": "str"}})))
        .unwrap()
        .into_parts();
    assert!(message.contains("books"));

    let body = serde_json::to_value(&view).unwrap();
    assert_eq!(body["collection_name"], "books");
    assert!(uuid::Uuid::parse_str(body["collection_id"].as_str().unwrap()).is_ok());
    assert!(body["created_at"]
        .as_str()
        .unwrap()
        .parse::<DateTime<Utc>>()
        .is_ok());
}

#[test]
fn test_create_twice_fails_and_leaves_catalog_unchanged() {
    let (_tmp, store) = open_store();
    let schema = json!({"title": {"type": "str"}});

    store.create("books", Some(&schema)).unwrap();
    let before = store.list().unwrap();

    let err = store.create("books", Some(&schema)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(store.list().unwrap(), before);
}

#[test]
fn test_create_rejects_invalid_schemas() {
    let (_tmp, store) = open_store();

    let err = store
        .create("books", Some(&json!({"title": {"type": "wrong"}})))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert!(err.to_string().contains("wrong"));

    let err = store
        .create("books", Some(&json!({"id": {"type": "str"}})))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert!(err.to_string().contains("id"));

    let err = store
        .create("books", Some(&json!({"tags": {"type": "arr"}})))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);

    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_read_returns_created_schema() {
    let (_tmp, store) = open_store();
    let schema = json!({
        "title": {"type": "str", "unique": true},
        "tags": {"type": "arr", "items": {"type": "str"}}
    });

    let created = store.create("books", Some(&schema)).unwrap().value;
    let read = store.read("books").unwrap().value;

    assert_eq!(read.id, created.id);
    assert_eq!(read.schema.to_value(), schema);
}

#[test]
fn test_read_missing_is_not_found() {
    let (_tmp, store) = open_store();
    let err = store.read("missing").unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn test_ids_are_never_reused() {
    let (_tmp, store) = open_store();
    let mut seen = HashSet::new();

    for _ in 0..5 {
        let id = store.create("cycle", None).unwrap().value.id;
        assert!(seen.insert(id), "id {} issued twice", id);
        store.delete("cycle").unwrap();
    }
}

// =============================================================================
// Update
// =============================================================================

#[test]
fn test_update_schema_bumps_updated_at() {
    let (_tmp, store) = open_store();
    store
        .create("books", Some(&json!({"title": {"type": "str"}})))
        .unwrap();

    let new_schema = json!({"title": {"type": "str"}, "year": {"type": "nbr"}});
    store.update_schema("books", &new_schema).unwrap();

    let view = store.read("books").unwrap().value;
    assert_eq!(view.schema.to_value(), new_schema);
    assert!(view.updated_at.unwrap() > view.created_at);
}

#[test]
fn test_repeated_updates_are_strictly_increasing() {
    let (_tmp, store) = open_store();
    store.create("books", None).unwrap();

    let mut last = store.read("books").unwrap().value.created_at;
    for i in 0..5 {
        let schema = json!({ format!("f{}", i): {"type": "nbr"} });
        let info = store.update_schema("books", &schema).unwrap().value;
        let updated = info.updated_at.unwrap();
        assert!(updated > last);
        last = updated;
    }
}

#[test]
fn test_rename_keeps_id_and_artifacts() {
    let (_tmp, store) = open_store();
    let created = store.create("books", None).unwrap().value;

    store.rename("books", "novels").unwrap();

    let view = store.read("novels").unwrap().value;
    assert_eq!(view.id, created.id);
    assert!(store
        .backend()
        .exists(&schema_artifact(&created.id))
        .unwrap());
    assert_eq!(store.read("books").unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_rename_cannot_collapse_two_collections() {
    let (_tmp, store) = open_store();
    store.create("books", None).unwrap();
    store.create("novels", None).unwrap();

    let err = store.rename("books", "novels").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(names(&store), vec!["books", "novels"]);
}

// =============================================================================
// Delete / List
// =============================================================================

#[test]
fn test_delete_removes_record_and_artifacts() {
    let (_tmp, store) = open_store();
    let id = store.create("books", None).unwrap().value.id;

    store.delete("books").unwrap();

    assert_eq!(store.read("books").unwrap_err().kind(), ErrorKind::NotFound);
    let backend = store.backend();
    assert!(!backend.exists(&schema_artifact(&id)).unwrap());
    assert!(!backend.exists(&index_artifact(&id)).unwrap());
    assert!(!backend.exists(&data_directory(&id)).unwrap());
}

#[test]
fn test_delete_removes_documents_in_data_directory() {
    let (_tmp, store) = open_store();
    let id = store.create("books", None).unwrap().value.id;

    let doc = format!("{}/doc-1.json", data_directory(&id));
    store.backend().write(&doc, b"{}").unwrap();

    store.delete("books").unwrap();
    assert!(!store.backend().exists(&doc).unwrap());
}

#[test]
fn test_list_in_insertion_order() {
    let (_tmp, store) = open_store();
    for name in ["a", "b", "c"] {
        store.create(name, None).unwrap();
    }
    assert_eq!(names(&store), vec!["a", "b", "c"]);

    store.delete("b").unwrap();
    store.create("b", None).unwrap();
    assert_eq!(names(&store), vec!["a", "c", "b"]);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_creates_of_same_name_yield_one_record() {
    let (_tmp, store) = open_store();
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.create("shared", None).is_ok())
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(names(&store), vec!["shared"]);
}

#[test]
fn test_concurrent_distinct_creates_are_all_kept() {
    let (_tmp, store) = open_store();
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.create(&format!("c{}", i), None).unwrap())
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.list().unwrap().len(), 8);
}
