//! Catalog store
//!
//! Owns the catalog artifact and the per-collection side artifacts.
//!
//! Every operation runs a full read-modify-write cycle under one mutex, so
//! concurrent callers on the same store never interleave.
//!
//! Commit ordering:
//! - Create stages schema, index and data directory first and writes the
//!   catalog last. A failed catalog write discards the staged artifacts, so a
//!   record is never discoverable without them.
//! - Delete drops the catalog entry first, then cleans up. A cleanup failure
//!   is reported but the collection is already gone.

use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use crate::observability::{log_event_with_fields, Event};
use crate::persistence::{load_json, store_json, PersistenceBackend, PersistenceError};
use crate::schema::Schema;

use super::errors::{CatalogError, CatalogResult};
use super::name::CollectionName;
use super::record::{
    data_directory, index_artifact, schema_artifact, CatalogFile, CollectionInfo,
    CollectionRecord, CollectionView, IndexFile, SchemaFile, CATALOG_ARTIFACT,
};

/// Result value of an operation together with its human-readable message
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub message: String,
}

impl<T> Outcome<T> {
    fn new(value: T, message: String) -> Self {
        Self { value, message }
    }

    pub fn into_parts(self) -> (T, String) {
        (self.value, self.message)
    }
}

/// The collection catalog over a persistence backend
#[derive(Debug)]
pub struct CatalogStore<B: PersistenceBackend> {
    backend: B,
    lock: Mutex<()>,
}

impl<B: PersistenceBackend> CatalogStore<B> {
    /// Opens the catalog, writing an empty one if none exists yet.
    ///
    /// # Errors
    ///
    /// Fails with `PersistenceFailed` if an existing catalog cannot be decoded.
    pub fn open(backend: B) -> CatalogResult<Self> {
        if !backend.exists(CATALOG_ARTIFACT)? {
            store_json(&backend, CATALOG_ARTIFACT, &CatalogFile::default())?;
            log_event_with_fields(Event::CatalogInitialized, &[("artifact", CATALOG_ARTIFACT)]);
        }

        let catalog: CatalogFile = load_json(&backend, CATALOG_ARTIFACT)?;
        let count = catalog.collections.len().to_string();
        log_event_with_fields(Event::CatalogOpened, &[("collections", &count)]);

        Ok(Self {
            backend,
            lock: Mutex::new(()),
        })
    }

    /// Returns the underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Creates a collection, optionally with a schema.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for a bad name or schema (nothing is written)
    /// - `AlreadyExists` if the name is taken (catalog unchanged)
    /// - `PersistenceFailed` if an artifact cannot be written
    pub fn create(
        &self,
        name: &str,
        schema: Option<&Value>,
    ) -> CatalogResult<Outcome<CollectionView>> {
        let result = self.create_inner(name, schema);
        observe("create", name, result)
    }

    fn create_inner(
        &self,
        name: &str,
        schema: Option<&Value>,
    ) -> CatalogResult<Outcome<CollectionView>> {
        let name = CollectionName::parse(name)?;
        let schema = schema
            .map(Schema::from_value)
            .transpose()?
            .unwrap_or_default();

        let _guard = self.lock()?;
        let mut catalog = self.load_catalog()?;

        if catalog.contains(name.as_str()) {
            return Err(CatalogError::AlreadyExists(name.to_string()));
        }

        let record = CollectionRecord::new(name);

        if let Err(e) = self.stage_artifacts(&record, &schema) {
            self.discard_staged(&record);
            return Err(e.into());
        }

        catalog.collections.push(record.clone());
        if let Err(e) = self.store_catalog(&catalog) {
            self.discard_staged(&record);
            return Err(e);
        }

        let id = record.id.to_string();
        log_event_with_fields(
            Event::CollectionCreated,
            &[("collection", record.name.as_str()), ("id", &id)],
        );

        let message = format!("Successfully created collection: '{}'", record.name);
        Ok(Outcome::new(CollectionView::new(&record, schema), message))
    }

    /// Reads a collection together with its schema.
    ///
    /// # Errors
    ///
    /// `NotFound` if no collection has this name; `PersistenceFailed` if the
    /// catalog or the schema artifact cannot be read.
    pub fn read(&self, name: &str) -> CatalogResult<Outcome<CollectionView>> {
        let result = self.read_inner(name);
        observe("read", name, result)
    }

    fn read_inner(&self, name: &str) -> CatalogResult<Outcome<CollectionView>> {
        let _guard = self.lock()?;
        let catalog = self.load_catalog()?;

        let record = catalog
            .find(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;

        let schema_file: SchemaFile = load_json(&self.backend, &schema_artifact(&record.id))?;

        let message = format!("Successfully read collection: '{}'", name);
        Ok(Outcome::new(CollectionView::new(record, schema_file.schema), message))
    }

    /// Renames a collection.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if `new_name` is invalid or equals `old_name`
    /// - `NotFound` if `old_name` does not exist
    /// - `AlreadyExists` if another collection already uses `new_name`
    pub fn rename(&self, old_name: &str, new_name: &str) -> CatalogResult<Outcome<CollectionInfo>> {
        let result = self.rename_inner(old_name, new_name);
        observe("rename", old_name, result)
    }

    fn rename_inner(
        &self,
        old_name: &str,
        new_name: &str,
    ) -> CatalogResult<Outcome<CollectionInfo>> {
        let new_name = CollectionName::parse(new_name)?;
        if new_name == *old_name {
            return Err(CatalogError::SameName(old_name.to_string()));
        }

        let _guard = self.lock()?;
        let mut catalog = self.load_catalog()?;

        let index = catalog
            .position(old_name)
            .ok_or_else(|| CatalogError::NotFound(old_name.to_string()))?;

        if catalog.contains(new_name.as_str()) {
            return Err(CatalogError::AlreadyExists(new_name.to_string()));
        }

        let record = &mut catalog.collections[index];
        record.name = new_name;
        record.touch();
        let info = record.info();

        self.store_catalog(&catalog)?;

        log_event_with_fields(
            Event::CollectionRenamed,
            &[("collection", info.name.as_str()), ("previous_name", old_name)],
        );

        let message = format!(
            "Successfully renamed collection: '{}' to '{}'",
            old_name, info.name
        );
        Ok(Outcome::new(info, message))
    }

    /// Replaces the schema of a collection.
    ///
    /// The schema artifact is written before the catalog. If the catalog write
    /// then fails, the previous schema artifact is put back, so the schema and
    /// `updated_at` always change together.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` for a bad schema (nothing is written), `NotFound` if
    /// the collection does not exist.
    pub fn update_schema(
        &self,
        name: &str,
        schema: &Value,
    ) -> CatalogResult<Outcome<CollectionInfo>> {
        let result = self.update_schema_inner(name, schema);
        observe("update_schema", name, result)
    }

    fn update_schema_inner(
        &self,
        name: &str,
        schema: &Value,
    ) -> CatalogResult<Outcome<CollectionInfo>> {
        let schema = Schema::from_value(schema)?;

        let _guard = self.lock()?;
        let mut catalog = self.load_catalog()?;

        let index = catalog
            .position(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;

        let record = &mut catalog.collections[index];
        let artifact = schema_artifact(&record.id);
        let previous = match self.backend.read(&artifact) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e.into()),
        };

        store_json(&self.backend, &artifact, &SchemaFile { schema })?;
        record.touch();
        let info = record.info();

        if let Err(e) = self.store_catalog(&catalog) {
            self.restore_schema(name, &artifact, previous.as_deref());
            return Err(e);
        }

        log_event_with_fields(Event::CollectionSchemaUpdated, &[("collection", name)]);

        let message = format!("Successfully updated schema of collection: '{}'", name);
        Ok(Outcome::new(info, message))
    }

    /// Deletes a collection and its artifacts.
    ///
    /// # Errors
    ///
    /// `NotFound` if the collection does not exist. `PersistenceFailed` if the
    /// catalog cannot be rewritten or an artifact cannot be removed; in the
    /// latter case the collection is already gone from the catalog.
    pub fn delete(&self, name: &str) -> CatalogResult<Outcome<CollectionInfo>> {
        let result = self.delete_inner(name);
        observe("delete", name, result)
    }

    fn delete_inner(&self, name: &str) -> CatalogResult<Outcome<CollectionInfo>> {
        let _guard = self.lock()?;
        let mut catalog = self.load_catalog()?;

        let index = catalog
            .position(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;

        let record = catalog.collections.remove(index);
        self.store_catalog(&catalog)?;

        log_event_with_fields(Event::CollectionDeleted, &[("collection", name)]);

        if let Some(e) = self.remove_artifacts(&record).into_iter().next() {
            return Err(e.into());
        }

        let message = format!("Successfully deleted collection: '{}'", name);
        Ok(Outcome::new(record.info(), message))
    }

    /// Lists every collection in catalog order.
    pub fn list(&self) -> CatalogResult<Vec<CollectionInfo>> {
        let result = self.list_inner();
        observe("list", "", result)
    }

    fn list_inner(&self) -> CatalogResult<Vec<CollectionInfo>> {
        let _guard = self.lock()?;
        let catalog = self.load_catalog()?;
        Ok(catalog.collections.iter().map(CollectionRecord::info).collect())
    }

    fn lock(&self) -> CatalogResult<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| CatalogError::Internal("Catalog lock poisoned".into()))
    }

    fn load_catalog(&self) -> CatalogResult<CatalogFile> {
        Ok(load_json(&self.backend, CATALOG_ARTIFACT)?)
    }

    fn store_catalog(&self, catalog: &CatalogFile) -> CatalogResult<()> {
        Ok(store_json(&self.backend, CATALOG_ARTIFACT, catalog)?)
    }

    fn stage_artifacts(
        &self,
        record: &CollectionRecord,
        schema: &Schema,
    ) -> Result<(), PersistenceError> {
        store_json(
            &self.backend,
            &schema_artifact(&record.id),
            &SchemaFile {
                schema: schema.clone(),
            },
        )?;
        store_json(&self.backend, &index_artifact(&record.id), &IndexFile::default())?;
        self.backend.create_dir(&data_directory(&record.id))
    }

    /// Best-effort write-back of the schema artifact replaced by an update
    /// that did not commit
    fn restore_schema(&self, name: &str, artifact: &str, previous: Option<&[u8]>) {
        let restored = match previous {
            Some(bytes) => self.backend.write(artifact, bytes),
            None => self.backend.delete(artifact),
        };

        let outcome = match &restored {
            Ok(()) => "restored".to_string(),
            Err(e) => e.to_string(),
        };
        log_event_with_fields(
            Event::SchemaUpdateRolledBack,
            &[("collection", name), ("outcome", &outcome)],
        );
    }

    /// Best-effort removal of the artifacts of a create that did not commit
    fn discard_staged(&self, record: &CollectionRecord) {
        let leftovers = self.remove_artifacts(record).len().to_string();
        log_event_with_fields(
            Event::CreateRolledBack,
            &[("collection", record.name.as_str()), ("leftovers", &leftovers)],
        );
    }

    /// Removes schema, index and data directory of `record`.
    ///
    /// Already-missing artifacts count as removed. Returns the failures.
    fn remove_artifacts(&self, record: &CollectionRecord) -> Vec<PersistenceError> {
        let results = [
            self.backend.delete(&schema_artifact(&record.id)),
            self.backend.delete(&index_artifact(&record.id)),
            self.backend.remove_dir(&data_directory(&record.id)),
        ];

        let mut failures = Vec::new();
        for result in results {
            match result {
                Err(e) if !e.is_not_found() => {
                    log_event_with_fields(
                        Event::CleanupFailed,
                        &[("collection", record.name.as_str()), ("error", &e.to_string())],
                    );
                    failures.push(e);
                }
                _ => {}
            }
        }
        failures
    }
}

/// Logs a failed operation before handing the result back
fn observe<T>(operation: &str, collection: &str, result: CatalogResult<T>) -> CatalogResult<T> {
    if let Err(e) = &result {
        log_event_with_fields(
            Event::OperationFailed,
            &[
                ("component", "catalog"),
                ("operation", operation),
                ("collection", collection),
                ("kind", e.kind().code()),
                ("error", &e.to_string()),
            ],
        );
    }
    result
}
