//! CLI command implementations
//!
//! Each command loads the configuration, opens the catalog in the configured
//! data directory, runs one catalog operation and returns a `Response`.
//! Names are checked here before any catalog access.

use std::path::Path;

use serde::Serialize;

use crate::catalog::{CatalogError, CatalogStore, CollectionName, CATALOG_ARTIFACT};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::persistence::LocalBackend;
use crate::schema::Schema;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_schema, write_error, write_response, Response};

/// Pagination metadata of a `list` response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run a command and write its response (or error) to stdout
pub fn run_command(cmd: Command) -> CliResult<()> {
    match execute(cmd) {
        Ok(response) => write_response(&response),
        Err(e) => {
            write_error(&e)?;
            Err(e)
        }
    }
}

/// Run a command without touching stdout
pub fn execute(cmd: Command) -> CliResult<Response> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Create {
            config,
            name,
            schema,
        } => create(&config, &name, schema.as_deref()),
        Command::Read { config, name } => read(&config, &name),
        Command::Update {
            config,
            name,
            new_name,
            schema,
        } => update(&config, &name, new_name.as_deref(), schema.as_deref()),
        Command::Delete { config, name } => delete(&config, &name),
        Command::List {
            config,
            limit,
            offset,
        } => list(&config, limit, offset),
    }
}

/// Initialize a data directory with an empty catalog
pub fn init(config_path: &Path) -> CliResult<Response> {
    let config = load_config(config_path)?;

    if is_initialized(config.data_path()) {
        return Err(CliError::already_initialized());
    }

    let backend = LocalBackend::open(config.data_path()).map_err(|e| {
        CliError::config_error(format!(
            "Failed to create data directory {:?}: {}",
            config.data_path(),
            e
        ))
    })?;
    CatalogStore::open(backend)?;

    Response::new(format!("Initialized data directory: '{}'", config.data_dir))
        .with("data_dir", &config.data_dir)
}

pub fn create(config_path: &Path, name: &str, schema: Option<&str>) -> CliResult<Response> {
    let (_, store) = open_store(config_path)?;
    check_name(name)?;

    let schema = schema.map(read_schema).transpose()?;
    let (view, message) = store.create(name, schema.as_ref())?.into_parts();

    Response::new(message).with("collection", view)
}

pub fn read(config_path: &Path, name: &str) -> CliResult<Response> {
    let (_, store) = open_store(config_path)?;
    check_name(name)?;

    let (view, message) = store.read(name)?.into_parts();
    Response::new(message).with("collection", view)
}

/// Rename and/or replace the schema, in that order.
///
/// Every argument, including the schema grammar, is checked before the
/// rename runs. A rename that succeeds stays applied if the schema write
/// after it fails.
pub fn update(
    config_path: &Path,
    name: &str,
    new_name: Option<&str>,
    schema: Option<&str>,
) -> CliResult<Response> {
    let (_, store) = open_store(config_path)?;
    check_name(name)?;

    if new_name.is_none() && schema.is_none() {
        return Err(CliError::invalid_argument(
            "Nothing to update: give --new-name and/or --schema",
        ));
    }
    if let Some(new_name) = new_name {
        check_name(new_name)?;
    }
    let schema = schema.map(read_schema).transpose()?;
    if let Some(schema) = &schema {
        Schema::from_value(schema).map_err(CatalogError::from)?;
    }

    let mut current = name.to_string();
    let mut info = None;

    if let Some(new_name) = new_name {
        let renamed = store.rename(&current, new_name)?.value;
        current = renamed.name.to_string();
        info = Some(renamed);
    }

    if let Some(schema) = &schema {
        info = Some(store.update_schema(&current, schema)?.value);
    }

    Response::new(format!("Successfully updated collection: '{}'", current))
        .with("collection", info)
}

pub fn delete(config_path: &Path, name: &str) -> CliResult<Response> {
    let (_, store) = open_store(config_path)?;
    check_name(name)?;

    let (info, message) = store.delete(name)?.into_parts();
    Response::new(message).with("collection", info)
}

pub fn list(config_path: &Path, limit: Option<usize>, offset: usize) -> CliResult<Response> {
    let (config, store) = open_store(config_path)?;

    let limit = limit.unwrap_or(config.default_page_limit);
    if limit > config.max_page_limit {
        return Err(CliError::invalid_argument(format!(
            "limit {} exceeds the maximum of {}",
            limit, config.max_page_limit
        )));
    }

    let collections = store.list()?;
    let pagination = Pagination {
        total: collections.len(),
        limit,
        offset,
    };
    let page = paginate(&collections, offset, limit);

    Response::new(format!("Found {} collection(s)", page.len()))
        .with("collections", page)?
        .with("pagination", pagination)
}

/// Slice of `items` starting at `offset`, at most `limit` long.
///
/// An offset past the end or a zero limit yields an empty page.
pub fn paginate<T>(items: &[T], offset: usize, limit: usize) -> &[T] {
    if offset >= items.len() || limit == 0 {
        return &[];
    }
    let end = offset.saturating_add(limit).min(items.len());
    &items[offset..end]
}

/// Load the config and apply its log level
fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);
    log_event_with_fields(Event::ConfigLoaded, &[("data_dir", &config.data_dir)]);
    Ok(config)
}

fn open_store(config_path: &Path) -> CliResult<(Config, CatalogStore<LocalBackend>)> {
    let config = load_config(config_path)?;

    if !is_initialized(config.data_path()) {
        return Err(CliError::not_initialized());
    }

    let backend = LocalBackend::open(config.data_path())
        .map_err(|e| CliError::config_error(format!("Failed to open data directory: {}", e)))?;
    let store = CatalogStore::open(backend)?;

    Ok((config, store))
}

/// Check if a data directory holds a catalog
fn is_initialized(data_dir: &Path) -> bool {
    data_dir.join(CATALOG_ARTIFACT).is_file()
}

fn check_name(name: &str) -> CliResult<()> {
    if CollectionName::is_valid(name) {
        Ok(())
    } else {
        Err(CliError::invalid_argument(format!(
            "Invalid collection name '{}': must be non-empty and match ^[a-z0-9-]*$",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use crate::catalog::ErrorKind;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn create_config(temp_dir: &TempDir) -> std::path::PathBuf {
        let config_path = temp_dir.path().join("docstore.json");
        let data_dir = temp_dir.path().join("data");

        let config = json!({
            "data_dir": data_dir.to_string_lossy(),
            "default_page_limit": 2,
            "max_page_limit": 5
        });

        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    fn initialized() -> (TempDir, std::path::PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);
        init(&config_path).unwrap();
        (temp_dir, config_path)
    }

    #[test]
    fn test_init_creates_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        init(&config_path).unwrap();

        let catalog = fs::read_to_string(temp_dir.path().join("data").join(CATALOG_ARTIFACT))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&catalog).unwrap();
        assert_eq!(value, json!({"collections": []}));
    }

    #[test]
    fn test_init_refuses_reinit() {
        let (_dir, config_path) = initialized();

        let result = init(&config_path);
        assert_eq!(result.unwrap_err().code(), CliErrorCode::AlreadyInitialized);
    }

    #[test]
    fn test_commands_require_init() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        let result = list(&config_path, None, 0);
        assert_eq!(result.unwrap_err().code(), CliErrorCode::NotInitialized);
    }

    #[test]
    fn test_create_and_read() {
        let (_dir, config_path) = initialized();

        let response = create(&config_path, "books", Some(r#"{"title": {"type": "str"}}"#)).unwrap();
        let body = response.to_json();
        assert_eq!(body["status"], "success");
        assert_eq!(body["collection"]["collection_name"], "books");

        let body = read(&config_path, "books").unwrap().to_json();
        assert_eq!(body["collection"]["schema"], json!({"title": {"type": "str"}}));
    }

    #[test]
    fn test_invalid_name_rejected_at_boundary() {
        let (_dir, config_path) = initialized();

        for result in [
            create(&config_path, "Bad", None),
            read(&config_path, ""),
            delete(&config_path, "a b"),
        ] {
            let err = result.unwrap_err();
            assert_eq!(err.code(), CliErrorCode::InvalidArgument);
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn test_catalog_errors_map_to_status() {
        let (_dir, config_path) = initialized();
        create(&config_path, "books", None).unwrap();

        let err = create(&config_path, "books", None).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::Catalog(ErrorKind::AlreadyExists));
        assert_eq!(err.status_code(), 409);

        let err = read(&config_path, "missing").unwrap_err();
        assert_eq!(err.status_code(), 404);

        let err = create(&config_path, "bad", Some(r#"{"id": {"type": "str"}}"#)).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_update_renames_then_replaces_schema() {
        let (_dir, config_path) = initialized();
        create(&config_path, "books", None).unwrap();

        let response = update(
            &config_path,
            "books",
            Some("novels"),
            Some(r#"{"year": {"type": "nbr"}}"#),
        )
        .unwrap();
        assert_eq!(response.message, "Successfully updated collection: 'novels'");

        let body = read(&config_path, "novels").unwrap().to_json();
        assert_eq!(body["collection"]["schema"], json!({"year": {"type": "nbr"}}));
        assert!(read(&config_path, "books").is_err());
    }

    #[test]
    fn test_update_with_invalid_schema_does_not_rename() {
        let (_dir, config_path) = initialized();
        create(&config_path, "books", None).unwrap();

        let err = update(
            &config_path,
            "books",
            Some("novels"),
            Some(r#"{"id": {"type": "str"}}"#),
        )
        .unwrap_err();
        assert_eq!(err.code(), CliErrorCode::Catalog(ErrorKind::ValidationFailed));
        assert_eq!(err.status_code(), 400);

        assert!(read(&config_path, "books").is_ok());
        assert_eq!(read(&config_path, "novels").unwrap_err().status_code(), 404);
    }

    #[test]
    fn test_update_requires_a_change() {
        let (_dir, config_path) = initialized();
        create(&config_path, "books", None).unwrap();

        let err = update(&config_path, "books", None, None).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::InvalidArgument);
    }

    #[test]
    fn test_list_paginates() {
        let (_dir, config_path) = initialized();
        for name in ["a", "b", "c"] {
            create(&config_path, name, None).unwrap();
        }

        let body = list(&config_path, None, 0).unwrap().to_json();
        let names: Vec<_> = body["collections"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(body["pagination"], json!({"total": 3, "limit": 2, "offset": 0}));

        let body = list(&config_path, Some(5), 2).unwrap().to_json();
        assert_eq!(body["collections"].as_array().unwrap().len(), 1);

        let body = list(&config_path, Some(5), 9).unwrap().to_json();
        assert!(body["collections"].as_array().unwrap().is_empty());

        let err = list(&config_path, Some(6), 0).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::InvalidArgument);
    }

    #[test]
    fn test_paginate_edges() {
        let items = [1, 2, 3];
        assert_eq!(paginate(&items, 0, 10), &[1, 2, 3]);
        assert_eq!(paginate(&items, 1, 1), &[2]);
        assert!(paginate(&items, 3, 1).is_empty());
        assert!(paginate(&items, 0, 0).is_empty());
        assert_eq!(paginate(&items, 2, usize::MAX), &[3]);
    }

    #[test]
    fn test_delete() {
        let (_dir, config_path) = initialized();
        create(&config_path, "books", None).unwrap();

        let body = delete(&config_path, "books").unwrap().to_json();
        assert_eq!(body["collection"]["name"], "books");
        assert_eq!(read(&config_path, "books").unwrap_err().status_code(), 404);
    }
}
