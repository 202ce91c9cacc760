//! Observable catalog events
//!
//! Events are explicit and typed; each maps to one log line.

use std::fmt;

use super::logger::Severity;

/// Observable events of the collection catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded
    ConfigLoaded,
    /// Catalog opened on a backend
    CatalogOpened,
    /// Empty catalog artifact written on first open
    CatalogInitialized,

    // Collection mutations
    /// Collection created
    CollectionCreated,
    /// Collection renamed
    CollectionRenamed,
    /// Collection schema replaced
    CollectionSchemaUpdated,
    /// Collection deleted
    CollectionDeleted,

    // Failures
    /// An operation failed and reported an error to its caller
    OperationFailed,
    /// Staged artifacts of a failed create were removed
    CreateRolledBack,
    /// Previous schema restored after a failed schema update
    SchemaUpdateRolledBack,
    /// An artifact could not be removed during cleanup
    CleanupFailed,
}

impl Event {
    /// Returns the event name as written to the log
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CatalogOpened => "CATALOG_OPENED",
            Event::CatalogInitialized => "CATALOG_INITIALIZED",
            Event::CollectionCreated => "COLLECTION_CREATED",
            Event::CollectionRenamed => "COLLECTION_RENAMED",
            Event::CollectionSchemaUpdated => "COLLECTION_SCHEMA_UPDATED",
            Event::CollectionDeleted => "COLLECTION_DELETED",
            Event::OperationFailed => "OPERATION_FAILED",
            Event::CreateRolledBack => "CREATE_ROLLED_BACK",
            Event::SchemaUpdateRolledBack => "SCHEMA_UPDATE_ROLLED_BACK",
            Event::CleanupFailed => "CLEANUP_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::OperationFailed => Severity::Error,
            Event::CreateRolledBack | Event::SchemaUpdateRolledBack | Event::CleanupFailed => {
                Severity::Warn
            }
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake_case() {
        for event in [
            Event::ConfigLoaded,
            Event::CatalogOpened,
            Event::CollectionCreated,
            Event::CollectionSchemaUpdated,
            Event::CleanupFailed,
        ] {
            let name = event.as_str();
            assert!(name.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failure_severities() {
        assert_eq!(Event::OperationFailed.severity(), Severity::Error);
        assert_eq!(Event::CleanupFailed.severity(), Severity::Warn);
        assert_eq!(Event::SchemaUpdateRolledBack.severity(), Severity::Warn);
        assert_eq!(Event::CollectionCreated.severity(), Severity::Info);
    }
}
