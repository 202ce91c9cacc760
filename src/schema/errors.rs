//! Schema error types
//!
//! Every variant names the offending key and the field it was found under so
//! callers can report the violation without parsing the message.
//!
//! Error codes:
//! - SCHEMA_NOT_AN_OBJECT
//! - SCHEMA_RESERVED_KEY
//! - SCHEMA_INVALID_ATTRIBUTE
//! - SCHEMA_UNKNOWN_ATTRIBUTE_KEY
//! - SCHEMA_MISSING_TYPE
//! - SCHEMA_INVALID_TYPE
//! - SCHEMA_KEY_NOT_ALLOWED
//! - SCHEMA_MISSING_ITEMS
//! - SCHEMA_MISSING_CONTENT
//! - SCHEMA_INVALID_UNIQUE

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// A single schema grammar violation.
///
/// Validation stops at the first violation, so a rejected schema reports
/// exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Schema must be a JSON object, got {found}.")]
    NotAnObject { found: String },

    #[error("Key `{key}` was found in schema, which is system reserved.")]
    ReservedKey { key: String },

    #[error("Schema key `{field}` is not a valid schema attribute.")]
    InvalidAttribute { field: String },

    #[error("Attribute key: `{key}` does not exist, schema error in field `{field}`.")]
    UnknownAttributeKey { key: String, field: String },

    #[error("Key `type` was not found in schema for Key: `{field}`, which is needed to define Attribute types.")]
    MissingType { field: String },

    #[error("Datatype: `{value}` does not exist, schema error in field `{field}`.")]
    InvalidType { value: String, field: String },

    #[error("Attribute key: `{key}` does not exist for dataType: `{data_type}` in schemaKey: `{field}`, schema error.")]
    KeyNotAllowed {
        key: String,
        data_type: String,
        field: String,
    },

    #[error("Key `items` does not exist or is not an attribute definition for array: `{field}`, schema error.")]
    MissingItems { field: String },

    #[error("Key `content` does not exist or is not a schema for object: `{field}`, schema error.")]
    MissingContent { field: String },

    #[error("Key `unique` must be a boolean in field `{field}`, got {found}.")]
    InvalidUnique { field: String, found: String },
}

impl SchemaError {
    /// Returns the stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::NotAnObject { .. } => "SCHEMA_NOT_AN_OBJECT",
            SchemaError::ReservedKey { .. } => "SCHEMA_RESERVED_KEY",
            SchemaError::InvalidAttribute { .. } => "SCHEMA_INVALID_ATTRIBUTE",
            SchemaError::UnknownAttributeKey { .. } => "SCHEMA_UNKNOWN_ATTRIBUTE_KEY",
            SchemaError::MissingType { .. } => "SCHEMA_MISSING_TYPE",
            SchemaError::InvalidType { .. } => "SCHEMA_INVALID_TYPE",
            SchemaError::KeyNotAllowed { .. } => "SCHEMA_KEY_NOT_ALLOWED",
            SchemaError::MissingItems { .. } => "SCHEMA_MISSING_ITEMS",
            SchemaError::MissingContent { .. } => "SCHEMA_MISSING_CONTENT",
            SchemaError::InvalidUnique { .. } => "SCHEMA_INVALID_UNIQUE",
        }
    }

    /// Returns the schema field the violation was found under, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            SchemaError::NotAnObject { .. } | SchemaError::ReservedKey { .. } => None,
            SchemaError::InvalidAttribute { field }
            | SchemaError::UnknownAttributeKey { field, .. }
            | SchemaError::MissingType { field }
            | SchemaError::InvalidType { field, .. }
            | SchemaError::KeyNotAllowed { field, .. }
            | SchemaError::MissingItems { field }
            | SchemaError::MissingContent { field }
            | SchemaError::InvalidUnique { field, .. } => Some(field),
        }
    }

    /// Returns the offending definition key, if the violation is about one
    pub fn key(&self) -> Option<&str> {
        match self {
            SchemaError::ReservedKey { key }
            | SchemaError::UnknownAttributeKey { key, .. }
            | SchemaError::KeyNotAllowed { key, .. } => Some(key),
            SchemaError::MissingType { .. } => Some("type"),
            SchemaError::MissingItems { .. } => Some("items"),
            SchemaError::MissingContent { .. } => Some("content"),
            SchemaError::InvalidUnique { .. } => Some("unique"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_key_message_names_key() {
        let err = SchemaError::ReservedKey { key: "id".into() };
        assert!(err.to_string().contains("`id`"));
        assert_eq!(err.code(), "SCHEMA_RESERVED_KEY");
        assert_eq!(err.key(), Some("id"));
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_invalid_type_message_names_value_and_field() {
        let err = SchemaError::InvalidType {
            value: "wrong".into(),
            field: "title".into(),
        };
        let display = err.to_string();
        assert!(display.contains("wrong"));
        assert!(display.contains("title"));
        assert_eq!(err.field(), Some("title"));
    }

    #[test]
    fn test_key_not_allowed_reports_all_context() {
        let err = SchemaError::KeyNotAllowed {
            key: "items".into(),
            data_type: "str".into(),
            field: "name".into(),
        };
        assert_eq!(err.key(), Some("items"));
        assert!(err.to_string().contains("str"));
    }
}
