//! Schema grammar validation
//!
//! Validation semantics:
//! - The top level of every schema (nested ones included) may not define `id`
//! - Every field maps to an attribute definition object
//! - A definition only uses `type`, `unique`, `items` and `content`
//! - `type` is one of the fixed data type codes
//! - Extra keys must be permitted for the declared type
//! - `arr` requires `items` (a definition), `obj` requires `content` (a schema)
//!
//! Validation is depth-first and stops at the first violation. Keys are
//! visited in sorted order, so the reported violation is deterministic.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult};
use super::types::{
    AttributeDefinition, DataType, Schema, CONTENT_KEY, DEFINITION_KEYS, ITEMS_KEY,
    RESERVED_ID_KEY, TYPE_KEY, UNIQUE_KEY,
};

/// Validates a schema definition tree and returns its typed form.
///
/// # Errors
///
/// Returns the first `SchemaError` found. No partial schema is ever returned.
pub fn validate_schema(value: &Value) -> SchemaResult<Schema> {
    let obj = value.as_object().ok_or_else(|| SchemaError::NotAnObject {
        found: json_type_name(value).to_string(),
    })?;

    // Checked before any field so it wins over every other violation
    if obj.contains_key(RESERVED_ID_KEY) {
        return Err(SchemaError::ReservedKey {
            key: RESERVED_ID_KEY.to_string(),
        });
    }

    let mut fields = BTreeMap::new();
    for (field, definition) in obj {
        let definition = definition
            .as_object()
            .ok_or_else(|| SchemaError::InvalidAttribute {
                field: field.clone(),
            })?;
        fields.insert(field.clone(), validate_definition(definition, field)?);
    }

    Ok(Schema::from_fields(fields))
}

/// Returns whether `value` is a valid schema.
pub fn is_valid_schema(value: &Value) -> bool {
    validate_schema(value).is_ok()
}

/// Validates a single attribute definition found under `field`.
fn validate_definition(
    definition: &Map<String, Value>,
    field: &str,
) -> SchemaResult<AttributeDefinition> {
    if let Some(key) = definition
        .keys()
        .find(|key| !DEFINITION_KEYS.contains(&key.as_str()))
    {
        return Err(SchemaError::UnknownAttributeKey {
            key: key.clone(),
            field: field.to_string(),
        });
    }

    let type_value = definition
        .get(TYPE_KEY)
        .ok_or_else(|| SchemaError::MissingType {
            field: field.to_string(),
        })?;

    let data_type = parse_data_type(type_value, field)?;

    if let Some(key) = definition.keys().find(|key| !data_type.allows(key)) {
        return Err(SchemaError::KeyNotAllowed {
            key: key.clone(),
            data_type: data_type.code().to_string(),
            field: field.to_string(),
        });
    }

    let unique = match definition.get(UNIQUE_KEY) {
        None => None,
        Some(Value::Bool(flag)) => Some(*flag),
        Some(other) => {
            return Err(SchemaError::InvalidUnique {
                field: field.to_string(),
                found: json_type_name(other).to_string(),
            })
        }
    };

    match data_type {
        DataType::Array => {
            let items = definition
                .get(ITEMS_KEY)
                .and_then(Value::as_object)
                .ok_or_else(|| SchemaError::MissingItems {
                    field: field.to_string(),
                })?;
            // Element definitions keep the enclosing field name for messages
            let items = validate_definition(items, field)?;
            Ok(AttributeDefinition::Array {
                items: Box::new(items),
                unique,
            })
        }
        DataType::Object => {
            let content = definition
                .get(CONTENT_KEY)
                .filter(|v| v.is_object())
                .ok_or_else(|| SchemaError::MissingContent {
                    field: field.to_string(),
                })?;
            let content = validate_schema(content)?;
            Ok(AttributeDefinition::Object { content, unique })
        }
        scalar => Ok(AttributeDefinition::Scalar {
            data_type: scalar,
            unique,
        }),
    }
}

/// Parses the value of a `type` key, rejecting non-string shapes.
fn parse_data_type(value: &Value, field: &str) -> SchemaResult<DataType> {
    let code = value.as_str().ok_or_else(|| SchemaError::InvalidType {
        value: value.to_string(),
        field: field.to_string(),
    })?;

    DataType::from_code(code).ok_or_else(|| SchemaError::InvalidType {
        value: code.to_string(),
        field: field.to_string(),
    })
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
