//! Schema type definitions
//!
//! Supported data types:
//! - str: UTF-8 string
//! - nbr: number
//! - bol: boolean
//! - nil: null
//! - arr: homogeneous array, element described by `items`
//! - obj: nested object, sub-fields described by `content`
//! - dat: date
//! - uid: UUID

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::errors::SchemaError;

/// Key naming the data type of an attribute
pub const TYPE_KEY: &str = "type";
/// Key marking an attribute as unique
pub const UNIQUE_KEY: &str = "unique";
/// Key holding the element definition of an array
pub const ITEMS_KEY: &str = "items";
/// Key holding the nested schema of an object
pub const CONTENT_KEY: &str = "content";
/// Attribute name reserved for the system-assigned document id
pub const RESERVED_ID_KEY: &str = "id";

/// Every key an attribute definition may carry, whatever its type
pub const DEFINITION_KEYS: [&str; 4] = [TYPE_KEY, UNIQUE_KEY, ITEMS_KEY, CONTENT_KEY];

/// Attribute data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "str")]
    String,
    #[serde(rename = "nbr")]
    Number,
    #[serde(rename = "bol")]
    Bool,
    #[serde(rename = "nil")]
    Null,
    #[serde(rename = "arr")]
    Array,
    #[serde(rename = "obj")]
    Object,
    #[serde(rename = "dat")]
    Date,
    #[serde(rename = "uid")]
    Uuid,
}

impl DataType {
    /// All data types in declaration order
    pub const ALL: [DataType; 8] = [
        DataType::String,
        DataType::Number,
        DataType::Bool,
        DataType::Null,
        DataType::Array,
        DataType::Object,
        DataType::Date,
        DataType::Uuid,
    ];

    /// Returns the wire code used in schema definitions
    pub fn code(&self) -> &'static str {
        match self {
            DataType::String => "str",
            DataType::Number => "nbr",
            DataType::Bool => "bol",
            DataType::Null => "nil",
            DataType::Array => "arr",
            DataType::Object => "obj",
            DataType::Date => "dat",
            DataType::Uuid => "uid",
        }
    }

    /// Parses a wire code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Definition keys permitted besides `type`
    pub fn allowed_keys(&self) -> &'static [&'static str] {
        match self {
            DataType::String | DataType::Number | DataType::Date | DataType::Uuid => &[UNIQUE_KEY],
            DataType::Bool | DataType::Null => &[],
            DataType::Array => &[UNIQUE_KEY, ITEMS_KEY],
            DataType::Object => &[UNIQUE_KEY, CONTENT_KEY],
        }
    }

    /// Returns whether `key` may appear in a definition of this type
    pub fn allows(&self, key: &str) -> bool {
        key == TYPE_KEY || self.allowed_keys().contains(&key)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Type-tagged description of a single schema field.
///
/// Values are only built by the validator, so the per-type key rules
/// (e.g. no `unique` on `bol`) always hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeDefinition {
    /// A leaf value: str, nbr, bol, nil, dat or uid
    Scalar {
        data_type: DataType,
        unique: Option<bool>,
    },
    /// An array whose elements follow `items`
    Array {
        items: Box<AttributeDefinition>,
        unique: Option<bool>,
    },
    /// An object whose sub-fields follow `content`
    Object {
        content: Schema,
        unique: Option<bool>,
    },
}

impl AttributeDefinition {
    /// Returns the declared data type
    pub fn data_type(&self) -> DataType {
        match self {
            AttributeDefinition::Scalar { data_type, .. } => *data_type,
            AttributeDefinition::Array { .. } => DataType::Array,
            AttributeDefinition::Object { .. } => DataType::Object,
        }
    }

    /// Returns the `unique` flag if one was declared
    pub fn unique(&self) -> Option<bool> {
        match self {
            AttributeDefinition::Scalar { unique, .. }
            | AttributeDefinition::Array { unique, .. }
            | AttributeDefinition::Object { unique, .. } => *unique,
        }
    }

    /// Returns the JSON form of this definition
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert(TYPE_KEY.into(), Value::from(self.data_type().code()));
        if let Some(unique) = self.unique() {
            map.insert(UNIQUE_KEY.into(), Value::Bool(unique));
        }
        match self {
            AttributeDefinition::Scalar { .. } => {}
            AttributeDefinition::Array { items, .. } => {
                map.insert(ITEMS_KEY.into(), items.to_value());
            }
            AttributeDefinition::Object { content, .. } => {
                map.insert(CONTENT_KEY.into(), content.to_value());
            }
        }
        Value::Object(map)
    }
}

impl Serialize for AttributeDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(TYPE_KEY, &self.data_type())?;
        if let Some(unique) = self.unique() {
            map.serialize_entry(UNIQUE_KEY, &unique)?;
        }
        match self {
            AttributeDefinition::Scalar { .. } => {}
            AttributeDefinition::Array { items, .. } => map.serialize_entry(ITEMS_KEY, items)?,
            AttributeDefinition::Object { content, .. } => {
                map.serialize_entry(CONTENT_KEY, content)?
            }
        }
        map.end()
    }
}

/// A validated collection schema: attribute name to definition.
///
/// Deserializing runs the full validator, so a `Schema` read from disk or
/// from a request is always grammatically valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Schema {
    fields: BTreeMap<String, AttributeDefinition>,
}

impl Schema {
    /// Creates an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a JSON value and builds the typed schema from it
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        super::validator::validate_schema(value)
    }

    pub(crate) fn from_fields(fields: BTreeMap<String, AttributeDefinition>) -> Self {
        Self { fields }
    }

    /// Returns the definition of a field
    pub fn get(&self, field: &str) -> Option<&AttributeDefinition> {
        self.fields.get(field)
    }

    /// Iterates over fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &AttributeDefinition)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of top-level fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the JSON form of this schema
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, def)| (name.clone(), def.to_value()))
                .collect(),
        )
    }
}

impl TryFrom<Value> for Schema {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Schema::from_value(&value)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, def) in &self.fields {
            map.serialize_entry(name, def)?;
        }
        map.end()
    }
}
