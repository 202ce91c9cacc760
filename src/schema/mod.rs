//! Schema Validator subsystem
//!
//! A collection may carry a schema: a recursive description of its document
//! attributes. Schemas are validated against a fixed attribute grammar before
//! any collection is created or changed.
//!
//! # Design Principles
//!
//! - Pure: no I/O, no state
//! - Typed: an accepted schema is a tree of `AttributeDefinition`s
//! - First violation wins, no aggregation
//! - Deterministic error selection

mod errors;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaResult};
pub use types::{
    AttributeDefinition, DataType, Schema, CONTENT_KEY, DEFINITION_KEYS, ITEMS_KEY,
    RESERVED_ID_KEY, TYPE_KEY, UNIQUE_KEY,
};
pub use validator::{is_valid_schema, validate_schema};
