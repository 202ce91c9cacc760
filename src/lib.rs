//! docstore - the collection catalog of a minimal document store
//!
//! Collections are named, carry an immutable id and an optional attribute
//! schema, and own three side artifacts next to the catalog file.

pub mod catalog;
pub mod cli;
pub mod observability;
pub mod persistence;
pub mod schema;
