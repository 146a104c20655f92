//! Core abstractions shared by the mapper and row sources.
//!
//! - [`value`]: raw column values and their type tags
//! - [`schema`]: column descriptors and schema signatures
//! - [`traits`]: the row-source capability traits

pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{describe, ColumnDescriptor, SchemaSignature};
pub use traits::{DataReader, DataRecord};
pub use value::{SqlType, SqlValue};
