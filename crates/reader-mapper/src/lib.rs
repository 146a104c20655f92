//! # reader-mapper
//!
//! Binds forward-only, schema-described row sources to strongly-typed
//! destination structs.
//!
//! This library provides:
//!
//! - **Schema introspection** of any [`DataRecord`] (column names and types)
//! - **Dotted column names** (`Inner.Descr`) mapped onto nested objects
//! - **Type coercion** for nullable fields, enums and numeric widening/narrowing
//! - **Compiled plans** cached once per (destination type, schema)
//! - **Eager or lazy** materialization of whole readers
//!
//! ## Example
//!
//! ```rust
//! use reader_mapper::{
//!     DataTable, Destination, MapperConfiguration, SqlType, SqlValue, TypeDescriptor,
//! };
//!
//! #[derive(Default)]
//! struct Customer {
//!     id: i64,
//!     name: Option<String>,
//! }
//!
//! impl Destination for Customer {
//!     fn descriptor() -> TypeDescriptor<Self> {
//!         TypeDescriptor::new("Customer")
//!             .field("Id", |c: &mut Customer, v: i64| c.id = v)
//!             .field("Name", |c: &mut Customer, v: Option<String>| c.name = v)
//!     }
//! }
//!
//! fn main() -> reader_mapper::Result<()> {
//!     let mut table = DataTable::new()
//!         .with_column("Id", SqlType::I32)
//!         .with_column("Name", SqlType::String);
//!     table.add_row(vec![SqlValue::I32(7), SqlValue::Null(SqlType::String)])?;
//!
//!     let mut config = MapperConfiguration::default();
//!     config.create_map::<Customer>()?;
//!     let mapper = config.create_mapper();
//!
//!     let customers: Vec<Customer> = mapper.map_all(&mut table.create_reader())?;
//!     assert_eq!(customers[0].id, 7);
//!     assert_eq!(customers[0].name, None);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod destination;
pub mod error;
pub mod mapper;
pub mod plan;
pub mod source;
pub mod typemap;

// Re-exports for convenient access
pub use config::{DestinationMap, MapperConfiguration, MapperOptions, NameMatching};
pub use crate::core::{DataReader, DataRecord, SqlType, SqlValue};
pub use destination::{Destination, PropertyPath, TypeDescriptor};
pub use error::{MapError, Result};
pub use mapper::{MappedRows, Mapper, RowIter};
pub use plan::{MappingPlan, PlanCache, PropertyBinding};
pub use source::DataTable;
pub use typemap::{ColumnValue, TargetType};
