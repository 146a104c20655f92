//! In-memory row sources.

mod table;

pub use table::{DataColumn, DataTable, DataTableReader};
