//! A typed, in-memory table and its forward-only reader.

use crate::core::{DataReader, DataRecord, SqlType, SqlValue};
use crate::error::{MapError, Result};
use crate::typemap::{coerce, TargetType};

/// Column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataColumn {
    pub name: String,
    pub data_type: SqlType,
}

/// Named, typed columns plus owned rows.
///
/// ```rust
/// use reader_mapper::{DataReader, DataRecord, DataTable, SqlType, SqlValue};
///
/// let mut table = DataTable::new()
///     .with_column("Id", SqlType::I32)
///     .with_column("Name", SqlType::String);
/// table.add_row(vec![SqlValue::I32(1), SqlValue::text_owned("one".into())]).unwrap();
///
/// let mut reader = table.create_reader();
/// assert!(reader.advance().unwrap());
/// assert_eq!(reader.value(0).unwrap(), SqlValue::I32(1));
/// assert!(!reader.advance().unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    columns: Vec<DataColumn>,
    rows: Vec<Vec<SqlValue<'static>>>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, data_type: SqlType) -> Self {
        self.columns.push(DataColumn {
            name: name.into(),
            data_type,
        });
        self
    }

    /// Append a row. Values are converted to their column's type with the
    /// mapper's coercion rules, and NULLs are retagged with it.
    pub fn add_row(&mut self, values: Vec<SqlValue<'static>>) -> Result<&mut Self> {
        if values.len() != self.columns.len() {
            return Err(MapError::row_source(format!(
                "Row has {} values but the table has {} columns",
                values.len(),
                self.columns.len()
            )));
        }

        let mut row = Vec::with_capacity(values.len());
        for (column, value) in self.columns.iter().zip(values) {
            let value_type = value.sql_type();
            let stored = coerce(value, TargetType::scalar(column.data_type)).map_err(|_| {
                MapError::row_source(format!(
                    "Column '{}' is {}, got a {} value",
                    column.name, column.data_type, value_type
                ))
            })?;
            row.push(stored.unwrap_or(SqlValue::Null(column.data_type)));
        }

        self.rows.push(row);
        Ok(self)
    }

    pub fn columns(&self) -> &[DataColumn] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// A reader positioned before the first row.
    pub fn create_reader(&self) -> DataTableReader<'_> {
        DataTableReader {
            table: self,
            cursor: Cursor::BeforeFirst,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    BeforeFirst,
    At(usize),
    AfterLast,
}

/// Forward-only reader over a [`DataTable`]. Values are lent from the table.
#[derive(Debug)]
pub struct DataTableReader<'t> {
    table: &'t DataTable,
    cursor: Cursor,
}

impl DataTableReader<'_> {
    fn current_row(&self) -> Result<&[SqlValue<'static>]> {
        match self.cursor {
            Cursor::At(index) => Ok(&self.table.rows[index]),
            Cursor::BeforeFirst => Err(MapError::row_source(
                "No current row: advance the reader first",
            )),
            Cursor::AfterLast => Err(MapError::row_source("Reader is past the last row")),
        }
    }
}

impl DataRecord for DataTableReader<'_> {
    fn field_count(&self) -> usize {
        self.table.columns.len()
    }

    fn field_name(&self, ordinal: usize) -> &str {
        &self.table.columns[ordinal].name
    }

    fn field_type(&self, ordinal: usize) -> SqlType {
        self.table.columns[ordinal].data_type
    }

    fn value(&self, ordinal: usize) -> Result<SqlValue<'_>> {
        let field_count = self.field_count();
        if ordinal >= field_count {
            return Err(MapError::OrdinalOutOfRange {
                ordinal,
                field_count,
            });
        }
        Ok(self.current_row()?[ordinal].as_borrowed())
    }
}

impl DataReader for DataTableReader<'_> {
    fn advance(&mut self) -> Result<bool> {
        let next = match self.cursor {
            Cursor::BeforeFirst => 0,
            Cursor::At(index) => index + 1,
            Cursor::AfterLast => return Ok(false),
        };
        if next < self.table.rows.len() {
            self.cursor = Cursor::At(next);
            Ok(true)
        } else {
            self.cursor = Cursor::AfterLast;
            Ok(false)
        }
    }
}
