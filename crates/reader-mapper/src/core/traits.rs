//! Row-source capabilities consumed by the mapper.
//!
//! - [`DataRecord`]: one row with ordered, named, typed columns
//! - [`DataReader`]: a forward-only source whose current row is a record
//!
//! Implementations belong to the row-source side (drivers, in-memory tables).
//! The mapper only borrows them and never closes them.

use crate::error::{MapError, Result};

use super::value::{SqlType, SqlValue};

/// A single row addressable by ordinal or name.
///
/// Column metadata (`field_count`, `field_name`, `field_type`) must be
/// available before the first row is read, so a plan can be compiled for a
/// reader that turns out to be empty.
pub trait DataRecord {
    /// Number of columns.
    fn field_count(&self) -> usize;

    /// Column name, verbatim. Panics if `ordinal >= field_count()`.
    fn field_name(&self, ordinal: usize) -> &str;

    /// Declared column type. Panics if `ordinal >= field_count()`.
    fn field_type(&self, ordinal: usize) -> SqlType;

    /// Value of a column in the current row, possibly borrowed from it.
    fn value(&self, ordinal: usize) -> Result<SqlValue<'_>>;

    /// Whether the current row holds NULL at `ordinal`. Unreadable values
    /// count as NULL.
    fn is_null(&self, ordinal: usize) -> bool {
        self.value(ordinal).map_or(true, |v| v.is_null())
    }

    /// Ordinal of the first column with exactly this name.
    fn ordinal(&self, name: &str) -> Option<usize> {
        (0..self.field_count()).find(|&i| self.field_name(i) == name)
    }

    /// Value of the named column in the current row.
    fn value_by_name(&self, name: &str) -> Result<SqlValue<'_>> {
        let ordinal = self
            .ordinal(name)
            .ok_or_else(|| MapError::row_source(format!("No column named '{}'", name)))?;
        self.value(ordinal)
    }
}

/// Forward-only row source.
///
/// Only one consumer may advance a reader at a time; the mapper's lazy
/// iterator holds it by `&mut` for exactly that reason.
pub trait DataReader: DataRecord {
    /// Move to the next row. Returns `false` once the source is exhausted.
    fn advance(&mut self) -> Result<bool>;
}

impl<R: DataRecord + ?Sized> DataRecord for &mut R {
    fn field_count(&self) -> usize {
        (**self).field_count()
    }

    fn field_name(&self, ordinal: usize) -> &str {
        (**self).field_name(ordinal)
    }

    fn field_type(&self, ordinal: usize) -> SqlType {
        (**self).field_type(ordinal)
    }

    fn value(&self, ordinal: usize) -> Result<SqlValue<'_>> {
        (**self).value(ordinal)
    }

    fn is_null(&self, ordinal: usize) -> bool {
        (**self).is_null(ordinal)
    }

    fn ordinal(&self, name: &str) -> Option<usize> {
        (**self).ordinal(name)
    }
}

impl<R: DataReader + ?Sized> DataReader for &mut R {
    fn advance(&mut self) -> Result<bool> {
        (**self).advance()
    }
}
