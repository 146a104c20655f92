//! Column metadata read from a row source.

use std::fmt;
use std::sync::Arc;

use super::traits::DataRecord;
use super::value::SqlType;

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name, verbatim. Dots encode a nested destination path.
    pub name: String,

    /// Ordinal position (0-based).
    pub ordinal: usize,

    /// Declared column type.
    pub declared_type: SqlType,
}

/// Read the column layout of a row source.
///
/// Only metadata is read; no row values are touched and names are not
/// normalized.
pub fn describe(record: &dyn DataRecord) -> Vec<ColumnDescriptor> {
    (0..record.field_count())
        .map(|ordinal| ColumnDescriptor {
            name: record.field_name(ordinal).to_string(),
            ordinal,
            declared_type: record.field_type(ordinal),
        })
        .collect()
}

/// Ordered `(name, type)` layout of a row source.
///
/// Equality is structural: two sources with the same ordered names and types
/// share a signature and therefore a compiled plan. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaSignature {
    columns: Arc<[(String, SqlType)]>,
}

impl SchemaSignature {
    pub fn from_columns(columns: &[ColumnDescriptor]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|c| (c.name.clone(), c.declared_type))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, SqlType)> {
        self.columns.iter().map(|(name, ty)| (name.as_str(), *ty))
    }
}

impl fmt::Display for SchemaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, (name, ty)) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, ty)?;
        }
        f.write_str(")")
    }
}
