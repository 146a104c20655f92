//! Raw column values as lent by a row source.
//!
//! A row source hands out [`SqlValue`]s that may borrow from its current row
//! buffer. The mapper coerces them into owned values before they reach a
//! destination setter, so nothing borrowed outlives the row.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Declared type of a column, also carried by NULL values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Bool,
    U8,
    I16,
    I32,
    I64,
    F32,
    F64,
    String,
    Bytes,
    Uuid,
    Decimal,
    DateTime,
    DateTimeOffset,
    Date,
    Time,
}

impl SqlType {
    /// Integer types usable as an enum discriminant.
    #[must_use]
    pub fn is_integral(self) -> bool {
        matches!(self, SqlType::U8 | SqlType::I16 | SqlType::I32 | SqlType::I64)
    }

    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, SqlType::F32 | SqlType::F64)
    }

    /// Integral, floating point, or decimal.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        self.is_integral() || self.is_float() || self == SqlType::Decimal
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlType::Bool => "bool",
            SqlType::U8 => "u8",
            SqlType::I16 => "i16",
            SqlType::I32 => "i32",
            SqlType::I64 => "i64",
            SqlType::F32 => "f32",
            SqlType::F64 => "f64",
            SqlType::String => "string",
            SqlType::Bytes => "bytes",
            SqlType::Uuid => "uuid",
            SqlType::Decimal => "decimal",
            SqlType::DateTime => "datetime",
            SqlType::DateTimeOffset => "datetimeoffset",
            SqlType::Date => "date",
            SqlType::Time => "time",
        };
        f.write_str(name)
    }
}

/// SQL value enum for type-safe row handling.
///
/// Uses `Cow` for string and byte data so a row source can lend values from
/// its current row without copying.
///
/// # Example
///
/// ```rust
/// use std::borrow::Cow;
/// use reader_mapper::core::SqlValue;
///
/// let borrowed: SqlValue<'_> = SqlValue::Text(Cow::Borrowed("hello"));
/// let owned: SqlValue<'static> = borrowed.into_owned();
/// assert!(!owned.is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue<'a> {
    /// NULL marker, tagged with the column type.
    Null(SqlType),

    Bool(bool),

    /// Unsigned byte (tinyint).
    U8(u8),

    /// 16-bit signed integer (smallint).
    I16(i16),

    /// 32-bit signed integer (int).
    I32(i32),

    /// 64-bit signed integer (bigint).
    I64(i64),

    /// 32-bit floating point (real).
    F32(f32),

    /// 64-bit floating point (double precision).
    F64(f64),

    Text(Cow<'a, str>),

    Bytes(Cow<'a, [u8]>),

    Uuid(Uuid),

    Decimal(Decimal),

    /// Timestamp without timezone.
    DateTime(NaiveDateTime),

    /// Timestamp with timezone offset.
    DateTimeOffset(DateTime<FixedOffset>),

    Date(NaiveDate),

    Time(NaiveTime),
}

impl<'a> SqlValue<'a> {
    /// Convert to a fully owned value with `'static` lifetime.
    #[must_use]
    pub fn into_owned(self) -> SqlValue<'static> {
        match self {
            SqlValue::Null(t) => SqlValue::Null(t),
            SqlValue::Bool(v) => SqlValue::Bool(v),
            SqlValue::U8(v) => SqlValue::U8(v),
            SqlValue::I16(v) => SqlValue::I16(v),
            SqlValue::I32(v) => SqlValue::I32(v),
            SqlValue::I64(v) => SqlValue::I64(v),
            SqlValue::F32(v) => SqlValue::F32(v),
            SqlValue::F64(v) => SqlValue::F64(v),
            SqlValue::Text(v) => SqlValue::Text(Cow::Owned(v.into_owned())),
            SqlValue::Bytes(v) => SqlValue::Bytes(Cow::Owned(v.into_owned())),
            SqlValue::Uuid(v) => SqlValue::Uuid(v),
            SqlValue::Decimal(v) => SqlValue::Decimal(v),
            SqlValue::DateTime(v) => SqlValue::DateTime(v),
            SqlValue::DateTimeOffset(v) => SqlValue::DateTimeOffset(v),
            SqlValue::Date(v) => SqlValue::Date(v),
            SqlValue::Time(v) => SqlValue::Time(v),
        }
    }

    /// Borrow this value without copying text or byte data.
    #[must_use]
    pub fn as_borrowed(&self) -> SqlValue<'_> {
        match self {
            SqlValue::Text(v) => SqlValue::Text(Cow::Borrowed(v.as_ref())),
            SqlValue::Bytes(v) => SqlValue::Bytes(Cow::Borrowed(v.as_ref())),
            SqlValue::Null(t) => SqlValue::Null(*t),
            SqlValue::Bool(v) => SqlValue::Bool(*v),
            SqlValue::U8(v) => SqlValue::U8(*v),
            SqlValue::I16(v) => SqlValue::I16(*v),
            SqlValue::I32(v) => SqlValue::I32(*v),
            SqlValue::I64(v) => SqlValue::I64(*v),
            SqlValue::F32(v) => SqlValue::F32(*v),
            SqlValue::F64(v) => SqlValue::F64(*v),
            SqlValue::Uuid(v) => SqlValue::Uuid(*v),
            SqlValue::Decimal(v) => SqlValue::Decimal(*v),
            SqlValue::DateTime(v) => SqlValue::DateTime(*v),
            SqlValue::DateTimeOffset(v) => SqlValue::DateTimeOffset(*v),
            SqlValue::Date(v) => SqlValue::Date(*v),
            SqlValue::Time(v) => SqlValue::Time(*v),
        }
    }

    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }

    /// The type of this value; NULLs report their tag.
    #[must_use]
    pub fn sql_type(&self) -> SqlType {
        match self {
            SqlValue::Null(t) => *t,
            SqlValue::Bool(_) => SqlType::Bool,
            SqlValue::U8(_) => SqlType::U8,
            SqlValue::I16(_) => SqlType::I16,
            SqlValue::I32(_) => SqlType::I32,
            SqlValue::I64(_) => SqlType::I64,
            SqlValue::F32(_) => SqlType::F32,
            SqlValue::F64(_) => SqlType::F64,
            SqlValue::Text(_) => SqlType::String,
            SqlValue::Bytes(_) => SqlType::Bytes,
            SqlValue::Uuid(_) => SqlType::Uuid,
            SqlValue::Decimal(_) => SqlType::Decimal,
            SqlValue::DateTime(_) => SqlType::DateTime,
            SqlValue::DateTimeOffset(_) => SqlType::DateTimeOffset,
            SqlValue::Date(_) => SqlType::Date,
            SqlValue::Time(_) => SqlType::Time,
        }
    }

    /// Widen any integral value to `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::U8(v) => Some(i64::from(*v)),
            SqlValue::I16(v) => Some(i64::from(*v)),
            SqlValue::I32(v) => Some(i64::from(*v)),
            SqlValue::I64(v) => Some(*v),
            _ => None,
        }
    }
}

// Convenience constructors for common cases
impl<'a> SqlValue<'a> {
    /// Create a text value from a borrowed string slice.
    #[must_use]
    pub fn text_borrowed(s: &'a str) -> Self {
        SqlValue::Text(Cow::Borrowed(s))
    }

    /// Create a text value from an owned String.
    #[must_use]
    pub fn text_owned(s: String) -> SqlValue<'static> {
        SqlValue::Text(Cow::Owned(s))
    }

    /// Create a bytes value from an owned Vec<u8>.
    #[must_use]
    pub fn bytes_owned(b: Vec<u8>) -> SqlValue<'static> {
        SqlValue::Bytes(Cow::Owned(b))
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for SqlValue<'static> {
                fn from(v: $ty) -> Self {
                    SqlValue::$variant(v)
                }
            }
        )+
    };
}

impl_from_scalar!(
    bool => Bool,
    u8 => U8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    Uuid => Uuid,
    Decimal => Decimal,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => DateTimeOffset,
    NaiveDate => Date,
    NaiveTime => Time,
);

impl From<String> for SqlValue<'static> {
    fn from(v: String) -> Self {
        SqlValue::Text(Cow::Owned(v))
    }
}

impl<'a> From<&'a str> for SqlValue<'a> {
    fn from(v: &'a str) -> Self {
        SqlValue::Text(Cow::Borrowed(v))
    }
}

impl From<Vec<u8>> for SqlValue<'static> {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(Cow::Owned(v))
    }
}
