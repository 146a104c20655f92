//! Type mapping between column values and destination properties.
//!
//! Every destination field type describes itself with a [`TargetType`] and
//! extracts itself from a coerced [`SqlValue`] through [`ColumnValue`]. The
//! conversion rules live in [`coerce`].

mod coerce;

pub use coerce::{coerce, is_convertible, CoercionError};

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::{SqlType, SqlValue};

/// Type of a destination property as seen by the coercer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetType {
    /// Scalar representation; for enums, the discriminant type.
    pub scalar: SqlType,
    /// Enumeration backed by an integral `scalar`.
    pub is_enum: bool,
    /// `Option<_>` wrapper.
    pub nullable: bool,
}

impl TargetType {
    pub const fn scalar(scalar: SqlType) -> Self {
        Self {
            scalar,
            is_enum: false,
            nullable: false,
        }
    }

    pub const fn enumeration(repr: SqlType) -> Self {
        Self {
            scalar: repr,
            is_enum: true,
            nullable: false,
        }
    }

    #[must_use]
    pub const fn into_nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_enum, self.nullable) {
            (false, false) => write!(f, "{}", self.scalar),
            (false, true) => write!(f, "Option<{}>", self.scalar),
            (true, false) => write!(f, "enum({})", self.scalar),
            (true, true) => write!(f, "Option<enum({})>", self.scalar),
        }
    }
}

/// A field type the mapper can assign.
///
/// `from_sql` receives a value already coerced to `target_type().scalar`; it
/// returns `None` only when handed something else.
pub trait ColumnValue: Sized + 'static {
    fn target_type() -> TargetType;

    fn from_sql(value: SqlValue<'static>) -> Option<Self>;
}

macro_rules! scalar_column_value {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl ColumnValue for $ty {
                fn target_type() -> TargetType {
                    TargetType::scalar(SqlType::$variant)
                }

                fn from_sql(value: SqlValue<'static>) -> Option<Self> {
                    match value {
                        SqlValue::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )+
    };
}

scalar_column_value!(
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

impl ColumnValue for String {
    fn target_type() -> TargetType {
        TargetType::scalar(SqlType::String)
    }

    fn from_sql(value: SqlValue<'static>) -> Option<Self> {
        match value {
            SqlValue::Text(v) => Some(v.into_owned()),
            _ => None,
        }
    }
}

impl ColumnValue for Vec<u8> {
    fn target_type() -> TargetType {
        TargetType::scalar(SqlType::Bytes)
    }

    fn from_sql(value: SqlValue<'static>) -> Option<Self> {
        match value {
            SqlValue::Bytes(v) => Some(v.into_owned()),
            _ => None,
        }
    }
}

/// NULL never reaches `from_sql`; an absent value leaves the field `None`.
impl<V: ColumnValue> ColumnValue for Option<V> {
    fn target_type() -> TargetType {
        V::target_type().into_nullable()
    }

    fn from_sql(value: SqlValue<'static>) -> Option<Self> {
        V::from_sql(value).map(Some)
    }
}

/// Implement [`ColumnValue`] for a fieldless enum stored as an integer column.
///
/// ```rust
/// use reader_mapper::column_enum;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Settlement {
///     PreDelivery = 0,
///     Dvp = 1,
///     Prepayment = 3,
/// }
///
/// column_enum!(Settlement: I32 { PreDelivery, Dvp, Prepayment });
/// ```
#[macro_export]
macro_rules! column_enum {
    ($ty:ty : $repr:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::typemap::ColumnValue for $ty {
            fn target_type() -> $crate::typemap::TargetType {
                $crate::typemap::TargetType::enumeration($crate::core::SqlType::$repr)
            }

            fn from_sql(value: $crate::core::SqlValue<'static>) -> ::std::option::Option<Self> {
                let discriminant = value.as_i64()?;
                $(
                    if discriminant == <$ty>::$variant as i64 {
                        return ::std::option::Option::Some(<$ty>::$variant);
                    }
                )+
                ::std::option::Option::None
            }
        }
    };
}
