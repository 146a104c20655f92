//! Conversion of raw column values into destination property values.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::core::{SqlType, SqlValue};

use super::TargetType;

/// A present value that no conversion rule accepts for the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercionError {
    pub source_type: SqlType,
    pub target_type: TargetType,
}

/// Convert a raw value for assignment to a property of type `target`.
///
/// Returns `Ok(None)` for NULL: the property keeps its default and the value
/// does not count towards materializing a nested object.
pub fn coerce(
    raw: SqlValue<'_>,
    target: TargetType,
) -> Result<Option<SqlValue<'static>>, CoercionError> {
    if raw.is_null() {
        return Ok(None);
    }

    let source_type = raw.sql_type();
    let converted = if target.is_enum {
        raw.as_i64()
            .and_then(|discriminant| from_integral(discriminant, target.scalar))
    } else {
        convert(raw, target.scalar)
    };

    converted.map(Some).ok_or(CoercionError {
        source_type,
        target_type: target,
    })
}

/// Whether values declared as `declared` can ever be assigned to `target`.
///
/// Range failures (an `i64` that does not fit an `i16`) are only detected
/// per value by [`coerce`].
pub fn is_convertible(declared: SqlType, target: TargetType) -> bool {
    if target.is_enum {
        return declared.is_integral() && target.scalar.is_integral();
    }
    let to = target.scalar;
    if declared == to {
        return true;
    }
    match declared {
        t if t.is_integral() => to.is_numeric(),
        t if t.is_float() => to.is_numeric(),
        SqlType::Decimal => to.is_numeric(),
        _ => false,
    }
}

fn convert(value: SqlValue<'_>, to: SqlType) -> Option<SqlValue<'static>> {
    if value.sql_type() == to {
        return Some(value.into_owned());
    }
    if let Some(v) = value.as_i64() {
        return from_integral(v, to);
    }
    match value {
        SqlValue::F32(v) => from_float(f64::from(v), to),
        SqlValue::F64(v) => from_float(v, to),
        SqlValue::Decimal(v) => from_decimal(v, to),
        _ => None,
    }
}

fn from_integral(v: i64, to: SqlType) -> Option<SqlValue<'static>> {
    match to {
        SqlType::U8 => u8::try_from(v).ok().map(SqlValue::U8),
        SqlType::I16 => i16::try_from(v).ok().map(SqlValue::I16),
        SqlType::I32 => i32::try_from(v).ok().map(SqlValue::I32),
        SqlType::I64 => Some(SqlValue::I64(v)),
        SqlType::F32 => Some(SqlValue::F32(v as f32)),
        SqlType::F64 => Some(SqlValue::F64(v as f64)),
        SqlType::Decimal => Some(SqlValue::Decimal(Decimal::from(v))),
        _ => None,
    }
}

fn from_float(v: f64, to: SqlType) -> Option<SqlValue<'static>> {
    match to {
        SqlType::F32 => Some(SqlValue::F32(v as f32)),
        SqlType::F64 => Some(SqlValue::F64(v)),
        SqlType::Decimal => Decimal::try_from(v).ok().map(SqlValue::Decimal),
        t if t.is_integral() => {
            // 2^63 itself is out of range for i64, hence the strict upper bound.
            if !v.is_finite() || v.fract() != 0.0 || v < i64::MIN as f64 || v >= i64::MAX as f64 {
                return None;
            }
            from_integral(v as i64, t)
        }
        _ => None,
    }
}

fn from_decimal(v: Decimal, to: SqlType) -> Option<SqlValue<'static>> {
    match to {
        SqlType::F32 => v.to_f32().map(SqlValue::F32),
        SqlType::F64 => v.to_f64().map(SqlValue::F64),
        t if t.is_integral() => {
            if !v.fract().is_zero() {
                return None;
            }
            from_integral(v.to_i64()?, t)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use uuid::Uuid;

    fn scalar(t: SqlType) -> TargetType {
        TargetType::scalar(t)
    }

    #[test]
    fn test_null_is_absent_for_every_target() {
        assert_eq!(coerce(SqlValue::Null(SqlType::I32), scalar(SqlType::I32)), Ok(None));
        assert_eq!(
            coerce(
                SqlValue::Null(SqlType::I32),
                TargetType::enumeration(SqlType::I32).into_nullable()
            ),
            Ok(None)
        );
        // Even a pairing that could never convert is fine when the value is absent.
        assert_eq!(coerce(SqlValue::Null(SqlType::String), scalar(SqlType::Uuid)), Ok(None));
    }

    #[test]
    fn test_identical_types_pass_through_owned() {
        let raw = SqlValue::Text(Cow::Borrowed("Hello"));
        assert_eq!(
            coerce(raw, scalar(SqlType::String)),
            Ok(Some(SqlValue::text_owned("Hello".to_string())))
        );
        let id = Uuid::new_v4();
        assert_eq!(
            coerce(SqlValue::Uuid(id), scalar(SqlType::Uuid)),
            Ok(Some(SqlValue::Uuid(id)))
        );
    }

    #[test]
    fn test_nullable_target_coerces_inner_scalar() {
        let target = scalar(SqlType::I32).into_nullable();
        assert_eq!(coerce(SqlValue::I32(7), target), Ok(Some(SqlValue::I32(7))));
    }

    #[test]
    fn test_integer_widening() {
        assert_eq!(
            coerce(SqlValue::I16(22), scalar(SqlType::I64)),
            Ok(Some(SqlValue::I64(22)))
        );
        assert_eq!(
            coerce(SqlValue::U8(0x12), scalar(SqlType::I32)),
            Ok(Some(SqlValue::I32(18)))
        );
        assert_eq!(
            coerce(SqlValue::I32(6134), scalar(SqlType::Decimal)),
            Ok(Some(SqlValue::Decimal(Decimal::from(6134))))
        );
    }

    #[test]
    fn test_integer_narrowing_is_range_checked() {
        assert_eq!(
            coerce(SqlValue::I64(300), scalar(SqlType::I16)),
            Ok(Some(SqlValue::I16(300)))
        );
        let err = coerce(SqlValue::I64(70_000), scalar(SqlType::I16)).unwrap_err();
        assert_eq!(err.source_type, SqlType::I64);
        assert_eq!(err.target_type, scalar(SqlType::I16));
        assert!(coerce(SqlValue::I32(-1), scalar(SqlType::U8)).is_err());
    }

    #[test]
    fn test_float_and_decimal_conversions() {
        assert_eq!(
            coerce(SqlValue::F32(1.5), scalar(SqlType::F64)),
            Ok(Some(SqlValue::F64(1.5)))
        );
        assert_eq!(
            coerce(SqlValue::Decimal(Decimal::new(250, 2)), scalar(SqlType::F64)),
            Ok(Some(SqlValue::F64(2.5)))
        );
        assert_eq!(
            coerce(SqlValue::Decimal(Decimal::new(4200, 2)), scalar(SqlType::I32)),
            Ok(Some(SqlValue::I32(42)))
        );
        assert!(coerce(SqlValue::Decimal(Decimal::new(4201, 2)), scalar(SqlType::I32)).is_err());
    }

    #[test]
    fn test_float_to_integer_requires_whole_values_in_range() {
        assert_eq!(
            coerce(SqlValue::F64(3.0), scalar(SqlType::I32)),
            Ok(Some(SqlValue::I32(3)))
        );
        assert_eq!(
            coerce(SqlValue::F32(-12.0), scalar(SqlType::I16)),
            Ok(Some(SqlValue::I16(-12)))
        );
        assert!(coerce(SqlValue::F64(3.5), scalar(SqlType::I32)).is_err());
        assert!(coerce(SqlValue::F64(256.0), scalar(SqlType::U8)).is_err());
        assert!(coerce(SqlValue::F64(1e19), scalar(SqlType::I64)).is_err());
        assert!(coerce(SqlValue::F64(f64::NAN), scalar(SqlType::I64)).is_err());
        assert!(coerce(SqlValue::F64(f64::INFINITY), scalar(SqlType::I32)).is_err());
    }

    #[test]
    fn test_enum_target_accepts_integral_sources() {
        let target = TargetType::enumeration(SqlType::I32).into_nullable();
        assert_eq!(coerce(SqlValue::I64(3), target), Ok(Some(SqlValue::I32(3))));
        assert_eq!(coerce(SqlValue::U8(1), target), Ok(Some(SqlValue::I32(1))));
        assert!(coerce(SqlValue::text_owned("3".into()), target).is_err());
        assert!(coerce(SqlValue::F64(3.0), target).is_err());
    }

    #[test]
    fn test_incompatible_pairings_fail() {
        assert!(coerce(SqlValue::text_owned("6134".into()), scalar(SqlType::I32)).is_err());
        assert!(coerce(SqlValue::Bool(true), scalar(SqlType::I32)).is_err());
        assert!(coerce(SqlValue::I32(1), scalar(SqlType::Bool)).is_err());
        assert!(coerce(SqlValue::I32(1), scalar(SqlType::String)).is_err());
    }

    #[test]
    fn test_is_convertible_matches_rules() {
        assert!(is_convertible(SqlType::I16, scalar(SqlType::I64)));
        assert!(is_convertible(SqlType::I64, scalar(SqlType::I16)));
        assert!(is_convertible(SqlType::Decimal, scalar(SqlType::I32)));
        assert!(is_convertible(SqlType::F32, scalar(SqlType::Decimal)));
        assert!(is_convertible(SqlType::F64, scalar(SqlType::I32)));
        assert!(!is_convertible(SqlType::F64, TargetType::enumeration(SqlType::I32)));
        assert!(!is_convertible(SqlType::String, scalar(SqlType::I32)));
        assert!(!is_convertible(SqlType::DateTime, scalar(SqlType::DateTimeOffset)));
        assert!(is_convertible(SqlType::I64, TargetType::enumeration(SqlType::I32)));
        assert!(!is_convertible(SqlType::String, TargetType::enumeration(SqlType::I32)));
        assert!(is_convertible(
            SqlType::String,
            scalar(SqlType::String).into_nullable()
        ));
    }
}
