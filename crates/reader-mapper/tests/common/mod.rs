//! Shared fixtures for the mapping integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use reader_mapper::{
    DataRecord, DataTable, Destination, DestinationMap, MapperConfiguration, MapperOptions, Result,
    SqlType, SqlValue, TypeDescriptor,
};
use rust_decimal::Decimal;
use uuid::Uuid;

pub mod field {
    pub const SMALL_INT: &str = "SmallInteger";
    pub const INT: &str = "Integer";
    pub const BIG_INT: &str = "BigInteger";
    pub const GUID: &str = "Guid";
    pub const FLOAT: &str = "Float";
    pub const DOUBLE: &str = "Double";
    pub const DECIMAL: &str = "Decimal";
    pub const DATE_TIME: &str = "DateTime";
    pub const BYTE: &str = "Byte";
    pub const BOOLEAN: &str = "Boolean";
    pub const SOMETHING: &str = "Something";
}

#[derive(Debug, Clone, PartialEq)]
pub struct DtoObject {
    pub small_integer: i16,
    pub integer: i32,
    pub big_integer: i64,
    pub guid: Uuid,
    pub float: f32,
    pub double: f64,
    pub decimal: Decimal,
    pub date_time: NaiveDateTime,
    pub byte: u8,
    pub boolean: bool,
    pub else_value: NaiveDateTime,
}

impl Default for DtoObject {
    fn default() -> Self {
        Self {
            small_integer: 0,
            integer: 0,
            big_integer: 0,
            guid: Uuid::nil(),
            float: 0.0,
            double: 0.0,
            decimal: Decimal::ZERO,
            date_time: NaiveDateTime::MIN,
            byte: 0,
            boolean: false,
            else_value: NaiveDateTime::MIN,
        }
    }
}

impl Destination for DtoObject {
    fn descriptor() -> TypeDescriptor<Self> {
        TypeDescriptor::new("DtoObject")
            .field("SmallInteger", |d: &mut DtoObject, v: i16| d.small_integer = v)
            .field("Integer", |d: &mut DtoObject, v: i32| d.integer = v)
            .field("BigInteger", |d: &mut DtoObject, v: i64| d.big_integer = v)
            .field("Guid", |d: &mut DtoObject, v: Uuid| d.guid = v)
            .field("Float", |d: &mut DtoObject, v: f32| d.float = v)
            .field("Double", |d: &mut DtoObject, v: f64| d.double = v)
            .field("Decimal", |d: &mut DtoObject, v: Decimal| d.decimal = v)
            .field("DateTime", |d: &mut DtoObject, v: NaiveDateTime| d.date_time = v)
            .field("Byte", |d: &mut DtoObject, v: u8| d.byte = v)
            .field("Boolean", |d: &mut DtoObject, v: bool| d.boolean = v)
            .field("Else", |d: &mut DtoObject, v: NaiveDateTime| d.else_value = v)
    }
}

/// Same shape as [`DtoObject`], reached through an embedded base.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedDtoObject {
    pub base: DtoObject,
}

impl Destination for DerivedDtoObject {
    fn descriptor() -> TypeDescriptor<Self> {
        TypeDescriptor::new("DerivedDtoObject").include(|d: &mut DerivedDtoObject| &mut d.base)
    }
}

pub fn sample_date_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2016, 3, 14)
        .and_then(|d| d.and_hms_opt(15, 9, 26))
        .unwrap()
}

/// One row covering every scalar column type the DTO declares.
pub fn dto_table(guid: Uuid) -> DataTable {
    let mut table = DataTable::new()
        .with_column(field::SMALL_INT, SqlType::I16)
        .with_column(field::INT, SqlType::I32)
        .with_column(field::BIG_INT, SqlType::I64)
        .with_column(field::GUID, SqlType::Uuid)
        .with_column(field::FLOAT, SqlType::F32)
        .with_column(field::DOUBLE, SqlType::F64)
        .with_column(field::DECIMAL, SqlType::Decimal)
        .with_column(field::DATE_TIME, SqlType::DateTime)
        .with_column(field::BYTE, SqlType::U8)
        .with_column(field::BOOLEAN, SqlType::Bool)
        .with_column(field::SOMETHING, SqlType::DateTime);
    table
        .add_row(vec![
            SqlValue::I16(22),
            SqlValue::I32(6134),
            SqlValue::I64(61346154),
            SqlValue::Uuid(guid),
            SqlValue::F32(642.61),
            SqlValue::F64(67164.64),
            SqlValue::Decimal(Decimal::new(9434161, 2)),
            SqlValue::DateTime(sample_date_time()),
            SqlValue::U8(0x12),
            SqlValue::Bool(true),
            SqlValue::DateTime(NaiveDateTime::MAX),
        ])
        .unwrap();
    table
}

/// Projects the `Something` column by ordinal.
pub fn something_by_ordinal(record: &dyn DataRecord) -> Result<SqlValue<'static>> {
    record.value(10).map(SqlValue::into_owned)
}

/// Projects the `Something` column by name.
pub fn something_by_name(record: &dyn DataRecord) -> Result<SqlValue<'static>> {
    record
        .value_by_name(field::SOMETHING)
        .map(SqlValue::into_owned)
}

/// `DtoObject` registered with its `Else` override.
pub fn dto_configuration(options: MapperOptions) -> MapperConfiguration {
    let mut config = MapperConfiguration::new(options);
    config
        .register(DestinationMap::<DtoObject>::new().for_member("Else", something_by_ordinal))
        .unwrap();
    config
}

pub fn assert_dto_matches(dto: &DtoObject, guid: Uuid) {
    assert_eq!(dto.small_integer, 22);
    assert_eq!(dto.integer, 6134);
    assert_eq!(dto.big_integer, 61346154);
    assert_eq!(dto.guid, guid);
    assert_eq!(dto.float, 642.61f32);
    assert_eq!(dto.double, 67164.64);
    assert_eq!(dto.decimal, Decimal::new(9434161, 2));
    assert_eq!(dto.date_time, sample_date_time());
    assert_eq!(dto.byte, 0x12);
    assert!(dto.boolean);
    assert_eq!(dto.else_value, NaiveDateTime::MAX);
}
