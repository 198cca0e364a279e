//! The tagged value model. `Value` is the principal sum type; every
//! operation over it (compare, arithmetic, cast, codec) is exhaustive, never
//! a silent default coercion.

use crate::interval::Interval;
use crate::numeric::Numeric;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    /// Days since 1970-01-01.
    Date(i64),
    Datetime(NaiveDateTime),
    Time(NaiveTime),
    /// Microseconds since 1970-01-01T00:00:00Z, always UTC-normalized.
    Timestamp(i64),
    Numeric(Numeric),
    BigNumeric(Numeric),
    Interval(Interval),
    /// Serialized JSON text; parsed lazily by callers that need structure.
    Json(String),
    Array(Vec<Value>),
    /// Ordered (name, value) pairs; field names unique within one struct.
    Struct(Vec<(String, Value)>),
}

/// A type descriptor, independent of any carried value. Mirrors the `Value`
/// variant set one-for-one.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Null,
    Int64,
    Float64,
    Bool,
    String,
    Bytes,
    Date,
    Datetime,
    Time,
    Timestamp,
    Numeric,
    BigNumeric,
    Interval,
    Json,
    Array(Box<Type>),
    Struct(Vec<(String, Type)>),
}

impl Value {
    pub fn type_of(&self) -> Type {
        match self {
            Value::Null => Type::Null,
            Value::Int(_) => Type::Int64,
            Value::Float(_) => Type::Float64,
            Value::Bool(_) => Type::Bool,
            Value::String(_) => Type::String,
            Value::Bytes(_) => Type::Bytes,
            Value::Date(_) => Type::Date,
            Value::Datetime(_) => Type::Datetime,
            Value::Time(_) => Type::Time,
            Value::Timestamp(_) => Type::Timestamp,
            Value::Numeric(_) => Type::Numeric,
            Value::BigNumeric(_) => Type::BigNumeric,
            Value::Interval(_) => Type::Interval,
            Value::Json(_) => Type::Json,
            Value::Array(items) => {
                Type::Array(Box::new(items.first().map(Value::type_of).unwrap_or(Type::Null)))
            }
            Value::Struct(fields) => {
                Type::Struct(fields.iter().map(|(n, v)| (n.clone(), v.type_of())).collect())
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn date_from_ymd(year: i32, month: u32, day: u32) -> Option<Value> {
        NaiveDate::from_ymd_opt(year, month, day).map(|d| Value::Date(crate::datetime::date_to_days(&d)))
    }

    pub fn struct_field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn struct_field_at(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.get(index).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Null => write!(f, "NULL"),
            Type::Int64 => write!(f, "INT64"),
            Type::Float64 => write!(f, "FLOAT64"),
            Type::Bool => write!(f, "BOOL"),
            Type::String => write!(f, "STRING"),
            Type::Bytes => write!(f, "BYTES"),
            Type::Date => write!(f, "DATE"),
            Type::Datetime => write!(f, "DATETIME"),
            Type::Time => write!(f, "TIME"),
            Type::Timestamp => write!(f, "TIMESTAMP"),
            Type::Numeric => write!(f, "NUMERIC"),
            Type::BigNumeric => write!(f, "BIGNUMERIC"),
            Type::Interval => write!(f, "INTERVAL"),
            Type::Json => write!(f, "JSON"),
            Type::Array(elem) => write!(f, "ARRAY<{elem}>"),
            Type::Struct(fields) => {
                write!(f, "STRUCT<")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name} {ty}")?;
                }
                write!(f, ">")
            }
        }
    }
}
