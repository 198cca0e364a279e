//! Bridges `rusqlite::types::Value` at the host-engine boundary to the
//! internal `bqlite_value::Value` used by every function body, so scalar and
//! aggregate implementations only ever deal with one value type.

use bqlite_value::Value as BValue;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

pub struct ValueWrapper(pub BValue);

impl FromSql for ValueWrapper {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let v = match value {
            ValueRef::Null => BValue::Null,
            ValueRef::Integer(i) => BValue::Int(i),
            ValueRef::Real(f) => BValue::Float(f),
            ValueRef::Text(t) => {
                let s = std::str::from_utf8(t).map_err(|e| FromSqlError::Other(Box::new(e)))?;
                match bqlite_value::codec::decode(s) {
                    Ok(decoded) => decoded,
                    Err(_) => BValue::String(s.to_string()),
                }
            }
            ValueRef::Blob(b) => BValue::Bytes(b.to_vec()),
        };
        Ok(ValueWrapper(v))
    }
}

impl ToSql for ValueWrapper {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match &self.0 {
            BValue::Null => ToSqlOutput::from(rusqlite::types::Null),
            BValue::Int(i) => ToSqlOutput::from(*i),
            BValue::Float(f) => ToSqlOutput::from(*f),
            BValue::Bool(b) => ToSqlOutput::from(*b),
            BValue::String(s) => ToSqlOutput::from(s.clone()),
            BValue::Bytes(b) => ToSqlOutput::from(b.clone()),
            other => match bqlite_value::codec::encode(other) {
                Ok(text) => ToSqlOutput::from(text),
                Err(_) => ToSqlOutput::from(rusqlite::types::Null),
            },
        })
    }
}

pub fn value_error_to_sql(e: bqlite_value::ValueError) -> rusqlite::Error {
    rusqlite::Error::UserFunctionError(Box::new(e))
}
