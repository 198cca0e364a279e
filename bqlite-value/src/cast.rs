//! Explicit `CAST`/`SAFE_CAST` conversions. Every source/target pair is
//! handled by name; there is no default fallback path, so an unlisted
//! combination is always `ValueError::Unimplemented` rather than a silent
//! best-effort coercion.

use crate::datetime::{date_to_days, days_to_date};
use crate::error::ValueError;
use crate::numeric::Numeric;
use crate::value::{Type, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::str::FromStr;

/// `CAST(value AS target)`: errors propagate to the caller.
pub fn cast(value: &Value, target: &Type) -> Result<Value, ValueError> {
    convert(value, target)
}

/// `SAFE_CAST(value AS target)`: any conversion error collapses to `NULL`.
pub fn safe_cast(value: &Value, target: &Type) -> Value {
    convert(value, target).unwrap_or(Value::Null)
}

fn convert(value: &Value, target: &Type) -> Result<Value, ValueError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let from = value.type_of();
    match (value, target) {
        (v, t) if &from == t => Ok(v.clone()),

        (Value::Bool(b), Type::String) => Ok(Value::String(if *b { "true".into() } else { "false".into() })),
        (Value::Bool(b), Type::Int64) => Ok(Value::Int(if *b { 1 } else { 0 })),

        (Value::Int(i), Type::Float64) => Ok(Value::Float(*i as f64)),
        (Value::Int(i), Type::Numeric) => Ok(Value::Numeric(Numeric::from_i64(*i))),
        (Value::Int(i), Type::BigNumeric) => Ok(Value::BigNumeric(Numeric::from_i64(*i))),
        (Value::Int(i), Type::String) => Ok(Value::String(i.to_string())),
        (Value::Int(i), Type::Bool) => Ok(Value::Bool(*i != 0)),

        (Value::Float(f), Type::Int64) => {
            if !f.is_finite() || f.round() < i64::MIN as f64 || f.round() > i64::MAX as f64 {
                Err(ValueError::Overflow { detail: format!("{f} does not fit in INT64") })
            } else {
                Ok(Value::Int(f.round() as i64))
            }
        }
        (Value::Float(f), Type::Numeric) => Numeric::from_f64(*f).map(Value::Numeric),
        (Value::Float(f), Type::BigNumeric) => Numeric::from_f64(*f).map(Value::BigNumeric),
        (Value::Float(f), Type::String) => Ok(Value::String(format_float(*f))),

        (Value::Numeric(n) | Value::BigNumeric(n), Type::Int64) => n.to_i64().map(Value::Int),
        (Value::Numeric(n) | Value::BigNumeric(n), Type::Float64) => Ok(Value::Float(n.to_f64())),
        (Value::Numeric(n), Type::BigNumeric) => Ok(Value::BigNumeric(*n)),
        (Value::BigNumeric(n), Type::Numeric) => Ok(Value::Numeric(*n)),
        (Value::Numeric(n) | Value::BigNumeric(n), Type::String) => Ok(Value::String(n.to_string())),

        (Value::String(s), Type::Int64) => i64::from_str(s.trim())
            .map(Value::Int)
            .map_err(|e| ValueError::conversion("STRING", "INT64", e.to_string())),
        (Value::String(s), Type::Float64) => f64::from_str(s.trim())
            .map(Value::Float)
            .map_err(|e| ValueError::conversion("STRING", "FLOAT64", e.to_string())),
        (Value::String(s), Type::Numeric) => Numeric::parse(s).map(Value::Numeric),
        (Value::String(s), Type::BigNumeric) => Numeric::parse(s).map(Value::BigNumeric),
        (Value::String(s), Type::Bool) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            other => Err(ValueError::conversion("STRING", "BOOL", format!("{other:?} is not a boolean literal"))),
        },
        (Value::String(s), Type::Bytes) => Ok(Value::Bytes(s.as_bytes().to_vec())),
        (Value::String(s), Type::Date) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(|d| Value::Date(date_to_days(&d)))
            .map_err(|e| ValueError::conversion("STRING", "DATE", e.to_string())),
        (Value::String(s), Type::Time) => NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f")
            .map(Value::Time)
            .map_err(|e| ValueError::conversion("STRING", "TIME", e.to_string())),
        (Value::String(s), Type::Datetime) => NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S%.f"))
            .map(Value::Datetime)
            .map_err(|e| ValueError::conversion("STRING", "DATETIME", e.to_string())),
        (Value::String(s), Type::Timestamp) => parse_timestamp(s).map(Value::Timestamp),
        (Value::String(s), Type::Json) => Ok(Value::Json(s.clone())),

        (Value::Bytes(b), Type::String) => String::from_utf8(b.clone())
            .map(Value::String)
            .map_err(|e| ValueError::conversion("BYTES", "STRING", e.to_string())),

        (Value::Date(d), Type::String) => Ok(Value::String(days_to_date(*d)?.format("%Y-%m-%d").to_string())),
        (Value::Date(d), Type::Datetime) => Ok(Value::Datetime(NaiveDateTime::new(days_to_date(*d)?, NaiveTime::MIN))),
        (Value::Date(d), Type::Timestamp) => {
            let dt = NaiveDateTime::new(days_to_date(*d)?, NaiveTime::MIN);
            Ok(Value::Timestamp(dt.and_utc().timestamp() * 1_000_000))
        }

        (Value::Datetime(dt), Type::String) => Ok(Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        (Value::Datetime(dt), Type::Date) => Ok(Value::Date(date_to_days(&dt.date()))),
        (Value::Datetime(dt), Type::Time) => Ok(Value::Time(dt.time())),
        (Value::Datetime(dt), Type::Timestamp) => {
            Ok(Value::Timestamp(dt.and_utc().timestamp() * 1_000_000 + dt.and_utc().timestamp_subsec_micros() as i64))
        }

        (Value::Timestamp(micros), Type::String) => format_timestamp(*micros).map(Value::String),
        (Value::Timestamp(micros), Type::Date) => {
            let dt = micros_to_datetime(*micros)?;
            Ok(Value::Date(date_to_days(&dt.naive_utc().date())))
        }
        (Value::Timestamp(micros), Type::Datetime) => Ok(Value::Datetime(micros_to_datetime(*micros)?.naive_utc())),

        (Value::Time(t), Type::String) => Ok(Value::String(t.format("%H:%M:%S%.f").to_string())),

        (Value::Json(j), Type::String) => Ok(Value::String(j.clone())),

        _ => Err(ValueError::Unimplemented {
            detail: format!("CAST from {from} to {target} is not supported"),
        }),
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".into()
    } else if f.is_infinite() {
        if f > 0.0 { "inf".into() } else { "-inf".into() }
    } else {
        format!("{f}")
    }
}

/// Converts microseconds-since-epoch to a UTC `DateTime`, failing instead of
/// panicking when the value falls outside chrono's representable range.
fn micros_to_datetime(micros: i64) -> Result<chrono::DateTime<chrono::Utc>, ValueError> {
    let secs = micros.div_euclid(1_000_000);
    let sub_micros = (micros.rem_euclid(1_000_000)) as u32;
    chrono::DateTime::from_timestamp(secs, sub_micros * 1000)
        .ok_or_else(|| ValueError::conversion("TIMESTAMP", "calendar datetime", format!("{micros} microseconds is out of chrono's representable range")))
}

fn format_timestamp(micros: i64) -> Result<String, ValueError> {
    let dt = micros_to_datetime(micros)?;
    Ok(dt.format("%Y-%m-%d %H:%M:%S%.f UTC").to_string())
}

fn parse_timestamp(s: &str) -> Result<i64, ValueError> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S%.f UTC", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.and_utc().timestamp() * 1_000_000 + dt.and_utc().timestamp_subsec_micros() as i64);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(NaiveDateTime::new(d, NaiveTime::MIN).and_utc().timestamp() * 1_000_000);
    }
    Err(ValueError::conversion("STRING", "TIMESTAMP", format!("{s:?} is not a recognized timestamp literal")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_to_numeric_then_back_to_string() {
        let got = cast(&Value::Int(42), &Type::Numeric).unwrap();
        assert_eq!(got, Value::Numeric(Numeric::from_i64(42)));
        let back = cast(&got, &Type::String).unwrap();
        assert_eq!(back, Value::String("42".into()));
    }

    #[test]
    fn safe_cast_swallows_error_as_null() {
        let got = safe_cast(&Value::String("not a number".into()), &Type::Int64);
        assert_eq!(got, Value::Null);
    }

    #[test]
    fn cast_propagates_error_for_bad_input() {
        let err = cast(&Value::String("not a number".into()), &Type::Int64);
        assert!(err.is_err());
    }

    #[test]
    fn date_string_round_trip() {
        let d = Value::date_from_ymd(2024, 3, 15).unwrap();
        let s = cast(&d, &Type::String).unwrap();
        assert_eq!(s, Value::String("2024-03-15".into()));
        let back = cast(&s, &Type::Date).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn unsupported_conversion_is_unimplemented() {
        let err = cast(&Value::Bytes(vec![1, 2]), &Type::Int64);
        assert!(matches!(err, Err(ValueError::Unimplemented { .. })));
    }

    #[test]
    fn null_casts_to_null_regardless_of_target() {
        assert_eq!(cast(&Value::Null, &Type::Int64).unwrap(), Value::Null);
    }
}
