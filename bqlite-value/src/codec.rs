//! Textual wire encoding for values that the host engine cannot represent
//! natively. A handful of variants map straight onto SQLite storage classes
//! (`Null`, `Int`, `Float`, `Bool`, `String`, `Bytes`) and round-trip with no
//! wrapping at all. Everything else — anything with a type tag that would
//! otherwise be lost in a bare TEXT/BLOB column — is wrapped in a tagged
//! envelope, JSON-serialized, then base64-encoded so it is safe to pass
//! through any text column without escaping.

use crate::error::ValueError;
use crate::numeric::Numeric;
use crate::value::Value;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;

const ENVELOPE_PREFIX: &str = "B64J:";

#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    ty: String,
    value: serde_json::Value,
}

/// Does this variant need the tagged envelope, or can it ride natively
/// through a host-engine column?
fn needs_envelope(v: &Value) -> bool {
    !matches!(
        v,
        Value::Null | Value::Int(_) | Value::Float(_) | Value::Bool(_) | Value::String(_) | Value::Bytes(_)
    )
}

/// Encodes a `Value` to the textual form used when it must pass through a
/// host-engine TEXT column. Native-storable variants aren't reachable here;
/// callers should bind them directly instead of going through this path.
pub fn encode(v: &Value) -> Result<String, ValueError> {
    let (ty, value) = match v {
        Value::Null => return Ok(String::new()),
        Value::Date(d) => ("DATE", json!(d)),
        Value::Time(t) => ("TIME", json!(t.format("%H:%M:%S%.f").to_string())),
        Value::Datetime(dt) => ("DATETIME", json!(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        Value::Timestamp(micros) => ("TIMESTAMP", json!(micros)),
        Value::Numeric(n) => ("NUMERIC", json!(n.to_string())),
        Value::BigNumeric(n) => ("BIGNUMERIC", json!(n.to_string())),
        Value::Interval(iv) => ("INTERVAL", json!({"months": iv.months, "days": iv.days, "micros": iv.micros})),
        Value::Json(text) => ("JSON", json!(text)),
        Value::Array(items) => {
            let encoded: Result<Vec<_>, _> = items.iter().map(to_json_any).collect();
            ("ARRAY", serde_json::Value::Array(encoded?))
        }
        Value::Struct(fields) => {
            let mut obj = serde_json::Map::new();
            for (name, val) in fields {
                obj.insert(name.clone(), to_json_any(val)?);
            }
            ("STRUCT", serde_json::Value::Object(obj))
        }
        _ => return Err(ValueError::type_error("encode", "native-storable value passed to envelope encoder")),
    };
    let envelope = Envelope { ty: ty.to_string(), value };
    let body = serde_json::to_vec(&envelope)
        .map_err(|e| ValueError::conversion("Value", "envelope", e.to_string()))?;
    Ok(format!("{ENVELOPE_PREFIX}{}", base64::engine::general_purpose::STANDARD.encode(body)))
}

fn to_json_any(v: &Value) -> Result<serde_json::Value, ValueError> {
    Ok(match v {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Float(f) => json!(f),
        Value::String(s) => json!(s),
        Value::Bytes(b) => json!(base64::engine::general_purpose::STANDARD.encode(b)),
        other if needs_envelope(other) => encode(other).map(serde_json::Value::String)?,
        other => return Err(ValueError::type_error("encode", format!("unreachable variant {other:?}"))),
    })
}

/// Decodes a value previously produced by [`encode`]. An empty string
/// decodes to `Null`; text without the envelope prefix is passed through
/// unchanged as `Value::String` (the natural host-column case).
pub fn decode(text: &str) -> Result<Value, ValueError> {
    if text.is_empty() {
        return Ok(Value::Null);
    }
    let Some(body) = text.strip_prefix(ENVELOPE_PREFIX) else {
        return Ok(Value::String(text.to_string()));
    };
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(body)
        .map_err(|e| ValueError::conversion("envelope", "Value", e.to_string()))?;
    let envelope: Envelope =
        serde_json::from_slice(&bytes).map_err(|e| ValueError::conversion("envelope", "Value", e.to_string()))?;
    from_envelope(&envelope.ty, envelope.value)
}

fn from_envelope(ty: &str, value: serde_json::Value) -> Result<Value, ValueError> {
    match ty {
        "DATE" => Ok(Value::Date(value.as_i64().ok_or_else(|| bad_envelope(ty))?)),
        "TIME" => {
            let s = value.as_str().ok_or_else(|| bad_envelope(ty))?;
            chrono::NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
                .map(Value::Time)
                .map_err(|e| ValueError::conversion("envelope", "TIME", e.to_string()))
        }
        "DATETIME" => {
            let s = value.as_str().ok_or_else(|| bad_envelope(ty))?;
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .map(Value::Datetime)
                .map_err(|e| ValueError::conversion("envelope", "DATETIME", e.to_string()))
        }
        "TIMESTAMP" => Ok(Value::Timestamp(value.as_i64().ok_or_else(|| bad_envelope(ty))?)),
        "NUMERIC" => Numeric::parse(value.as_str().ok_or_else(|| bad_envelope(ty))?).map(Value::Numeric),
        "BIGNUMERIC" => Numeric::parse(value.as_str().ok_or_else(|| bad_envelope(ty))?).map(Value::BigNumeric),
        "INTERVAL" => {
            let months = value.get("months").and_then(|v| v.as_i64()).ok_or_else(|| bad_envelope(ty))? as i32;
            let days = value.get("days").and_then(|v| v.as_i64()).ok_or_else(|| bad_envelope(ty))? as i32;
            let micros = value.get("micros").and_then(|v| v.as_i64()).ok_or_else(|| bad_envelope(ty))?;
            Ok(Value::Interval(crate::interval::Interval { months, days, micros }))
        }
        "JSON" => Ok(Value::Json(value.as_str().ok_or_else(|| bad_envelope(ty))?.to_string())),
        "ARRAY" => {
            let items = value.as_array().ok_or_else(|| bad_envelope(ty))?;
            let decoded: Result<Vec<_>, _> = items.iter().map(from_json_any).collect();
            Ok(Value::Array(decoded?))
        }
        "STRUCT" => {
            let obj = value.as_object().ok_or_else(|| bad_envelope(ty))?;
            let mut fields = Vec::with_capacity(obj.len());
            for (name, v) in obj {
                fields.push((name.clone(), from_json_any(v)?));
            }
            Ok(Value::Struct(fields))
        }
        other => Err(ValueError::Unimplemented { detail: format!("unknown envelope type tag {other:?}") }),
    }
}

fn from_json_any(v: &serde_json::Value) -> Result<Value, ValueError> {
    Ok(match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        other => return Err(ValueError::type_error("decode", format!("unexpected nested JSON shape {other:?}"))),
    })
}

fn bad_envelope(ty: &str) -> ValueError {
    ValueError::conversion("envelope", ty, "malformed envelope payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;

    #[test]
    fn timestamp_round_trips() {
        let v = Value::Timestamp(1_700_000_000_123_456);
        let encoded = encode(&v).unwrap();
        assert!(encoded.starts_with(ENVELOPE_PREFIX));
        assert_eq!(decode(&encoded).unwrap(), v);
    }

    #[test]
    fn numeric_round_trips_exactly() {
        let v = Value::Numeric(Numeric::parse("123.456000").unwrap());
        let encoded = encode(&v).unwrap();
        assert_eq!(decode(&encoded).unwrap(), v);
    }

    #[test]
    fn interval_round_trips() {
        let v = Value::Interval(Interval::new(1, 2, 3, 4, 5, 6, 7));
        let encoded = encode(&v).unwrap();
        assert_eq!(decode(&encoded).unwrap(), v);
    }

    #[test]
    fn empty_string_is_null() {
        assert_eq!(decode("").unwrap(), Value::Null);
    }

    #[test]
    fn plain_text_without_prefix_passes_through() {
        assert_eq!(decode("hello").unwrap(), Value::String("hello".into()));
    }

    #[test]
    fn array_round_trips() {
        let v = Value::Array(vec![Value::Int(1), Value::Int(2), Value::Null]);
        let encoded = encode(&v).unwrap();
        assert_eq!(decode(&encoded).unwrap(), v);
    }

    #[test]
    fn struct_round_trips() {
        let v = Value::Struct(vec![("a".into(), Value::Int(1)), ("b".into(), Value::String("x".into()))]);
        let encoded = encode(&v).unwrap();
        assert_eq!(decode(&encoded).unwrap(), v);
    }
}
