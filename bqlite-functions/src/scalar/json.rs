//! JSON accessor and constructor functions. `Value::Json` carries its
//! serialized text directly; these functions parse it lazily.

use crate::convert::{value_error_to_sql, ValueWrapper};
use bqlite_value::{Value, ValueError};
use rusqlite::functions::Context;
use rusqlite::Result;
use serde_json::Value as Json;

fn parse(v: &Value) -> Result<Option<Json>> {
    match v {
        Value::Json(text) => serde_json::from_str(text).map(Some).map_err(|e| value_error_to_sql(ValueError::conversion("JSON", "parsed", e.to_string()))),
        Value::Null => Ok(None),
        other => Err(value_error_to_sql(ValueError::type_error("json fn", format!("expected JSON, got {:?}", other.type_of())))),
    }
}

fn to_json_value(v: &Value) -> Json {
    match v {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
        Value::String(s) => Json::String(s.clone()),
        Value::Json(text) => serde_json::from_str(text).unwrap_or(Json::Null),
        Value::Array(items) => Json::Array(items.iter().map(to_json_value).collect()),
        Value::Struct(fields) => Json::Object(fields.iter().map(|(k, v)| (k.clone(), to_json_value(v))).collect()),
        other => Json::String(bqlite_value::codec::encode(other).unwrap_or_default()),
    }
}

pub fn sys_to_json_string(ctx: &Context) -> Result<ValueWrapper> {
    let v = ctx.get::<ValueWrapper>(0)?.0;
    if v.is_null() {
        return Ok(ValueWrapper(Value::Null));
    }
    Ok(ValueWrapper(Value::String(to_json_value(&v).to_string())))
}

pub fn sys_to_json(ctx: &Context) -> Result<ValueWrapper> {
    let v = ctx.get::<ValueWrapper>(0)?.0;
    if v.is_null() {
        return Ok(ValueWrapper(Value::Null));
    }
    Ok(ValueWrapper(Value::Json(to_json_value(&v).to_string())))
}

pub fn sys_json_type(ctx: &Context) -> Result<ValueWrapper> {
    let Some(j) = parse(&ctx.get::<ValueWrapper>(0)?.0)? else { return Ok(ValueWrapper(Value::Null)) };
    let ty = match j {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    };
    Ok(ValueWrapper(Value::String(ty.to_string())))
}

fn navigate<'a>(mut cur: &'a Json, path: &str) -> Option<&'a Json> {
    for part in path.trim_start_matches('$').split('.').filter(|p| !p.is_empty()) {
        cur = cur.get(part)?;
    }
    Some(cur)
}

pub fn sys_json_extract(ctx: &Context) -> Result<ValueWrapper> {
    let Some(j) = parse(&ctx.get::<ValueWrapper>(0)?.0)? else { return Ok(ValueWrapper(Value::Null)) };
    let path = match ctx.get::<ValueWrapper>(1)?.0 {
        Value::String(s) => s,
        _ => return Err(value_error_to_sql(ValueError::type_error("sys_json_extract", "path must be STRING"))),
    };
    Ok(ValueWrapper(match navigate(&j, &path) {
        Some(v) => Value::Json(v.to_string()),
        None => Value::Null,
    }))
}

pub fn sys_json_extract_scalar(ctx: &Context) -> Result<ValueWrapper> {
    let Some(j) = parse(&ctx.get::<ValueWrapper>(0)?.0)? else { return Ok(ValueWrapper(Value::Null)) };
    let path = match ctx.get::<ValueWrapper>(1)?.0 {
        Value::String(s) => s,
        _ => return Err(value_error_to_sql(ValueError::type_error("sys_json_extract_scalar", "path must be STRING"))),
    };
    Ok(ValueWrapper(match navigate(&j, &path) {
        Some(Json::String(s)) => Value::String(s.clone()),
        Some(other) => Value::String(other.to_string()),
        None => Value::Null,
    }))
}
