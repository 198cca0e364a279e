//! Array/struct helpers plus the `sys_cast`/`sys_make_struct`/
//! `sys_get_struct_field` calls the transformer emits for CAST and struct
//! construction/access.

use crate::convert::{value_error_to_sql, ValueWrapper};
use bqlite_value::{cast, Value, ValueError};
use rusqlite::functions::Context;
use rusqlite::Result;

pub fn sys_cast(ctx: &Context) -> Result<ValueWrapper> {
    let input = ctx.get::<ValueWrapper>(0)?.0;
    let to_text = match ctx.get::<ValueWrapper>(1)?.0 {
        Value::String(s) => s,
        other => return Err(value_error_to_sql(ValueError::type_error("sys_cast", format!("target type must be STRING, got {:?}", other.type_of())))),
    };
    let safe = matches!(ctx.get::<ValueWrapper>(2)?.0, Value::Bool(true) | Value::Int(1));
    let ty = parse_type_name(&to_text).ok_or_else(|| value_error_to_sql(ValueError::Unimplemented { detail: format!("unrecognized cast target {to_text}") }))?;
    let result = if safe { cast::safe_cast(&input, &ty) } else { cast::cast(&input, &ty).map_err(value_error_to_sql)? };
    Ok(ValueWrapper(result))
}

/// Parses the scalar subset of a type's display text (`INT64`, `ARRAY<T>`,
/// ...); struct types are not round-tripped through this path since CAST
/// to STRUCT is not part of the supported matrix.
fn parse_type_name(text: &str) -> Option<bqlite_value::Type> {
    use bqlite_value::Type;
    let text = text.trim();
    if let Some(inner) = text.strip_prefix("ARRAY<").and_then(|s| s.strip_suffix('>')) {
        return parse_type_name(inner).map(|t| Type::Array(Box::new(t)));
    }
    Some(match text.to_ascii_uppercase().as_str() {
        "INT64" | "INTEGER" => Type::Int64,
        "FLOAT64" | "FLOAT" => Type::Float64,
        "BOOL" | "BOOLEAN" => Type::Bool,
        "STRING" => Type::String,
        "BYTES" => Type::Bytes,
        "DATE" => Type::Date,
        "DATETIME" => Type::Datetime,
        "TIME" => Type::Time,
        "TIMESTAMP" => Type::Timestamp,
        "NUMERIC" => Type::Numeric,
        "BIGNUMERIC" => Type::BigNumeric,
        "INTERVAL" => Type::Interval,
        "JSON" => Type::Json,
        _ => return None,
    })
}

pub fn sys_make_struct(ctx: &Context) -> Result<ValueWrapper> {
    let mut fields = Vec::new();
    for i in 0..ctx.len() {
        fields.push((format!("f{i}"), ctx.get::<ValueWrapper>(i)?.0));
    }
    Ok(ValueWrapper(Value::Struct(fields)))
}

pub fn sys_get_struct_field(ctx: &Context) -> Result<ValueWrapper> {
    let input = ctx.get::<ValueWrapper>(0)?.0;
    let index = match ctx.get::<ValueWrapper>(1)?.0 {
        Value::Int(i) => i as usize,
        _ => return Err(value_error_to_sql(ValueError::type_error("sys_get_struct_field", "index must be INT64"))),
    };
    match input.struct_field_at(index) {
        Some(v) => Ok(ValueWrapper(v.clone())),
        None => Ok(ValueWrapper(Value::Null)),
    }
}

pub fn sys_array_length(ctx: &Context) -> Result<ValueWrapper> {
    match ctx.get::<ValueWrapper>(0)?.0 {
        Value::Array(items) => Ok(ValueWrapper(Value::Int(items.len() as i64))),
        Value::Null => Ok(ValueWrapper(Value::Null)),
        other => Err(value_error_to_sql(ValueError::type_error("sys_array_length", format!("expected ARRAY, got {:?}", other.type_of())))),
    }
}

pub fn sys_array_at_offset(ctx: &Context) -> Result<ValueWrapper> {
    let Value::Array(items) = ctx.get::<ValueWrapper>(0)?.0 else {
        return Err(value_error_to_sql(ValueError::type_error("sys_array_at_offset", "expected ARRAY")));
    };
    let offset = match ctx.get::<ValueWrapper>(1)?.0 {
        Value::Int(n) => n,
        _ => return Err(value_error_to_sql(ValueError::type_error("sys_array_at_offset", "offset must be INT64"))),
    };
    let idx = if offset >= 0 { offset as usize } else { (items.len() as i64 + offset) as usize };
    Ok(ValueWrapper(items.get(idx).cloned().unwrap_or(Value::Null)))
}

pub fn sys_array_at_ordinal(ctx: &Context) -> Result<ValueWrapper> {
    let Value::Array(items) = ctx.get::<ValueWrapper>(0)?.0 else {
        return Err(value_error_to_sql(ValueError::type_error("sys_array_at_ordinal", "expected ARRAY")));
    };
    let ordinal = match ctx.get::<ValueWrapper>(1)?.0 {
        Value::Int(n) => n,
        _ => return Err(value_error_to_sql(ValueError::type_error("sys_array_at_ordinal", "ordinal must be INT64"))),
    };
    if ordinal < 1 {
        return Err(value_error_to_sql(ValueError::type_error("sys_array_at_ordinal", "ordinal is 1-based")));
    }
    Ok(ValueWrapper(items.get(ordinal as usize - 1).cloned().unwrap_or(Value::Null)))
}

pub fn sys_array_concat(ctx: &Context) -> Result<ValueWrapper> {
    let mut out = Vec::new();
    for i in 0..ctx.len() {
        match ctx.get::<ValueWrapper>(i)?.0 {
            Value::Array(items) => out.extend(items),
            Value::Null => {}
            other => return Err(value_error_to_sql(ValueError::type_error("sys_array_concat", format!("expected ARRAY, got {:?}", other.type_of())))),
        }
    }
    Ok(ValueWrapper(Value::Array(out)))
}

pub fn sys_array_reverse(ctx: &Context) -> Result<ValueWrapper> {
    match ctx.get::<ValueWrapper>(0)?.0 {
        Value::Array(mut items) => {
            items.reverse();
            Ok(ValueWrapper(Value::Array(items)))
        }
        Value::Null => Ok(ValueWrapper(Value::Null)),
        other => Err(value_error_to_sql(ValueError::type_error("sys_array_reverse", format!("expected ARRAY, got {:?}", other.type_of())))),
    }
}

pub fn sys_array_to_string(ctx: &Context) -> Result<ValueWrapper> {
    let Value::Array(items) = ctx.get::<ValueWrapper>(0)?.0 else {
        return Err(value_error_to_sql(ValueError::type_error("sys_array_to_string", "expected ARRAY")));
    };
    let sep = match ctx.get::<ValueWrapper>(1)?.0 {
        Value::String(s) => s,
        _ => return Err(value_error_to_sql(ValueError::type_error("sys_array_to_string", "separator must be STRING"))),
    };
    let parts: Vec<String> = items
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(format!("{other:?}")),
        })
        .collect();
    Ok(ValueWrapper(Value::String(parts.join(&sep))))
}

pub fn sys_generate_array(ctx: &Context) -> Result<ValueWrapper> {
    let start = match ctx.get::<ValueWrapper>(0)?.0 {
        Value::Int(n) => n,
        Value::Null => return Ok(ValueWrapper(Value::Null)),
        _ => return Err(value_error_to_sql(ValueError::type_error("sys_generate_array", "start must be INT64"))),
    };
    let end = match ctx.get::<ValueWrapper>(1)?.0 {
        Value::Int(n) => n,
        Value::Null => return Ok(ValueWrapper(Value::Null)),
        _ => return Err(value_error_to_sql(ValueError::type_error("sys_generate_array", "end must be INT64"))),
    };
    let step = if ctx.len() > 2 {
        match ctx.get::<ValueWrapper>(2)?.0 {
            Value::Int(n) => n,
            _ => 1,
        }
    } else {
        1
    };
    if step == 0 {
        return Err(value_error_to_sql(ValueError::type_error("sys_generate_array", "step must be nonzero")));
    }
    let mut out = Vec::new();
    let mut current = start;
    while (step > 0 && current <= end) || (step < 0 && current >= end) {
        out.push(Value::Int(current));
        current += step;
    }
    Ok(ValueWrapper(Value::Array(out)))
}
