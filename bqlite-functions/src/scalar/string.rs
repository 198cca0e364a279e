//! String functions. Byte offsets follow BigQuery's 1-based, Unicode
//! codepoint-indexed convention, not Rust's byte indices.

use crate::convert::{value_error_to_sql, ValueWrapper};
use base64::Engine as _;
use bqlite_value::{Value, ValueError};
use regex::Regex;
use rusqlite::functions::Context;
use rusqlite::Result;

fn text(ctx: &Context, i: usize) -> Result<Option<String>> {
    match ctx.get::<ValueWrapper>(i)?.0 {
        Value::String(s) => Ok(Some(s)),
        Value::Null => Ok(None),
        other => Err(value_error_to_sql(ValueError::type_error("string fn", format!("expected STRING, got {:?}", other.type_of())))),
    }
}

macro_rules! null_propagating_unary {
    ($name:ident, $body:expr) => {
        pub fn $name(ctx: &Context) -> Result<ValueWrapper> {
            match text(ctx, 0)? {
                None => Ok(ValueWrapper(Value::Null)),
                Some(s) => Ok(ValueWrapper($body(s))),
            }
        }
    };
}

null_propagating_unary!(sys_upper, |s: String| Value::String(s.to_uppercase()));
null_propagating_unary!(sys_lower, |s: String| Value::String(s.to_lowercase()));
null_propagating_unary!(sys_trim, |s: String| Value::String(s.trim().to_string()));
null_propagating_unary!(sys_ltrim, |s: String| Value::String(s.trim_start().to_string()));
null_propagating_unary!(sys_rtrim, |s: String| Value::String(s.trim_end().to_string()));
null_propagating_unary!(sys_length, |s: String| Value::Int(s.chars().count() as i64));
null_propagating_unary!(sys_to_base64, |s: String| Value::String(base64::engine::general_purpose::STANDARD.encode(s)));

pub fn sys_concat(ctx: &Context) -> Result<ValueWrapper> {
    let mut out = String::new();
    for i in 0..ctx.len() {
        match ctx.get::<ValueWrapper>(i)?.0 {
            Value::Null => return Ok(ValueWrapper(Value::Null)),
            Value::String(s) => out.push_str(&s),
            other => return Err(value_error_to_sql(ValueError::type_error("sys_concat", format!("expected STRING, got {:?}", other.type_of())))),
        }
    }
    Ok(ValueWrapper(Value::String(out)))
}

pub fn sys_substr(ctx: &Context) -> Result<ValueWrapper> {
    let Some(s) = text(ctx, 0)? else { return Ok(ValueWrapper(Value::Null)) };
    let pos = match ctx.get::<ValueWrapper>(1)?.0 {
        Value::Int(i) => i,
        Value::Null => return Ok(ValueWrapper(Value::Null)),
        _ => return Err(value_error_to_sql(ValueError::type_error("sys_substr", "position must be INT64"))),
    };
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let start = if pos > 0 { pos - 1 } else { (len + pos).max(0) };
    let start = start.clamp(0, len) as usize;
    let take = if ctx.len() > 2 {
        match ctx.get::<ValueWrapper>(2)?.0 {
            Value::Int(n) => n.max(0) as usize,
            Value::Null => return Ok(ValueWrapper(Value::Null)),
            _ => return Err(value_error_to_sql(ValueError::type_error("sys_substr", "length must be INT64"))),
        }
    } else {
        chars.len()
    };
    let result: String = chars.into_iter().skip(start).take(take).collect();
    Ok(ValueWrapper(Value::String(result)))
}

pub fn sys_replace(ctx: &Context) -> Result<ValueWrapper> {
    let (Some(s), Some(from), Some(to)) = (text(ctx, 0)?, text(ctx, 1)?, text(ctx, 2)?) else {
        return Ok(ValueWrapper(Value::Null));
    };
    Ok(ValueWrapper(Value::String(s.replace(&from, &to))))
}

pub fn sys_strpos(ctx: &Context) -> Result<ValueWrapper> {
    let (Some(s), Some(needle)) = (text(ctx, 0)?, text(ctx, 1)?) else {
        return Ok(ValueWrapper(Value::Null));
    };
    let byte_pos = s.find(&needle);
    let pos = match byte_pos {
        Some(b) => s[..b].chars().count() as i64 + 1,
        None => 0,
    };
    Ok(ValueWrapper(Value::Int(pos)))
}

pub fn sys_lpad(ctx: &Context) -> Result<ValueWrapper> {
    pad(ctx, true)
}
pub fn sys_rpad(ctx: &Context) -> Result<ValueWrapper> {
    pad(ctx, false)
}

fn pad(ctx: &Context, left: bool) -> Result<ValueWrapper> {
    let Some(s) = text(ctx, 0)? else { return Ok(ValueWrapper(Value::Null)) };
    let target_len = match ctx.get::<ValueWrapper>(1)?.0 {
        Value::Int(n) => n.max(0) as usize,
        Value::Null => return Ok(ValueWrapper(Value::Null)),
        _ => return Err(value_error_to_sql(ValueError::type_error("sys_lpad", "length must be INT64"))),
    };
    let fill = if ctx.len() > 2 { text(ctx, 2)?.unwrap_or_else(|| " ".into()) } else { " ".into() };
    let chars: Vec<char> = s.chars().collect();
    if chars.len() >= target_len || fill.is_empty() {
        let truncated: String = chars.into_iter().take(target_len).collect();
        return Ok(ValueWrapper(Value::String(truncated)));
    }
    let fill_chars: Vec<char> = fill.chars().collect();
    let needed = target_len - chars.len();
    let padding: String = fill_chars.iter().cycle().take(needed).collect();
    let result = if left { format!("{padding}{s}") } else { format!("{s}{padding}") };
    Ok(ValueWrapper(Value::String(result)))
}

pub fn sys_regexp_contains(ctx: &Context) -> Result<ValueWrapper> {
    let (Some(s), Some(pat)) = (text(ctx, 0)?, text(ctx, 1)?) else {
        return Ok(ValueWrapper(Value::Null));
    };
    let re = Regex::new(&pat).map_err(|e| value_error_to_sql(ValueError::type_error("sys_regexp_contains", e.to_string())))?;
    Ok(ValueWrapper(Value::Bool(re.is_match(&s))))
}

pub fn sys_regexp_extract(ctx: &Context) -> Result<ValueWrapper> {
    let (Some(s), Some(pat)) = (text(ctx, 0)?, text(ctx, 1)?) else {
        return Ok(ValueWrapper(Value::Null));
    };
    let re = Regex::new(&pat).map_err(|e| value_error_to_sql(ValueError::type_error("sys_regexp_extract", e.to_string())))?;
    match re.captures(&s) {
        Some(caps) => {
            let m = caps.get(if caps.len() > 1 { 1 } else { 0 });
            Ok(ValueWrapper(m.map(|m| Value::String(m.as_str().to_string())).unwrap_or(Value::Null)))
        }
        None => Ok(ValueWrapper(Value::Null)),
    }
}

pub fn sys_regexp_replace(ctx: &Context) -> Result<ValueWrapper> {
    let (Some(s), Some(pat), Some(rep)) = (text(ctx, 0)?, text(ctx, 1)?, text(ctx, 2)?) else {
        return Ok(ValueWrapper(Value::Null));
    };
    let re = Regex::new(&pat).map_err(|e| value_error_to_sql(ValueError::type_error("sys_regexp_replace", e.to_string())))?;
    Ok(ValueWrapper(Value::String(re.replace_all(&s, rep.as_str()).into_owned())))
}

pub fn sys_split(ctx: &Context) -> Result<ValueWrapper> {
    let Some(s) = text(ctx, 0)? else { return Ok(ValueWrapper(Value::Null)) };
    let delim = if ctx.len() > 1 { text(ctx, 1)?.unwrap_or_else(|| ",".into()) } else { ",".into() };
    let parts: Vec<Value> = if delim.is_empty() {
        s.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        s.split(delim.as_str()).map(|p| Value::String(p.to_string())).collect()
    };
    Ok(ValueWrapper(Value::Array(parts)))
}
