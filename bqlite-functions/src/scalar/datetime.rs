//! Date/time/datetime/timestamp functions. `current_*` functions receive
//! their frozen-now argument appended by the transformer so that repeated
//! calls within one statement agree, rather than sampling the wall clock
//! per-row.

use crate::convert::{value_error_to_sql, ValueWrapper};
use bqlite_value::{datetime, Interval, Value, ValueError};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use rusqlite::functions::Context;
use rusqlite::Result;

fn as_date(v: &Value) -> Option<NaiveDate> {
    match v {
        Value::Date(days) => datetime::days_to_date(*days).ok(),
        _ => None,
    }
}

fn as_timestamp_micros(v: &Value) -> Option<i64> {
    match v {
        Value::Timestamp(micros) => Some(*micros),
        _ => None,
    }
}

/// Reads the frozen-now micros from argument 0 when the caller supplied one,
/// else samples the wall clock directly (a bare `SELECT CURRENT_DATE()` with
/// no surrounding statement-level freeze).
fn frozen_now_micros(ctx: &Context) -> Result<i64> {
    if ctx.len() == 0 {
        return Ok(Utc::now().timestamp_micros());
    }
    let frozen = ctx.get::<ValueWrapper>(0)?.0;
    as_timestamp_micros(&frozen).ok_or_else(|| value_error_to_sql(ValueError::type_error("current_*", "expected frozen TIMESTAMP")))
}

pub fn sys_current_date(ctx: &Context) -> Result<ValueWrapper> {
    let dt = micros_to_datetime(frozen_now_micros(ctx)?);
    Ok(ValueWrapper(Value::Date(datetime::date_to_days(&dt.date()))))
}

pub fn sys_current_timestamp(ctx: &Context) -> Result<ValueWrapper> {
    Ok(ValueWrapper(Value::Timestamp(frozen_now_micros(ctx)?)))
}

pub fn sys_current_datetime(ctx: &Context) -> Result<ValueWrapper> {
    Ok(ValueWrapper(Value::Datetime(micros_to_datetime(frozen_now_micros(ctx)?))))
}

fn micros_to_datetime(micros: i64) -> NaiveDateTime {
    let secs = micros.div_euclid(1_000_000);
    let subsec_micros = micros.rem_euclid(1_000_000) as u32;
    DateTime::<Utc>::from_timestamp(secs, subsec_micros * 1000).unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap()).naive_utc()
}

pub fn sys_date_add(ctx: &Context) -> Result<ValueWrapper> {
    let Some(date) = as_date(&ctx.get::<ValueWrapper>(0)?.0) else { return Ok(ValueWrapper(Value::Null)) };
    let amount = match ctx.get::<ValueWrapper>(1)?.0 {
        Value::Int(n) => n,
        Value::Null => return Ok(ValueWrapper(Value::Null)),
        _ => return Err(value_error_to_sql(ValueError::type_error("sys_date_add", "amount must be INT64"))),
    };
    let unit = part_name(ctx, 2)?;
    let result = add_to_date(date, amount, &unit)?;
    Ok(ValueWrapper(Value::Date(datetime::date_to_days(&result))))
}

pub fn sys_date_sub(ctx: &Context) -> Result<ValueWrapper> {
    let Some(date) = as_date(&ctx.get::<ValueWrapper>(0)?.0) else { return Ok(ValueWrapper(Value::Null)) };
    let amount = match ctx.get::<ValueWrapper>(1)?.0 {
        Value::Int(n) => -n,
        Value::Null => return Ok(ValueWrapper(Value::Null)),
        _ => return Err(value_error_to_sql(ValueError::type_error("sys_date_sub", "amount must be INT64"))),
    };
    let unit = part_name(ctx, 2)?;
    let result = add_to_date(date, amount, &unit)?;
    Ok(ValueWrapper(Value::Date(datetime::date_to_days(&result))))
}

fn part_name(ctx: &Context, i: usize) -> Result<String> {
    match ctx.get::<ValueWrapper>(i)?.0 {
        Value::String(s) => Ok(s.to_ascii_uppercase()),
        _ => Err(value_error_to_sql(ValueError::type_error("date part", "expected a date-part name"))),
    }
}

fn add_to_date(date: NaiveDate, amount: i64, unit: &str) -> Result<NaiveDate> {
    match unit {
        "DAY" => date
            .checked_add_signed(Duration::days(amount))
            .ok_or_else(|| value_error_to_sql(ValueError::Overflow { detail: "date arithmetic out of range".into() })),
        "WEEK" => date
            .checked_add_signed(Duration::weeks(amount))
            .ok_or_else(|| value_error_to_sql(ValueError::Overflow { detail: "date arithmetic out of range".into() })),
        "MONTH" => apply_months(date, amount as i32),
        "YEAR" => apply_months(date, amount as i32 * 12),
        _ => Err(value_error_to_sql(ValueError::Unimplemented { detail: format!("date part {unit}") })),
    }
}

fn apply_months(date: NaiveDate, months: i32) -> Result<NaiveDate> {
    let iv = Interval::new(0, months, 0, 0, 0, 0, 0);
    let dt = NaiveDateTime::new(date, NaiveTime::MIN);
    iv.apply_to_datetime(dt).map(|d| d.date()).map_err(value_error_to_sql)
}

pub fn sys_date_diff(ctx: &Context) -> Result<ValueWrapper> {
    let (Some(a), Some(b)) = (as_date(&ctx.get::<ValueWrapper>(0)?.0), as_date(&ctx.get::<ValueWrapper>(1)?.0)) else {
        return Ok(ValueWrapper(Value::Null));
    };
    let unit = part_name(ctx, 2)?;
    let days = (a - b).num_days();
    let result = match unit.as_str() {
        "DAY" => days,
        "WEEK" => days / 7,
        _ => return Err(value_error_to_sql(ValueError::Unimplemented { detail: format!("date diff unit {unit}") })),
    };
    Ok(ValueWrapper(Value::Int(result)))
}

pub fn sys_date_trunc(ctx: &Context) -> Result<ValueWrapper> {
    let Some(date) = as_date(&ctx.get::<ValueWrapper>(0)?.0) else { return Ok(ValueWrapper(Value::Null)) };
    let unit = part_name(ctx, 1)?;
    let truncated = match unit.as_str() {
        "DAY" => date,
        "MONTH" => NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap(),
        "YEAR" => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap(),
        "WEEK" => date - Duration::days(date.weekday().num_days_from_sunday() as i64),
        _ => return Err(value_error_to_sql(ValueError::Unimplemented { detail: format!("date trunc unit {unit}") })),
    };
    Ok(ValueWrapper(Value::Date(datetime::date_to_days(&truncated))))
}

pub fn sys_extract(ctx: &Context) -> Result<ValueWrapper> {
    let part = part_name(ctx, 0)?;
    let v = ctx.get::<ValueWrapper>(1)?.0;
    let date = match &v {
        Value::Date(_) => as_date(&v),
        Value::Datetime(dt) => Some(dt.date()),
        Value::Timestamp(micros) => Some(micros_to_datetime(*micros).date()),
        Value::Null => return Ok(ValueWrapper(Value::Null)),
        _ => None,
    };
    let Some(date) = date else {
        return Err(value_error_to_sql(ValueError::type_error("sys_extract", "expected a date-bearing type")));
    };
    let result = match part.as_str() {
        "YEAR" => date.year() as i64,
        "MONTH" => date.month() as i64,
        "DAY" => date.day() as i64,
        "DAYOFWEEK" => date.weekday().num_days_from_sunday() as i64 + 1,
        "DAYOFYEAR" => date.ordinal() as i64,
        "QUARTER" => (date.month() as i64 - 1) / 3 + 1,
        "HOUR" | "MINUTE" | "SECOND" => extract_time_part(&v, &part)?,
        _ => return Err(value_error_to_sql(ValueError::Unimplemented { detail: format!("extract part {part}") })),
    };
    Ok(ValueWrapper(Value::Int(result)))
}

fn extract_time_part(v: &Value, part: &str) -> Result<i64> {
    let time = match v {
        Value::Datetime(dt) => dt.time(),
        Value::Timestamp(micros) => micros_to_datetime(*micros).time(),
        Value::Time(t) => *t,
        _ => return Err(value_error_to_sql(ValueError::type_error("sys_extract", "expected a time-bearing type"))),
    };
    Ok(match part {
        "HOUR" => time.hour() as i64,
        "MINUTE" => time.minute() as i64,
        "SECOND" => time.second() as i64,
        _ => unreachable!(),
    })
}

pub fn sys_last_day(ctx: &Context) -> Result<ValueWrapper> {
    let Some(date) = as_date(&ctx.get::<ValueWrapper>(0)?.0) else { return Ok(ValueWrapper(Value::Null)) };
    let (next_year, next_month) = if date.month() == 12 { (date.year() + 1, 1) } else { (date.year(), date.month() + 1) };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| value_error_to_sql(ValueError::Overflow { detail: "LAST_DAY out of range".into() }))?;
    let last = first_of_next.pred_opt().ok_or_else(|| value_error_to_sql(ValueError::Overflow { detail: "LAST_DAY out of range".into() }))?;
    Ok(ValueWrapper(Value::Date(datetime::date_to_days(&last))))
}

pub fn sys_date_from_unix_date(ctx: &Context) -> Result<ValueWrapper> {
    match ctx.get::<ValueWrapper>(0)?.0 {
        Value::Int(days) => Ok(ValueWrapper(Value::Date(days))),
        Value::Null => Ok(ValueWrapper(Value::Null)),
        _ => Err(value_error_to_sql(ValueError::type_error("sys_date_from_unix_date", "expected INT64"))),
    }
}

pub fn sys_unix_date(ctx: &Context) -> Result<ValueWrapper> {
    match ctx.get::<ValueWrapper>(0)?.0 {
        Value::Date(days) => Ok(ValueWrapper(Value::Int(days))),
        Value::Null => Ok(ValueWrapper(Value::Null)),
        _ => Err(value_error_to_sql(ValueError::type_error("sys_unix_date", "expected DATE"))),
    }
}

pub fn sys_timestamp_seconds(ctx: &Context) -> Result<ValueWrapper> {
    scale_to_micros(ctx, 1_000_000)
}
pub fn sys_timestamp_millis(ctx: &Context) -> Result<ValueWrapper> {
    scale_to_micros(ctx, 1_000)
}
pub fn sys_timestamp_micros(ctx: &Context) -> Result<ValueWrapper> {
    scale_to_micros(ctx, 1)
}

fn scale_to_micros(ctx: &Context, scale: i64) -> Result<ValueWrapper> {
    match ctx.get::<ValueWrapper>(0)?.0 {
        Value::Int(n) => Ok(ValueWrapper(Value::Timestamp(n * scale))),
        Value::Null => Ok(ValueWrapper(Value::Null)),
        _ => Err(value_error_to_sql(ValueError::type_error("timestamp_*", "expected INT64"))),
    }
}

pub fn sys_unix_seconds(ctx: &Context) -> Result<ValueWrapper> {
    unix_scaled(ctx, 1_000_000)
}
pub fn sys_unix_millis(ctx: &Context) -> Result<ValueWrapper> {
    unix_scaled(ctx, 1_000)
}
pub fn sys_unix_micros(ctx: &Context) -> Result<ValueWrapper> {
    unix_scaled(ctx, 1)
}

fn unix_scaled(ctx: &Context, scale: i64) -> Result<ValueWrapper> {
    match ctx.get::<ValueWrapper>(0)?.0 {
        Value::Timestamp(micros) => Ok(ValueWrapper(Value::Int(micros.div_euclid(scale)))),
        Value::Null => Ok(ValueWrapper(Value::Null)),
        _ => Err(value_error_to_sql(ValueError::type_error("unix_*", "expected TIMESTAMP"))),
    }
}
