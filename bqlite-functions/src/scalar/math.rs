//! Math functions. The `safe_*` family (SAFE_DIVIDE, etc) swallows
//! division-by-zero and overflow into NULL instead of surfacing an error.

use crate::convert::{value_error_to_sql, ValueWrapper};
use bqlite_value::{Value, ValueError};
use rusqlite::functions::Context;
use rusqlite::Result;

fn num(ctx: &Context, i: usize) -> Result<Option<f64>> {
    match ctx.get::<ValueWrapper>(i)?.0 {
        Value::Int(n) => Ok(Some(n as f64)),
        Value::Float(f) => Ok(Some(f)),
        Value::Numeric(n) | Value::BigNumeric(n) => Ok(Some(n.to_f64())),
        Value::Null => Ok(None),
        other => Err(value_error_to_sql(ValueError::type_error("math fn", format!("expected numeric, got {:?}", other.type_of())))),
    }
}

macro_rules! unary_math {
    ($name:ident, $f:expr) => {
        pub fn $name(ctx: &Context) -> Result<ValueWrapper> {
            match num(ctx, 0)? {
                None => Ok(ValueWrapper(Value::Null)),
                Some(x) => Ok(ValueWrapper(Value::Float($f(x)))),
            }
        }
    };
}

unary_math!(sys_sqrt, f64::sqrt);
unary_math!(sys_exp, f64::exp);
unary_math!(sys_ln, f64::ln);
unary_math!(sys_log10, f64::log10);
unary_math!(sys_cos, f64::cos);
unary_math!(sys_cosh, f64::cosh);
unary_math!(sys_acos, f64::acos);
unary_math!(sys_acosh, f64::acosh);
unary_math!(sys_sin, f64::sin);
unary_math!(sys_sinh, f64::sinh);
unary_math!(sys_asin, f64::asin);
unary_math!(sys_asinh, f64::asinh);
unary_math!(sys_tan, f64::tan);
unary_math!(sys_tanh, f64::tanh);
unary_math!(sys_atan, f64::atan);
unary_math!(sys_atanh, f64::atanh);

pub fn sys_abs(ctx: &Context) -> Result<ValueWrapper> {
    match ctx.get::<ValueWrapper>(0)?.0 {
        Value::Null => Ok(ValueWrapper(Value::Null)),
        Value::Int(i) => Ok(ValueWrapper(Value::Int(i.abs()))),
        Value::Float(f) => Ok(ValueWrapper(Value::Float(f.abs()))),
        other => Err(value_error_to_sql(ValueError::type_error("sys_abs", format!("expected numeric, got {:?}", other.type_of())))),
    }
}

pub fn sys_sign(ctx: &Context) -> Result<ValueWrapper> {
    match ctx.get::<ValueWrapper>(0)?.0 {
        Value::Null => Ok(ValueWrapper(Value::Null)),
        Value::Int(i) => Ok(ValueWrapper(Value::Int(i.signum()))),
        Value::Float(f) => Ok(ValueWrapper(Value::Float(if f > 0.0 { 1.0 } else if f < 0.0 { -1.0 } else { 0.0 }))),
        other => Err(value_error_to_sql(ValueError::type_error("sys_sign", format!("expected numeric, got {:?}", other.type_of())))),
    }
}

pub fn sys_is_nan(ctx: &Context) -> Result<ValueWrapper> {
    Ok(ValueWrapper(Value::Bool(matches!(ctx.get::<ValueWrapper>(0)?.0, Value::Float(f) if f.is_nan()))))
}

pub fn sys_is_inf(ctx: &Context) -> Result<ValueWrapper> {
    Ok(ValueWrapper(Value::Bool(matches!(ctx.get::<ValueWrapper>(0)?.0, Value::Float(f) if f.is_infinite()))))
}

pub fn sys_pow(ctx: &Context) -> Result<ValueWrapper> {
    match (num(ctx, 0)?, num(ctx, 1)?) {
        (Some(base), Some(exp)) => Ok(ValueWrapper(Value::Float(base.powf(exp)))),
        _ => Ok(ValueWrapper(Value::Null)),
    }
}

pub fn sys_greatest(ctx: &Context) -> Result<ValueWrapper> {
    extreme(ctx, true)
}
pub fn sys_least(ctx: &Context) -> Result<ValueWrapper> {
    extreme(ctx, false)
}

fn extreme(ctx: &Context, want_max: bool) -> Result<ValueWrapper> {
    let mut best: Option<Value> = None;
    for i in 0..ctx.len() {
        let v = ctx.get::<ValueWrapper>(i)?.0;
        if v.is_null() {
            return Ok(ValueWrapper(Value::Null));
        }
        best = Some(match best {
            None => v,
            Some(cur) => {
                let ord = bqlite_value::compare::cmp(&v, &cur, bqlite_value::compare::NullOrdering::First);
                if (want_max && ord == std::cmp::Ordering::Greater) || (!want_max && ord == std::cmp::Ordering::Less) {
                    v
                } else {
                    cur
                }
            }
        });
    }
    Ok(ValueWrapper(best.unwrap_or(Value::Null)))
}

pub fn sys_mod(ctx: &Context) -> Result<ValueWrapper> {
    match (ctx.get::<ValueWrapper>(0)?.0, ctx.get::<ValueWrapper>(1)?.0) {
        (Value::Int(a), Value::Int(b)) => {
            if b == 0 {
                Err(value_error_to_sql(ValueError::DivByZero))
            } else {
                Ok(ValueWrapper(Value::Int(a % b)))
            }
        }
        (Value::Null, _) | (_, Value::Null) => Ok(ValueWrapper(Value::Null)),
        _ => Err(value_error_to_sql(ValueError::type_error("sys_mod", "expected INT64 operands"))),
    }
}

pub fn sys_round(ctx: &Context) -> Result<ValueWrapper> {
    let Some(x) = num(ctx, 0)? else { return Ok(ValueWrapper(Value::Null)) };
    let digits = if ctx.len() > 1 { num(ctx, 1)?.unwrap_or(0.0) as i32 } else { 0 };
    let factor = 10f64.powi(digits);
    Ok(ValueWrapper(Value::Float((x * factor).round() / factor)))
}

pub fn sys_trunc(ctx: &Context) -> Result<ValueWrapper> {
    match num(ctx, 0)? {
        Some(x) => Ok(ValueWrapper(Value::Float(x.trunc()))),
        None => Ok(ValueWrapper(Value::Null)),
    }
}

pub fn sys_ceil(ctx: &Context) -> Result<ValueWrapper> {
    match num(ctx, 0)? {
        Some(x) => Ok(ValueWrapper(Value::Float(x.ceil()))),
        None => Ok(ValueWrapper(Value::Null)),
    }
}

pub fn sys_floor(ctx: &Context) -> Result<ValueWrapper> {
    match num(ctx, 0)? {
        Some(x) => Ok(ValueWrapper(Value::Float(x.floor()))),
        None => Ok(ValueWrapper(Value::Null)),
    }
}

pub fn sys_ieee_divide(ctx: &Context) -> Result<ValueWrapper> {
    match (num(ctx, 0)?, num(ctx, 1)?) {
        (Some(a), Some(b)) => Ok(ValueWrapper(Value::Float(a / b))),
        _ => Ok(ValueWrapper(Value::Null)),
    }
}

pub fn sys_log(ctx: &Context) -> Result<ValueWrapper> {
    match (num(ctx, 0)?, if ctx.len() > 1 { num(ctx, 1)? } else { Some(std::f64::consts::E) }) {
        (Some(x), Some(base)) => Ok(ValueWrapper(Value::Float(x.log(base)))),
        _ => Ok(ValueWrapper(Value::Null)),
    }
}

pub fn sys_div(ctx: &Context) -> Result<ValueWrapper> {
    match (ctx.get::<ValueWrapper>(0)?.0, ctx.get::<ValueWrapper>(1)?.0) {
        (Value::Int(a), Value::Int(b)) => {
            if b == 0 {
                Err(value_error_to_sql(ValueError::DivByZero))
            } else {
                Ok(ValueWrapper(Value::Int(a.div_euclid(b))))
            }
        }
        (Value::Null, _) | (_, Value::Null) => Ok(ValueWrapper(Value::Null)),
        _ => Err(value_error_to_sql(ValueError::type_error("sys_div", "expected INT64 operands"))),
    }
}

pub fn sys_safe_divide(ctx: &Context) -> Result<ValueWrapper> {
    match (ctx.get::<ValueWrapper>(0)?.0, ctx.get::<ValueWrapper>(1)?.0) {
        (a, b) => match bqlite_value::arith::div(&a, &b) {
            Ok(v) => Ok(ValueWrapper(v)),
            Err(_) => Ok(ValueWrapper(Value::Null)),
        },
    }
}
