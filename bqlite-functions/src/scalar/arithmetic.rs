//! `add`/`subtract`/`multiply`/`divide`, comparisons, logical and bitwise
//! operators — the primitives `bqlite-transform` skips straight to the
//! native SQL operator for, registered here only so the non-primitive path
//! (mixed types behind a UDF call, e.g. struct fields) still works.

use crate::convert::{value_error_to_sql, ValueWrapper};
use bqlite_value::{compare, Value, ValueError};
use rusqlite::functions::Context;
use rusqlite::Result;

fn arg(ctx: &Context, i: usize) -> Result<Value> {
    Ok(ctx.get::<ValueWrapper>(i)?.0)
}

pub fn sys_add(ctx: &Context) -> Result<ValueWrapper> {
    binary_arith(ctx, bqlite_value::arith::add)
}
pub fn sys_subtract(ctx: &Context) -> Result<ValueWrapper> {
    binary_arith(ctx, bqlite_value::arith::sub)
}
pub fn sys_multiply(ctx: &Context) -> Result<ValueWrapper> {
    binary_arith(ctx, bqlite_value::arith::mul)
}
pub fn sys_divide(ctx: &Context) -> Result<ValueWrapper> {
    binary_arith(ctx, bqlite_value::arith::div)
}

fn binary_arith(ctx: &Context, f: fn(&Value, &Value) -> Result<Value, ValueError>) -> Result<ValueWrapper> {
    let a = arg(ctx, 0)?;
    let b = arg(ctx, 1)?;
    f(&a, &b).map(ValueWrapper).map_err(value_error_to_sql)
}

pub fn sys_equal(ctx: &Context) -> Result<ValueWrapper> {
    cmp_fn(ctx, |o| o == std::cmp::Ordering::Equal, true)
}
pub fn sys_not_equal(ctx: &Context) -> Result<ValueWrapper> {
    cmp_fn(ctx, |o| o != std::cmp::Ordering::Equal, true)
}
pub fn sys_greater(ctx: &Context) -> Result<ValueWrapper> {
    cmp_fn(ctx, |o| o == std::cmp::Ordering::Greater, false)
}
pub fn sys_less(ctx: &Context) -> Result<ValueWrapper> {
    cmp_fn(ctx, |o| o == std::cmp::Ordering::Less, false)
}
pub fn sys_greater_or_equal(ctx: &Context) -> Result<ValueWrapper> {
    cmp_fn(ctx, |o| o != std::cmp::Ordering::Less, false)
}
pub fn sys_less_or_equal(ctx: &Context) -> Result<ValueWrapper> {
    cmp_fn(ctx, |o| o != std::cmp::Ordering::Greater, false)
}

fn cmp_fn(ctx: &Context, pred: impl Fn(std::cmp::Ordering) -> bool, eq_semantics: bool) -> Result<ValueWrapper> {
    let a = arg(ctx, 0)?;
    let b = arg(ctx, 1)?;
    if a.is_null() || b.is_null() {
        return Ok(ValueWrapper(Value::Null));
    }
    let result = if eq_semantics {
        let eq = compare::eq(&a, &b);
        pred(if eq { std::cmp::Ordering::Equal } else { std::cmp::Ordering::Less })
    } else {
        pred(compare::cmp(&a, &b, compare::NullOrdering::First))
    };
    Ok(ValueWrapper(Value::Bool(result)))
}

pub fn sys_and(ctx: &Context) -> Result<ValueWrapper> {
    let a = arg(ctx, 0)?;
    let b = arg(ctx, 1)?;
    Ok(ValueWrapper(match (as_bool(&a), as_bool(&b)) {
        (Some(false), _) | (_, Some(false)) => Value::Bool(false),
        (Some(true), Some(true)) => Value::Bool(true),
        _ => Value::Null,
    }))
}

pub fn sys_or(ctx: &Context) -> Result<ValueWrapper> {
    let a = arg(ctx, 0)?;
    let b = arg(ctx, 1)?;
    Ok(ValueWrapper(match (as_bool(&a), as_bool(&b)) {
        (Some(true), _) | (_, Some(true)) => Value::Bool(true),
        (Some(false), Some(false)) => Value::Bool(false),
        _ => Value::Null,
    }))
}

pub fn sys_not(ctx: &Context) -> Result<ValueWrapper> {
    let a = arg(ctx, 0)?;
    Ok(ValueWrapper(match as_bool(&a) {
        Some(b) => Value::Bool(!b),
        None => Value::Null,
    }))
}

fn as_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Null => None,
        _ => None,
    }
}

macro_rules! bitwise_binop {
    ($name:ident, $op:tt) => {
        pub fn $name(ctx: &Context) -> Result<ValueWrapper> {
            let a = arg(ctx, 0)?;
            let b = arg(ctx, 1)?;
            match (a, b) {
                (Value::Int(x), Value::Int(y)) => Ok(ValueWrapper(Value::Int(x $op y))),
                (Value::Null, _) | (_, Value::Null) => Ok(ValueWrapper(Value::Null)),
                _ => Err(value_error_to_sql(ValueError::type_error(stringify!($name), "expected INT64 operands"))),
            }
        }
    };
}

bitwise_binop!(sys_bitwise_and, &);
bitwise_binop!(sys_bitwise_or, |);
bitwise_binop!(sys_bitwise_xor, ^);
bitwise_binop!(sys_left_shift, <<);
bitwise_binop!(sys_right_shift, >>);

pub fn sys_bitwise_not(ctx: &Context) -> Result<ValueWrapper> {
    match arg(ctx, 0)? {
        Value::Int(x) => Ok(ValueWrapper(Value::Int(!x))),
        Value::Null => Ok(ValueWrapper(Value::Null)),
        _ => Err(value_error_to_sql(ValueError::type_error("sys_bitwise_not", "expected INT64"))),
    }
}
