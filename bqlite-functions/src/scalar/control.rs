//! `coalesce` and `nullif`. `IF`/`IFNULL`/`CASE` are rewritten to native
//! `CASE` by the transformer and never reach a registered function.

use crate::convert::ValueWrapper;
use bqlite_value::{compare, Value};
use rusqlite::functions::Context;
use rusqlite::Result;

pub fn sys_coalesce(ctx: &Context) -> Result<ValueWrapper> {
    for i in 0..ctx.len() {
        let v = ctx.get::<ValueWrapper>(i)?.0;
        if !v.is_null() {
            return Ok(ValueWrapper(v));
        }
    }
    Ok(ValueWrapper(Value::Null))
}

pub fn sys_nullif(ctx: &Context) -> Result<ValueWrapper> {
    let a = ctx.get::<ValueWrapper>(0)?.0;
    let b = ctx.get::<ValueWrapper>(1)?.0;
    Ok(ValueWrapper(if compare::eq(&a, &b) { Value::Null } else { a }))
}
