//! Aggregate UDFs. Each `Aggregate` implementation accumulates raw
//! `Value`s plus any trailing option-sentinels during Step, then applies
//! ORDER BY / LIMIT / HAVING MAX|MIN in Finalize before producing a result —
//! Step never assumes host-engine scan order matches the intended ordering.

use crate::convert::{value_error_to_sql, ValueWrapper};
use crate::options::{parse_aggregate_options, split_args, AggregateOptions};
use bqlite_value::{compare, Value, ValueError};
use rusqlite::functions::{Aggregate, Context, FunctionFlags};
use rusqlite::{Connection, Result};

#[derive(Default)]
struct Accumulator {
    values: Vec<Value>,
    options: AggregateOptions,
}

fn step_collect(ctx: &Context, acc: &mut Option<Accumulator>) -> Result<()> {
    let mut raw = Vec::with_capacity(ctx.len());
    for i in 0..ctx.len() {
        raw.push(ctx.get::<ValueWrapper>(i)?.0);
    }
    let (data, opts) = split_args(&raw);
    let options = parse_aggregate_options(&opts);
    let acc = acc.get_or_insert_with(Accumulator::default);
    acc.options = options.clone();
    if let Some(v) = data.into_iter().next() {
        if !(options.ignore_nulls && v.is_null()) {
            acc.values.push(v);
        }
    }
    Ok(())
}

/// Applies `DISTINCT`/`ORDER BY`/`LIMIT`/`HAVING MAX|MIN` to a Step-collected
/// value list the way `ArrayAgg`/`StringAgg`'s Finalize needs; `HAVING
/// MAX`/`MIN` is treated as an implicit `ORDER BY <value> DESC|ASC LIMIT 1`
/// since neither aggregate carries a separate ordering key argument.
fn finalize_ordered(mut values: Vec<Value>, options: &AggregateOptions) -> Vec<Value> {
    if options.distinct {
        let mut seen: Vec<Value> = Vec::new();
        values.retain(|v| {
            if seen.iter().any(|s| compare::eq(s, v)) {
                false
            } else {
                seen.push(v.clone());
                true
            }
        });
    }
    let (descending, limit) = if options.having_max {
        (true, Some(1))
    } else if options.having_min {
        (false, Some(1))
    } else {
        (options.order_descending.unwrap_or(false), options.limit)
    };
    if options.order_descending.is_some() || options.limit.is_some() || options.having_max || options.having_min {
        finish_ordered(values, descending, limit)
    } else {
        values
    }
}

fn apply_order_limit(mut values: Vec<Value>, descending: bool, limit: Option<i64>) -> Vec<Value> {
    values.sort_by(|a, b| {
        let ord = compare::cmp(a, b, compare::NullOrdering::First);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
    if let Some(n) = limit {
        values.truncate(n.max(0) as usize);
    }
    values
}

pub struct Count;
impl Aggregate<Option<Accumulator>, ValueWrapper> for Count {
    fn init(&self, _: &mut Context<'_>) -> Result<Option<Accumulator>> {
        Ok(None)
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut Option<Accumulator>) -> Result<()> {
        step_collect(ctx, acc)
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<Option<Accumulator>>) -> Result<ValueWrapper> {
        let acc = acc.flatten();
        let n = acc.map(|a| a.values.iter().filter(|v| !v.is_null()).count()).unwrap_or(0);
        Ok(ValueWrapper(Value::Int(n as i64)))
    }
}

pub struct CountStar;
impl Aggregate<i64, ValueWrapper> for CountStar {
    fn init(&self, _: &mut Context<'_>) -> Result<i64> {
        Ok(0)
    }
    fn step(&self, _: &mut Context<'_>, count: &mut i64) -> Result<()> {
        *count += 1;
        Ok(())
    }
    fn finalize(&self, _: &mut Context<'_>, count: Option<i64>) -> Result<ValueWrapper> {
        Ok(ValueWrapper(Value::Int(count.unwrap_or(0))))
    }
}

pub struct CountIf;
impl Aggregate<i64, ValueWrapper> for CountIf {
    fn init(&self, _: &mut Context<'_>) -> Result<i64> {
        Ok(0)
    }
    fn step(&self, ctx: &mut Context<'_>, count: &mut i64) -> Result<()> {
        if matches!(ctx.get::<ValueWrapper>(0)?.0, Value::Bool(true)) {
            *count += 1;
        }
        Ok(())
    }
    fn finalize(&self, _: &mut Context<'_>, count: Option<i64>) -> Result<ValueWrapper> {
        Ok(ValueWrapper(Value::Int(count.unwrap_or(0))))
    }
}

pub struct Sum;
impl Aggregate<Option<Accumulator>, ValueWrapper> for Sum {
    fn init(&self, _: &mut Context<'_>) -> Result<Option<Accumulator>> {
        Ok(None)
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut Option<Accumulator>) -> Result<()> {
        step_collect(ctx, acc)
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<Option<Accumulator>>) -> Result<ValueWrapper> {
        let acc = acc.flatten();
        let mut total = Value::Null;
        for v in acc.map(|a| a.values).unwrap_or_default() {
            if v.is_null() {
                continue;
            }
            total = if total.is_null() { v } else { bqlite_value::arith::add(&total, &v).map_err(value_error_to_sql)? };
        }
        Ok(ValueWrapper(total))
    }
}

pub struct Avg;
impl Aggregate<Option<Accumulator>, ValueWrapper> for Avg {
    fn init(&self, _: &mut Context<'_>) -> Result<Option<Accumulator>> {
        Ok(None)
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut Option<Accumulator>) -> Result<()> {
        step_collect(ctx, acc)
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<Option<Accumulator>>) -> Result<ValueWrapper> {
        let acc = acc.flatten();
        let values: Vec<_> = acc.map(|a| a.values).unwrap_or_default().into_iter().filter(|v| !v.is_null()).collect();
        if values.is_empty() {
            return Ok(ValueWrapper(Value::Null));
        }
        let sum = values.iter().try_fold(0.0f64, |acc, v| {
            Ok::<_, ValueError>(acc
                + match v {
                    Value::Int(i) => *i as f64,
                    Value::Float(f) => *f,
                    Value::Numeric(n) | Value::BigNumeric(n) => n.to_f64(),
                    other => return Err(ValueError::type_error("AVG", format!("non-numeric value {other:?}"))),
                })
        });
        let sum = sum.map_err(value_error_to_sql)?;
        Ok(ValueWrapper(Value::Float(sum / values.len() as f64)))
    }
}

pub struct MinMax {
    pub want_max: bool,
}
impl Aggregate<Option<Accumulator>, ValueWrapper> for MinMax {
    fn init(&self, _: &mut Context<'_>) -> Result<Option<Accumulator>> {
        Ok(None)
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut Option<Accumulator>) -> Result<()> {
        step_collect(ctx, acc)
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<Option<Accumulator>>) -> Result<ValueWrapper> {
        let acc = acc.flatten();
        let mut best: Option<Value> = None;
        for v in acc.map(|a| a.values).unwrap_or_default() {
            if v.is_null() {
                continue;
            }
            best = Some(match best {
                None => v,
                Some(cur) => {
                    let ord = compare::cmp(&v, &cur, compare::NullOrdering::First);
                    if (self.want_max && ord == std::cmp::Ordering::Greater) || (!self.want_max && ord == std::cmp::Ordering::Less) {
                        v
                    } else {
                        cur
                    }
                }
            });
        }
        Ok(ValueWrapper(best.unwrap_or(Value::Null)))
    }
}

pub struct ArrayAgg;
impl Aggregate<Option<Accumulator>, ValueWrapper> for ArrayAgg {
    fn init(&self, _: &mut Context<'_>) -> Result<Option<Accumulator>> {
        Ok(None)
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut Option<Accumulator>) -> Result<()> {
        step_collect(ctx, acc)
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<Option<Accumulator>>) -> Result<ValueWrapper> {
        let acc = acc.flatten();
        let acc = acc.unwrap_or_default();
        Ok(ValueWrapper(Value::Array(finalize_ordered(acc.values, &acc.options))))
    }
}

pub struct ArrayConcatAgg;
impl Aggregate<Option<Accumulator>, ValueWrapper> for ArrayConcatAgg {
    fn init(&self, _: &mut Context<'_>) -> Result<Option<Accumulator>> {
        Ok(None)
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut Option<Accumulator>) -> Result<()> {
        step_collect(ctx, acc)
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<Option<Accumulator>>) -> Result<ValueWrapper> {
        let acc = acc.flatten();
        let mut out = Vec::new();
        for v in acc.map(|a| a.values).unwrap_or_default() {
            if let Value::Array(items) = v {
                out.extend(items);
            }
        }
        Ok(ValueWrapper(Value::Array(out)))
    }
}

pub struct StringAgg;
impl Aggregate<Option<Accumulator>, ValueWrapper> for StringAgg {
    fn init(&self, _: &mut Context<'_>) -> Result<Option<Accumulator>> {
        Ok(None)
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut Option<Accumulator>) -> Result<()> {
        step_collect(ctx, acc)
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<Option<Accumulator>>) -> Result<ValueWrapper> {
        let acc = acc.flatten();
        let acc = acc.unwrap_or_default();
        let ordered = finalize_ordered(acc.values, &acc.options);
        let parts: Vec<String> = ordered
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(format!("{other:?}")),
            })
            .collect();
        if parts.is_empty() {
            return Ok(ValueWrapper(Value::Null));
        }
        Ok(ValueWrapper(Value::String(parts.join(", "))))
    }
}

pub struct LogicalAndOr {
    pub want_and: bool,
}
impl Aggregate<Option<bool>, ValueWrapper> for LogicalAndOr {
    fn init(&self, _: &mut Context<'_>) -> Result<Option<bool>> {
        Ok(None)
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut Option<bool>) -> Result<()> {
        if let Value::Bool(b) = ctx.get::<ValueWrapper>(0)?.0 {
            *acc = Some(match *acc {
                None => b,
                Some(cur) => {
                    if self.want_and {
                        cur && b
                    } else {
                        cur || b
                    }
                }
            });
        }
        Ok(())
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<Option<bool>>) -> Result<ValueWrapper> {
        Ok(ValueWrapper(acc.flatten().map(Value::Bool).unwrap_or(Value::Null)))
    }
}

pub struct BitAgg {
    pub op: BitOp,
}

#[derive(Clone, Copy)]
pub enum BitOp {
    And,
    Or,
    Xor,
}

impl Aggregate<Option<i64>, ValueWrapper> for BitAgg {
    fn init(&self, _: &mut Context<'_>) -> Result<Option<i64>> {
        Ok(None)
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut Option<i64>) -> Result<()> {
        if let Value::Int(n) = ctx.get::<ValueWrapper>(0)?.0 {
            *acc = Some(match (*acc, self.op) {
                (None, _) => n,
                (Some(cur), BitOp::And) => cur & n,
                (Some(cur), BitOp::Or) => cur | n,
                (Some(cur), BitOp::Xor) => cur ^ n,
            });
        }
        Ok(())
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<Option<i64>>) -> Result<ValueWrapper> {
        Ok(ValueWrapper(acc.flatten().map(Value::Int).unwrap_or(Value::Null)))
    }
}

pub fn register_all(conn: &Connection) -> Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8;
    conn.create_aggregate_function("COUNT", -1, flags, Count)?;
    conn.create_aggregate_function("COUNT_STAR", 0, flags, CountStar)?;
    conn.create_aggregate_function("COUNTIF", 1, flags, CountIf)?;
    conn.create_aggregate_function("SUM", -1, flags, Sum)?;
    conn.create_aggregate_function("AVG", -1, flags, Avg)?;
    conn.create_aggregate_function("MIN", -1, flags, MinMax { want_max: false })?;
    conn.create_aggregate_function("MAX", -1, flags, MinMax { want_max: true })?;
    conn.create_aggregate_function("ARRAY_AGG", -1, flags, ArrayAgg)?;
    conn.create_aggregate_function("ARRAY_CONCAT_AGG", -1, flags, ArrayConcatAgg)?;
    conn.create_aggregate_function("STRING_AGG", -1, flags, StringAgg)?;
    conn.create_aggregate_function("LOGICAL_AND", 1, flags, LogicalAndOr { want_and: true })?;
    conn.create_aggregate_function("LOGICAL_OR", 1, flags, LogicalAndOr { want_and: false })?;
    conn.create_aggregate_function("BIT_AND", 1, flags, BitAgg { op: BitOp::And })?;
    conn.create_aggregate_function("BIT_OR", 1, flags, BitAgg { op: BitOp::Or })?;
    conn.create_aggregate_function("BIT_XOR", 1, flags, BitAgg { op: BitOp::Xor })?;
    Ok(())
}

/// Re-sorts and truncates a Step-collected value list per its parsed
/// aggregate options; exposed for window functions that share the same
/// ORDER BY / LIMIT semantics.
pub fn finish_ordered(values: Vec<Value>, descending: bool, limit: Option<i64>) -> Vec<Value> {
    apply_order_limit(values, descending, limit)
}
