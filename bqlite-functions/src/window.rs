//! Window runtime: rank-family functions plus frame-aware SUM/AVG/MIN/MAX/
//! COUNT built on `rusqlite`'s `WindowAggregate`, which already tracks
//! Step/Inverse/Value/Finalize over the host engine's frame machinery.

use crate::convert::ValueWrapper;
use bqlite_value::{compare, Value};
use rusqlite::functions::{Aggregate, Context, FunctionFlags, WindowAggregate};
use rusqlite::{Connection, Result};

#[derive(Default)]
struct Ordered {
    values: Vec<Value>,
}

pub struct FrameSum;
impl Aggregate<Ordered, ValueWrapper> for FrameSum {
    fn init(&self, _: &mut Context<'_>) -> Result<Ordered> {
        Ok(Ordered::default())
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut Ordered) -> Result<()> {
        acc.values.push(ctx.get::<ValueWrapper>(0)?.0);
        Ok(())
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<Ordered>) -> Result<ValueWrapper> {
        let mut total = Value::Null;
        for v in acc.map(|a| a.values).unwrap_or_default() {
            if v.is_null() {
                continue;
            }
            total = if total.is_null() { v } else { bqlite_value::arith::add(&total, &v).unwrap_or(total) };
        }
        Ok(ValueWrapper(total))
    }
}

impl WindowAggregate<Ordered, ValueWrapper> for FrameSum {
    fn inverse(&self, ctx: &mut Context<'_>, acc: &mut Ordered) -> Result<()> {
        let v = ctx.get::<ValueWrapper>(0)?.0;
        if let Some(pos) = acc.values.iter().position(|existing| existing == &v) {
            acc.values.remove(pos);
        }
        Ok(())
    }
    fn value(&self, acc: Option<&mut Ordered>) -> Result<ValueWrapper> {
        let mut total = Value::Null;
        if let Some(acc) = acc {
            for v in &acc.values {
                if v.is_null() {
                    continue;
                }
                total = if total.is_null() { v.clone() } else { bqlite_value::arith::add(&total, v).unwrap_or(total) };
            }
        }
        Ok(ValueWrapper(total))
    }
}

pub struct FrameCount;
impl Aggregate<i64, ValueWrapper> for FrameCount {
    fn init(&self, _: &mut Context<'_>) -> Result<i64> {
        Ok(0)
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut i64) -> Result<()> {
        if !ctx.get::<ValueWrapper>(0)?.0.is_null() {
            *acc += 1;
        }
        Ok(())
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<i64>) -> Result<ValueWrapper> {
        Ok(ValueWrapper(Value::Int(acc.unwrap_or(0))))
    }
}

impl WindowAggregate<i64, ValueWrapper> for FrameCount {
    fn inverse(&self, ctx: &mut Context<'_>, acc: &mut i64) -> Result<()> {
        if !ctx.get::<ValueWrapper>(0)?.0.is_null() {
            *acc -= 1;
        }
        Ok(())
    }
    fn value(&self, acc: Option<&mut i64>) -> Result<ValueWrapper> {
        Ok(ValueWrapper(Value::Int(acc.copied().unwrap_or(0))))
    }
}

pub struct FrameMinMax {
    pub want_max: bool,
}
impl Aggregate<Ordered, ValueWrapper> for FrameMinMax {
    fn init(&self, _: &mut Context<'_>) -> Result<Ordered> {
        Ok(Ordered::default())
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut Ordered) -> Result<()> {
        acc.values.push(ctx.get::<ValueWrapper>(0)?.0);
        Ok(())
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<Ordered>) -> Result<ValueWrapper> {
        Ok(ValueWrapper(extreme(acc.map(|a| a.values).unwrap_or_default(), self.want_max)))
    }
}

impl WindowAggregate<Ordered, ValueWrapper> for FrameMinMax {
    fn inverse(&self, ctx: &mut Context<'_>, acc: &mut Ordered) -> Result<()> {
        let v = ctx.get::<ValueWrapper>(0)?.0;
        if let Some(pos) = acc.values.iter().position(|existing| existing == &v) {
            acc.values.remove(pos);
        }
        Ok(())
    }
    fn value(&self, acc: Option<&mut Ordered>) -> Result<ValueWrapper> {
        Ok(ValueWrapper(extreme(acc.map(|a| a.values.clone()).unwrap_or_default(), self.want_max)))
    }
}

fn extreme(values: Vec<Value>, want_max: bool) -> Value {
    let mut best: Option<Value> = None;
    for v in values {
        if v.is_null() {
            continue;
        }
        best = Some(match best {
            None => v,
            Some(cur) => {
                let ord = compare::cmp(&v, &cur, compare::NullOrdering::First);
                if (want_max && ord == std::cmp::Ordering::Greater) || (!want_max && ord == std::cmp::Ordering::Less) {
                    v
                } else {
                    cur
                }
            }
        });
    }
    best.unwrap_or(Value::Null)
}

/// `ROW_NUMBER`/`RANK`/`DENSE_RANK` need the full partition's ordering key
/// sequence, not a sliding frame, so they accumulate every row's key and
/// answer on `value()` by locating the current row's position among peers.
/// The host engine calls `value()` once per row in partition order, so the
/// accumulator's running length at that point IS the current row's ordinal.
#[derive(Default)]
struct RankState {
    seen_keys: Vec<Value>,
}

pub struct RowNumber;
impl Aggregate<RankState, ValueWrapper> for RowNumber {
    fn init(&self, _: &mut Context<'_>) -> Result<RankState> {
        Ok(RankState::default())
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut RankState) -> Result<()> {
        acc.seen_keys.push(ctx.get::<ValueWrapper>(0)?.0);
        Ok(())
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<RankState>) -> Result<ValueWrapper> {
        Ok(ValueWrapper(Value::Int(acc.map(|a| a.seen_keys.len() as i64).unwrap_or(0))))
    }
}
impl WindowAggregate<RankState, ValueWrapper> for RowNumber {
    fn inverse(&self, _: &mut Context<'_>, acc: &mut RankState) -> Result<()> {
        if !acc.seen_keys.is_empty() {
            acc.seen_keys.remove(0);
        }
        Ok(())
    }
    fn value(&self, acc: Option<&mut RankState>) -> Result<ValueWrapper> {
        Ok(ValueWrapper(Value::Int(acc.map(|a| a.seen_keys.len() as i64).unwrap_or(0))))
    }
}

pub struct Rank {
    pub dense: bool,
}
impl Aggregate<RankState, ValueWrapper> for Rank {
    fn init(&self, _: &mut Context<'_>) -> Result<RankState> {
        Ok(RankState::default())
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut RankState) -> Result<()> {
        acc.seen_keys.push(ctx.get::<ValueWrapper>(0)?.0);
        Ok(())
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<RankState>) -> Result<ValueWrapper> {
        Ok(ValueWrapper(self.rank_of_last(acc.as_ref().map(|a| a.seen_keys.as_slice()).unwrap_or(&[]))))
    }
}
impl WindowAggregate<RankState, ValueWrapper> for Rank {
    fn inverse(&self, _: &mut Context<'_>, acc: &mut RankState) -> Result<()> {
        if !acc.seen_keys.is_empty() {
            acc.seen_keys.remove(0);
        }
        Ok(())
    }
    fn value(&self, acc: Option<&mut RankState>) -> Result<ValueWrapper> {
        Ok(ValueWrapper(self.rank_of_last(acc.map(|a| a.seen_keys.as_slice()).unwrap_or(&[]))))
    }
}
impl Rank {
    fn rank_of_last(&self, keys: &[Value]) -> Value {
        let Some(current) = keys.last() else { return Value::Null };
        if self.dense {
            let mut distinct: Vec<&Value> = Vec::new();
            for k in keys {
                if !distinct.iter().any(|d| compare::eq(d, k)) {
                    distinct.push(k);
                }
            }
            let pos = distinct.iter().position(|d| compare::eq(d, current)).unwrap_or(0);
            Value::Int(pos as i64 + 1)
        } else {
            let smaller = keys[..keys.len() - 1].iter().filter(|k| compare::cmp(k, current, compare::NullOrdering::First) == std::cmp::Ordering::Less).count();
            Value::Int(smaller as i64 + 1)
        }
    }
}

/// Key sequence plus a self-incrementing cursor. Relies on the frame
/// widening `bqlite-transform` applies to these functions (`ROWS BETWEEN
/// UNBOUNDED PRECEDING AND UNBOUNDED FOLLOWING`): the host engine steps
/// every row of the partition before asking for the first value, and never
/// calls `inverse` since the frame never shrinks, so `returned` tracks
/// exactly which output row is being answered.
#[derive(Default)]
struct IndexedKeys {
    keys: Vec<Value>,
    returned: usize,
}

fn percent_rank_at(keys: &[Value], idx: usize) -> Value {
    let n = keys.len();
    if n <= 1 || idx >= n {
        return Value::Float(0.0);
    }
    let current = &keys[idx];
    let smaller = keys.iter().filter(|k| compare::cmp(k, current, compare::NullOrdering::First) == std::cmp::Ordering::Less).count();
    Value::Float(smaller as f64 / (n - 1) as f64)
}

fn cume_dist_at(keys: &[Value], idx: usize) -> Value {
    let n = keys.len();
    if n == 0 || idx >= n {
        return Value::Float(0.0);
    }
    let current = &keys[idx];
    let le = keys.iter().filter(|k| compare::cmp(k, current, compare::NullOrdering::First) != std::cmp::Ordering::Greater).count();
    Value::Float(le as f64 / n as f64)
}

pub struct PercentRank;
impl Aggregate<IndexedKeys, ValueWrapper> for PercentRank {
    fn init(&self, _: &mut Context<'_>) -> Result<IndexedKeys> {
        Ok(IndexedKeys::default())
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut IndexedKeys) -> Result<()> {
        acc.keys.push(ctx.get::<ValueWrapper>(0)?.0);
        Ok(())
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<IndexedKeys>) -> Result<ValueWrapper> {
        let a = acc.unwrap_or_default();
        Ok(ValueWrapper(percent_rank_at(&a.keys, 0)))
    }
}
impl WindowAggregate<IndexedKeys, ValueWrapper> for PercentRank {
    fn inverse(&self, _: &mut Context<'_>, _acc: &mut IndexedKeys) -> Result<()> {
        Ok(())
    }
    fn value(&self, acc: Option<&mut IndexedKeys>) -> Result<ValueWrapper> {
        match acc {
            Some(a) => {
                let idx = a.returned;
                a.returned += 1;
                Ok(ValueWrapper(percent_rank_at(&a.keys, idx)))
            }
            None => Ok(ValueWrapper(Value::Null)),
        }
    }
}

pub struct CumeDist;
impl Aggregate<IndexedKeys, ValueWrapper> for CumeDist {
    fn init(&self, _: &mut Context<'_>) -> Result<IndexedKeys> {
        Ok(IndexedKeys::default())
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut IndexedKeys) -> Result<()> {
        acc.keys.push(ctx.get::<ValueWrapper>(0)?.0);
        Ok(())
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<IndexedKeys>) -> Result<ValueWrapper> {
        let a = acc.unwrap_or_default();
        Ok(ValueWrapper(cume_dist_at(&a.keys, 0)))
    }
}
impl WindowAggregate<IndexedKeys, ValueWrapper> for CumeDist {
    fn inverse(&self, _: &mut Context<'_>, _acc: &mut IndexedKeys) -> Result<()> {
        Ok(())
    }
    fn value(&self, acc: Option<&mut IndexedKeys>) -> Result<ValueWrapper> {
        match acc {
            Some(a) => {
                let idx = a.returned;
                a.returned += 1;
                Ok(ValueWrapper(cume_dist_at(&a.keys, idx)))
            }
            None => Ok(ValueWrapper(Value::Null)),
        }
    }
}

#[derive(Default)]
struct NtileState {
    buckets: i64,
    count: usize,
    returned: usize,
}

fn ntile_bucket(buckets: i64, count: usize, idx: usize) -> Value {
    if buckets <= 0 || count == 0 {
        return Value::Null;
    }
    let buckets = buckets as usize;
    let base = count / buckets;
    let extra = count % buckets;
    let mut pos = idx;
    for bucket in 0..buckets {
        let size = if bucket < extra { base + 1 } else { base };
        if pos < size {
            return Value::Int(bucket as i64 + 1);
        }
        pos -= size;
    }
    Value::Int(buckets as i64)
}

pub struct Ntile;
impl Aggregate<NtileState, ValueWrapper> for Ntile {
    fn init(&self, _: &mut Context<'_>) -> Result<NtileState> {
        Ok(NtileState::default())
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut NtileState) -> Result<()> {
        acc.buckets = ctx.get::<i64>(0)?;
        acc.count += 1;
        Ok(())
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<NtileState>) -> Result<ValueWrapper> {
        let a = acc.unwrap_or_default();
        Ok(ValueWrapper(ntile_bucket(a.buckets, a.count, 0)))
    }
}
impl WindowAggregate<NtileState, ValueWrapper> for Ntile {
    fn inverse(&self, _: &mut Context<'_>, _acc: &mut NtileState) -> Result<()> {
        Ok(())
    }
    fn value(&self, acc: Option<&mut NtileState>) -> Result<ValueWrapper> {
        match acc {
            Some(a) => {
                let idx = a.returned;
                a.returned += 1;
                Ok(ValueWrapper(ntile_bucket(a.buckets, a.count, idx)))
            }
            None => Ok(ValueWrapper(Value::Null)),
        }
    }
}

#[derive(Default)]
struct LagLeadState {
    values: Vec<Value>,
    offsets: Vec<i64>,
    defaults: Vec<Value>,
    returned: usize,
}

pub struct LagLead {
    pub is_lead: bool,
}
impl LagLead {
    fn at(&self, a: &LagLeadState, idx: usize) -> Value {
        let offset = a.offsets.get(idx).copied().unwrap_or(1);
        let target = if self.is_lead { idx as i64 + offset } else { idx as i64 - offset };
        if target < 0 || target as usize >= a.values.len() {
            a.defaults.get(idx).cloned().unwrap_or(Value::Null)
        } else {
            a.values[target as usize].clone()
        }
    }
}
impl Aggregate<LagLeadState, ValueWrapper> for LagLead {
    fn init(&self, _: &mut Context<'_>) -> Result<LagLeadState> {
        Ok(LagLeadState::default())
    }
    fn step(&self, ctx: &mut Context<'_>, acc: &mut LagLeadState) -> Result<()> {
        acc.values.push(ctx.get::<ValueWrapper>(0)?.0);
        let offset = if ctx.len() > 1 { ctx.get::<i64>(1).unwrap_or(1) } else { 1 };
        acc.offsets.push(offset);
        let default = if ctx.len() > 2 { ctx.get::<ValueWrapper>(2).map(|v| v.0).unwrap_or(Value::Null) } else { Value::Null };
        acc.defaults.push(default);
        Ok(())
    }
    fn finalize(&self, _: &mut Context<'_>, acc: Option<LagLeadState>) -> Result<ValueWrapper> {
        let a = acc.unwrap_or_default();
        Ok(ValueWrapper(self.at(&a, 0)))
    }
}
impl WindowAggregate<LagLeadState, ValueWrapper> for LagLead {
    fn inverse(&self, _: &mut Context<'_>, _acc: &mut LagLeadState) -> Result<()> {
        Ok(())
    }
    fn value(&self, acc: Option<&mut LagLeadState>) -> Result<ValueWrapper> {
        match acc {
            Some(a) => {
                let idx = a.returned;
                a.returned += 1;
                Ok(ValueWrapper(self.at(a, idx)))
            }
            None => Ok(ValueWrapper(Value::Null)),
        }
    }
}

fn value_as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Numeric(n) | Value::BigNumeric(n) => Some(n.to_f64()),
        _ => None,
    }
}

#[derive(Default)]
struct SamplesState {
    values: Vec<f64>,
    fraction: f64,
}

fn percentile_cont(values: &[f64], fraction: f64) -> Value {
    if values.is_empty() {
        return Value::Null;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    let pos = fraction.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Value::Float(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Value::Float(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

fn percentile_disc(values: &[f64], fraction: f64) -> Value {
    if values.is_empty() {
        return Value::Null;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    let idx = ((fraction.clamp(0.0, 1.0) * n as f64).ceil() as usize).saturating_sub(1).min(n - 1);
    Value::Float(sorted[idx])
}

macro_rules! percentile_fn {
    ($name:ident, $compute:expr) => {
        pub struct $name;
        impl Aggregate<SamplesState, ValueWrapper> for $name {
            fn init(&self, _: &mut Context<'_>) -> Result<SamplesState> {
                Ok(SamplesState::default())
            }
            fn step(&self, ctx: &mut Context<'_>, acc: &mut SamplesState) -> Result<()> {
                let v = ctx.get::<ValueWrapper>(0)?.0;
                if let Some(f) = value_as_f64(&v) {
                    acc.values.push(f);
                }
                acc.fraction = ctx.get::<f64>(1).unwrap_or(0.0);
                Ok(())
            }
            fn finalize(&self, _: &mut Context<'_>, acc: Option<SamplesState>) -> Result<ValueWrapper> {
                let a = acc.unwrap_or_default();
                Ok(ValueWrapper($compute(&a.values, a.fraction)))
            }
        }
        impl WindowAggregate<SamplesState, ValueWrapper> for $name {
            fn inverse(&self, _: &mut Context<'_>, _acc: &mut SamplesState) -> Result<()> {
                Ok(())
            }
            fn value(&self, acc: Option<&mut SamplesState>) -> Result<ValueWrapper> {
                match acc {
                    Some(a) => Ok(ValueWrapper($compute(&a.values, a.fraction))),
                    None => Ok(ValueWrapper(Value::Null)),
                }
            }
        }
    };
}

percentile_fn!(PercentileCont, percentile_cont);
percentile_fn!(PercentileDisc, percentile_disc);

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64], sample: bool) -> Value {
    let n = values.len();
    let denom = if sample { n.saturating_sub(1) } else { n };
    if n == 0 || denom == 0 {
        return Value::Null;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Value::Float(sum_sq / denom as f64)
}

fn stddev(values: &[f64], sample: bool) -> Value {
    match variance(values, sample) {
        Value::Float(v) => Value::Float(v.sqrt()),
        other => other,
    }
}

#[derive(Default)]
struct OneColumnState {
    values: Vec<f64>,
}

macro_rules! dispersion_fn {
    ($name:ident, $compute:expr) => {
        pub struct $name;
        impl Aggregate<OneColumnState, ValueWrapper> for $name {
            fn init(&self, _: &mut Context<'_>) -> Result<OneColumnState> {
                Ok(OneColumnState::default())
            }
            fn step(&self, ctx: &mut Context<'_>, acc: &mut OneColumnState) -> Result<()> {
                if let Some(f) = value_as_f64(&ctx.get::<ValueWrapper>(0)?.0) {
                    acc.values.push(f);
                }
                Ok(())
            }
            fn finalize(&self, _: &mut Context<'_>, acc: Option<OneColumnState>) -> Result<ValueWrapper> {
                let a = acc.unwrap_or_default();
                Ok(ValueWrapper($compute(&a.values)))
            }
        }
        impl WindowAggregate<OneColumnState, ValueWrapper> for $name {
            fn inverse(&self, _: &mut Context<'_>, _acc: &mut OneColumnState) -> Result<()> {
                Ok(())
            }
            fn value(&self, acc: Option<&mut OneColumnState>) -> Result<ValueWrapper> {
                match acc {
                    Some(a) => Ok(ValueWrapper($compute(&a.values))),
                    None => Ok(ValueWrapper(Value::Null)),
                }
            }
        }
    };
}

dispersion_fn!(Stddev, |v: &[f64]| stddev(v, true));
dispersion_fn!(StddevPop, |v: &[f64]| stddev(v, false));
dispersion_fn!(StddevSamp, |v: &[f64]| stddev(v, true));
dispersion_fn!(VarianceFn, |v: &[f64]| variance(v, true));
dispersion_fn!(VarPop, |v: &[f64]| variance(v, false));
dispersion_fn!(VarSamp, |v: &[f64]| variance(v, true));

#[derive(Default)]
struct PairState {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

fn covariance(xs: &[f64], ys: &[f64], sample: bool) -> Value {
    let n = xs.len().min(ys.len());
    let denom = if sample { n.saturating_sub(1) } else { n };
    if n == 0 || denom == 0 {
        return Value::Null;
    }
    let mx = mean(&xs[..n]);
    let my = mean(&ys[..n]);
    let sum: f64 = (0..n).map(|i| (xs[i] - mx) * (ys[i] - my)).sum();
    Value::Float(sum / denom as f64)
}

fn correlation(xs: &[f64], ys: &[f64]) -> Value {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return Value::Null;
    }
    let cov = match covariance(xs, ys, false) {
        Value::Float(v) => v,
        _ => return Value::Null,
    };
    let sx = match variance(&xs[..n], false) {
        Value::Float(v) => v.sqrt(),
        _ => return Value::Null,
    };
    let sy = match variance(&ys[..n], false) {
        Value::Float(v) => v.sqrt(),
        _ => return Value::Null,
    };
    if sx == 0.0 || sy == 0.0 {
        return Value::Null;
    }
    Value::Float(cov / (sx * sy))
}

macro_rules! pairwise_fn {
    ($name:ident, $compute:expr) => {
        pub struct $name;
        impl Aggregate<PairState, ValueWrapper> for $name {
            fn init(&self, _: &mut Context<'_>) -> Result<PairState> {
                Ok(PairState::default())
            }
            fn step(&self, ctx: &mut Context<'_>, acc: &mut PairState) -> Result<()> {
                if let Some(y) = value_as_f64(&ctx.get::<ValueWrapper>(0)?.0) {
                    if let Some(x) = value_as_f64(&ctx.get::<ValueWrapper>(1)?.0) {
                        acc.ys.push(y);
                        acc.xs.push(x);
                    }
                }
                Ok(())
            }
            fn finalize(&self, _: &mut Context<'_>, acc: Option<PairState>) -> Result<ValueWrapper> {
                let a = acc.unwrap_or_default();
                Ok(ValueWrapper($compute(&a.xs, &a.ys)))
            }
        }
        impl WindowAggregate<PairState, ValueWrapper> for $name {
            fn inverse(&self, _: &mut Context<'_>, _acc: &mut PairState) -> Result<()> {
                Ok(())
            }
            fn value(&self, acc: Option<&mut PairState>) -> Result<ValueWrapper> {
                match acc {
                    Some(a) => Ok(ValueWrapper($compute(&a.xs, &a.ys))),
                    None => Ok(ValueWrapper(Value::Null)),
                }
            }
        }
    };
}

pairwise_fn!(Corr, |xs: &[f64], ys: &[f64]| correlation(xs, ys));
pairwise_fn!(CovarPop, |xs: &[f64], ys: &[f64]| covariance(xs, ys, false));
pairwise_fn!(CovarSamp, |xs: &[f64], ys: &[f64]| covariance(xs, ys, true));

pub fn register_all(conn: &Connection) -> Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8;
    conn.create_window_function("sys_window_sum", 1, flags, FrameSum)?;
    conn.create_window_function("sys_window_count", 1, flags, FrameCount)?;
    conn.create_window_function("sys_window_min", 1, flags, FrameMinMax { want_max: false })?;
    conn.create_window_function("sys_window_max", 1, flags, FrameMinMax { want_max: true })?;
    conn.create_window_function("ROW_NUMBER", 1, flags, RowNumber)?;
    conn.create_window_function("RANK", 1, flags, Rank { dense: false })?;
    conn.create_window_function("DENSE_RANK", 1, flags, Rank { dense: true })?;
    conn.create_window_function("PERCENT_RANK", 1, flags, PercentRank)?;
    conn.create_window_function("CUME_DIST", 1, flags, CumeDist)?;
    conn.create_window_function("NTILE", 1, flags, Ntile)?;
    conn.create_window_function("LAG", 1, flags, LagLead { is_lead: false })?;
    conn.create_window_function("LAG", 2, flags, LagLead { is_lead: false })?;
    conn.create_window_function("LAG", 3, flags, LagLead { is_lead: false })?;
    conn.create_window_function("LEAD", 1, flags, LagLead { is_lead: true })?;
    conn.create_window_function("LEAD", 2, flags, LagLead { is_lead: true })?;
    conn.create_window_function("LEAD", 3, flags, LagLead { is_lead: true })?;
    conn.create_window_function("PERCENTILE_CONT", 2, flags, PercentileCont)?;
    conn.create_window_function("PERCENTILE_DISC", 2, flags, PercentileDisc)?;
    conn.create_window_function("CORR", 2, flags, Corr)?;
    conn.create_window_function("COVAR_POP", 2, flags, CovarPop)?;
    conn.create_window_function("COVAR_SAMP", 2, flags, CovarSamp)?;
    conn.create_window_function("STDDEV", 1, flags, Stddev)?;
    conn.create_window_function("STDDEV_POP", 1, flags, StddevPop)?;
    conn.create_window_function("STDDEV_SAMP", 1, flags, StddevSamp)?;
    conn.create_window_function("VARIANCE", 1, flags, VarianceFn)?;
    conn.create_window_function("VAR_POP", 1, flags, VarPop)?;
    conn.create_window_function("VAR_SAMP", 1, flags, VarSamp)?;
    Ok(())
}

#[cfg(test)]
mod more_tests {
    use super::*;

    #[test]
    fn ntile_balances_remainder_into_leading_buckets() {
        assert_eq!(ntile_bucket(3, 7, 0), Value::Int(1));
        assert_eq!(ntile_bucket(3, 7, 2), Value::Int(1));
        assert_eq!(ntile_bucket(3, 7, 3), Value::Int(2));
        assert_eq!(ntile_bucket(3, 7, 6), Value::Int(3));
    }

    #[test]
    fn percent_rank_of_min_is_zero() {
        let keys = vec![Value::Int(1), Value::Int(2), Value::Int(3)];
        assert_eq!(percent_rank_at(&keys, 0), Value::Float(0.0));
        assert_eq!(percent_rank_at(&keys, 2), Value::Float(1.0));
    }

    #[test]
    fn cume_dist_of_last_is_one() {
        let keys = vec![Value::Int(1), Value::Int(2), Value::Int(3)];
        assert_eq!(cume_dist_at(&keys, 2), Value::Float(1.0));
    }

    #[test]
    fn variance_of_constant_series_is_zero() {
        assert_eq!(variance(&[2.0, 2.0, 2.0], false), Value::Float(0.0));
    }

    #[test]
    fn percentile_cont_interpolates_midpoint() {
        assert_eq!(percentile_cont(&[1.0, 2.0, 3.0, 4.0], 0.5), Value::Float(2.5));
    }
}
