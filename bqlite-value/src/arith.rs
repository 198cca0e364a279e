//! `+ - * /` over `Value`. Numeric promotion follows
//! `INT64 -> NUMERIC -> FLOAT64`; `DATE`/`DATETIME`/`TIMESTAMP` combine with
//! `INTERVAL` using the calendar-then-fixed-offset rule in
//! `interval::Interval::apply_to_datetime`.

use crate::datetime::{date_to_days, days_to_date, unpack_datetime, pack_datetime};
use crate::error::ValueError;
use crate::numeric::Numeric;
use crate::value::Value;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    fn name(self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Sub => "subtract",
            Op::Mul => "multiply",
            Op::Div => "divide",
        }
    }
}

fn numeric_op(op: Op, a: Numeric, b: Numeric) -> Result<Numeric, ValueError> {
    match op {
        Op::Add => a.add(b),
        Op::Sub => a.sub(b),
        Op::Mul => a.mul(b),
        Op::Div => a.div(b),
    }
}

fn float_op(op: Op, a: f64, b: f64) -> Result<f64, ValueError> {
    match op {
        Op::Add => Ok(a + b),
        Op::Sub => Ok(a - b),
        Op::Mul => Ok(a * b),
        Op::Div => {
            if b == 0.0 {
                Err(ValueError::DivByZero)
            } else {
                Ok(a / b)
            }
        }
    }
}

fn datetime_plus_interval(op: Op, dt: NaiveDateTime, iv: crate::interval::Interval) -> Result<NaiveDateTime, ValueError> {
    let iv = if op == Op::Sub { iv.negate() } else { iv };
    iv.apply_to_datetime(dt)
}

fn binary(op: Op, a: &Value, b: &Value) -> Result<Value, ValueError> {
    use Value::*;
    match (a, b) {
        (Null, _) | (_, Null) => Ok(Null),
        (Int(x), Int(y)) => match op {
            Op::Add => x.checked_add(*y).map(Int).ok_or(ValueError::Overflow { detail: "INT64 add".into() }),
            Op::Sub => x.checked_sub(*y).map(Int).ok_or(ValueError::Overflow { detail: "INT64 sub".into() }),
            Op::Mul => x.checked_mul(*y).map(Int).ok_or(ValueError::Overflow { detail: "INT64 mul".into() }),
            Op::Div => {
                if *y == 0 {
                    Err(ValueError::DivByZero)
                } else {
                    Ok(Float(*x as f64 / *y as f64))
                }
            }
        },
        (Numeric(x), Numeric(y)) => numeric_op(op, *x, *y).map(Value::Numeric),
        (BigNumeric(x), BigNumeric(y)) => numeric_op(op, *x, *y).map(Value::BigNumeric),
        (Int(x), Numeric(y)) => numeric_op(op, crate::numeric::Numeric::from_i64(*x), *y).map(Value::Numeric),
        (Numeric(x), Int(y)) => numeric_op(op, *x, crate::numeric::Numeric::from_i64(*y)).map(Value::Numeric),
        (Float(_), _) | (_, Float(_)) => {
            let x = to_f64(a)?;
            let y = to_f64(b)?;
            float_op(op, x, y).map(Float)
        }
        (Date(d), Interval(iv)) => {
            let dt = NaiveDateTime::new(days_to_date(*d)?, chrono::NaiveTime::MIN);
            let result = datetime_plus_interval(op, dt, *iv)?;
            Ok(Date(date_to_days(&result.date())))
        }
        (Datetime(dt), Interval(iv)) => datetime_plus_interval(op, *dt, *iv).map(Value::Datetime),
        (Timestamp(micros), Interval(iv)) => {
            let dt = unpack_datetime(pack_datetime(&micros_to_naive(*micros)?))?;
            let result = datetime_plus_interval(op, dt, *iv)?;
            Ok(Timestamp(naive_to_micros(result)))
        }
        (Interval(x), Interval(y)) if op == Op::Add => Ok(Interval(x.add(*y))),
        (Interval(x), Interval(y)) if op == Op::Sub => Ok(Interval(x.sub(*y))),
        (Interval(x), Int(y)) if op == Op::Mul => Ok(Interval(x.scale(*y as f64))),
        (Interval(x), Float(y)) if op == Op::Mul => Ok(Interval(x.scale(*y))),
        _ => Err(ValueError::type_error(
            op.name(),
            format!("incompatible operand types {} and {}", a.type_of(), b.type_of()),
        )),
    }
}

fn to_f64(v: &Value) -> Result<f64, ValueError> {
    match v {
        Value::Int(x) => Ok(*x as f64),
        Value::Float(x) => Ok(*x),
        Value::Numeric(n) | Value::BigNumeric(n) => Ok(n.to_f64()),
        _ => Err(ValueError::type_error("numeric-promotion", format!("{} is not numeric", v.type_of()))),
    }
}

fn micros_to_naive(micros: i64) -> Result<NaiveDateTime, ValueError> {
    chrono::DateTime::from_timestamp(micros.div_euclid(1_000_000), ((micros.rem_euclid(1_000_000)) * 1000) as u32)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| ValueError::conversion("TIMESTAMP", "calendar datetime", format!("{micros} microseconds is out of chrono's representable range")))
}

fn naive_to_micros(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp() * 1_000_000 + dt.and_utc().timestamp_subsec_micros() as i64
}

pub fn add(a: &Value, b: &Value) -> Result<Value, ValueError> {
    binary(Op::Add, a, b)
}
pub fn sub(a: &Value, b: &Value) -> Result<Value, ValueError> {
    binary(Op::Sub, a, b)
}
pub fn mul(a: &Value, b: &Value) -> Result<Value, ValueError> {
    binary(Op::Mul, a, b)
}
pub fn div(a: &Value, b: &Value) -> Result<Value, ValueError> {
    binary(Op::Div, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_div_yields_float() {
        assert_eq!(div(&Value::Int(7), &Value::Int(2)).unwrap(), Value::Float(3.5));
    }

    #[test]
    fn div_by_zero_int_errors() {
        assert_eq!(div(&Value::Int(1), &Value::Int(0)), Err(ValueError::DivByZero));
    }

    #[test]
    fn null_propagates() {
        assert_eq!(add(&Value::Null, &Value::Int(1)).unwrap(), Value::Null);
    }

    #[test]
    fn date_plus_interval_months_clamps_end_of_month() {
        let d = Value::date_from_ymd(2024, 1, 31).unwrap();
        let iv = Value::Interval(crate::interval::Interval::new(0, 1, 0, 0, 0, 0, 0));
        let got = add(&d, &iv).unwrap();
        assert_eq!(got, Value::date_from_ymd(2024, 2, 29).unwrap());
    }

    #[test]
    fn numeric_promotion_int_plus_numeric() {
        let a = Value::Int(1);
        let b = Value::Numeric(Numeric::parse("0.5").unwrap());
        assert_eq!(add(&a, &b).unwrap(), Value::Numeric(Numeric::parse("1.5").unwrap()));
    }

    #[test]
    fn type_mismatch_errors() {
        let a = Value::String("x".into());
        let b = Value::Int(1);
        assert!(add(&a, &b).is_err());
    }
}
