//! Total ordering over `Value`. `Null` compares consistently according to a
//! `NullOrdering` mode rather than being excluded from ordering, so sorts
//! stay deterministic even over mixed nullable columns.

use crate::value::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullOrdering {
    First,
    Last,
}

impl Default for NullOrdering {
    fn default() -> Self {
        NullOrdering::First
    }
}

/// Stable discriminant used to totally order values of different variants,
/// so that a fixed total order exists even over a mixed-type column.
fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) => 2,
        Value::Numeric(_) => 3,
        Value::BigNumeric(_) => 4,
        Value::Float(_) => 5,
        Value::String(_) => 6,
        Value::Bytes(_) => 7,
        Value::Date(_) => 8,
        Value::Time(_) => 9,
        Value::Datetime(_) => 10,
        Value::Timestamp(_) => 11,
        Value::Interval(_) => 12,
        Value::Json(_) => 13,
        Value::Array(_) => 14,
        Value::Struct(_) => 15,
    }
}

pub fn cmp(a: &Value, b: &Value, nulls: NullOrdering) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => {
            return match nulls {
                NullOrdering::First => Ordering::Less,
                NullOrdering::Last => Ordering::Greater,
            }
        }
        (false, true) => {
            return match nulls {
                NullOrdering::First => Ordering::Greater,
                NullOrdering::Last => Ordering::Less,
            }
        }
        (false, false) => {}
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Float(x), Value::Float(y)) => x.total_cmp(y),
        (Value::Int(x), Value::Float(y)) => (*x as f64).total_cmp(y),
        (Value::Float(x), Value::Int(y)) => x.total_cmp(&(*y as f64)),
        (Value::Numeric(x), Value::Numeric(y)) => x.cmp(y),
        (Value::BigNumeric(x), Value::BigNumeric(y)) => x.cmp(y),
        (Value::Numeric(x), Value::Int(y)) => x.cmp(&crate::numeric::Numeric::from_i64(*y)),
        (Value::Int(x), Value::Numeric(y)) => crate::numeric::Numeric::from_i64(*x).cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bytes(x), Value::Bytes(y)) => x.cmp(y),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::Time(x), Value::Time(y)) => x.cmp(y),
        (Value::Datetime(x), Value::Datetime(y)) => x.cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::Interval(x), Value::Interval(y)) => x.cmp(y),
        (Value::Json(x), Value::Json(y)) => json_text_eq_aware_cmp(x, y),
        (Value::Array(x), Value::Array(y)) => cmp_seq(x, y, nulls),
        (Value::Struct(x), Value::Struct(y)) => {
            cmp_seq(&x.iter().map(|(_, v)| v.clone()).collect::<Vec<_>>(), &y.iter().map(|(_, v)| v.clone()).collect::<Vec<_>>(), nulls)
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn cmp_seq(a: &[Value], b: &[Value], nulls: NullOrdering) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let o = cmp(x, y, nulls);
        if o != Ordering::Equal {
            return o;
        }
    }
    a.len().cmp(&b.len())
}

/// JSON equality is textual after trimming insignificant whitespace; JSON
/// values are not canonicalized on decode.
fn json_text_eq_aware_cmp(x: &str, y: &str) -> Ordering {
    let xt: String = x.chars().filter(|c| !c.is_whitespace()).collect();
    let yt: String = y.chars().filter(|c| !c.is_whitespace()).collect();
    xt.cmp(&yt)
}

/// `Null` is equal only to `Null`, and `NaN` never equals `NaN` even though
/// the total order treats them as equal-ranked.
pub fn eq(a: &Value, b: &Value) -> bool {
    if a.is_null() || b.is_null() {
        return a.is_null() && b.is_null();
    }
    if let (Value::Float(x), Value::Float(y)) = (a, b) {
        return x == y;
    }
    cmp(a, b, NullOrdering::First) == Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_first_orders_null_below_everything() {
        let mut v = vec![Value::Int(2), Value::Null, Value::Int(1)];
        v.sort_by(|a, b| cmp(a, b, NullOrdering::First));
        assert_eq!(v, vec![Value::Null, Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn nulls_last_orders_null_above_everything_descending() {
        let mut v = vec![Value::Int(1), Value::Null, Value::Int(2)];
        v.sort_by(|a, b| cmp(b, a, NullOrdering::Last));
        assert_eq!(v, vec![Value::Int(2), Value::Int(1), Value::Null]);
    }

    #[test]
    fn nan_never_equals_nan_but_sorts_deterministically() {
        let nan1 = Value::Float(f64::NAN);
        let nan2 = Value::Float(f64::NAN);
        assert!(!eq(&nan1, &nan2));
        assert_eq!(cmp(&nan1, &nan2, NullOrdering::First), Ordering::Equal);
    }

    #[test]
    fn null_equals_only_null() {
        assert!(eq(&Value::Null, &Value::Null));
        assert!(!eq(&Value::Null, &Value::Int(0)));
    }
}
