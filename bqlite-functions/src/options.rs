//! Option-sentinel values. `sys_distinct`, `sys_order_by`, `sys_limit`, and
//! friends encode their argument as a tagged JSON envelope so an aggregate or
//! window Step can tell a true data argument from a trailing modifier without
//! widening its own signature per modifier combination.

use base64::Engine as _;
use bqlite_value::Value;
use serde::{Deserialize, Serialize};

const OPTION_PREFIX: &str = "BQOPT:";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "opt", content = "arg")]
pub enum Option_ {
    Distinct,
    IgnoreNulls,
    Limit(i64),
    OrderBy { descending: bool },
    HavingMax,
    HavingMin,
    WindowFrameUnit(String),
    WindowPartition,
    WindowOrderBy,
    WindowBoundaryStart(String),
    WindowBoundaryEnd(String),
    WindowRowId,
}

pub fn encode_option(opt: &Option_) -> String {
    let json = serde_json::to_string(opt).unwrap_or_default();
    format!("{OPTION_PREFIX}{}", base64::engine::general_purpose::STANDARD.encode(json))
}

pub fn decode_option(text: &str) -> Option<Option_> {
    let rest = text.strip_prefix(OPTION_PREFIX)?;
    let json = base64::engine::general_purpose::STANDARD.decode(rest).ok()?;
    serde_json::from_slice(&json).ok()
}

pub fn is_option(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.starts_with(OPTION_PREFIX))
}

/// Splits a Step call's raw arguments into true data values and decoded
/// options, preserving the order options appeared in (so `ORDER BY`/`LIMIT`
/// can be matched to their originating clause).
pub fn split_args(args: &[Value]) -> (Vec<Value>, Vec<Option_>) {
    let mut data = Vec::new();
    let mut opts = Vec::new();
    for v in args {
        if let Value::String(s) = v {
            if let Some(opt) = decode_option(s) {
                opts.push(opt);
                continue;
            }
        }
        data.push(v.clone());
    }
    (data, opts)
}

#[derive(Debug, Default, Clone)]
pub struct AggregateOptions {
    pub distinct: bool,
    pub ignore_nulls: bool,
    pub limit: Option<i64>,
    pub order_descending: Option<bool>,
    pub having_max: bool,
    pub having_min: bool,
}

pub fn parse_aggregate_options(opts: &[Option_]) -> AggregateOptions {
    let mut out = AggregateOptions::default();
    for opt in opts {
        match opt {
            Option_::Distinct => out.distinct = true,
            Option_::IgnoreNulls => out.ignore_nulls = true,
            Option_::Limit(n) => out.limit = Some(*n),
            Option_::OrderBy { descending } => out.order_descending = Some(*descending),
            Option_::HavingMax => out.having_max = true,
            Option_::HavingMin => out.having_min = true,
            _ => {}
        }
    }
    out
}

#[derive(Debug, Default, Clone)]
pub struct WindowOptions {
    pub frame_unit: Option<String>,
    pub boundary_start: Option<String>,
    pub boundary_end: Option<String>,
    pub uses_row_id: bool,
}

pub fn parse_window_options(opts: &[Option_]) -> WindowOptions {
    let mut out = WindowOptions::default();
    for opt in opts {
        match opt {
            Option_::WindowFrameUnit(u) => out.frame_unit = Some(u.clone()),
            Option_::WindowBoundaryStart(b) => out.boundary_start = Some(b.clone()),
            Option_::WindowBoundaryEnd(b) => out.boundary_end = Some(b.clone()),
            Option_::WindowRowId => out.uses_row_id = true,
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_round_trips() {
        let opt = Option_::Limit(5);
        let encoded = encode_option(&opt);
        assert!(is_option(&Value::String(encoded.clone())));
        let decoded = decode_option(&encoded).unwrap();
        assert!(matches!(decoded, Option_::Limit(5)));
    }

    #[test]
    fn split_args_separates_data_from_options() {
        let args = vec![Value::Int(1), Value::String(encode_option(&Option_::Distinct)), Value::Int(2)];
        let (data, opts) = split_args(&args);
        assert_eq!(data.len(), 2);
        assert_eq!(opts.len(), 1);
    }
}
