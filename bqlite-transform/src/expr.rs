//! Expression transformers: each `ExpressionData` variant lowers to a
//! host-dialect SQL fragment. Comparison/logical operators get a fast path
//! straight to the native operator when every operand is already a
//! SQLite-primitive fragment; everything else calls a registered
//! `sys_<name>` UDF.

use crate::context::TransformContext;
use bqlite_analyzer::ir::{ExpressionData, SubqueryKind};
use bqlite_value::codec;

const PRIMITIVE_BINOPS: &[(&str, &str)] = &[
    ("sys_equal", "="),
    ("sys_not_equal", "!="),
    ("sys_greater", ">"),
    ("sys_less", "<"),
    ("sys_greater_or_equal", ">="),
    ("sys_less_or_equal", "<="),
    ("sys_and", "AND"),
    ("sys_or", "OR"),
];

/// A fragment is "primitive" (safe for the native-operator fast path) if it
/// is a bare literal, a bare column reference, or itself an
/// already-optimized comparison — the test is recursive by construction
/// since we only ever produce primitive fragments from primitive inputs.
fn is_primitive(expr: &ExpressionData) -> bool {
    matches!(expr, ExpressionData::Literal(_) | ExpressionData::Column { .. })
        || matches!(expr, ExpressionData::Binary { op, .. } if PRIMITIVE_BINOPS.iter().any(|(name, _)| *name == op.trim_start_matches('$')))
}

pub fn transform_expr(expr: &ExpressionData, ctx: &mut TransformContext) -> String {
    match expr {
        ExpressionData::Literal(v) => literal_fragment(v),
        ExpressionData::Column { id, .. } => {
            let alias = ctx.fragments.synthesized_alias(*id);
            match ctx.fragments.binding(*id).map(|b| b.scope_alias.clone()) {
                Some(scope) if ctx.fragments.current_scope() == Some("join") => format!("{scope}.`{alias}`"),
                _ => format!("`{alias}`"),
            }
        }
        ExpressionData::Function { name, arguments, window } => transform_function(name, arguments, window.as_ref(), ctx),
        ExpressionData::Cast { input, to, safe } => {
            let inner = transform_expr(input, ctx);
            format!("sys_cast({inner}, {}, {})", quote(&to.to_string()), safe)
        }
        ExpressionData::Subquery { kind, body } => {
            let sql = crate::scan::transform_scan(body, ctx);
            match kind {
                SubqueryKind::Scalar => format!("({sql})"),
                SubqueryKind::Array => format!("sys_array_agg((SELECT value FROM ({sql})))"),
                SubqueryKind::Exists => format!("EXISTS({sql})"),
                SubqueryKind::In => format!("IN ({sql})"),
                SubqueryKind::LikeAny => format!("LIKE ANY ({sql})"),
                SubqueryKind::LikeAll => format!("LIKE ALL ({sql})"),
            }
        }
        ExpressionData::Parameter { name } => match name {
            Some(n) => format!("@{}", n.to_ascii_lowercase()),
            None => "?".to_string(),
        },
        ExpressionData::MakeStruct { fields } => {
            let args: Vec<_> = fields.iter().map(|(_, v)| transform_expr(v, ctx)).collect();
            format!("sys_make_struct({})", args.join(", "))
        }
        ExpressionData::GetStructField { input, index } => {
            let inner = transform_expr(input, ctx);
            format!("sys_get_struct_field({inner}, {index})")
        }
        ExpressionData::Case { branches, else_ } => {
            let mut sql = "CASE".to_string();
            for (cond, result) in branches {
                sql.push_str(&format!(" WHEN {} THEN {}", transform_expr(cond, ctx), transform_expr(result, ctx)));
            }
            if let Some(e) = else_ {
                sql.push_str(&format!(" ELSE {}", transform_expr(e, ctx)));
            }
            sql.push_str(" END");
            sql
        }
        ExpressionData::Binary { op, left, right } => {
            let l = transform_expr(left, ctx);
            let r = transform_expr(right, ctx);
            let name = format!("sys_{}", op.trim_start_matches('$'));
            if let Some((_, native)) = PRIMITIVE_BINOPS.iter().find(|(n, _)| *n == name) {
                if is_primitive(left) && is_primitive(right) {
                    return format!("({l} {native} {r})");
                }
            }
            format!("{name}({l}, {r})")
        }
        ExpressionData::Unary { op, operand } => {
            let inner = transform_expr(operand, ctx);
            match op.as_str() {
                "is_null" => format!("({inner} IS NULL)"),
                "is_not_null" => format!("({inner} IS NOT NULL)"),
                other => format!("sys_{}({inner})", other.trim_start_matches('$')),
            }
        }
        ExpressionData::List(items) => {
            let parts: Vec<_> = items.iter().map(|e| transform_expr(e, ctx)).collect();
            format!("({})", parts.join(", "))
        }
        ExpressionData::Star => "*".to_string(),
    }
}

fn transform_function(
    name: &str,
    arguments: &[ExpressionData],
    window: Option<&bqlite_analyzer::ir::WindowSpec>,
    ctx: &mut TransformContext,
) -> String {
    let args: Vec<_> = arguments.iter().map(|a| transform_expr(a, ctx)).collect();
    match name {
        "sys_ifnull" if args.len() == 2 => format!("CASE WHEN {} IS NULL THEN {} ELSE {} END", args[0], args[1], args[0]),
        "sys_if" if args.len() == 3 => format!("CASE WHEN {} THEN {} ELSE {} END", args[0], args[1], args[2]),
        "sys_case_no_value" => {
            let mut sql = "CASE".to_string();
            for pair in args.chunks(2) {
                if pair.len() == 2 {
                    sql.push_str(&format!(" WHEN {} THEN {}", pair[0], pair[1]));
                } else {
                    sql.push_str(&format!(" ELSE {}", pair[0]));
                }
            }
            sql.push_str(" END");
            sql
        }
        "sys_case_with_value" if !args.is_empty() => {
            let mut sql = format!("CASE {}", args[0]);
            for pair in args[1..].chunks(2) {
                if pair.len() == 2 {
                    sql.push_str(&format!(" WHEN {} THEN {}", pair[0], pair[1]));
                } else {
                    sql.push_str(&format!(" ELSE {}", pair[0]));
                }
            }
            sql.push_str(" END");
            sql
        }
        _ => {
            let mut call = format!("{name}({})", args.join(", "));
            if let Some(w) = window {
                call.push_str(&format!(" OVER ({})", window_clause(name, w, ctx)));
            }
            call
        }
    }
}

/// Window/analytic functions whose BigQuery semantics always consider the
/// entire partition regardless of any ROWS/RANGE clause the query supplies;
/// when the extractor didn't carry an explicit frame, the frame is widened
/// to span the whole partition so the host engine hands the UDF every row
/// before it computes a result (rank-over-total, percentiles, correlation).
const WHOLE_PARTITION_FUNCTIONS: &[&str] = &[
    "PERCENT_RANK", "CUME_DIST", "NTILE", "LAG", "LEAD",
    "PERCENTILE_CONT", "PERCENTILE_DISC", "CORR", "COVAR_POP", "COVAR_SAMP",
    "STDDEV", "STDDEV_POP", "STDDEV_SAMP", "VARIANCE", "VAR_POP", "VAR_SAMP",
];

pub(crate) fn window_clause(name: &str, w: &bqlite_analyzer::ir::WindowSpec, ctx: &mut TransformContext) -> String {
    let mut parts = Vec::new();
    if !w.partition_by.is_empty() {
        let cols: Vec<_> = w.partition_by.iter().map(|e| transform_expr(e, ctx)).collect();
        parts.push(format!("PARTITION BY {}", cols.join(", ")));
    }
    if !w.order_by.is_empty() {
        let items: Vec<_> = w
            .order_by
            .iter()
            .map(|item| {
                let e = transform_expr(&item.expr, ctx);
                let dir = if item.descending { " DESC" } else { "" };
                format!("{e}{dir}")
            })
            .collect();
        parts.push(format!("ORDER BY {}", items.join(", ")));
    }
    if let Some(frame) = &w.frame {
        parts.push(frame_clause(frame));
    } else if WHOLE_PARTITION_FUNCTIONS.contains(&name.to_ascii_uppercase().as_str()) {
        parts.push("ROWS BETWEEN UNBOUNDED PRECEDING AND UNBOUNDED FOLLOWING".to_string());
    }
    parts.join(" ")
}

fn frame_clause(frame: &bqlite_analyzer::ir::WindowFrame) -> String {
    use bqlite_analyzer::ir::{FrameBoundary, FrameUnit};
    let unit = match frame.unit {
        FrameUnit::Rows => "ROWS",
        FrameUnit::Range => "RANGE",
        FrameUnit::Groups => "GROUPS",
    };
    let boundary = |b: &FrameBoundary| match b {
        FrameBoundary::UnboundedPreceding => "UNBOUNDED PRECEDING".to_string(),
        FrameBoundary::Preceding(n) => format!("{n} PRECEDING"),
        FrameBoundary::CurrentRow => "CURRENT ROW".to_string(),
        FrameBoundary::Following(n) => format!("{n} FOLLOWING"),
        FrameBoundary::UnboundedFollowing => "UNBOUNDED FOLLOWING".to_string(),
    };
    format!("{unit} BETWEEN {} AND {}", boundary(&frame.start), boundary(&frame.end))
}

fn literal_fragment(v: &bqlite_value::Value) -> String {
    match v {
        bqlite_value::Value::Null => "NULL".to_string(),
        bqlite_value::Value::Int(i) => i.to_string(),
        bqlite_value::Value::Float(f) => f.to_string(),
        bqlite_value::Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        bqlite_value::Value::String(s) => quote(s),
        other => match codec::encode(other) {
            Ok(text) => quote(&text),
            Err(_) => "NULL".to_string(),
        },
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bqlite_analyzer::ir::ColumnId;
    use bqlite_value::Value;

    #[test]
    fn ifnull_rewrites_to_case() {
        let mut ctx = TransformContext::default();
        let expr = ExpressionData::Function {
            name: "sys_ifnull".into(),
            arguments: vec![ExpressionData::Literal(Value::Int(1)), ExpressionData::Literal(Value::Int(2))],
            window: None,
        };
        assert_eq!(transform_expr(&expr, &mut ctx), "CASE WHEN 1 IS NULL THEN 2 ELSE 1 END");
    }

    #[test]
    fn primitive_comparison_uses_native_operator() {
        let mut ctx = TransformContext::default();
        ctx.fragments.register_column(ColumnId(0), "a", "t0");
        let expr = ExpressionData::Binary {
            op: "$equal".into(),
            left: Box::new(ExpressionData::Column { id: ColumnId(0), name: "a".into() }),
            right: Box::new(ExpressionData::Literal(Value::Int(1))),
        };
        assert_eq!(transform_expr(&expr, &mut ctx), "(`a__0` = 1)");
    }

    #[test]
    fn string_literal_is_quoted_and_escaped() {
        let expr = ExpressionData::Literal(Value::String("it's".into()));
        assert_eq!(transform_expr(&expr, &mut TransformContext::default()), "'it''s'");
    }
}
