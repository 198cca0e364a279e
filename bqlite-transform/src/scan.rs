//! Scan transformers: each `ScanData` variant lowers to a host-dialect SQL
//! fragment (a full `SELECT`, ready to be wrapped as a FROM subquery by its
//! caller).

use crate::context::TransformContext;
use crate::expr::transform_expr;
use bqlite_analyzer::ir::{JoinType, ScanData, SetOpKind, SetOpQuantifier};

pub fn transform_scan(scan: &ScanData, ctx: &mut TransformContext) -> String {
    match scan {
        ScanData::Table { output, path } => {
            let alias = ctx.fragments.fresh_scope_alias();
            let table_name = path.join("_");
            let select_list = if output.is_empty() {
                "*".to_string()
            } else {
                output
                    .iter()
                    .map(|c| {
                        ctx.fragments.register_column(c.id, &c.name, &alias);
                        format!("`{}` AS `{}`", c.name, ctx.fragments.synthesized_alias(c.id))
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!("(SELECT {select_list} FROM `{table_name}`) {alias}")
        }
        ScanData::Filter { input, condition } => {
            let input_sql = transform_scan(input, ctx);
            let is_having = matches!(input.as_ref(), ScanData::Aggregate { .. });
            let cond = transform_expr(condition, ctx);
            let keyword = if is_having { "HAVING" } else { "WHERE" };
            if input_sql.trim_end().ends_with(')') || !input_sql.contains("WHERE") {
                format!("SELECT * FROM ({input_sql}) {keyword} {cond}")
            } else {
                format!("SELECT * FROM ({input_sql}) t {keyword} {cond}")
            }
        }
        ScanData::Project { input, output, expressions } => {
            let input_sql = transform_scan(input, ctx);
            let alias = ctx.fragments.fresh_scope_alias();
            let mut by_id = std::collections::HashMap::new();
            for (id, e) in expressions {
                by_id.insert(*id, e);
            }
            let select_list: Vec<_> = output
                .iter()
                .map(|c| {
                    let fragment = match by_id.get(&c.id) {
                        Some(e) => transform_expr(e, ctx),
                        None => ctx.fragments.synthesized_alias(c.id),
                    };
                    ctx.fragments.register_column(c.id, &c.name, &alias);
                    format!("{fragment} AS `{}`", ctx.fragments.synthesized_alias(c.id))
                })
                .collect();
            format!("SELECT {} FROM ({input_sql}) {alias}", select_list.join(", "))
        }
        ScanData::Aggregate { input, group_by, grouping_sets, aggregates, output, needs_row_id } => {
            let input_sql = transform_scan(input, ctx);
            let alias = ctx.fragments.fresh_scope_alias();
            let group_exprs: Vec<_> = group_by.iter().map(|e| transform_expr(e, ctx)).collect();
            let key_cols = &output[..group_exprs.len().min(output.len())];
            let key_select: Vec<_> = key_cols
                .iter()
                .zip(group_exprs.iter())
                .map(|(c, e)| {
                    ctx.fragments.register_column(c.id, &c.name, &alias);
                    format!("{e} AS `{}`", ctx.fragments.synthesized_alias(c.id))
                })
                .collect();
            let agg_list: Vec<_> = aggregates
                .iter()
                .map(|call| {
                    let args: Vec<_> = call.arguments.iter().map(|a| transform_expr(a, ctx)).collect();
                    ctx.fragments.register_column(call.output.id, &call.output.name, &alias);
                    format!("{}({}) AS `{}`", call.function, args.join(", "), ctx.fragments.synthesized_alias(call.output.id))
                })
                .collect();
            let select_list: Vec<_> = key_select.iter().cloned().chain(agg_list.iter().cloned()).collect();
            let row_id = if *needs_row_id { ", ROW_NUMBER() OVER() AS row_id" } else { "" };

            if grouping_sets.is_empty() || grouping_sets.len() == 1 {
                let group_clause = if group_exprs.is_empty() { String::new() } else { format!(" GROUP BY {}", group_exprs.join(", ")) };
                format!("SELECT {}{row_id} FROM ({input_sql}) {alias}{group_clause}", select_list.join(", "))
            } else {
                let branches: Vec<_> = grouping_sets
                    .iter()
                    .map(|set| {
                        let keys: Vec<_> = key_cols
                            .iter()
                            .enumerate()
                            .map(|(i, c)| {
                                let alias_name = ctx.fragments.synthesized_alias(c.id);
                                if set.contains(&i) {
                                    format!("{} AS `{alias_name}`", group_exprs[i])
                                } else {
                                    format!("NULL AS `{alias_name}`")
                                }
                            })
                            .collect();
                        let group_clause = if set.is_empty() { String::new() } else { format!(" GROUP BY {}", set.iter().map(|i| group_exprs[*i].clone()).collect::<Vec<_>>().join(", ")) };
                        format!("SELECT {}, {}{row_id} FROM ({input_sql}) {alias}{group_clause}", keys.join(", "), agg_list.join(", "))
                    })
                    .collect();
                branches.join(" UNION ALL ")
            }
        }
        ScanData::OrderBy { input, items } => {
            let input_sql = transform_scan(input, ctx);
            let alias = ctx.fragments.fresh_scope_alias();
            let rendered: Vec<_> = items
                .iter()
                .map(|item| {
                    let e = transform_expr(&item.expr, ctx);
                    let null_prefix = match item.nulls_first {
                        Some(true) => format!("({e} IS NOT NULL), "),
                        Some(false) => format!("({e} IS NULL), "),
                        None => String::new(),
                    };
                    let dir = if item.descending { " DESC" } else { "" };
                    format!("{null_prefix}{e} COLLATE bqlite_total_order{dir}")
                })
                .collect();
            format!("SELECT * FROM ({input_sql}) {alias} ORDER BY {}", rendered.join(", "))
        }
        ScanData::Limit { input, limit, offset } => {
            let input_sql = transform_scan(input, ctx);
            match offset {
                Some(o) => format!("{input_sql} LIMIT {limit} OFFSET {o}"),
                None => format!("{input_sql} LIMIT {limit}"),
            }
        }
        ScanData::SingleRow => "SELECT 1".to_string(),
        ScanData::With { entries, body } => {
            let mut ctes = Vec::new();
            for entry in entries {
                let sql = transform_scan(&entry.body, ctx);
                let ids: Vec<_> = entry.columns.iter().map(|c| c.id).collect();
                ctx.fragments.register_cte(&entry.name, ids);
                ctes.push(format!("`{}` AS ({sql})", entry.name));
            }
            let main = transform_scan(body, ctx);
            format!("WITH {} {main}", ctes.join(", "))
        }
        ScanData::WithRef { name, output } => {
            let cols = ctx.fragments.cte_columns(name).map(|c| c.to_vec()).unwrap_or_default();
            let select_list: Vec<_> = output
                .iter()
                .zip(cols.iter().chain(std::iter::repeat(&bqlite_analyzer::ir::ColumnId(0))))
                .map(|(out, src)| format!("`{}` AS `{}`", ctx.fragments.synthesized_alias(*src), ctx.fragments.synthesized_alias(out.id)))
                .collect();
            format!("SELECT {} FROM `{name}`", select_list.join(", "))
        }
        ScanData::SetOp { kind, quantifier, inputs, output } => {
            let op = match (kind, quantifier) {
                (SetOpKind::Union, SetOpQuantifier::All) => "UNION ALL",
                (SetOpKind::Union, SetOpQuantifier::Distinct) => "UNION",
                (SetOpKind::Intersect, _) => "INTERSECT",
                (SetOpKind::Except, _) => "EXCEPT",
            };
            let branches: Vec<_> = inputs
                .iter()
                .map(|input| {
                    let sql = transform_scan(input, ctx);
                    let aliased: Vec<_> = output.iter().map(|c| format!("`{}`", ctx.fragments.synthesized_alias(c.id))).collect();
                    format!("SELECT {} FROM ({sql}) t", aliased.join(", "))
                })
                .collect();
            branches.join(&format!(" {op} "))
        }
        ScanData::Join { join_type, left, right, condition, output: _ } => {
            match join_type {
                JoinType::Cross => {
                    let l = transform_scan(left, ctx);
                    let r = transform_scan(right, ctx);
                    format!("SELECT * FROM ({l}) l CROSS JOIN ({r}) r")
                }
                JoinType::Inner | JoinType::Left => {
                    let l = transform_scan(left, ctx);
                    let r = transform_scan(right, ctx);
                    let on = condition.as_ref().map(|c| transform_expr(c, ctx)).unwrap_or_else(|| "1".into());
                    let kw = if *join_type == JoinType::Left { "LEFT JOIN" } else { "JOIN" };
                    format!("SELECT * FROM ({l}) l {kw} ({r}) r ON {on}")
                }
                JoinType::Right => {
                    // Emulated by swapping sides and emitting LEFT JOIN.
                    let l = transform_scan(right, ctx);
                    let r = transform_scan(left, ctx);
                    let on = condition.as_ref().map(|c| transform_expr(c, ctx)).unwrap_or_else(|| "1".into());
                    format!("SELECT * FROM ({l}) l LEFT JOIN ({r}) r ON {on} ORDER BY row_id NULLS LAST")
                }
                JoinType::Full => {
                    let l = transform_scan(left, ctx);
                    let r = transform_scan(right, ctx);
                    let on = condition.as_ref().map(|c| transform_expr(c, ctx)).unwrap_or_else(|| "1".into());
                    format!(
                        "SELECT * FROM ({l}) l LEFT JOIN ({r}) r ON {on} \
                         UNION ALL SELECT DISTINCT * FROM ({r}) r LEFT JOIN ({l}) l ON {on}"
                    )
                }
            }
        }
        ScanData::Array { input, expr, element } => {
            let encoded = transform_expr(expr, ctx);
            let value_col = format!("`{}`", ctx.fragments.synthesized_alias(element.id));
            match input {
                Some(base) => {
                    let base_sql = transform_scan(base, ctx);
                    format!("SELECT * FROM ({base_sql}) CROSS JOIN json_each({encoded}) AS {value_col}")
                }
                None => format!("SELECT value AS {value_col} FROM json_each({encoded})"),
            }
        }
        ScanData::Analytic { input, functions, windows, output: _ } => {
            let input_sql = transform_scan(input, ctx);
            let alias = ctx.fragments.fresh_scope_alias();
            let calls: Vec<_> = functions
                .iter()
                .zip(windows.iter())
                .map(|(call, window)| {
                    let args: Vec<_> = call.arguments.iter().map(|a| transform_expr(a, ctx)).collect();
                    ctx.fragments.register_column(call.output.id, &call.output.name, &alias);
                    let w = crate::expr::window_clause(&call.function, window, ctx);
                    format!("{}({}) OVER ({w}) AS `{}`", call.function, args.join(", "), ctx.fragments.synthesized_alias(call.output.id))
                })
                .collect();
            format!("SELECT *, {} FROM ({input_sql}) {alias}", calls.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bqlite_analyzer::ir::{ColumnId, OutputColumn};
    use bqlite_value::Type;

    #[test]
    fn table_scan_emits_aliased_columns() {
        let mut ctx = TransformContext::default();
        let scan = ScanData::Table {
            output: vec![OutputColumn { id: ColumnId(0), name: "a".into(), ty: Type::Int64 }],
            path: vec!["t".into()],
        };
        let sql = transform_scan(&scan, &mut ctx);
        assert!(sql.contains("`a` AS `a__0`"));
    }

    #[test]
    fn limit_appends_clause() {
        let mut ctx = TransformContext::default();
        let scan = ScanData::Limit { input: Box::new(ScanData::SingleRow), limit: 10, offset: Some(5) };
        let sql = transform_scan(&scan, &mut ctx);
        assert!(sql.ends_with("LIMIT 10 OFFSET 5"));
    }
}
