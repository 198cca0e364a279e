//! Entry point tying the per-variant transformers together: takes a resolved
//! statement and returns the host-dialect SQL text plus any bound parameters.

use crate::context::TransformContext;
use crate::expr::transform_expr;
use crate::scan::transform_scan;
use bqlite_analyzer::ir::{MergeActionKind, MergeClauseData, MergeMatchKind, StatementData};

pub struct TransformedStatement {
    pub sql: String,
    pub is_query: bool,
}

pub fn transform_statement(stmt: &StatementData, ctx: &mut TransformContext) -> TransformedStatement {
    match stmt {
        StatementData::Select { body } => TransformedStatement { sql: transform_scan(body, ctx), is_query: true },
        StatementData::Insert { table, columns, source } => {
            let table_name = table.join("_");
            let cols = if columns.is_empty() { String::new() } else { format!("({})", columns.join(", ")) };
            let select = transform_scan(source, ctx);
            TransformedStatement { sql: format!("INSERT INTO `{table_name}`{cols} {select}"), is_query: false }
        }
        StatementData::Update { table, from, assignments, filter } => {
            let table_name = table.join("_");
            let set_clause: Vec<_> = assignments.iter().map(|(col, expr)| format!("`{col}` = {}", transform_expr(expr, ctx))).collect();
            let mut sql = format!("UPDATE `{table_name}` SET {}", set_clause.join(", "));
            if let Some(f) = from {
                sql.push_str(&format!(" FROM ({})", transform_scan(f, ctx)));
            }
            if let Some(cond) = filter {
                sql.push_str(&format!(" WHERE {}", transform_expr(cond, ctx)));
            }
            TransformedStatement { sql, is_query: false }
        }
        StatementData::Delete { table, filter } => {
            let table_name = table.join("_");
            let mut sql = format!("DELETE FROM `{table_name}`");
            if let Some(cond) = filter {
                sql.push_str(&format!(" WHERE {}", transform_expr(cond, ctx)));
            }
            TransformedStatement { sql, is_query: false }
        }
        StatementData::Merge { target, source, condition, clauses } => {
            let target_name = target.join("_");
            let source_sql = transform_scan(source, ctx);
            let on = transform_expr(condition, ctx);
            let rendered: Vec<_> = clauses.iter().map(|c| render_merge_clause(c, ctx)).collect();
            TransformedStatement {
                sql: format!("MERGE INTO `{target_name}` USING ({source_sql}) s ON {on} {}", rendered.join(" ")),
                is_query: false,
            }
        }
        StatementData::Drop { path, kind } => TransformedStatement { sql: format!("DROP {} `{}`", kind.to_ascii_uppercase(), path.join("_")), is_query: false },
        StatementData::CreateTable { path, columns, as_select } => {
            let table_name = path.join("_");
            match as_select {
                Some(body) => TransformedStatement { sql: format!("CREATE TABLE `{table_name}` AS {}", transform_scan(body, ctx)), is_query: false },
                None => {
                    let col_list: Vec<String> = columns.iter().map(|c| format!("`{c}`")).collect();
                    TransformedStatement { sql: format!("CREATE TABLE `{table_name}` ({})", col_list.join(", ")), is_query: false }
                }
            }
        }
        StatementData::CreateView { path, body } => {
            TransformedStatement { sql: format!("CREATE VIEW `{}` AS {}", path.join("_"), transform_scan(body, ctx)), is_query: false }
        }
        StatementData::CreateFunction { path } => TransformedStatement { sql: format!("-- function `{}` registered out-of-band", path.join("_")), is_query: false },
    }
}

fn render_merge_clause(clause: &MergeClauseData, ctx: &mut TransformContext) -> String {
    let when = match clause.kind {
        MergeMatchKind::Matched => "WHEN MATCHED",
        MergeMatchKind::NotMatched => "WHEN NOT MATCHED",
        MergeMatchKind::NotMatchedBySource => "WHEN NOT MATCHED BY SOURCE",
    };
    let predicate = clause
        .predicate
        .as_ref()
        .map(|p| format!(" AND {}", transform_expr(p, ctx)))
        .unwrap_or_default();
    let action = match &clause.action {
        MergeActionKind::UpdateSet(assignments) => {
            let set: Vec<_> = assignments.iter().map(|(col, e)| format!("`{col}` = {}", transform_expr(e, ctx))).collect();
            format!("THEN UPDATE SET {}", set.join(", "))
        }
        MergeActionKind::Delete => "THEN DELETE".to_string(),
        MergeActionKind::InsertValues { columns, values } => {
            let cols = if columns.is_empty() { String::new() } else { format!("({})", columns.join(", ")) };
            let vals: Vec<_> = values.iter().map(|e| transform_expr(e, ctx)).collect();
            format!("THEN INSERT{cols} VALUES ({})", vals.join(", "))
        }
        MergeActionKind::InsertRow => "THEN INSERT ROW".to_string(),
        MergeActionKind::DoNothing => "THEN DO NOTHING".to_string(),
    };
    format!("{when}{predicate} {action}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bqlite_analyzer::ir::ScanData;

    #[test]
    fn select_passes_through_scan_sql() {
        let mut ctx = TransformContext::default();
        let stmt = StatementData::Select { body: ScanData::SingleRow };
        let out = transform_statement(&stmt, &mut ctx);
        assert!(out.is_query);
        assert_eq!(out.sql, "SELECT 1");
    }

    #[test]
    fn delete_with_filter_renders_where() {
        use bqlite_analyzer::ir::{ColumnId, ExpressionData};
        use bqlite_value::Value;
        let mut ctx = TransformContext::default();
        ctx.fragments.register_column(ColumnId(0), "id", "t0");
        let stmt = StatementData::Delete {
            table: vec!["orders".into()],
            filter: Some(ExpressionData::Binary {
                op: "$equal".into(),
                left: Box::new(ExpressionData::Column { id: ColumnId(0), name: "id".into() }),
                right: Box::new(ExpressionData::Literal(Value::Int(1))),
            }),
        };
        let out = transform_statement(&stmt, &mut ctx);
        assert_eq!(out.sql, "DELETE FROM `orders` WHERE (`id__0` = 1)");
    }
}
