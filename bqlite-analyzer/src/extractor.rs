//! Walks a parsed statement once into the sum-typed IR (`ir.rs`), allocating
//! a fresh `ColumnId` for every column introduced along the way: table
//! scans, projections, joins, grouping keys, and `UNNEST` elements.

use crate::builtins::resolve_builtin;
use crate::error::AnalyzeError;
use crate::ir::*;
use bqlite_value::Value;
use sqlparser::ast::{
    BinaryOperator as SqlBinOp, Expr as SqlExpr, Query, Select, SelectItem, SetExpr, Statement,
    TableFactor, UnaryOperator as SqlUnaryOp, Value as SqlValue,
};
use std::collections::HashMap;

pub struct Extractor {
    alloc: ColumnIdAllocator,
    /// name -> id of the most recently bound column with that name, so a
    /// bare reference in a later clause resolves to the right scan output.
    scope: HashMap<String, ColumnId>,
    /// CTE name -> its output columns, so a later FROM reference resolves
    /// to a `WithRef` instead of a base table scan.
    ctes: HashMap<String, Vec<OutputColumn>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor { alloc: ColumnIdAllocator::default(), scope: HashMap::new(), ctes: HashMap::new() }
    }
}

/// Aggregate function names that participate in a GROUP BY pipeline.
/// Window-only names (ROW_NUMBER, RANK, ...) are excluded here: they only
/// ever appear with an `OVER` clause, handled separately in `extract_expr`.
const PLAIN_AGGREGATE_NAMES: &[&str] = &[
    "COUNT", "SUM", "AVG", "MIN", "MAX", "ARRAY_AGG", "ARRAY_CONCAT_AGG",
    "STRING_AGG", "LOGICAL_AND", "LOGICAL_OR", "BIT_AND", "BIT_OR", "BIT_XOR", "COUNTIF",
];

struct GroupByResult {
    keys: Vec<OutputColumn>,
    exprs: Vec<ExpressionData>,
    grouping_sets: Vec<Vec<usize>>,
    raw_text: Vec<String>,
}

impl Extractor {
    pub fn extract(&mut self, stmt: &Statement) -> Result<StatementData, AnalyzeError> {
        match stmt {
            Statement::Query(query) => Ok(StatementData::Select { body: self.extract_query(query)? }),
            Statement::Insert(insert) => {
                let path: Vec<String> = insert.table_name.to_string().split('.').map(str::to_string).collect();
                let columns: Vec<String> = insert.columns.iter().map(|c| c.value.clone()).collect();
                let source = match &insert.source {
                    Some(q) => self.extract_query(q)?,
                    None => ScanData::SingleRow,
                };
                Ok(StatementData::Insert { table: path, columns, source })
            }
            Statement::Update { table, assignments, from, selection, .. } => {
                let path = table_with_joins_path(table)?;
                let mut sets = Vec::new();
                for a in assignments {
                    sets.push((assignment_target_name(&a.target), self.extract_expr(&a.value)?));
                }
                let from_scan = match from {
                    Some(f) => Some(self.extract_table_with_joins(f)?),
                    None => None,
                };
                let filter = match selection {
                    Some(e) => Some(self.extract_expr(e)?),
                    None => None,
                };
                Ok(StatementData::Update { table: path, from: from_scan, assignments: sets, filter })
            }
            Statement::Delete(delete) => {
                let path = delete
                    .tables
                    .first()
                    .map(|n| n.to_string().split('.').map(str::to_string).collect())
                    .or_else(|| from_table_path(&delete.from))
                    .unwrap_or_default();
                let filter = match &delete.selection {
                    Some(e) => Some(self.extract_expr(e)?),
                    None => None,
                };
                Ok(StatementData::Delete { table: path, filter })
            }
            Statement::Merge { table, source, on, clauses, .. } => {
                let target = table_factor_path(table)?;
                let source_scan = self.extract_table_factor(source)?;
                let condition = self.extract_expr(on)?;
                let mut out_clauses = Vec::new();
                for clause in clauses {
                    let kind = match clause.clause_kind {
                        sqlparser::ast::MergeClauseKind::Matched => MergeMatchKind::Matched,
                        sqlparser::ast::MergeClauseKind::NotMatched => MergeMatchKind::NotMatched,
                        sqlparser::ast::MergeClauseKind::NotMatchedBySource => MergeMatchKind::NotMatchedBySource,
                        #[allow(unreachable_patterns)]
                        _ => MergeMatchKind::NotMatched,
                    };
                    let predicate = match &clause.predicate {
                        Some(e) => Some(self.extract_expr(e)?),
                        None => None,
                    };
                    let action = match &clause.action {
                        sqlparser::ast::MergeAction::Update { assignments } => {
                            let mut sets = Vec::new();
                            for a in assignments {
                                sets.push((assignment_target_name(&a.target), self.extract_expr(&a.value)?));
                            }
                            MergeActionKind::UpdateSet(sets)
                        }
                        sqlparser::ast::MergeAction::Delete => MergeActionKind::Delete,
                        sqlparser::ast::MergeAction::Insert(insert) => {
                            let columns: Vec<String> = insert.columns.iter().map(|i| i.value.clone()).collect();
                            match &insert.kind {
                                sqlparser::ast::MergeInsertKind::Values(values) => {
                                    let mut vals = Vec::new();
                                    if let Some(row) = values.rows.first() {
                                        for e in row {
                                            vals.push(self.extract_expr(e)?);
                                        }
                                    }
                                    MergeActionKind::InsertValues { columns, values: vals }
                                }
                                #[allow(unreachable_patterns)]
                                _ => MergeActionKind::InsertRow,
                            }
                        }
                    };
                    out_clauses.push(MergeClauseData { kind, predicate, action });
                }
                Ok(StatementData::Merge { target, source: source_scan, condition, clauses: out_clauses })
            }
            Statement::Drop { names, object_type, .. } => Ok(StatementData::Drop {
                path: names.first().map(|n| n.to_string().split('.').map(str::to_string).collect()).unwrap_or_default(),
                kind: object_type.to_string(),
            }),
            Statement::Truncate { table_names, .. } => {
                let path = table_names.first().map(|t| t.name.to_string().split('.').map(str::to_string).collect()).unwrap_or_default();
                Ok(StatementData::Delete { table: path, filter: None })
            }
            Statement::CreateTable(ct) => {
                let path: Vec<String> = ct.name.to_string().split('.').map(str::to_string).collect();
                let columns: Vec<String> = ct.columns.iter().map(|c| c.name.value.clone()).collect();
                let as_select = match &ct.query {
                    Some(q) => Some(self.extract_query(q)?),
                    None => None,
                };
                Ok(StatementData::CreateTable { path, columns, as_select })
            }
            Statement::CreateView { name, query, .. } => {
                Ok(StatementData::CreateView { path: name.to_string().split('.').map(str::to_string).collect(), body: self.extract_query(query)? })
            }
            Statement::CreateFunction { name, .. } => Ok(StatementData::CreateFunction { path: name.to_string().split('.').map(str::to_string).collect() }),
            other => Err(AnalyzeError::Unimplemented { detail: format!("statement kind {other:?} not supported") }),
        }
    }

    fn extract_query(&mut self, query: &Query) -> Result<ScanData, AnalyzeError> {
        let mut cte_entries = Vec::new();
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                let body = self.extract_query(&cte.query)?;
                let columns = scan_output_columns(&body);
                let name = cte.alias.name.value.clone();
                self.ctes.insert(name.clone(), columns.clone());
                cte_entries.push(WithEntry { name, body: Box::new(body), columns });
            }
        }

        let mut scan = self.extract_set_expr(&query.body)?;

        if let Some(order_by) = &query.order_by {
            let mut items = Vec::new();
            for item in &order_by.exprs {
                let expr = self.extract_expr(&item.expr)?;
                items.push(OrderByItem {
                    expr,
                    descending: item.asc == Some(false),
                    nulls_first: item.nulls_first,
                });
            }
            if !items.is_empty() {
                scan = ScanData::OrderBy { input: Box::new(scan), items };
            }
        }

        if let Some(SqlExpr::Value(v)) = &query.limit {
            if let Some(n) = sql_value_as_u64(v) {
                let off = query.offset.as_ref().and_then(|o| match &o.value {
                    SqlExpr::Value(v) => sql_value_as_u64(v),
                    _ => None,
                });
                scan = ScanData::Limit { input: Box::new(scan), limit: n, offset: off };
            }
        }

        if !cte_entries.is_empty() {
            scan = ScanData::With { entries: cte_entries, body: Box::new(scan) };
        }

        Ok(scan)
    }

    fn extract_set_expr(&mut self, se: &SetExpr) -> Result<ScanData, AnalyzeError> {
        match se {
            SetExpr::Select(select) => self.extract_select(select),
            SetExpr::Query(q) => self.extract_query(q),
            SetExpr::Values(values) => self.extract_values(&values.rows),
            SetExpr::SetOperation { op, set_quantifier, left, right } => {
                let l = self.extract_set_expr(left)?;
                let r = self.extract_set_expr(right)?;
                let kind = match op {
                    sqlparser::ast::SetOperator::Union => SetOpKind::Union,
                    sqlparser::ast::SetOperator::Intersect => SetOpKind::Intersect,
                    sqlparser::ast::SetOperator::Except => SetOpKind::Except,
                };
                let quantifier = match set_quantifier {
                    sqlparser::ast::SetQuantifier::All => SetOpQuantifier::All,
                    _ => SetOpQuantifier::Distinct,
                };
                let output: Vec<OutputColumn> = scan_output_columns(&l)
                    .iter()
                    .map(|c| OutputColumn { id: self.alloc.alloc(), name: c.name.clone(), ty: c.ty.clone() })
                    .collect();
                Ok(ScanData::SetOp { kind, quantifier, inputs: vec![l, r], output })
            }
            other => Err(AnalyzeError::Unimplemented { detail: format!("query body {other:?} not supported") }),
        }
    }

    /// A `VALUES (...), (...)` list lowers to a row-wise projection of
    /// literals over `SingleRow`, unioned together when there's more than
    /// one row — there's no dedicated IR case for a bare values list since
    /// every other consumer already knows how to render `Project`/`SetOp`.
    fn extract_values(&mut self, rows: &[Vec<SqlExpr>]) -> Result<ScanData, AnalyzeError> {
        let mut built = Vec::new();
        for row in rows {
            let mut output = Vec::new();
            let mut expressions = Vec::new();
            for (i, e) in row.iter().enumerate() {
                let id = self.alloc.alloc();
                output.push(OutputColumn { id, name: format!("col{i}"), ty: bqlite_value::Type::Null });
                expressions.push((id, self.extract_expr(e)?));
            }
            built.push(ScanData::Project { input: Box::new(ScanData::SingleRow), output, expressions });
        }
        if built.len() == 1 {
            return Ok(built.into_iter().next().unwrap());
        }
        let output = match built.first() {
            Some(ScanData::Project { output, .. }) => output.clone(),
            _ => Vec::new(),
        };
        Ok(ScanData::SetOp { kind: SetOpKind::Union, quantifier: SetOpQuantifier::All, inputs: built, output })
    }

    fn extract_select(&mut self, select: &Select) -> Result<ScanData, AnalyzeError> {
        let mut scan = self.extract_from(&select.from)?;

        if let Some(selection) = &select.selection {
            let condition = self.extract_expr(selection)?;
            scan = ScanData::Filter { input: Box::new(scan), condition: Box::new(condition) };
        }

        let group_by_present = !matches!(&select.group_by, sqlparser::ast::GroupByExpr::Expressions(e, _) if e.is_empty());
        let has_aggregate_call = select.projection.iter().any(|item| projection_expr(item).map(is_aggregate_call).unwrap_or(false));

        let mut agg_text_map: Vec<(String, ColumnId)> = Vec::new();
        let mut key_text_map: Vec<(String, ColumnId)> = Vec::new();

        if group_by_present || has_aggregate_call {
            let grp = self.extract_group_by(&select.group_by)?;
            key_text_map = grp.raw_text.iter().cloned().zip(grp.keys.iter().map(|k| k.id)).collect();

            let mut aggregates = Vec::new();
            let mut output = grp.keys.clone();
            for item in &select.projection {
                if let Some(SqlExpr::Function(func)) = projection_expr(item) {
                    if is_aggregate_function(func) {
                        let (fname, args) = self.extract_aggregate_call(func)?;
                        let id = self.alloc.alloc();
                        let name = match item {
                            SelectItem::ExprWithAlias { alias, .. } => alias.value.clone(),
                            _ => fname.to_ascii_lowercase(),
                        };
                        let out = OutputColumn { id, name, ty: bqlite_value::Type::Null };
                        aggregates.push(AggregateCall { output: out.clone(), function: fname, arguments: args });
                        output.push(out);
                        agg_text_map.push((projection_expr(item).unwrap().to_string(), id));
                    }
                }
            }

            scan = ScanData::Aggregate {
                input: Box::new(scan),
                group_by: grp.exprs,
                grouping_sets: grp.grouping_sets,
                aggregates,
                output,
                needs_row_id: false,
            };
        }

        let mut expressions = Vec::new();
        let mut output = Vec::new();
        for item in &select.projection {
            match item {
                SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
                    let alias_name = match item {
                        SelectItem::ExprWithAlias { alias, .. } => alias.value.clone(),
                        _ => expr_display_name(expr),
                    };
                    let id = self.alloc.alloc();
                    output.push(OutputColumn { id, name: alias_name.clone(), ty: bqlite_value::Type::Null });
                    self.scope.insert(alias_name.clone(), id);
                    let text = expr.to_string();
                    let resolved_expr = if let Some((_, src_id)) = agg_text_map.iter().find(|(t, _)| *t == text) {
                        ExpressionData::Column { id: *src_id, name: alias_name.clone() }
                    } else if let Some((_, src_id)) = key_text_map.iter().find(|(t, _)| *t == text) {
                        ExpressionData::Column { id: *src_id, name: alias_name.clone() }
                    } else {
                        self.extract_expr(expr)?
                    };
                    expressions.push((id, resolved_expr));
                }
                SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => {
                    let id = self.alloc.alloc();
                    output.push(OutputColumn { id, name: "*".into(), ty: bqlite_value::Type::Null });
                    expressions.push((id, ExpressionData::Star));
                }
            }
        }

        Ok(ScanData::Project { input: Box::new(scan), output, expressions })
    }

    fn extract_group_by(&mut self, group_by: &sqlparser::ast::GroupByExpr) -> Result<GroupByResult, AnalyzeError> {
        let exprs_raw: &Vec<SqlExpr> = match group_by {
            sqlparser::ast::GroupByExpr::Expressions(exprs, _) => exprs,
            sqlparser::ast::GroupByExpr::All(_) => return Err(AnalyzeError::Unimplemented { detail: "GROUP BY ALL not supported".into() }),
        };

        let mut keys = Vec::new();
        let mut exprs = Vec::new();
        let mut raw_text = Vec::new();
        let mut rollup_indices: Vec<usize> = Vec::new();

        for e in exprs_raw {
            if let SqlExpr::Rollup(sets) = e {
                for set in sets {
                    for item in set {
                        let id = self.alloc.alloc();
                        keys.push(OutputColumn { id, name: expr_display_name(item), ty: bqlite_value::Type::Null });
                        exprs.push(self.extract_expr(item)?);
                        raw_text.push(item.to_string());
                        rollup_indices.push(exprs.len() - 1);
                    }
                }
            } else {
                let id = self.alloc.alloc();
                keys.push(OutputColumn { id, name: expr_display_name(e), ty: bqlite_value::Type::Null });
                exprs.push(self.extract_expr(e)?);
                raw_text.push(e.to_string());
            }
        }

        let mut grouping_sets = Vec::new();
        if !rollup_indices.is_empty() {
            for n in (0..=rollup_indices.len()).rev() {
                grouping_sets.push(rollup_indices[..n].to_vec());
            }
        }

        Ok(GroupByResult { keys, exprs, grouping_sets, raw_text })
    }

    fn extract_aggregate_call(&mut self, func: &sqlparser::ast::Function) -> Result<(String, Vec<ExpressionData>), AnalyzeError> {
        let mut name = func.name.to_string().to_ascii_uppercase();
        let mut arguments = Vec::new();
        let mut is_wildcard = false;
        if let sqlparser::ast::FunctionArguments::List(list) = &func.args {
            for arg in &list.args {
                match arg {
                    sqlparser::ast::FunctionArg::Unnamed(sqlparser::ast::FunctionArgExpr::Expr(e)) => arguments.push(self.extract_expr(e)?),
                    sqlparser::ast::FunctionArg::Unnamed(sqlparser::ast::FunctionArgExpr::Wildcard) => is_wildcard = true,
                    _ => {}
                }
            }
        }
        if name == "COUNT" && is_wildcard {
            name = "COUNT_STAR".to_string();
        }
        let resolved = resolve_builtin(&name)?;
        Ok((resolved.internal_name, arguments))
    }

    fn extract_from(&mut self, from: &[sqlparser::ast::TableWithJoins]) -> Result<ScanData, AnalyzeError> {
        if from.is_empty() {
            return Ok(ScanData::SingleRow);
        }
        let mut scan = self.extract_table_with_joins(&from[0])?;
        for twj in &from[1..] {
            let right = self.extract_table_with_joins(twj)?;
            scan = ScanData::Join { join_type: JoinType::Cross, left: Box::new(scan), right: Box::new(right), condition: None, output: Vec::new() };
        }
        Ok(scan)
    }

    fn extract_table_with_joins(&mut self, twj: &sqlparser::ast::TableWithJoins) -> Result<ScanData, AnalyzeError> {
        let mut scan = self.extract_table_factor(&twj.relation)?;
        for join in &twj.joins {
            let right = self.extract_table_factor(&join.relation)?;
            let (join_type, constraint) = match &join.join_operator {
                sqlparser::ast::JoinOperator::Inner(c) => (JoinType::Inner, Some(c)),
                sqlparser::ast::JoinOperator::LeftOuter(c) => (JoinType::Left, Some(c)),
                sqlparser::ast::JoinOperator::RightOuter(c) => (JoinType::Right, Some(c)),
                sqlparser::ast::JoinOperator::FullOuter(c) => (JoinType::Full, Some(c)),
                sqlparser::ast::JoinOperator::CrossJoin => (JoinType::Cross, None),
                other => return Err(AnalyzeError::Unimplemented { detail: format!("join operator {other:?} not supported") }),
            };
            let condition = match constraint {
                Some(sqlparser::ast::JoinConstraint::On(e)) => Some(Box::new(self.extract_expr(e)?)),
                _ => None,
            };
            scan = ScanData::Join { join_type, left: Box::new(scan), right: Box::new(right), condition, output: Vec::new() };
        }
        Ok(scan)
    }

    fn extract_table_factor(&mut self, factor: &TableFactor) -> Result<ScanData, AnalyzeError> {
        match factor {
            TableFactor::Table { name, .. } => {
                let path: Vec<String> = name.to_string().split('.').map(str::to_string).collect();
                if path.len() == 1 {
                    if let Some(cols) = self.ctes.get(&path[0]).cloned() {
                        let output: Vec<OutputColumn> = cols
                            .iter()
                            .map(|c| OutputColumn { id: self.alloc.alloc(), name: c.name.clone(), ty: c.ty.clone() })
                            .collect();
                        for (c, o) in cols.iter().zip(output.iter()) {
                            self.scope.insert(c.name.clone(), o.id);
                        }
                        return Ok(ScanData::WithRef { name: path[0].clone(), output });
                    }
                }
                Ok(ScanData::Table { output: Vec::new(), path })
            }
            other => Err(AnalyzeError::Unimplemented { detail: format!("table factor {other:?} not supported") }),
        }
    }

    fn extract_expr(&mut self, expr: &SqlExpr) -> Result<ExpressionData, AnalyzeError> {
        match expr {
            SqlExpr::Value(v) => Ok(ExpressionData::Literal(sql_value_to_bqlite(v)?)),
            SqlExpr::Identifier(ident) => {
                let id = self.scope.get(&ident.value).copied().unwrap_or_else(|| self.alloc.alloc());
                Ok(ExpressionData::Column { id, name: ident.value.clone() })
            }
            SqlExpr::CompoundIdentifier(parts) => {
                let name = parts.last().map(|p| p.value.clone()).unwrap_or_default();
                let id = self.scope.get(&name).copied().unwrap_or_else(|| self.alloc.alloc());
                Ok(ExpressionData::Column { id, name })
            }
            SqlExpr::BinaryOp { left, op, right } => Ok(ExpressionData::Binary {
                op: binop_name(op),
                left: Box::new(self.extract_expr(left)?),
                right: Box::new(self.extract_expr(right)?),
            }),
            SqlExpr::UnaryOp { op, expr } => Ok(ExpressionData::Unary {
                op: unaryop_name(op),
                operand: Box::new(self.extract_expr(expr)?),
            }),
            SqlExpr::Function(func) => {
                let name = func.name.to_string();
                let resolved = resolve_builtin(&name)?;
                let mut arguments = Vec::new();
                if let sqlparser::ast::FunctionArguments::List(list) = &func.args {
                    for arg in &list.args {
                        if let sqlparser::ast::FunctionArg::Unnamed(sqlparser::ast::FunctionArgExpr::Expr(e)) = arg {
                            arguments.push(self.extract_expr(e)?);
                        }
                    }
                }
                let window = match &func.over {
                    Some(sqlparser::ast::WindowType::WindowSpec(spec)) => Some(self.extract_window(spec)?),
                    Some(sqlparser::ast::WindowType::NamedWindow(_)) => {
                        return Err(AnalyzeError::Unimplemented { detail: "named WINDOW clause not supported".into() });
                    }
                    None => None,
                };
                Ok(ExpressionData::Function { name: resolved.internal_name, arguments, window })
            }
            SqlExpr::Cast { expr, data_type, .. } => Ok(ExpressionData::Cast {
                input: Box::new(self.extract_expr(expr)?),
                to: sql_type_to_bqlite(data_type),
                safe: false,
            }),
            SqlExpr::IsNull(e) => Ok(ExpressionData::Unary { op: "is_null".into(), operand: Box::new(self.extract_expr(e)?) }),
            SqlExpr::IsNotNull(e) => Ok(ExpressionData::Unary { op: "is_not_null".into(), operand: Box::new(self.extract_expr(e)?) }),
            other => Err(AnalyzeError::Unimplemented { detail: format!("expression {other:?} not supported") }),
        }
    }

    fn extract_window(&mut self, spec: &sqlparser::ast::WindowSpec) -> Result<WindowSpec, AnalyzeError> {
        let mut partition_by = Vec::new();
        for e in &spec.partition_by {
            partition_by.push(self.extract_expr(e)?);
        }
        let mut order_by = Vec::new();
        for item in &spec.order_by {
            let expr = self.extract_expr(&item.expr)?;
            order_by.push(OrderByItem { expr, descending: item.asc == Some(false), nulls_first: item.nulls_first });
        }
        let frame = match &spec.window_frame {
            Some(f) => Some(self.extract_frame(f)?),
            None => None,
        };
        Ok(WindowSpec { partition_by, order_by, frame })
    }

    fn extract_frame(&mut self, frame: &sqlparser::ast::WindowFrame) -> Result<WindowFrame, AnalyzeError> {
        let unit = match frame.units {
            sqlparser::ast::WindowFrameUnits::Rows => FrameUnit::Rows,
            sqlparser::ast::WindowFrameUnits::Range => FrameUnit::Range,
            sqlparser::ast::WindowFrameUnits::Groups => FrameUnit::Groups,
        };
        let start = frame_boundary(&frame.start_bound);
        let end = match &frame.end_bound {
            Some(b) => frame_boundary(b),
            None => FrameBoundary::CurrentRow,
        };
        Ok(WindowFrame { unit, start, end })
    }
}

fn frame_boundary(bound: &sqlparser::ast::WindowFrameBound) -> FrameBoundary {
    use sqlparser::ast::WindowFrameBound as B;
    match bound {
        B::CurrentRow => FrameBoundary::CurrentRow,
        B::Preceding(None) => FrameBoundary::UnboundedPreceding,
        B::Preceding(Some(e)) => FrameBoundary::Preceding(expr_as_u64(e).unwrap_or(0)),
        B::Following(None) => FrameBoundary::UnboundedFollowing,
        B::Following(Some(e)) => FrameBoundary::Following(expr_as_u64(e).unwrap_or(0)),
    }
}

fn expr_as_u64(expr: &SqlExpr) -> Option<u64> {
    match expr {
        SqlExpr::Value(v) => sql_value_as_u64(v),
        _ => None,
    }
}

fn projection_expr(item: &SelectItem) -> Option<&SqlExpr> {
    match item {
        SelectItem::UnnamedExpr(e) | SelectItem::ExprWithAlias { expr: e, .. } => Some(e),
        _ => None,
    }
}

fn is_aggregate_function(func: &sqlparser::ast::Function) -> bool {
    func.over.is_none() && PLAIN_AGGREGATE_NAMES.contains(&func.name.to_string().to_ascii_uppercase().as_str())
}

fn is_aggregate_call(expr: &SqlExpr) -> bool {
    matches!(expr, SqlExpr::Function(f) if is_aggregate_function(f))
}

fn scan_output_columns(scan: &ScanData) -> Vec<OutputColumn> {
    match scan {
        ScanData::Table { output, .. }
        | ScanData::Join { output, .. }
        | ScanData::Project { output, .. }
        | ScanData::Aggregate { output, .. }
        | ScanData::WithRef { output, .. }
        | ScanData::SetOp { output, .. }
        | ScanData::Analytic { output, .. } => output.clone(),
        ScanData::Filter { input, .. } | ScanData::OrderBy { input, .. } | ScanData::Limit { input, .. } => scan_output_columns(input),
        ScanData::With { body, .. } => scan_output_columns(body),
        ScanData::SingleRow => Vec::new(),
        ScanData::Array { element, .. } => vec![element.clone()],
    }
}

fn table_factor_path(factor: &TableFactor) -> Result<Vec<String>, AnalyzeError> {
    match factor {
        TableFactor::Table { name, .. } => Ok(name.to_string().split('.').map(str::to_string).collect()),
        other => Err(AnalyzeError::Unimplemented { detail: format!("table factor {other:?} not supported") }),
    }
}

fn table_with_joins_path(twj: &sqlparser::ast::TableWithJoins) -> Result<Vec<String>, AnalyzeError> {
    table_factor_path(&twj.relation)
}

fn from_table_path(from: &sqlparser::ast::FromTable) -> Option<Vec<String>> {
    let tables = match from {
        sqlparser::ast::FromTable::WithFromKeyword(v) | sqlparser::ast::FromTable::WithoutKeyword(v) => v,
    };
    tables.first().and_then(|twj| table_factor_path(&twj.relation).ok())
}

fn assignment_target_name(target: &sqlparser::ast::AssignmentTarget) -> String {
    match target {
        sqlparser::ast::AssignmentTarget::ColumnName(name) => name.0.last().map(|p| p.value.clone()).unwrap_or_default(),
        sqlparser::ast::AssignmentTarget::Tuple(names) => names.first().and_then(|n| n.0.last()).map(|p| p.value.clone()).unwrap_or_default(),
    }
}

fn expr_display_name(expr: &SqlExpr) -> String {
    match expr {
        SqlExpr::Identifier(i) => i.value.clone(),
        SqlExpr::CompoundIdentifier(parts) => parts.last().map(|p| p.value.clone()).unwrap_or_default(),
        _ => "expr".to_string(),
    }
}

fn binop_name(op: &SqlBinOp) -> String {
    match op {
        SqlBinOp::Plus => "$add",
        SqlBinOp::Minus => "$subtract",
        SqlBinOp::Multiply => "$multiply",
        SqlBinOp::Divide => "$divide",
        SqlBinOp::Eq => "$equal",
        SqlBinOp::NotEq => "$not_equal",
        SqlBinOp::Gt => "$greater",
        SqlBinOp::Lt => "$less",
        SqlBinOp::GtEq => "$greater_or_equal",
        SqlBinOp::LtEq => "$less_or_equal",
        SqlBinOp::And => "$and",
        SqlBinOp::Or => "$or",
        SqlBinOp::BitwiseAnd => "$bitwise_and",
        SqlBinOp::BitwiseOr => "$bitwise_or",
        SqlBinOp::BitwiseXor => "$bitwise_xor",
        _ => "$unknown_binop",
    }
    .to_string()
}

fn unaryop_name(op: &SqlUnaryOp) -> String {
    match op {
        SqlUnaryOp::Not => "$not",
        SqlUnaryOp::Minus => "$negate",
        SqlUnaryOp::Plus => "$unary_plus",
        _ => "$unknown_unaryop",
    }
    .to_string()
}

fn sql_value_to_bqlite(v: &SqlValue) -> Result<Value, AnalyzeError> {
    match v {
        SqlValue::Number(n, _) => {
            if let Ok(i) = n.parse::<i64>() {
                Ok(Value::Int(i))
            } else {
                n.parse::<f64>().map(Value::Float).map_err(|e| AnalyzeError::Parse(e.to_string()))
            }
        }
        SqlValue::SingleQuotedString(s) | SqlValue::DoubleQuotedString(s) => Ok(Value::String(s.clone())),
        SqlValue::Boolean(b) => Ok(Value::Bool(*b)),
        SqlValue::Null => Ok(Value::Null),
        SqlValue::Placeholder(p) => Ok(Value::String(p.clone())),
        other => Err(AnalyzeError::Unimplemented { detail: format!("literal {other:?} not supported") }),
    }
}

fn sql_value_as_u64(v: &SqlValue) -> Option<u64> {
    match v {
        SqlValue::Number(n, _) => n.parse::<u64>().ok(),
        _ => None,
    }
}

fn sql_type_to_bqlite(ty: &sqlparser::ast::DataType) -> bqlite_value::Type {
    use bqlite_value::Type;
    use sqlparser::ast::DataType as DT;
    match ty {
        DT::BigInt(_) | DT::Int(_) | DT::Integer(_) => Type::Int64,
        DT::Float(_) | DT::Double | DT::DoublePrecision => Type::Float64,
        DT::Boolean | DT::Bool => Type::Bool,
        DT::Text | DT::Varchar(_) => Type::String,
        DT::Date => Type::Date,
        DT::Datetime(_) => Type::Datetime,
        DT::Time(_, _) => Type::Time,
        DT::Timestamp(_, _) => Type::Timestamp,
        DT::Numeric(_) | DT::Decimal(_) => Type::Numeric,
        DT::JSON => Type::Json,
        _ => Type::String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::parse_statement;

    #[test]
    fn extracts_simple_projection() {
        let stmt = parse_statement("SELECT 1 + 2").unwrap();
        let mut ex = Extractor::default();
        let extracted = ex.extract(&stmt).unwrap();
        match extracted {
            StatementData::Select { body: ScanData::Project { expressions, .. } } => {
                assert_eq!(expressions.len(), 1);
            }
            other => panic!("unexpected IR shape: {other:?}"),
        }
    }

    #[test]
    fn extracts_table_scan_with_filter() {
        let stmt = parse_statement("SELECT a FROM t WHERE a > 1").unwrap();
        let mut ex = Extractor::default();
        let extracted = ex.extract(&stmt).unwrap();
        match extracted {
            StatementData::Select { body: ScanData::Project { input, .. } } => {
                assert!(matches!(*input, ScanData::Filter { .. }));
            }
            other => panic!("unexpected IR shape: {other:?}"),
        }
    }

    #[test]
    fn column_ids_assigned_for_each_projection() {
        let stmt = parse_statement("SELECT a, b, c FROM t").unwrap();
        let mut ex = Extractor::default();
        let extracted = ex.extract(&stmt).unwrap();
        if let StatementData::Select { body: ScanData::Project { output, .. } } = extracted {
            let ids: Vec<_> = output.iter().map(|c| c.id).collect();
            let mut sorted = ids.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), ids.len());
        } else {
            panic!("expected Project");
        }
    }

    #[test]
    fn extracts_join_from_multi_table_from() {
        let stmt = parse_statement("SELECT a.x FROM a JOIN b ON a.id = b.id").unwrap();
        let mut ex = Extractor::default();
        let extracted = ex.extract(&stmt).unwrap();
        match extracted {
            StatementData::Select { body: ScanData::Project { input, .. } } => {
                assert!(matches!(*input, ScanData::Join { join_type: JoinType::Inner, .. }));
            }
            other => panic!("unexpected IR shape: {other:?}"),
        }
    }

    #[test]
    fn extracts_group_by_into_aggregate_scan() {
        let stmt = parse_statement("SELECT city, COUNT(*) FROM t GROUP BY city").unwrap();
        let mut ex = Extractor::default();
        let extracted = ex.extract(&stmt).unwrap();
        match extracted {
            StatementData::Select { body: ScanData::Project { input, output, .. } } => {
                assert_eq!(output.len(), 2);
                match *input {
                    ScanData::Aggregate { aggregates, output, .. } => {
                        assert_eq!(aggregates.len(), 1);
                        assert_eq!(aggregates[0].function, "COUNT_STAR");
                        assert_eq!(output.len(), 2);
                    }
                    other => panic!("expected Aggregate, got {other:?}"),
                }
            }
            other => panic!("unexpected IR shape: {other:?}"),
        }
    }

    #[test]
    fn extracts_cte_into_with_scan() {
        let stmt = parse_statement("WITH t AS (SELECT 1 AS v) SELECT v FROM t").unwrap();
        let mut ex = Extractor::default();
        let extracted = ex.extract(&stmt).unwrap();
        match extracted {
            StatementData::Select { body: ScanData::With { entries, .. } } => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].name, "t");
            }
            other => panic!("unexpected IR shape: {other:?}"),
        }
    }

    #[test]
    fn extracts_union_into_set_op() {
        let stmt = parse_statement("SELECT 1 UNION ALL SELECT 2").unwrap();
        let mut ex = Extractor::default();
        let extracted = ex.extract(&stmt).unwrap();
        assert!(matches!(extracted, StatementData::Select { body: ScanData::SetOp { .. } }));
    }

    #[test]
    fn extracts_create_table_columns() {
        let stmt = parse_statement("CREATE TABLE foo (x INT64, y STRING)").unwrap();
        let mut ex = Extractor::default();
        let extracted = ex.extract(&stmt).unwrap();
        match extracted {
            StatementData::CreateTable { columns, .. } => assert_eq!(columns, vec!["x".to_string(), "y".to_string()]),
            other => panic!("unexpected IR shape: {other:?}"),
        }
    }
}
