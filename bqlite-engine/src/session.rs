//! Runs a script end to end: split -> classify -> (parse -> resolve ->
//! transform -> bind -> execute) per statement, routing through the active
//! transaction when one is open.

use crate::error::BqError;
use crate::options::ConnectOptions;
use bqlite_analyzer::ir::StatementData;
use bqlite_analyzer::{detect_param_mode, parse_statement, Extractor, ParamMode};
use bqlite_catalog::{Catalog, Column, CreateMode, FunctionLanguage, FunctionSpec, TableSpec};
use bqlite_functions::convert::ValueWrapper;
use bqlite_transform::{transform_statement, TransformContext, TransformedStatement};
use bqlite_value::{Type, Value};
use rusqlite::Connection;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

pub enum ExecOutcome {
    Rows(QueryRows),
    RowsAffected(usize),
}

pub struct Session {
    conn: Connection,
    catalog: Catalog,
    options: ConnectOptions,
    in_transaction: bool,
}

fn now_epoch_secs() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}

/// Counts top-level `?` placeholders, ignoring ones inside quoted text.
fn count_positional(sql: &str) -> usize {
    let mut n = 0;
    let mut quote: Option<char> = None;
    for c in sql.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '?' => n += 1,
                _ => {}
            },
        }
    }
    n
}

/// First-seen-order, deduplicated list of `@name` placeholders.
fn named_in_order(sql: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut quote: Option<char> = None;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '@' => {
                    let mut name = String::new();
                    while let Some(n) = chars.peek() {
                        if n.is_alphanumeric() || *n == '_' {
                            name.push(*n);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if !name.is_empty() && !names.contains(&name) {
                        names.push(name);
                    }
                }
                _ => {}
            },
        }
    }
    names
}

impl Session {
    pub fn open(options: ConnectOptions) -> Result<Session, BqError> {
        let conn = match options.db_path() {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        bqlite_functions::register_all(&conn)?;
        Catalog::ensure_mirror_table(&conn)?;
        let catalog = Catalog::new(options.catalog_base_path().clone(), *options.catalog_max_depth());
        catalog.sync(&conn, now_epoch_secs())?;
        Ok(Session { conn, catalog, options, in_transaction: false })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn add_table(&self, spec: bqlite_catalog::TableSpec) -> Result<(), BqError> {
        self.catalog.add_table(&self.conn, spec, now_epoch_secs())?;
        Ok(())
    }

    pub fn add_function(&self, spec: bqlite_catalog::FunctionSpec) -> Result<(), BqError> {
        self.catalog.add_function(&self.conn, spec, now_epoch_secs())?;
        Ok(())
    }

    pub fn drop_entry(&self, path: &[String]) -> Result<(), BqError> {
        self.catalog.drop_entry(&self.conn, path)?;
        Ok(())
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Parses, resolves, and transforms `sql` without executing it.
    pub fn explain(&self, sql: &str) -> Result<String, BqError> {
        let ast = parse_statement(sql)?;
        let ir = Extractor::default().extract(&ast)?;
        let mut tctx = TransformContext::new(*self.options.null_ordering());
        Ok(transform_statement(&ir, &mut tctx).sql)
    }

    /// Runs every statement in `script` in order. Positional values are
    /// consumed left to right across the whole script; named values are
    /// looked up case-insensitively and fall back to the positional pool
    /// (in declaration order) when a statement references a name the map
    /// doesn't have.
    pub fn execute_script(&mut self, script: &str, positional: &[Value], named: &HashMap<String, Value>) -> Result<Vec<ExecOutcome>, BqError> {
        let named_lower: HashMap<String, Value> = named.iter().map(|(k, v)| (k.to_ascii_lowercase(), v.clone())).collect();
        let mut pos_cursor = 0usize;
        let mut outcomes = Vec::new();
        for stmt_text in bqlite_analyzer::split_statements(script) {
            let outcome = match crate::dispatcher::classify(&stmt_text) {
                crate::dispatcher::Action::Begin => {
                    self.conn.execute_batch("BEGIN")?;
                    self.in_transaction = true;
                    ExecOutcome::RowsAffected(0)
                }
                crate::dispatcher::Action::Commit => {
                    self.conn.execute_batch("COMMIT")?;
                    self.in_transaction = false;
                    ExecOutcome::RowsAffected(0)
                }
                crate::dispatcher::Action::Rollback => {
                    self.conn.execute_batch("ROLLBACK")?;
                    self.in_transaction = false;
                    ExecOutcome::RowsAffected(0)
                }
                crate::dispatcher::Action::Statement => self.run_statement(&stmt_text, positional, &mut pos_cursor, &named_lower)?,
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn run_statement(&mut self, text: &str, positional: &[Value], pos_cursor: &mut usize, named_lower: &HashMap<String, Value>) -> Result<ExecOutcome, BqError> {
        let mode = detect_param_mode(text)?;
        let ast = parse_statement(text)?;
        let ir = Extractor::default().extract(&ast)?;
        let mut tctx = TransformContext::new(*self.options.null_ordering());
        let transformed = transform_statement(&ir, &mut tctx);

        if let crate::dispatcher::StatementAction::CreateFunction { path } = crate::dispatcher::dispatch(&ir) {
            self.add_function(FunctionSpec {
                path: path.to_vec(),
                language: FunctionLanguage::Sql,
                arguments: Vec::new(),
                return_type: Type::Null,
                body: transformed.sql.clone(),
            })?;
            return Ok(ExecOutcome::RowsAffected(0));
        }

        let outcome = self.run_bound(mode, &transformed, positional, pos_cursor, named_lower)?;
        self.apply_catalog_action(&ir, &transformed)?;
        Ok(outcome)
    }

    /// Applies whatever catalog bookkeeping follows a successful execution:
    /// `CREATE TABLE`/`CREATE VIEW` register the new entry, `DROP` removes
    /// one. Plain queries and DML carry no catalog action.
    fn apply_catalog_action(&self, ir: &StatementData, transformed: &TransformedStatement) -> Result<(), BqError> {
        match crate::dispatcher::dispatch(ir) {
            crate::dispatcher::StatementAction::CreateTable { path, columns, has_select } => self.add_table(TableSpec {
                path: path.to_vec(),
                columns: columns.iter().map(|name| Column { name: name.clone(), ty: Type::String }).collect(),
                create_mode: CreateMode::CreateIfNotExists,
                as_select: if has_select { Some(transformed.sql.clone()) } else { None },
            }),
            crate::dispatcher::StatementAction::CreateView { path } => self.add_table(TableSpec {
                path: path.to_vec(),
                columns: Vec::new(),
                create_mode: CreateMode::CreateOrReplace,
                as_select: Some(transformed.sql.clone()),
            }),
            crate::dispatcher::StatementAction::Drop { path, .. } => self.drop_entry(path),
            _ => Ok(()),
        }
    }

    fn run_bound(
        &mut self,
        mode: ParamMode,
        transformed: &TransformedStatement,
        positional: &[Value],
        pos_cursor: &mut usize,
        named_lower: &HashMap<String, Value>,
    ) -> Result<ExecOutcome, BqError> {
        match mode {
            ParamMode::None => self.run_plain(&transformed.sql, transformed.is_query),
            ParamMode::Positional => {
                let n = count_positional(&transformed.sql);
                if *pos_cursor + n > positional.len() {
                    return Err(BqError::ParameterMissing { index: positional.len() });
                }
                let values: Vec<ValueWrapper> = positional[*pos_cursor..*pos_cursor + n].iter().cloned().map(ValueWrapper).collect();
                *pos_cursor += n;
                self.run_positional(&transformed.sql, transformed.is_query, values)
            }
            ParamMode::Named => {
                let names = named_in_order(&transformed.sql);
                let mut bound = Vec::with_capacity(names.len());
                for name in &names {
                    let value = match named_lower.get(&name.to_ascii_lowercase()) {
                        Some(v) => v.clone(),
                        None => {
                            if *pos_cursor >= positional.len() {
                                return Err(BqError::ParameterMissing { index: *pos_cursor });
                            }
                            let v = positional[*pos_cursor].clone();
                            *pos_cursor += 1;
                            v
                        }
                    };
                    bound.push((format!("@{name}"), ValueWrapper(value)));
                }
                self.run_named(&transformed.sql, transformed.is_query, bound)
            }
        }
    }

    fn run_plain(&mut self, sql: &str, is_query: bool) -> Result<ExecOutcome, BqError> {
        if is_query {
            self.query_rows(sql, [])
        } else {
            Ok(ExecOutcome::RowsAffected(self.conn.execute(sql, [])?))
        }
    }

    fn run_positional(&mut self, sql: &str, is_query: bool, values: Vec<ValueWrapper>) -> Result<ExecOutcome, BqError> {
        if is_query {
            self.query_rows(sql, rusqlite::params_from_iter(values.iter()))
        } else {
            Ok(ExecOutcome::RowsAffected(self.conn.execute(sql, rusqlite::params_from_iter(values.iter()))?))
        }
    }

    fn run_named(&mut self, sql: &str, is_query: bool, bound: Vec<(String, ValueWrapper)>) -> Result<ExecOutcome, BqError> {
        let refs: Vec<(&str, &dyn rusqlite::ToSql)> = bound.iter().map(|(k, v)| (k.as_str(), v as &dyn rusqlite::ToSql)).collect();
        if is_query {
            self.query_rows(sql, refs.as_slice())
        } else {
            Ok(ExecOutcome::RowsAffected(self.conn.execute(sql, refs.as_slice())?))
        }
    }

    fn query_rows(&self, sql: &str, params: impl rusqlite::Params) -> Result<ExecOutcome, BqError> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
        let ncols = columns.len();
        let rows = stmt.query_map(params, |row| {
            let mut values = Vec::with_capacity(ncols);
            for i in 0..ncols {
                values.push(row.get::<_, ValueWrapper>(i)?.0);
            }
            Ok(values)
        })?;
        let rows: Vec<Vec<Value>> = rows.collect::<rusqlite::Result<_>>()?;
        Ok(ExecOutcome::Rows(QueryRows { columns, rows }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_a_simple_select() {
        let mut session = Session::open(ConnectOptions::new()).unwrap();
        let outcomes = session.execute_script("SELECT 1", &[], &HashMap::new()).unwrap();
        match &outcomes[0] {
            ExecOutcome::Rows(rows) => assert_eq!(rows.rows, vec![vec![Value::Int(1)]]),
            _ => panic!("expected rows"),
        }
    }

    #[test]
    fn positional_parameters_consume_in_declaration_order() {
        let mut session = Session::open(ConnectOptions::new()).unwrap();
        let positional = vec![Value::Int(7)];
        let outcomes = session.execute_script("SELECT ?", &positional, &HashMap::new()).unwrap();
        match &outcomes[0] {
            ExecOutcome::Rows(rows) => assert_eq!(rows.rows, vec![vec![Value::Int(7)]]),
            _ => panic!("expected rows"),
        }
    }

    #[test]
    fn begin_commit_toggle_transaction_state() {
        let mut session = Session::open(ConnectOptions::new()).unwrap();
        session.execute_script("BEGIN", &[], &HashMap::new()).unwrap();
        assert!(session.in_transaction());
        session.execute_script("COMMIT", &[], &HashMap::new()).unwrap();
        assert!(!session.in_transaction());
    }

    #[test]
    fn count_positional_ignores_quoted_question_marks() {
        assert_eq!(count_positional("SELECT ? WHERE x = '?'"), 1);
    }

    #[test]
    fn named_in_order_dedups_repeated_names() {
        assert_eq!(named_in_order("SELECT @a, @b, @a"), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn create_table_registers_in_catalog_and_is_queryable() {
        let mut session = Session::open(ConnectOptions::new()).unwrap();
        session.execute_script("CREATE TABLE widgets (id INT64, name STRING)", &[], &HashMap::new()).unwrap();
        assert!(session.catalog().find_table(&["widgets".to_string()]).is_some());
        let outcomes = session.execute_script("INSERT INTO widgets (id, name) VALUES (1, 'a')", &[], &HashMap::new()).unwrap();
        match &outcomes[0] {
            ExecOutcome::RowsAffected(n) => assert_eq!(*n, 1),
            _ => panic!("expected rows affected"),
        }
    }

    #[test]
    fn drop_table_removes_catalog_entry() {
        let mut session = Session::open(ConnectOptions::new()).unwrap();
        session.execute_script("CREATE TABLE widgets (id INT64)", &[], &HashMap::new()).unwrap();
        session.execute_script("DROP TABLE widgets", &[], &HashMap::new()).unwrap();
        assert!(session.catalog().find_table(&["widgets".to_string()]).is_none());
    }
}
