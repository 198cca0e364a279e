//! Classifies one already-split statement text before it reaches the
//! analyzer: transaction control (`BEGIN`/`COMMIT`/`ROLLBACK`) is host-native
//! and never goes through parse/resolve/transform, everything else is a
//! regular action the analyzer and transformer handle.
//!
//! A second, finer-grained dispatch happens once a statement has been
//! extracted into IR: `dispatch` tells `Session` whether the statement is a
//! plain query/DML pass-through or one that also needs to mutate the
//! catalog (`CREATE TABLE`, `CREATE FUNCTION`, `CREATE VIEW`, `DROP`).

use bqlite_analyzer::ir::StatementData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Begin,
    Commit,
    Rollback,
    Statement,
}

pub fn classify(stmt_text: &str) -> Action {
    let head: String = stmt_text.trim_start().split_whitespace().next().unwrap_or("").to_ascii_uppercase();
    match head.as_str() {
        "BEGIN" | "START" => Action::Begin,
        "COMMIT" => Action::Commit,
        "ROLLBACK" => Action::Rollback,
        _ => Action::Statement,
    }
}

/// What an extracted statement does beyond running SQL against the host
/// connection. `Query`/`Dml`/`Merge` carry no extra payload: the generic
/// transform-and-execute path in `Session::run_statement` already handles
/// them. The DDL variants carry enough of the original statement to build
/// a catalog entry once the SQL side has run (or, for `CreateFunction`,
/// instead of running any SQL at all).
#[derive(Debug, Clone, Copy)]
pub enum StatementAction<'a> {
    Query,
    Dml,
    Merge,
    CreateTable { path: &'a [String], columns: &'a [String], has_select: bool },
    CreateFunction { path: &'a [String] },
    CreateView { path: &'a [String] },
    Drop { path: &'a [String], kind: &'a str },
}

pub fn dispatch(stmt: &StatementData) -> StatementAction<'_> {
    match stmt {
        StatementData::Select { .. } => StatementAction::Query,
        StatementData::Insert { .. } | StatementData::Update { .. } | StatementData::Delete { .. } => StatementAction::Dml,
        StatementData::Merge { .. } => StatementAction::Merge,
        StatementData::CreateTable { path, columns, as_select } => {
            StatementAction::CreateTable { path, columns, has_select: as_select.is_some() }
        }
        StatementData::CreateFunction { path } => StatementAction::CreateFunction { path },
        StatementData::CreateView { path, .. } => StatementAction::CreateView { path },
        StatementData::Drop { path, kind } => StatementAction::Drop { path, kind },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bqlite_analyzer::ir::ScanData;

    #[test]
    fn recognizes_transaction_control() {
        assert_eq!(classify("BEGIN TRANSACTION"), Action::Begin);
        assert_eq!(classify("  commit"), Action::Commit);
        assert_eq!(classify("ROLLBACK"), Action::Rollback);
        assert_eq!(classify("SELECT 1"), Action::Statement);
    }

    #[test]
    fn create_table_dispatch_reports_as_select() {
        let stmt = StatementData::CreateTable { path: vec!["t".into()], columns: vec!["a".into()], as_select: Some(ScanData::SingleRow) };
        match dispatch(&stmt) {
            StatementAction::CreateTable { has_select, columns, .. } => {
                assert!(has_select);
                assert_eq!(columns, &["a".to_string()]);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn drop_dispatch_carries_kind() {
        let stmt = StatementData::Drop { path: vec!["t".into()], kind: "TABLE".into() };
        match dispatch(&stmt) {
            StatementAction::Drop { kind, .. } => assert_eq!(kind, "TABLE"),
            other => panic!("unexpected action: {other:?}"),
        }
    }
}
