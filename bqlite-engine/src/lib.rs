//! Embedded execution engine: opens a host-engine connection, registers the
//! function library, and runs BigQuery-dialect scripts against it through
//! the analyze -> transform -> execute pipeline.

pub mod dispatcher;
pub mod error;
pub mod options;
pub mod session;

pub use dispatcher::Action;
pub use error::BqError;
pub use options::ConnectOptions;
pub use session::{ExecOutcome, QueryRows, Session};

/// `INFORMATION_SCHEMA.TABLES`-shaped rows: (full name path, column count).
pub fn information_schema_tables(session: &Session) -> Vec<(String, usize)> {
    session.catalog().information_schema_tables()
}

/// `INFORMATION_SCHEMA.ROUTINES`-shaped rows: (full name path, argument count).
pub fn information_schema_routines(session: &Session) -> Vec<(String, usize)> {
    session.catalog().information_schema_routines()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bqlite_catalog::{Column, CreateMode, TableSpec};
    use bqlite_value::Type;
    use std::collections::HashMap;

    #[test]
    fn opens_in_memory_and_runs_a_query() {
        let mut session = Session::open(ConnectOptions::new()).unwrap();
        let outcomes = session.execute_script("SELECT 1 + 1", &[], &HashMap::new()).unwrap();
        assert_eq!(outcomes.len(), 1);
    }

    #[test]
    fn information_schema_reflects_catalog_entries() {
        let session = Session::open(ConnectOptions::new()).unwrap();
        session
            .add_table(TableSpec { path: vec!["t".into()], columns: vec![Column { name: "a".into(), ty: Type::Int64 }], create_mode: CreateMode::Create, as_select: None })
            .unwrap();
        let tables = information_schema_tables(&session);
        assert!(tables.iter().any(|(name, _)| name == "t"));
    }
}
