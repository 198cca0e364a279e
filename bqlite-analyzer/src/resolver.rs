//! Thin wrapper around `sqlparser`'s BigQuery dialect: parses one statement
//! text into its AST, with feature flags for BigQuery semantic extensions
//! threaded through for the extractor to consult.

use crate::error::AnalyzeError;
use sqlparser::ast::Statement;
use sqlparser::dialect::BigQueryDialect;
use sqlparser::parser::Parser;

/// Feature flags enabled for every analysis pass. Kept as a struct (rather
/// than inlined booleans scattered through the extractor) because several
/// of these gate alternate parses during templated-function inference.
#[derive(Debug, Clone, Copy)]
pub struct FeatureFlags {
    pub analytic_functions: bool,
    pub named_arguments: bool,
    pub numeric_types: bool,
    pub json: bool,
    pub geography: bool,
    pub qualify: bool,
    pub grouping_sets: bool,
    pub pivot_unpivot: bool,
    pub safe_function_call: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        FeatureFlags {
            analytic_functions: true,
            named_arguments: true,
            numeric_types: true,
            json: true,
            geography: true,
            qualify: true,
            grouping_sets: true,
            pivot_unpivot: true,
            safe_function_call: true,
        }
    }
}

pub fn parse_statement(text: &str) -> Result<Statement, AnalyzeError> {
    let mut statements = Parser::parse_sql(&BigQueryDialect {}, text)?;
    if statements.len() != 1 {
        return Err(AnalyzeError::Parse(format!(
            "expected exactly one statement, got {} (split script before parsing)",
            statements.len()
        )));
    }
    Ok(statements.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_select() {
        let stmt = parse_statement("SELECT 1").unwrap();
        assert!(matches!(stmt, Statement::Query(_)));
    }

    #[test]
    fn rejects_multiple_statements() {
        let err = parse_statement("SELECT 1; SELECT 2");
        assert!(err.is_err());
    }
}
