//! The error taxonomy surfaced across the analyze/transform/execute
//! pipeline. Each origin keeps its own error type internally; this enum is
//! the single boundary type callers of the driver surface see.

use std::fmt;

#[derive(Debug)]
pub enum BqError {
    Parse(String),
    Resolve(String),
    Unimplemented(String),
    ParameterMix { positional: usize, named: usize },
    ParameterMissing { index: usize },
    TemplateInference { function: String },
    Conversion(String),
    DivByZero,
    Overflow(String),
    Type(String),
    Catalog(String),
    HostEngine(rusqlite::Error),
}

impl fmt::Display for BqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BqError::Parse(s) => write!(f, "parse error: {s}"),
            BqError::Resolve(s) => write!(f, "resolve error: {s}"),
            BqError::Unimplemented(s) => write!(f, "unimplemented: {s}"),
            BqError::ParameterMix { positional, named } => {
                write!(f, "mixed positional ({positional}) and named ({named}) parameters")
            }
            BqError::ParameterMissing { index } => write!(f, "missing parameter at position {index}"),
            BqError::TemplateInference { function } => write!(f, "cannot infer return type for {function}"),
            BqError::Conversion(s) => write!(f, "conversion error: {s}"),
            BqError::DivByZero => write!(f, "division by zero"),
            BqError::Overflow(s) => write!(f, "arithmetic overflow: {s}"),
            BqError::Type(s) => write!(f, "type error: {s}"),
            BqError::Catalog(s) => write!(f, "catalog error: {s}"),
            BqError::HostEngine(e) => write!(f, "host engine error: {e}"),
        }
    }
}

impl std::error::Error for BqError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BqError::HostEngine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for BqError {
    fn from(e: rusqlite::Error) -> Self {
        BqError::HostEngine(e)
    }
}

impl From<bqlite_analyzer::AnalyzeError> for BqError {
    fn from(e: bqlite_analyzer::AnalyzeError) -> Self {
        use bqlite_analyzer::AnalyzeError;
        match e {
            AnalyzeError::Parse(s) => BqError::Parse(s),
            AnalyzeError::ParameterMix { positional, named } => BqError::ParameterMix { positional, named },
            AnalyzeError::TemplateInference { function } => BqError::TemplateInference { function },
            AnalyzeError::Unimplemented { detail } => BqError::Unimplemented(detail),
        }
    }
}

impl From<bqlite_catalog::CatalogError> for BqError {
    fn from(e: bqlite_catalog::CatalogError) -> Self {
        BqError::Catalog(e.to_string())
    }
}

impl From<bqlite_value::ValueError> for BqError {
    fn from(e: bqlite_value::ValueError) -> Self {
        use bqlite_value::ValueError;
        match e {
            ValueError::Conversion { .. } => BqError::Conversion(e.to_string()),
            ValueError::Type { .. } => BqError::Type(e.to_string()),
            ValueError::DivByZero => BqError::DivByZero,
            ValueError::Overflow { .. } => BqError::Overflow(e.to_string()),
            ValueError::Unimplemented { .. } => BqError::Unimplemented(e.to_string()),
        }
    }
}
