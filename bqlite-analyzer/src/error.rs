use std::fmt;

#[derive(Debug)]
pub enum AnalyzeError {
    Parse(String),
    ParameterMix { positional: usize, named: usize },
    TemplateInference { function: String },
    Unimplemented { detail: String },
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzeError::Parse(msg) => write!(f, "parse error: {msg}"),
            AnalyzeError::ParameterMix { positional, named } => write!(
                f,
                "cannot mix positional (?) and named (@name) parameters: found {positional} positional and {named} named"
            ),
            AnalyzeError::TemplateInference { function } => {
                write!(f, "could not infer a concrete return type for templated function {function}")
            }
            AnalyzeError::Unimplemented { detail } => write!(f, "unimplemented: {detail}"),
        }
    }
}

impl std::error::Error for AnalyzeError {}

impl From<sqlparser::parser::ParserError> for AnalyzeError {
    fn from(e: sqlparser::parser::ParserError) -> Self {
        AnalyzeError::Parse(e.to_string())
    }
}
