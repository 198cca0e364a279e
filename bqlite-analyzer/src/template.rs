//! Templated `CREATE FUNCTION` return-type inference: a function body whose
//! return type depends on its argument type is re-analyzed once per
//! candidate scalar type, then once more per candidate `ARRAY<T>`, keeping
//! the first substitution that type-checks.

use crate::error::AnalyzeError;
use bqlite_value::Type;

pub const SCALAR_CANDIDATES: &[Type] = &[
    Type::Int64,
    Type::Float64,
    Type::Bool,
    Type::String,
    Type::Bytes,
    Type::Json,
    Type::Date,
    Type::Datetime,
    Type::Time,
    Type::Timestamp,
    Type::Interval,
];

/// Attempts to resolve a concrete return type for a templated function by
/// substitution. `try_resolve` re-analyzes the function body with a
/// concrete placeholder type and reports whether it type-checks.
pub fn infer_return_type(
    function_name: &str,
    mut try_resolve: impl FnMut(&Type) -> bool,
) -> Result<Type, AnalyzeError> {
    for candidate in SCALAR_CANDIDATES {
        if try_resolve(candidate) {
            return Ok(candidate.clone());
        }
    }
    for candidate in SCALAR_CANDIDATES {
        let arrayed = Type::Array(Box::new(candidate.clone()));
        if try_resolve(&arrayed) {
            return Ok(arrayed);
        }
    }
    Err(AnalyzeError::TemplateInference { function: function_name.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_successful_scalar_wins() {
        let result = infer_return_type("f", |t| *t == Type::Bool);
        assert_eq!(result.unwrap(), Type::Bool);
    }

    #[test]
    fn falls_back_to_array_candidates() {
        let result = infer_return_type("f", |t| *t == Type::Array(Box::new(Type::String)));
        assert_eq!(result.unwrap(), Type::Array(Box::new(Type::String)));
    }

    #[test]
    fn total_failure_is_template_inference_error() {
        let result = infer_return_type("f", |_| false);
        assert!(matches!(result, Err(AnalyzeError::TemplateInference { .. })));
    }
}
