//! Resolves a parsed function name into the internal identifier that later
//! transformers call: `$op`-style resolver names become `sys_<op>`; the
//! fixed set of known built-ins become `sys_<name>`; current-time functions
//! are flagged so a transformer can append a frozen-now argument; anything
//! else falls through to catalog lookup by the caller.

use crate::error::AnalyzeError;

pub const CURRENT_TIME_FUNCTIONS: &[&str] = &["CURRENT_DATE", "CURRENT_TIME", "CURRENT_DATETIME", "CURRENT_TIMESTAMP"];

/// Scalar/operator names the extractor recognizes directly, independent of
/// the catalog. Resolved to `sys_<name>`, mirroring the scalar UDF registry.
const SCALAR_BUILTINS: &[&str] = &[
    "ADD", "SUBTRACT", "MULTIPLY", "DIVIDE", "EQUAL", "NOT_EQUAL", "GREATER", "LESS",
    "BITWISE_AND", "BITWISE_OR", "BITWISE_XOR", "BITWISE_NOT", "BITWISE_LEFT_SHIFT", "BITWISE_RIGHT_SHIFT",
    "AND", "OR", "NOT",
    "CASE_NO_VALUE", "CASE_WITH_VALUE", "COALESCE", "IF", "IFNULL", "NULLIF",
    "CONCAT", "SUBSTR", "LENGTH", "UPPER", "LOWER", "LPAD", "RPAD", "TRIM", "LTRIM", "RTRIM",
    "REPLACE", "REGEXP_CONTAINS", "REGEXP_EXTRACT", "REGEXP_REPLACE", "SPLIT", "STRPOS", "INSTR",
    "TO_HEX", "FROM_HEX", "TO_BASE32", "TO_BASE64", "FROM_BASE32", "FROM_BASE64",
    "NORMALIZE", "NORMALIZE_AND_CASEFOLD",
    "ABS", "SIGN", "IS_INF", "IS_NAN", "IEEE_DIVIDE", "RAND", "SQRT", "POW", "POWER", "EXP",
    "LN", "LOG", "LOG10", "GREATEST", "LEAST", "DIV", "MOD", "ROUND", "TRUNC", "CEIL", "FLOOR",
    "COS", "COSH", "ACOS", "ACOSH", "SIN", "SINH", "ASIN", "ASINH", "TAN", "TANH", "ATAN", "ATANH",
    "ATAN2", "RANGE_BUCKET",
    "SAFE_ADD", "SAFE_SUBTRACT", "SAFE_MULTIPLY", "SAFE_NEGATE", "SAFE_DIVIDE",
    "CURRENT_DATE", "CURRENT_TIME", "CURRENT_DATETIME", "CURRENT_TIMESTAMP",
    "DATE_ADD", "DATE_SUB", "DATE_DIFF", "DATE_TRUNC", "FORMAT_DATE", "PARSE_DATE",
    "TIMESTAMP_ADD", "TIMESTAMP_SUB", "TIMESTAMP_DIFF", "TIMESTAMP_TRUNC",
    "UNIX_DATE", "UNIX_SECONDS", "UNIX_MILLIS", "UNIX_MICROS",
    "TIMESTAMP_SECONDS", "TIMESTAMP_MILLIS", "TIMESTAMP_MICROS",
    "EXTRACT", "LAST_DAY", "DATE_FROM_UNIX_DATE",
    "ARRAY_AT_OFFSET", "ARRAY_AT_ORDINAL", "ARRAY_LENGTH", "ARRAY_CONCAT", "ARRAY_REVERSE",
    "ARRAY_TO_STRING", "GENERATE_ARRAY", "GENERATE_DATE_ARRAY", "GENERATE_TIMESTAMP_ARRAY",
    "MAKE_STRUCT", "MAKE_ARRAY",
    "TO_JSON", "TO_JSON_STRING", "JSON_TYPE", "JSON_EXTRACT", "JSON_EXTRACT_SCALAR",
    "JSON_ARRAY", "JSON_OBJECT",
    "FARM_FINGERPRINT", "MD5", "SHA1", "SHA256", "SHA512",
    "GENERATE_UUID",
];

/// Aggregate and window/analytic function names. These are registered with
/// the host engine under their bare uppercase BigQuery names (see
/// `bqlite-functions::aggregate::register_all` /
/// `bqlite-functions::window::register_all`), not `sys_`-prefixed, so
/// resolution must leave the name as-is rather than lowercasing+prefixing it.
const AGGREGATE_WINDOW_BUILTINS: &[&str] = &[
    "COUNT", "COUNT_STAR", "SUM", "AVG", "MIN", "MAX", "ARRAY_AGG", "ARRAY_CONCAT_AGG",
    "STRING_AGG", "LOGICAL_AND", "LOGICAL_OR", "BIT_AND", "BIT_OR", "BIT_XOR", "COUNTIF",
    "ROW_NUMBER", "RANK", "DENSE_RANK", "PERCENT_RANK", "CUME_DIST", "NTILE", "LAG", "LEAD",
    "PERCENTILE_CONT", "PERCENTILE_DISC", "CORR", "COVAR_POP", "COVAR_SAMP", "STDDEV", "STDDEV_POP",
    "STDDEV_SAMP", "VARIANCE", "VAR_POP", "VAR_SAMP",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFunction {
    pub internal_name: String,
    pub is_current_time: bool,
}

/// Resolves a parsed function name token into its internal identifier.
/// `raw_name` may carry the `$op` prefix the resolver uses for
/// operator-style calls (e.g. `$add`, `$equal`).
pub fn resolve_builtin(raw_name: &str) -> Result<ResolvedFunction, AnalyzeError> {
    let upper = raw_name.to_ascii_uppercase();
    if let Some(op) = upper.strip_prefix('$') {
        return Ok(ResolvedFunction { internal_name: format!("sys_{}", op.to_ascii_lowercase()), is_current_time: false });
    }
    let is_current_time = CURRENT_TIME_FUNCTIONS.contains(&upper.as_str());
    if AGGREGATE_WINDOW_BUILTINS.contains(&upper.as_str()) {
        return Ok(ResolvedFunction { internal_name: upper, is_current_time });
    }
    if SCALAR_BUILTINS.contains(&upper.as_str()) {
        return Ok(ResolvedFunction { internal_name: format!("sys_{}", upper.to_ascii_lowercase()), is_current_time });
    }
    Err(AnalyzeError::Unimplemented { detail: format!("unrecognized built-in function {raw_name:?}") })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_style_name_gets_sys_prefix() {
        let r = resolve_builtin("$add").unwrap();
        assert_eq!(r.internal_name, "sys_add");
        assert!(!r.is_current_time);
    }

    #[test]
    fn known_builtin_resolves() {
        let r = resolve_builtin("concat").unwrap();
        assert_eq!(r.internal_name, "sys_concat");
    }

    #[test]
    fn current_time_function_is_flagged() {
        let r = resolve_builtin("CURRENT_TIMESTAMP").unwrap();
        assert_eq!(r.internal_name, "sys_current_timestamp");
        assert!(r.is_current_time);
    }

    #[test]
    fn aggregate_name_resolves_bare() {
        let r = resolve_builtin("sum").unwrap();
        assert_eq!(r.internal_name, "SUM");
    }

    #[test]
    fn window_name_resolves_bare() {
        let r = resolve_builtin("dense_rank").unwrap();
        assert_eq!(r.internal_name, "DENSE_RANK");
    }

    #[test]
    fn unrecognized_name_is_unimplemented() {
        let err = resolve_builtin("TOTALLY_MADE_UP_FUNCTION");
        assert!(matches!(err, Err(AnalyzeError::Unimplemented { .. })));
    }
}
