//! `TableSpec`/`FunctionSpec`: the two kinds of catalog entry.

use bqlite_value::Type;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateMode {
    Create,
    CreateIfNotExists,
    CreateOrReplace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(with = "type_json")]
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub path: Vec<String>,
    pub columns: Vec<Column>,
    pub create_mode: CreateMode,
    /// The translated `AS SELECT` body, for views and CTAS.
    pub as_select: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionLanguage {
    Sql,
    Builtin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    #[serde(with = "type_json")]
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub path: Vec<String>,
    pub language: FunctionLanguage,
    pub arguments: Vec<Argument>,
    #[serde(with = "type_json")]
    pub return_type: Type,
    /// Resolved SQL text after rewriting, with `?` placeholders per argument.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Entry {
    Table(TableSpec),
    Function(FunctionSpec),
}

impl Entry {
    pub fn path(&self) -> &[String] {
        match self {
            Entry::Table(t) => &t.path,
            Entry::Function(f) => &f.path,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Entry::Table(_) => "table",
            Entry::Function(_) => "function",
        }
    }
}

/// `Type` has no `Serialize`/`Deserialize` of its own (it lives in
/// `bqlite-value`, which stays independent of `serde`'s derive surface for
/// anything beyond the codec); round-trip it through its `Display` form
/// plus a small parser that covers the finite type grammar catalog specs
/// actually need.
mod type_json {
    use bqlite_value::Type;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ty: &Type, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ty.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Type, D::Error> {
        let text = String::deserialize(d)?;
        parse_type(&text).map_err(serde::de::Error::custom)
    }

    pub fn parse_type(text: &str) -> Result<Type, String> {
        let text = text.trim();
        match text.to_ascii_uppercase().as_str() {
            "NULL" => return Ok(Type::Null),
            "INT64" => return Ok(Type::Int64),
            "FLOAT64" => return Ok(Type::Float64),
            "BOOL" => return Ok(Type::Bool),
            "STRING" => return Ok(Type::String),
            "BYTES" => return Ok(Type::Bytes),
            "DATE" => return Ok(Type::Date),
            "DATETIME" => return Ok(Type::Datetime),
            "TIME" => return Ok(Type::Time),
            "TIMESTAMP" => return Ok(Type::Timestamp),
            "NUMERIC" => return Ok(Type::Numeric),
            "BIGNUMERIC" => return Ok(Type::BigNumeric),
            "INTERVAL" => return Ok(Type::Interval),
            "JSON" => return Ok(Type::Json),
            _ => {}
        }
        if let Some(inner) = text.strip_prefix("ARRAY<").and_then(|s| s.strip_suffix('>')) {
            return parse_type(inner).map(|t| Type::Array(Box::new(t)));
        }
        if let Some(inner) = text.strip_prefix("STRUCT<").and_then(|s| s.strip_suffix('>')) {
            let mut fields = Vec::new();
            for part in split_top_level(inner) {
                let (name, ty) = part
                    .trim()
                    .split_once(' ')
                    .ok_or_else(|| format!("malformed struct field {part:?}"))?;
                fields.push((name.to_string(), parse_type(ty)?));
            }
            return Ok(Type::Struct(fields));
        }
        Err(format!("unrecognized type text {text:?}"))
    }

    fn split_top_level(s: &str) -> Vec<&str> {
        let mut parts = Vec::new();
        let mut depth = 0;
        let mut start = 0;
        for (i, c) in s.char_indices() {
            match c {
                '<' => depth += 1,
                '>' => depth -= 1,
                ',' if depth == 0 => {
                    parts.push(&s[start..i]);
                    start = i + 1;
                }
                _ => {}
            }
        }
        if start < s.len() {
            parts.push(&s[start..]);
        }
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_spec_round_trips_through_json() {
        let spec = TableSpec {
            path: vec!["p".into(), "d".into(), "t".into()],
            columns: vec![Column { name: "a".into(), ty: Type::Int64 }, Column { name: "b".into(), ty: Type::Array(Box::new(Type::String)) }],
            create_mode: CreateMode::CreateIfNotExists,
            as_select: None,
        };
        let json = serde_json::to_string(&spec).unwrap();
        let back: TableSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, back);
    }

    #[test]
    fn struct_type_round_trips() {
        let ty = Type::Struct(vec![("x".into(), Type::Int64), ("y".into(), Type::Float64)]);
        let text = ty.to_string();
        let back = type_json::parse_type(&text).unwrap();
        assert_eq!(ty, back);
    }
}
