use std::fmt;

/// Errors raised by the value model: conversion failures, type mismatches,
/// division by zero, and arithmetic overflow.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueError {
    Conversion { from: String, to: String, detail: String },
    Type { op: String, detail: String },
    DivByZero,
    Overflow { detail: String },
    Unimplemented { detail: String },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::Conversion { from, to, detail } => {
                write!(f, "cannot convert {from} to {to}: {detail}")
            }
            ValueError::Type { op, detail } => write!(f, "type error in {op}: {detail}"),
            ValueError::DivByZero => write!(f, "division by zero"),
            ValueError::Overflow { detail } => write!(f, "arithmetic overflow: {detail}"),
            ValueError::Unimplemented { detail } => write!(f, "unimplemented: {detail}"),
        }
    }
}

impl std::error::Error for ValueError {}

impl ValueError {
    pub fn conversion(from: impl Into<String>, to: impl Into<String>, detail: impl Into<String>) -> Self {
        ValueError::Conversion {
            from: from.into(),
            to: to.into(),
            detail: detail.into(),
        }
    }

    pub fn type_error(op: impl Into<String>, detail: impl Into<String>) -> Self {
        ValueError::Type {
            op: op.into(),
            detail: detail.into(),
        }
    }
}
