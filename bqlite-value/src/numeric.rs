//! `NUMERIC`/`BIGNUMERIC` support: an arbitrary-precision rational backed by
//! `rust_decimal`, with lossless arithmetic and round-to-nearest-even
//! conversion to `f64`.

use crate::error::ValueError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Numeric(pub Decimal);

impl Numeric {
    pub fn parse(s: &str) -> Result<Self, ValueError> {
        Decimal::from_str(s.trim())
            .map(Numeric)
            .map_err(|e| ValueError::conversion("STRING", "NUMERIC", e.to_string()))
    }

    pub fn from_i64(v: i64) -> Self {
        Numeric(Decimal::from(v))
    }

    pub fn from_f64(v: f64) -> Result<Self, ValueError> {
        Decimal::try_from(v)
            .map(Numeric)
            .map_err(|e| ValueError::conversion("FLOAT64", "NUMERIC", e.to_string()))
    }

    pub fn to_f64(self) -> f64 {
        // round-to-nearest-even is rust_decimal's default `to_f64` behavior.
        self.0.to_f64().unwrap_or(f64::NAN)
    }

    pub fn to_i64(self) -> Result<i64, ValueError> {
        self.0
            .to_i64()
            .ok_or_else(|| ValueError::Overflow { detail: format!("{} does not fit in INT64", self.0) })
    }

    pub fn add(self, other: Self) -> Result<Self, ValueError> {
        self.0
            .checked_add(other.0)
            .map(Numeric)
            .ok_or_else(|| ValueError::Overflow { detail: "NUMERIC addition".into() })
    }

    pub fn sub(self, other: Self) -> Result<Self, ValueError> {
        self.0
            .checked_sub(other.0)
            .map(Numeric)
            .ok_or_else(|| ValueError::Overflow { detail: "NUMERIC subtraction".into() })
    }

    pub fn mul(self, other: Self) -> Result<Self, ValueError> {
        self.0
            .checked_mul(other.0)
            .map(Numeric)
            .ok_or_else(|| ValueError::Overflow { detail: "NUMERIC multiplication".into() })
    }

    pub fn div(self, other: Self) -> Result<Self, ValueError> {
        if other.0.is_zero() {
            return Err(ValueError::DivByZero);
        }
        self.0
            .checked_div(other.0)
            .map(Numeric)
            .ok_or_else(|| ValueError::Overflow { detail: "NUMERIC division".into() })
    }
}

impl std::fmt::Display for Numeric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_through_display() {
        let n = Numeric::parse("123.456").unwrap();
        assert_eq!(n.to_string(), "123.456");
    }

    #[test]
    fn division_by_zero_errors() {
        let a = Numeric::from_i64(1);
        let b = Numeric::from_i64(0);
        assert_eq!(a.div(b), Err(ValueError::DivByZero));
    }

    #[test]
    fn lossless_addition() {
        let a = Numeric::parse("0.1").unwrap();
        let b = Numeric::parse("0.2").unwrap();
        assert_eq!(a.add(b).unwrap().to_string(), "0.3");
    }
}
