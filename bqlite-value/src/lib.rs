//! The tagged value model shared by every other crate in this workspace:
//! the `Value`/`Type` sum types, comparison with configurable null
//! ordering, arithmetic with `INT64 -> NUMERIC -> FLOAT64` promotion,
//! explicit `CAST`/`SAFE_CAST` conversions, and the textual codec used to
//! carry values through a host SQL engine that has no native concept of
//! `NUMERIC`, `INTERVAL`, `ARRAY`, or `STRUCT`.

pub mod arith;
pub mod cast;
pub mod codec;
pub mod compare;
pub mod datetime;
pub mod error;
pub mod interval;
pub mod numeric;
pub mod value;

pub use compare::NullOrdering;
pub use error::ValueError;
pub use interval::Interval;
pub use numeric::Numeric;
pub use value::{Type, Value};
