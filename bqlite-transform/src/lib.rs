//! Lowers the resolved-tree IR produced by `bqlite-analyzer` into host-dialect
//! SQL text, one variant-specific transformer per `ScanData`/`ExpressionData`
//! case, coordinated by a single dispatch entry point.

pub mod context;
pub mod coordinator;
pub mod expr;
pub mod scan;

pub use context::{FragmentContext, NullOrderingMode, TransformContext};
pub use coordinator::{transform_statement, TransformedStatement};
