//! Scalar, aggregate, and window user-defined functions registered with the
//! host engine under the `sys_<name>` (scalar) or bare BigQuery (aggregate,
//! window) naming convention the transform layer expects.

pub mod aggregate;
pub mod convert;
pub mod options;
pub mod registry;
pub mod scalar;
pub mod window;

pub use registry::register_all;
