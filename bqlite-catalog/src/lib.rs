//! Table/function catalog: name-path resolution, an in-memory index with
//! sub-catalog nesting, and a mirror table that persists entries inside the
//! host engine so a fresh connection can rehydrate them.

pub mod catalog;
pub mod error;
pub mod name_path;
pub mod spec;

pub use catalog::Catalog;
pub use error::CatalogError;
pub use spec::{Argument, Column, CreateMode, Entry, FunctionLanguage, FunctionSpec, TableSpec};
