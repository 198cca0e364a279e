//! Connection-level options: where the host engine file lives, the catalog's
//! base name path, and how NULLs sort in the absence of an explicit
//! `NULLS FIRST`/`NULLS LAST`.

use bqlite_transform::NullOrderingMode;
use getset::{Getters, Setters, WithSetters};

#[derive(Getters, Setters, WithSetters, Debug, Clone)]
#[getset(get = "pub", set = "pub", set_with = "pub")]
pub struct ConnectOptions {
    /// `None` opens an in-memory database; `Some(path)` opens or creates a file.
    db_path: Option<String>,
    /// Default `project.dataset` the catalog resolves unqualified names against.
    catalog_base_path: Vec<String>,
    /// Caps how many path segments a sub-catalog reference may add; `None` is unbounded.
    catalog_max_depth: Option<usize>,
    null_ordering: NullOrderingMode,
}

impl ConnectOptions {
    pub fn new() -> ConnectOptions {
        ConnectOptions::default()
    }
}

impl Default for ConnectOptions {
    fn default() -> Self {
        ConnectOptions {
            db_path: None,
            catalog_base_path: Vec::new(),
            catalog_max_depth: None,
            null_ordering: NullOrderingMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_setters_chain() {
        let opts = ConnectOptions::new().with_db_path(Some("data.db".to_string())).with_catalog_base_path(vec!["p".into(), "d".into()]);
        assert_eq!(opts.db_path(), &Some("data.db".to_string()));
        assert_eq!(opts.catalog_base_path(), &vec!["p".to_string(), "d".to_string()]);
    }
}
