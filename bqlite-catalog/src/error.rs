use std::fmt;

#[derive(Debug)]
pub enum CatalogError {
    NotFound { path: String, kind: &'static str },
    HostEngine(rusqlite::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::NotFound { path, kind } => write!(f, "no {kind} named {path:?} in the catalog"),
            CatalogError::HostEngine(e) => write!(f, "catalog mirror table error: {e}"),
            CatalogError::Serialize(e) => write!(f, "catalog spec (de)serialization error: {e}"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        CatalogError::HostEngine(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Serialize(e)
    }
}
