//! In-memory catalog index, mirrored into a reserved host-engine table so a
//! fresh connection can rehydrate it. Reads consult an `Arc`-snapshotted
//! index with no lock held across the call; mutations are serialized by an
//! exclusive lock that covers both the in-memory update and the mirror
//! table write, so the two never diverge mid-operation.

use crate::error::CatalogError;
use crate::name_path::merge;
use crate::spec::{Entry, FunctionSpec, TableSpec};
use log::{debug, info};
use rusqlite::Connection;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

const MIRROR_TABLE: &str = "__bqlite_catalog";

fn path_key(path: &[String]) -> String {
    path.iter().map(|p| p.to_ascii_lowercase()).collect::<Vec<_>>().join(".")
}

#[derive(Default, Clone)]
struct Index {
    entries: HashMap<String, Entry>,
    /// Sub-catalog membership: parent path key -> set of immediate child path keys.
    children: HashMap<String, HashSet<String>>,
}

impl Index {
    fn insert(&mut self, entry: Entry) {
        let key = path_key(entry.path());
        self.register_prefixes(entry.path());
        self.entries.insert(key, entry);
    }

    fn register_prefixes(&mut self, path: &[String]) {
        for i in 1..path.len() {
            let parent = path_key(&path[..i]);
            let child = path_key(&path[..i + 1]);
            self.children.entry(parent).or_default().insert(child);
        }
    }

    fn remove(&mut self, path: &[String]) {
        let key = path_key(path);
        self.entries.remove(&key);
        for set in self.children.values_mut() {
            set.remove(&key);
        }
        self.children.remove(&key);
    }
}

pub struct Catalog {
    base_path: Vec<String>,
    max_depth: Option<usize>,
    index: RwLock<Arc<Index>>,
    write_lock: Mutex<()>,
    last_synced_at: Mutex<i64>,
}

impl Catalog {
    pub fn new(base_path: Vec<String>, max_depth: Option<usize>) -> Self {
        Catalog {
            base_path,
            max_depth,
            index: RwLock::new(Arc::new(Index::default())),
            write_lock: Mutex::new(()),
            last_synced_at: Mutex::new(0),
        }
    }

    fn snapshot(&self) -> Arc<Index> {
        self.index.read().expect("catalog index lock poisoned").clone()
    }

    fn resolve(&self, query: &[String]) -> Vec<String> {
        merge(&self.base_path, query, self.max_depth)
    }

    pub fn ensure_mirror_table(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {MIRROR_TABLE} (
                name TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                spec_json TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            )"
        ))?;
        Ok(())
    }

    /// Loads entries updated since the last sync, in a single transaction.
    /// Idempotent: calling twice with no intervening writes loads nothing.
    pub fn sync(&self, conn: &Connection, now: i64) -> Result<usize, CatalogError> {
        Self::ensure_mirror_table(conn)?;
        let _guard = self.write_lock.lock().expect("catalog write lock poisoned");
        let since = *self.last_synced_at.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT kind, spec_json, updated_at FROM {MIRROR_TABLE} WHERE updated_at >= ?1"
        ))?;
        let rows = stmt.query_map([since], |row| {
            let spec_json: String = row.get(1)?;
            let updated_at: i64 = row.get(2)?;
            Ok((spec_json, updated_at))
        })?;

        let mut next = self.snapshot().as_ref().clone();
        let mut loaded = 0;
        for row in rows {
            let (spec_json, _updated_at) = row?;
            let entry: Entry = serde_json::from_str(&spec_json)?;
            next.insert(entry);
            loaded += 1;
        }
        *self.index.write().expect("catalog index lock poisoned") = Arc::new(next);
        *self.last_synced_at.lock().unwrap() = now;
        info!("catalog sync loaded {loaded} entries since {since}");
        Ok(loaded)
    }

    fn mirror_write(conn: &Connection, entry: &Entry, now: i64) -> Result<(), CatalogError> {
        Self::ensure_mirror_table(conn)?;
        let name = path_key(entry.path());
        let spec_json = serde_json::to_string(entry)?;
        conn.execute(
            &format!(
                "INSERT INTO {MIRROR_TABLE} (name, kind, spec_json, updated_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(name) DO UPDATE SET kind=excluded.kind, spec_json=excluded.spec_json, updated_at=excluded.updated_at"
            ),
            rusqlite::params![name, entry.kind(), spec_json, now],
        )?;
        Ok(())
    }

    pub fn add_table(&self, conn: &Connection, mut spec: TableSpec, now: i64) -> Result<(), CatalogError> {
        spec.path = self.resolve(&spec.path);
        debug!("catalog add_table {}", path_key(&spec.path));
        let _guard = self.write_lock.lock().expect("catalog write lock poisoned");
        let entry = Entry::Table(spec);
        Self::mirror_write(conn, &entry, now)?;
        let mut next = self.snapshot().as_ref().clone();
        next.insert(entry);
        *self.index.write().expect("catalog index lock poisoned") = Arc::new(next);
        Ok(())
    }

    pub fn add_function(&self, conn: &Connection, mut spec: FunctionSpec, now: i64) -> Result<(), CatalogError> {
        spec.path = self.resolve(&spec.path);
        debug!("catalog add_function {}", path_key(&spec.path));
        let _guard = self.write_lock.lock().expect("catalog write lock poisoned");
        let entry = Entry::Function(spec);
        Self::mirror_write(conn, &entry, now)?;
        let mut next = self.snapshot().as_ref().clone();
        next.insert(entry);
        *self.index.write().expect("catalog index lock poisoned") = Arc::new(next);
        Ok(())
    }

    pub fn find_table(&self, query: &[String]) -> Option<TableSpec> {
        let path = self.resolve(query);
        match self.snapshot().entries.get(&path_key(&path)) {
            Some(Entry::Table(t)) => Some(t.clone()),
            _ => None,
        }
    }

    pub fn find_function(&self, query: &[String]) -> Option<FunctionSpec> {
        let path = self.resolve(query);
        match self.snapshot().entries.get(&path_key(&path)) {
            Some(Entry::Function(f)) => Some(f.clone()),
            _ => None,
        }
    }

    pub fn drop_entry(&self, conn: &Connection, query: &[String]) -> Result<(), CatalogError> {
        let path = self.resolve(query);
        let key = path_key(&path);
        let _guard = self.write_lock.lock().expect("catalog write lock poisoned");
        conn.execute(&format!("DELETE FROM {MIRROR_TABLE} WHERE name = ?1"), [&key])?;
        let mut next = self.snapshot().as_ref().clone();
        next.remove(&path);
        *self.index.write().expect("catalog index lock poisoned") = Arc::new(next);
        Ok(())
    }

    /// Lists `INFORMATION_SCHEMA.TABLES`-shaped rows: (name path joined by
    /// `.`, column count) for every table entry currently indexed.
    pub fn information_schema_tables(&self) -> Vec<(String, usize)> {
        let snap = self.snapshot();
        let mut rows: BTreeMap<String, usize> = BTreeMap::new();
        for entry in snap.entries.values() {
            if let Entry::Table(t) = entry {
                rows.insert(t.path.join("."), t.columns.len());
            }
        }
        rows.into_iter().collect()
    }

    /// Lists `INFORMATION_SCHEMA.ROUTINES`-shaped rows: (name path, arg count).
    pub fn information_schema_routines(&self) -> Vec<(String, usize)> {
        let snap = self.snapshot();
        let mut rows: BTreeMap<String, usize> = BTreeMap::new();
        for entry in snap.entries.values() {
            if let Entry::Function(f) = entry {
                rows.insert(f.path.join("."), f.arguments.len());
            }
        }
        rows.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Column, CreateMode};
    use bqlite_value::Type;

    fn v(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn add_then_find_round_trips() {
        let conn = Connection::open_in_memory().unwrap();
        let catalog = Catalog::new(v(&["proj", "ds"]), None);
        let spec = TableSpec {
            path: v(&["t"]),
            columns: vec![Column { name: "a".into(), ty: Type::Int64 }],
            create_mode: CreateMode::Create,
            as_select: None,
        };
        catalog.add_table(&conn, spec, 1).unwrap();
        let found = catalog.find_table(&v(&["t"])).unwrap();
        assert_eq!(found.path, v(&["proj", "ds", "t"]));
    }

    #[test]
    fn drop_removes_entry() {
        let conn = Connection::open_in_memory().unwrap();
        let catalog = Catalog::new(v(&["proj", "ds"]), None);
        let spec = TableSpec { path: v(&["t"]), columns: vec![], create_mode: CreateMode::Create, as_select: None };
        catalog.add_table(&conn, spec, 1).unwrap();
        catalog.drop_entry(&conn, &v(&["t"])).unwrap();
        assert!(catalog.find_table(&v(&["t"])).is_none());
    }

    #[test]
    fn sync_rehydrates_from_mirror_table() {
        let conn = Connection::open_in_memory().unwrap();
        let catalog = Catalog::new(v(&["proj", "ds"]), None);
        let spec = TableSpec { path: v(&["t"]), columns: vec![], create_mode: CreateMode::Create, as_select: None };
        catalog.add_table(&conn, spec, 1).unwrap();

        let fresh = Catalog::new(v(&["proj", "ds"]), None);
        let loaded = fresh.sync(&conn, 2).unwrap();
        assert_eq!(loaded, 1);
        assert!(fresh.find_table(&v(&["t"])).is_some());
    }

    #[test]
    fn replace_in_place_keeps_single_entry() {
        let conn = Connection::open_in_memory().unwrap();
        let catalog = Catalog::new(v(&["proj", "ds"]), None);
        let spec1 = TableSpec { path: v(&["t"]), columns: vec![], create_mode: CreateMode::Create, as_select: None };
        let spec2 = TableSpec {
            path: v(&["t"]),
            columns: vec![Column { name: "x".into(), ty: Type::String }],
            create_mode: CreateMode::CreateOrReplace,
            as_select: None,
        };
        catalog.add_table(&conn, spec1, 1).unwrap();
        catalog.add_table(&conn, spec2, 2).unwrap();
        let found = catalog.find_table(&v(&["t"])).unwrap();
        assert_eq!(found.columns.len(), 1);
    }
}
