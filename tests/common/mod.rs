#![allow(dead_code)]

use cuestore::storage::{PersistenceStore, StoreOptions};
use std::path::PathBuf;
use std::sync::Once;
use tempfile::TempDir;

pub mod fixtures;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        cuestore::logging::init_test_logging();
    });
}

pub fn test_db() -> PersistenceStore {
    init_test_logging();
    PersistenceStore::open_memory().expect("Failed to create test database")
}

pub fn test_db_with(options: StoreOptions) -> PersistenceStore {
    init_test_logging();
    PersistenceStore::open_memory_with(options).expect("Failed to create test database")
}

pub fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("cuestore").join("library.db")
}

pub fn test_db_with_dir() -> (PersistenceStore, TempDir) {
    init_test_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = db_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let storage = PersistenceStore::open(&path).expect("Failed to create test database");
    (storage, dir)
}
