//! Schema migration tests against on-disk files.
//!
//! Builds version-1 databases by hand, then opens them through the store.

mod common;

use common::fixtures;
use cuestore::StoreError;
use cuestore::storage::schema::{CURRENT_SCHEMA_VERSION, upgrade_schema};
use cuestore::storage::{MediaCatalog, PersistenceStore};
use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

/// Version-1 layout: metadata and cue points exist, the position table has
/// no color cache columns.
fn write_v1_database(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        r"
        CREATE TABLE MediaMetadata (id TEXT PRIMARY KEY, title TEXT, artist TEXT);
        CREATE TABLE CuePoint (
            media_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            description TEXT,
            PRIMARY KEY (media_id, position)
        );
        CREATE TABLE PlaybackPosition (id TEXT PRIMARY KEY, position INTEGER);
        INSERT INTO MediaMetadata (id, title, artist) VALUES ('legacy', 'Old Show', 'Someone');
        INSERT INTO PlaybackPosition (id, position) VALUES ('legacy', 77000);
        INSERT INTO CuePoint (media_id, position, description) VALUES ('legacy', 1500, 'opening');
        PRAGMA user_version = 1;
        ",
    )
    .unwrap();
}

fn column_count(conn: &Connection, table: &str, column: &str) -> usize {
    let mut stmt = conn
        .prepare(&format!("SELECT name FROM pragma_table_info('{table}')"))
        .unwrap();
    stmt.query_map([], |row| row.get::<_, String>(0))
        .unwrap()
        .filter_map(std::result::Result::ok)
        .filter(|name| name == column)
        .count()
}

#[test]
fn v1_file_keeps_its_data_after_open() {
    common::init_test_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("v1.db");
    write_v1_database(&path);

    let mut storage = PersistenceStore::open(&path).unwrap();

    assert_eq!(storage.schema_version().unwrap(), CURRENT_SCHEMA_VERSION);
    assert_eq!(storage.position("legacy").unwrap(), Some(77_000));
    let cues = storage.cue_points("legacy").unwrap();
    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].description.as_deref(), Some("opening"));

    let items = storage.cue_point_items().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title.as_deref(), Some("Old Show"));
    assert_eq!(items[0].album, None);

    storage
        .update_position(&fixtures::media_item("legacy"), 80_000)
        .unwrap();
    assert_eq!(storage.position("legacy").unwrap(), Some(80_000));
}

#[test]
fn upgrade_from_v1_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("twice.db");
    write_v1_database(&path);

    let conn = Connection::open(&path).unwrap();
    upgrade_schema(&conn, &MediaCatalog, 1, CURRENT_SCHEMA_VERSION).unwrap();
    upgrade_schema(&conn, &MediaCatalog, 1, CURRENT_SCHEMA_VERSION).unwrap();

    assert_eq!(column_count(&conn, "PlaybackPosition", "vibrant_color"), 1);
    assert_eq!(column_count(&conn, "PlaybackPosition", "text_color"), 1);
    assert_eq!(column_count(&conn, "MediaMetadata", "album"), 1);

    let position: i64 = conn
        .query_row(
            "SELECT position FROM PlaybackPosition WHERE id = 'legacy'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(position, 77_000);
}

#[test]
fn newer_schema_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("future.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.pragma_update(None, "journal_mode", "DELETE").unwrap();
        conn.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION + 1)
            .unwrap();
    }

    let err = PersistenceStore::open(&path).unwrap_err();
    assert!(matches!(
        err,
        StoreError::SchemaTooNew { found, supported }
            if found == CURRENT_SCHEMA_VERSION + 1 && supported == CURRENT_SCHEMA_VERSION
    ));

    let conn = Connection::open(&path).unwrap();
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap();
    assert_eq!(version, CURRENT_SCHEMA_VERSION + 1);
    let journal_mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .unwrap();
    assert_eq!(journal_mode.to_lowercase(), "delete");
    assert!(!dir.path().join("future.db-wal").exists());
}

#[test]
fn reopening_current_schema_is_a_noop() {
    common::init_test_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("current.db");

    let mut storage = PersistenceStore::open(&path).unwrap();
    storage
        .add_cue_point(&fixtures::media_item("kept"), 9, Some("mark"))
        .unwrap();
    storage.close().unwrap();

    for _ in 0..3 {
        let storage = PersistenceStore::open(&path).unwrap();
        assert_eq!(storage.schema_version().unwrap(), CURRENT_SCHEMA_VERSION);
        assert_eq!(storage.cue_points("kept").unwrap().len(), 1);
        storage.close().unwrap();
    }
}
