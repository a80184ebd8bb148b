//! Database schema definitions and migration logic.
//!
//! The schema version lives in `PRAGMA user_version`. A fresh database runs
//! the create hook; an older one runs the upgrade hook. Both hooks call into
//! the metadata catalog first so it can manage its own tables.

use crate::error::{Result, StoreError};
use crate::storage::metadata::MetadataCatalog;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Duration;
use tracing::{debug, info};

pub const CURRENT_SCHEMA_VERSION: i32 = 2;

pub const CUE_POINT_TABLE: &str = "CuePoint";
pub const PLAYBACK_POSITION_TABLE: &str = "PlaybackPosition";

/// Cue points: at most one per exact timestamp per media item.
pub const CUE_POINT_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS CuePoint (
        media_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        description TEXT,
        PRIMARY KEY (media_id, position)
    );
";

/// Playback positions. The color columns cache artwork colors for the
/// player UI; this crate never reads them but must keep them intact.
pub const PLAYBACK_POSITION_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS PlaybackPosition (
        id TEXT PRIMARY KEY,
        position INTEGER,
        vibrant_color INTEGER,
        text_color INTEGER
    );
";

const COLOR_CACHE_COLUMNS: &[(&str, &str)] =
    &[("vibrant_color", "INTEGER"), ("text_color", "INTEGER")];

/// Apply connection pragmas, then create or upgrade the schema.
///
/// A file written by a newer build is rejected before any persistent pragma
/// runs, so it is left exactly as it was. The version check is repeated
/// inside the `IMMEDIATE` transaction that holds all DDL, so two processes
/// opening the same fresh file do not both run the create hook.
///
/// # Errors
///
/// Returns [`StoreError::SchemaTooNew`] if the file was written by a newer
/// build, or a database error if pragmas or DDL fail.
pub fn apply_schema<C: MetadataCatalog + ?Sized>(
    conn: &Connection,
    catalog: &C,
    busy_timeout: Duration,
) -> Result<()> {
    conn.busy_timeout(busy_timeout)?;
    reject_newer(schema_version(conn)?)?;

    // Set journal mode to WAL so the playback and bookmark writers can share the file
    conn.pragma_update(None, "journal_mode", "WAL")?;
    // NORMAL synchronous is safe with WAL: committed data survives OS crash
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let version = schema_version(&tx)?;
    reject_newer(version)?;

    if version == 0 {
        create_schema(&tx, catalog)?;
    } else if version < CURRENT_SCHEMA_VERSION {
        upgrade_schema(&tx, catalog, version, CURRENT_SCHEMA_VERSION)?;
    }

    tx.execute_batch(CUE_POINT_SQL)?;
    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;
    tx.commit()?;

    Ok(())
}

fn reject_newer(version: i32) -> Result<()> {
    if version > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::SchemaTooNew {
            found: version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    Ok(())
}

/// Read the stored schema version (0 for a fresh file).
///
/// # Errors
///
/// Returns an error if the pragma cannot be read.
pub fn schema_version(conn: &Connection) -> Result<i32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// One-time full schema creation.
fn create_schema<C: MetadataCatalog + ?Sized>(conn: &Connection, catalog: &C) -> Result<()> {
    debug!(version = CURRENT_SCHEMA_VERSION, "Creating schema");
    catalog.create_schema(conn)?;
    conn.execute_batch(CUE_POINT_SQL)?;
    conn.execute_batch(PLAYBACK_POSITION_SQL)?;
    // Files created before versioning may already hold a narrower table.
    ensure_columns(conn, PLAYBACK_POSITION_TABLE, COLOR_CACHE_COLUMNS)
}

/// Upgrade hook for a database at `old_version`.
///
/// Only version 1 has a migration: it adds the two color-cache columns to
/// `PlaybackPosition`. Each column is added only when missing, so running
/// this twice is harmless. If the table itself is missing it is created with
/// the current layout.
///
/// # Errors
///
/// Returns an error if the catalog upgrade or any `ALTER TABLE` fails.
pub fn upgrade_schema<C: MetadataCatalog + ?Sized>(
    conn: &Connection,
    catalog: &C,
    old_version: i32,
    new_version: i32,
) -> Result<()> {
    info!(from = old_version, to = new_version, "Upgrading schema");
    catalog.upgrade_schema(conn, old_version, new_version)?;

    if old_version == 1 {
        conn.execute_batch(PLAYBACK_POSITION_SQL)?;
        ensure_columns(conn, PLAYBACK_POSITION_TABLE, COLOR_CACHE_COLUMNS)?;
    }

    Ok(())
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name=?")?;
    Ok(stmt.exists([table])?)
}

pub(crate) fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    // pragma_table_info() takes the table name literally; callers only pass
    // our own table constants.
    let sql = format!("SELECT 1 FROM pragma_table_info('{table}') WHERE name = ?");
    let mut stmt = conn.prepare(&sql)?;
    Ok(stmt.exists([column])?)
}

/// Add each `(name, definition)` column that `table` lacks.
///
/// Missing tables are left alone.
pub(crate) fn ensure_columns(conn: &Connection, table: &str, columns: &[(&str, &str)]) -> Result<()> {
    if !table_exists(conn, table)? {
        return Ok(());
    }

    for (name, definition) in columns {
        if !column_exists(conn, table, name)? {
            debug!(table, column = name, "Adding column");
            let sql = format!("ALTER TABLE {table} ADD COLUMN {name} {definition}");
            conn.execute(&sql, [])?;
        }
    }

    Ok(())
}
