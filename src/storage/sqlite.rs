//! `SQLite` persistence store for playback positions and cue points.

use crate::error::{Result, StoreError, is_constraint_violation};
use crate::model::{CuePoint, CueWrite, MediaItem, PositionWrite};
use crate::storage::best_effort::BestEffort;
use crate::storage::metadata::{MediaCatalog, MetadataCatalog};
use crate::storage::options::{DuplicateCuePolicy, StoreOptions, UpsertStrategy};
use crate::storage::schema::{apply_schema, schema_version};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Playback-position and cue-point store over one `SQLite` connection.
///
/// Construct one per logical caller (the playback engine and the bookmark UI
/// each open their own on the same file); WAL mode and the busy timeout let
/// them interleave. All calls block on database I/O.
#[derive(Debug)]
pub struct PersistenceStore<C: MetadataCatalog = MediaCatalog> {
    conn: Connection,
    catalog: C,
    options: StoreOptions,
    diagnostics: Diagnostics,
}

/// Failure counters kept alongside the benign defaults returned by
/// [`BestEffort`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Errors of any kind swallowed by the best-effort wrapper.
    pub storage_failures: u64,
    /// Inserts that hit an existing key and took the fallback path.
    pub constraint_fallbacks: u64,
}

/// Context for a mutation, tracking side effects to fold into diagnostics.
pub(crate) struct MutationContext<'a> {
    pub op_name: &'a str,
    pub media_id: &'a str,
    pub constraint_fallbacks: u64,
}

impl<'a> MutationContext<'a> {
    fn new(op_name: &'a str, media_id: &'a str) -> Self {
        Self {
            op_name,
            media_id,
            constraint_fallbacks: 0,
        }
    }

    fn record_fallback(&mut self) {
        debug!(op = self.op_name, media_id = self.media_id, "Key exists, taking fallback path");
        self.constraint_fallbacks += 1;
    }
}

impl PersistenceStore<MediaCatalog> {
    /// Open (creating if needed) the database at `path` with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open the database at `path` with explicit options.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open_with(path: &Path, options: StoreOptions) -> Result<Self> {
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "Opened database");
        Self::with_catalog(conn, MediaCatalog, options)
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        Self::open_memory_with(StoreOptions::default())
    }

    /// Open an in-memory database with explicit options.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory_with(options: StoreOptions) -> Result<Self> {
        Self::with_catalog(Connection::open_in_memory()?, MediaCatalog, options)
    }
}

impl<C: MetadataCatalog> PersistenceStore<C> {
    /// Wrap an existing connection, running the schema hooks for `catalog`.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created or upgraded.
    pub fn with_catalog(conn: Connection, catalog: C, options: StoreOptions) -> Result<Self> {
        apply_schema(&conn, &catalog, options.busy_timeout)?;
        Ok(Self {
            conn,
            catalog,
            options,
            diagnostics: Diagnostics::default(),
        })
    }

    /// Close the connection, surfacing any error `Drop` would swallow.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` refuses to close (e.g. unfinalized statements).
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| StoreError::Database(err))
    }

    /// Borrow the store through the wrapper that maps every failure to a
    /// benign default.
    pub fn best_effort(&mut self) -> BestEffort<'_, C> {
        BestEffort::new(self)
    }

    #[must_use]
    pub const fn options(&self) -> &StoreOptions {
        &self.options
    }

    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    #[must_use]
    pub const fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    pub(crate) fn record_failure(&mut self) {
        self.diagnostics.storage_failures += 1;
    }

    /// Stored schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the pragma cannot be read.
    pub fn schema_version(&self) -> Result<i32> {
        schema_version(&self.conn)
    }

    /// Run `f` inside an `IMMEDIATE` transaction.
    ///
    /// The transaction is rolled back when `f` fails. Fallbacks recorded on
    /// the context are added to the diagnostics only after commit.
    fn mutate<F, R>(&mut self, op: &str, media_id: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction<'_>, &C, &mut MutationContext<'_>) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut ctx = MutationContext::new(op, media_id);

        let result = f(&tx, &self.catalog, &mut ctx)?;

        tx.commit()?;
        self.diagnostics.constraint_fallbacks += ctx.constraint_fallbacks;
        Ok(result)
    }

    /// Stored position for `media_id`, or `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn position(&self, media_id: &str) -> Result<Option<u64>> {
        let stored: Option<Option<i64>> = self
            .conn
            .query_row(
                "SELECT position FROM PlaybackPosition WHERE id = ?",
                [media_id],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            None => Ok(None),
            Some(value) => Ok(Some(position_from_sql(0, value.unwrap_or(0))?)),
        }
    }

    /// Record `position` for `item`, upserting its metadata row first.
    ///
    /// Both writes share one transaction, so the position row never exists
    /// without its metadata row.
    ///
    /// # Errors
    ///
    /// Returns an error if the item has no id, the position or duration does
    /// not fit in `SQLite`'s integer range, or any write fails.
    pub fn update_position(&mut self, item: &MediaItem, position: u64) -> Result<PositionWrite> {
        let media_id = validate_item(item)?;
        let value = position_to_sql(position)?;
        let strategy = self.options.upsert;

        let outcome = self.mutate("update_position", media_id, |tx, catalog, ctx| {
            catalog.ensure_media_item_persisted(tx, item)?;
            match strategy {
                UpsertStrategy::Native => upsert_position_native(tx, media_id, value),
                UpsertStrategy::InsertThenUpdate => {
                    upsert_position_fallback(tx, ctx, media_id, value)
                }
            }
        })?;

        debug!(media_id, position, outcome = ?outcome, "Stored playback position");
        Ok(outcome)
    }

    /// Add a cue point, upserting the item's metadata row first.
    ///
    /// An existing cue point at the same position is handled according to
    /// [`DuplicateCuePolicy`].
    ///
    /// # Errors
    ///
    /// Returns an error if the item has no id, the position or duration is
    /// out of range, or any write fails.
    pub fn add_cue_point(
        &mut self,
        item: &MediaItem,
        position: u64,
        description: Option<&str>,
    ) -> Result<CueWrite> {
        let media_id = validate_item(item)?;
        let value = position_to_sql(position)?;
        let policy = self.options.duplicate_cues;

        let outcome = self.mutate("add_cue_point", media_id, |tx, catalog, ctx| {
            catalog.ensure_media_item_persisted(tx, item)?;

            let inserted = tx.execute(
                "INSERT INTO CuePoint (media_id, position, description) VALUES (?, ?, ?)",
                rusqlite::params![media_id, value, description],
            );

            match inserted {
                Ok(_) => Ok(CueWrite::Inserted),
                Err(err) if is_constraint_violation(&err) => {
                    ctx.record_fallback();
                    match policy {
                        DuplicateCuePolicy::KeepExisting => Ok(CueWrite::Kept),
                        DuplicateCuePolicy::Overwrite => {
                            tx.execute(
                                "UPDATE CuePoint SET description = ? WHERE media_id = ? AND position = ?",
                                rusqlite::params![description, media_id, value],
                            )?;
                            Ok(CueWrite::Replaced)
                        }
                    }
                }
                Err(err) => Err(err.into()),
            }
        })?;

        if outcome == CueWrite::Kept {
            info!(media_id, position, "Cue point already exists, new description dropped");
        } else {
            debug!(media_id, position, outcome = ?outcome, "Stored cue point");
        }
        Ok(outcome)
    }

    /// Delete the cue point at exactly `(media_id, position)`.
    ///
    /// Returns `false` if nothing was there.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is out of range or the delete fails.
    pub fn delete_cue_point(&mut self, media_id: &str, position: u64) -> Result<bool> {
        let value = position_to_sql(position)?;
        let rows = self.conn.execute(
            "DELETE FROM CuePoint WHERE media_id = ? AND position = ?",
            rusqlite::params![media_id, value],
        )?;
        debug!(media_id, position, removed = rows > 0, "Deleted cue point");
        Ok(rows > 0)
    }

    /// Cue points for `media_id`, ordered by position.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn cue_points(&self, media_id: &str) -> Result<Vec<CuePoint>> {
        let mut stmt = self.conn.prepare(
            "SELECT media_id, position, description
             FROM CuePoint
             WHERE media_id = ?
             ORDER BY position ASC",
        )?;
        let cues = stmt
            .query_map([media_id], cue_point_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(cues)
    }

    /// Replace the description of the cue point at `(media_id, position)`.
    ///
    /// Returns `false` if no such cue point exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is out of range or the update fails.
    pub fn set_description(&mut self, media_id: &str, position: u64, text: &str) -> Result<bool> {
        let value = position_to_sql(position)?;
        let rows = self.conn.execute(
            "UPDATE CuePoint SET description = ? WHERE media_id = ? AND position = ?",
            rusqlite::params![text, media_id, value],
        )?;
        debug!(media_id, position, updated = rows > 0, "Set cue point description");
        Ok(rows > 0)
    }

    /// Every media item with at least one cue point, each listed once.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn cue_point_items(&self) -> Result<Vec<MediaItem>> {
        let sql = format!(
            "SELECT {columns} FROM {table} m
             WHERE EXISTS (SELECT 1 FROM CuePoint c WHERE c.media_id = m.id)
             ORDER BY m.id",
            columns = self.catalog.item_columns(),
            table = self.catalog.table(),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map([], |row| self.catalog.item_from_row(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }
}

fn upsert_position_native(tx: &Transaction<'_>, media_id: &str, value: i64) -> Result<PositionWrite> {
    let existed = tx
        .prepare("SELECT 1 FROM PlaybackPosition WHERE id = ?")?
        .exists([media_id])?;

    tx.execute(
        "INSERT INTO PlaybackPosition (id, position) VALUES (?, ?)
         ON CONFLICT(id) DO UPDATE SET position = excluded.position",
        rusqlite::params![media_id, value],
    )?;

    Ok(if existed {
        PositionWrite::Updated
    } else {
        PositionWrite::Inserted
    })
}

fn upsert_position_fallback(
    tx: &Transaction<'_>,
    ctx: &mut MutationContext<'_>,
    media_id: &str,
    value: i64,
) -> Result<PositionWrite> {
    let inserted = tx.execute(
        "INSERT INTO PlaybackPosition (id, position) VALUES (?, ?)",
        rusqlite::params![media_id, value],
    );

    match inserted {
        Ok(_) => Ok(PositionWrite::Inserted),
        Err(err) if is_constraint_violation(&err) => {
            ctx.record_fallback();
            tx.execute(
                "UPDATE PlaybackPosition SET position = ? WHERE id = ?",
                rusqlite::params![value, media_id],
            )?;
            Ok(PositionWrite::Updated)
        }
        Err(err) => Err(err.into()),
    }
}

/// Reject items the catalog could not store, before any transaction opens.
fn validate_item(item: &MediaItem) -> Result<&str> {
    if item.id.is_empty() {
        return Err(StoreError::MissingMediaId);
    }
    if let Some(duration) = item.duration.filter(|&d| i64::try_from(d).is_err()) {
        return Err(StoreError::DurationOutOfRange(duration));
    }
    Ok(&item.id)
}

fn position_to_sql(position: u64) -> Result<i64> {
    i64::try_from(position).map_err(|_| StoreError::PositionOutOfRange(position))
}

fn position_from_sql(column: usize, value: i64) -> rusqlite::Result<u64> {
    u64::try_from(value).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(column, value))
}

fn cue_point_from_row(row: &Row<'_>) -> rusqlite::Result<CuePoint> {
    Ok(CuePoint {
        media_id: row.get(0)?,
        position: position_from_sql(1, row.get(1)?)?,
        description: row.get(2)?,
    })
}
