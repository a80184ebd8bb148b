//! Media metadata catalog.
//!
//! The catalog owns the `MediaMetadata` table. The persistence store never
//! writes to it directly: it calls [`MetadataCatalog::ensure_media_item_persisted`]
//! before any write that references an item, and hooks into the catalog's
//! create/upgrade lifecycle from [`crate::storage::schema`].

use crate::error::{Result, StoreError};
use crate::model::MediaItem;
use crate::storage::schema::ensure_columns;
use rusqlite::{Connection, Row};

/// Interface the persistence store consumes from the metadata owner.
///
/// Implementations must key their table by a `TEXT` column named `id`, which
/// the cue-point discovery query correlates against.
pub trait MetadataCatalog {
    /// Name of the metadata table.
    fn table(&self) -> &'static str;

    /// Comma-separated column list read by [`Self::item_from_row`], in order.
    fn item_columns(&self) -> &'static str;

    /// Create the catalog's tables on a fresh database.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL fails.
    fn create_schema(&self, conn: &Connection) -> Result<()>;

    /// Bring the catalog's tables from `old_version` to `new_version`.
    ///
    /// # Errors
    ///
    /// Returns an error if the migration fails.
    fn upgrade_schema(&self, conn: &Connection, old_version: i32, new_version: i32) -> Result<()>;

    /// Upsert the metadata row for `item`, keyed by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn ensure_media_item_persisted(&self, conn: &Connection, item: &MediaItem) -> Result<()>;

    /// Build an item from a row selected with [`Self::item_columns`].
    ///
    /// # Errors
    ///
    /// Returns an error if a column has an unexpected type.
    fn item_from_row(&self, row: &Row<'_>) -> rusqlite::Result<MediaItem>;
}

pub const MEDIA_METADATA_TABLE: &str = "MediaMetadata";

const MEDIA_METADATA_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS MediaMetadata (
        id TEXT PRIMARY KEY,
        title TEXT,
        artist TEXT,
        album TEXT,
        duration INTEGER,
        artwork_url TEXT
    );
";

const MEDIA_METADATA_COLUMNS: &[(&str, &str)] = &[
    ("title", "TEXT"),
    ("artist", "TEXT"),
    ("album", "TEXT"),
    ("duration", "INTEGER"),
    ("artwork_url", "TEXT"),
];

/// Bundled `SQLite` catalog with a minimal descriptive record.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaCatalog;

impl MetadataCatalog for MediaCatalog {
    fn table(&self) -> &'static str {
        MEDIA_METADATA_TABLE
    }

    fn item_columns(&self) -> &'static str {
        "id, title, artist, album, duration, artwork_url"
    }

    fn create_schema(&self, conn: &Connection) -> Result<()> {
        conn.execute_batch(MEDIA_METADATA_SQL)?;
        Ok(())
    }

    fn upgrade_schema(&self, conn: &Connection, _old_version: i32, _new_version: i32) -> Result<()> {
        conn.execute_batch(MEDIA_METADATA_SQL)?;
        ensure_columns(conn, MEDIA_METADATA_TABLE, MEDIA_METADATA_COLUMNS)
    }

    fn ensure_media_item_persisted(&self, conn: &Connection, item: &MediaItem) -> Result<()> {
        let duration = item
            .duration
            .map(|d| i64::try_from(d).map_err(|_| StoreError::DurationOutOfRange(d)))
            .transpose()?;
        // Fields the caller leaves empty keep whatever the catalog already has.
        conn.execute(
            "INSERT INTO MediaMetadata (id, title, artist, album, duration, artwork_url)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                title = COALESCE(excluded.title, MediaMetadata.title),
                artist = COALESCE(excluded.artist, MediaMetadata.artist),
                album = COALESCE(excluded.album, MediaMetadata.album),
                duration = COALESCE(excluded.duration, MediaMetadata.duration),
                artwork_url = COALESCE(excluded.artwork_url, MediaMetadata.artwork_url)",
            rusqlite::params![
                item.id,
                item.title,
                item.artist,
                item.album,
                duration,
                item.artwork_url,
            ],
        )?;
        Ok(())
    }

    fn item_from_row(&self, row: &Row<'_>) -> rusqlite::Result<MediaItem> {
        Ok(MediaItem {
            id: row.get(0)?,
            title: row.get(1)?,
            artist: row.get(2)?,
            album: row.get(3)?,
            duration: row
                .get::<_, Option<i64>>(4)?
                .and_then(|d| u64::try_from(d).ok()),
            artwork_url: row.get(5)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        MediaCatalog.create_schema(&conn).unwrap();
        conn
    }

    fn load(conn: &Connection, id: &str) -> MediaItem {
        conn.query_row(
            "SELECT id, title, artist, album, duration, artwork_url FROM MediaMetadata WHERE id = ?",
            [id],
            |row| MediaCatalog.item_from_row(row),
        )
        .unwrap()
    }

    #[test]
    fn ensure_inserts_then_merges() {
        let conn = catalog_conn();
        let item = MediaItem::new("track-1").with_title("Intro").with_artist("Band");
        MediaCatalog.ensure_media_item_persisted(&conn, &item).unwrap();

        let update = MediaItem::new("track-1").with_album("Debut");
        MediaCatalog.ensure_media_item_persisted(&conn, &update).unwrap();

        let stored = load(&conn, "track-1");
        assert_eq!(stored.title.as_deref(), Some("Intro"));
        assert_eq!(stored.artist.as_deref(), Some("Band"));
        assert_eq!(stored.album.as_deref(), Some("Debut"));

        let count: i64 = conn
            .query_row("SELECT count(*) FROM MediaMetadata", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn upgrade_adds_missing_columns() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE MediaMetadata (id TEXT PRIMARY KEY, title TEXT);")
            .unwrap();

        MediaCatalog.upgrade_schema(&conn, 1, 2).unwrap();

        let item = MediaItem {
            duration: Some(180_000),
            ..MediaItem::new("track-2")
        };
        MediaCatalog.ensure_media_item_persisted(&conn, &item).unwrap();
        assert_eq!(load(&conn, "track-2").duration, Some(180_000));
    }

    #[test]
    fn oversized_duration_is_rejected() {
        let conn = catalog_conn();
        let item = MediaItem {
            duration: Some(u64::MAX),
            ..MediaItem::new("endless")
        };

        let err = MediaCatalog.ensure_media_item_persisted(&conn, &item).unwrap_err();
        assert!(matches!(err, StoreError::DurationOutOfRange(u64::MAX)));
        let count: i64 = conn
            .query_row("SELECT count(*) FROM MediaMetadata", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
