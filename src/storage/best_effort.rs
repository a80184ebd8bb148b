//! Best-effort view of a [`PersistenceStore`].
//!
//! Playback and bookmark callers never want a storage hiccup to stop the
//! player, so this wrapper swallows every error: reads fall back to `0` or an
//! empty list and writes become no-ops. Each failure is logged with the
//! operation and key, and counted in [`Diagnostics`](super::Diagnostics).

use crate::error::StoreError;
use crate::model::{CuePoint, MediaItem};
use crate::storage::metadata::{MediaCatalog, MetadataCatalog};
use crate::storage::sqlite::PersistenceStore;
use tracing::{debug, warn};

/// Borrowed wrapper returned by [`PersistenceStore::best_effort`].
#[derive(Debug)]
pub struct BestEffort<'a, C: MetadataCatalog = MediaCatalog> {
    store: &'a mut PersistenceStore<C>,
}

impl<'a, C: MetadataCatalog> BestEffort<'a, C> {
    pub(crate) fn new(store: &'a mut PersistenceStore<C>) -> Self {
        Self { store }
    }

    /// Last stored position, or `0` when `media_id` is `None`, nothing was
    /// stored, or the read failed.
    pub fn last_position(&mut self, media_id: Option<&str>) -> u64 {
        let Some(media_id) = media_id else {
            return 0;
        };

        match self.store.position(media_id) {
            Ok(Some(position)) => position,
            Ok(None) => {
                debug!(op = "last_position", media_id, "No stored position");
                0
            }
            Err(err) => {
                self.failed("last_position", media_id, &err);
                0
            }
        }
    }

    pub fn update_position(&mut self, item: &MediaItem, position: u64) {
        if let Err(err) = self.store.update_position(item, position) {
            self.failed("update_position", &item.id, &err);
        }
    }

    pub fn add_cue_point(&mut self, item: &MediaItem, position: u64, description: Option<&str>) {
        if let Err(err) = self.store.add_cue_point(item, position, description) {
            self.failed("add_cue_point", &item.id, &err);
        }
    }

    pub fn delete_cue_point(&mut self, media_id: &str, position: u64) {
        if let Err(err) = self.store.delete_cue_point(media_id, position) {
            self.failed("delete_cue_point", media_id, &err);
        }
    }

    pub fn cue_points(&mut self, media_id: &str) -> Vec<CuePoint> {
        self.store.cue_points(media_id).unwrap_or_else(|err| {
            self.failed("cue_points", media_id, &err);
            Vec::new()
        })
    }

    pub fn set_description(&mut self, media_id: &str, position: u64, text: &str) {
        if let Err(err) = self.store.set_description(media_id, position, text) {
            self.failed("set_description", media_id, &err);
        }
    }

    pub fn cue_point_items(&mut self) -> Vec<MediaItem> {
        self.store.cue_point_items().unwrap_or_else(|err| {
            self.failed("cue_point_items", "*", &err);
            Vec::new()
        })
    }

    fn failed(&mut self, op: &'static str, media_id: &str, err: &StoreError) {
        self.store.record_failure();
        warn!(
            op,
            media_id,
            kind = %err.kind(),
            error = %err,
            "Storage operation failed, returning default"
        );
    }
}
