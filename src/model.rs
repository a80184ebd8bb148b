//! Plain data types handed to and returned from the store.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Descriptive record for one media item.
///
/// Everything except `id` belongs to the metadata catalog; the store only
/// passes the item through so the catalog can upsert it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MediaItem {
    /// Opaque identifier, stable per media item.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Duration in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
}

impl MediaItem {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }
}

/// Stored playback progress for a media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlaybackPosition {
    pub media_id: String,
    /// Milliseconds from the start of the item.
    pub position: u64,
}

/// A user bookmark inside a media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CuePoint {
    pub media_id: String,
    /// Milliseconds from the start of the item. Unique per `media_id`.
    pub position: u64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Outcome of a position upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionWrite {
    Inserted,
    Updated,
}

/// Outcome of adding a cue point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CueWrite {
    /// No cue point existed at that position.
    Inserted,
    /// A cue point existed and its description was overwritten.
    Replaced,
    /// A cue point existed and was left untouched.
    Kept,
}
