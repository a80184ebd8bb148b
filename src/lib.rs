//! `cuestore` - playback progress and cue points for a local media library
//!
//! This crate stores where playback stopped in each media item and the
//! bookmarks ("cue points") users drop inside them, on top of a metadata
//! catalog that owns the descriptive media records.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (MediaItem, CuePoint, PlaybackPosition)
//! - [`storage`] - `SQLite` store, schema migrations, metadata catalog
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling
//! - [`logging`] - Tracing subscriber setup
//!
//! # Example
//!
//! ```
//! use cuestore::model::MediaItem;
//! use cuestore::storage::PersistenceStore;
//!
//! let mut store = PersistenceStore::open_memory()?;
//! let song = MediaItem::new("song-1").with_title("Opening");
//!
//! store.update_position(&song, 61_000)?;
//! store.add_cue_point(&song, 30_000, Some("chorus"))?;
//!
//! assert_eq!(store.best_effort().last_position(Some("song-1")), 61_000);
//! assert_eq!(store.cue_points("song-1")?.len(), 1);
//! # Ok::<(), cuestore::StoreError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;

pub use error::{ErrorKind, Result, StoreError};
pub use storage::{BestEffort, PersistenceStore};
