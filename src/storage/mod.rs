//! `SQLite` storage layer for `cuestore`.
//!
//! This module provides the persistence layer using `SQLite` with:
//! - WAL mode so the playback and bookmark writers can share one file
//! - One `IMMEDIATE` transaction per write (metadata upsert + own row)
//! - Versioned, re-runnable schema migrations
//!
//! # Submodules
//!
//! - [`best_effort`] - Wrapper mapping failures to benign defaults
//! - [`metadata`] - Metadata catalog interface and bundled implementation
//! - [`options`] - Upsert strategy and duplicate cue-point policy
//! - [`schema`] - Database schema definitions and migrations
//! - [`sqlite`] - Main `SQLite` store implementation

pub mod best_effort;
pub mod metadata;
pub mod options;
pub mod schema;
pub mod sqlite;

pub use best_effort::BestEffort;
pub use metadata::{MediaCatalog, MetadataCatalog};
pub use options::{DuplicateCuePolicy, StoreOptions, UpsertStrategy};
pub use sqlite::{Diagnostics, PersistenceStore};
