//! Tunables for [`PersistenceStore`](crate::storage::PersistenceStore).

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// How `update_position` writes an existing row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpsertStrategy {
    /// `INSERT ... ON CONFLICT(id) DO UPDATE`.
    #[default]
    Native,
    /// Insert, and on a primary-key conflict fall back to `UPDATE`.
    InsertThenUpdate,
}

/// What `add_cue_point` does when a cue point already sits at that position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateCuePolicy {
    /// Replace the stored description with the new one.
    #[default]
    Overwrite,
    /// Keep the stored row; the new description is dropped.
    KeepExisting,
}

impl UpsertStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::InsertThenUpdate => "insert-then-update",
        }
    }
}

impl DuplicateCuePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::KeepExisting => "keep-existing",
        }
    }
}

impl fmt::Display for UpsertStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DuplicateCuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpsertStrategy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "native" => Ok(Self::Native),
            "insert-then-update" => Ok(Self::InsertThenUpdate),
            other => Err(StoreError::Config(format!("unknown upsert strategy: {other}"))),
        }
    }
}

impl FromStr for DuplicateCuePolicy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "keep-existing" | "keep" => Ok(Self::KeepExisting),
            other => Err(StoreError::Config(format!(
                "unknown duplicate cue policy: {other}"
            ))),
        }
    }
}

/// Options applied when opening a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub upsert: UpsertStrategy,
    pub duplicate_cues: DuplicateCuePolicy,
    pub busy_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            upsert: UpsertStrategy::default(),
            duplicate_cues: DuplicateCuePolicy::default(),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }
}

impl StoreOptions {
    #[must_use]
    pub const fn with_upsert(mut self, upsert: UpsertStrategy) -> Self {
        self.upsert = upsert;
        self
    }

    #[must_use]
    pub const fn with_duplicate_cues(mut self, policy: DuplicateCuePolicy) -> Self {
        self.duplicate_cues = policy;
        self
    }
}
