//! Error types for `cuestore`.
//!
//! Storage calls return [`StoreError`]. Constraint violations are expected
//! (they drive the upsert fallbacks); everything else coming out of `SQLite`
//! is an unexpected storage failure. [`StoreError::kind`] exposes that split
//! so callers and the best-effort wrapper can log them differently.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors produced by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("schema version {found} is newer than supported version {supported}")]
    SchemaTooNew { found: i32, supported: i32 },

    #[error("media item has no id")]
    MissingMediaId,

    #[error("position {0} ms exceeds the storable range")]
    PositionOutOfRange(u64),

    #[error("duration {0} ms exceeds the storable range")]
    DurationOutOfRange(u64),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A uniqueness or other constraint rejected the statement.
    Constraint,
    /// I/O, locking, corruption and any other engine failure.
    Storage,
    /// The on-disk schema cannot be used by this build.
    Schema,
    /// The caller passed something unstorable.
    Input,
    /// Configuration could not be loaded.
    Config,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Constraint => "CONSTRAINT",
            Self::Storage => "STORAGE",
            Self::Schema => "SCHEMA",
            Self::Input => "INPUT",
            Self::Config => "CONFIG",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StoreError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Database(_) if self.is_constraint_violation() => ErrorKind::Constraint,
            Self::Database(_) | Self::Io(_) => ErrorKind::Storage,
            Self::SchemaTooNew { .. } => ErrorKind::Schema,
            Self::MissingMediaId | Self::PositionOutOfRange(_) | Self::DurationOutOfRange(_) => {
                ErrorKind::Input
            }
            Self::Config(_) | Self::Yaml(_) | Self::Json(_) => ErrorKind::Config,
        }
    }

    /// True when `SQLite` rejected the statement on a constraint (primary key,
    /// unique, not null).
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Database(err) if is_constraint_violation(err))
    }
}

/// Check a raw `rusqlite` error for a constraint violation.
#[must_use]
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
