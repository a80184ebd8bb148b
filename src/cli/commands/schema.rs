//! Schema command implementation.
//!
//! Emits JSON Schema documents for the records the store hands back, plus the
//! stored and supported database schema versions. Output is always JSON.

use super::print_json;
use crate::error::Result;
use crate::model::{CuePoint, MediaItem, PlaybackPosition};
use crate::storage::PersistenceStore;
use crate::storage::schema::CURRENT_SCHEMA_VERSION;
use schemars::schema::RootSchema;
use schemars::schema_for;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
struct SchemaOutput {
    tool: &'static str,
    schema_version: i32,
    supported_version: i32,
    schemas: BTreeMap<&'static str, RootSchema>,
}

/// Execute the schema command.
///
/// # Errors
///
/// Returns an error if the stored version cannot be read.
pub fn execute(store: &PersistenceStore) -> Result<()> {
    let payload = SchemaOutput {
        tool: "cuestore",
        schema_version: store.schema_version()?,
        supported_version: CURRENT_SCHEMA_VERSION,
        schemas: build_schemas(),
    };
    print_json(&payload)
}

fn build_schemas() -> BTreeMap<&'static str, RootSchema> {
    let mut schemas = BTreeMap::new();
    schemas.insert("MediaItem", schema_for!(MediaItem));
    schemas.insert("CuePoint", schema_for!(CuePoint));
    schemas.insert("PlaybackPosition", schema_for!(PlaybackPosition));
    schemas
}
