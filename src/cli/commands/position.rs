//! Position command implementation.

use super::{format_timestamp, print_json};
use crate::cli::{PositionCommands, PositionSetArgs};
use crate::error::Result;
use crate::model::PositionWrite;
use crate::storage::PersistenceStore;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct PositionOutput<'a> {
    media_id: &'a str,
    position: u64,
    stored: bool,
}

#[derive(Debug, Serialize)]
struct PositionWriteOutput<'a> {
    media_id: &'a str,
    position: u64,
    outcome: PositionWrite,
}

/// Execute the position command.
///
/// # Errors
///
/// Returns an error if the storage call fails.
pub fn execute(command: &PositionCommands, store: &mut PersistenceStore, json: bool) -> Result<()> {
    match command {
        PositionCommands::Get { id } => get_position(id, store, json),
        PositionCommands::Set(args) => set_position(args, store, json),
    }
}

fn get_position(id: &str, store: &PersistenceStore, json: bool) -> Result<()> {
    let stored = store.position(id)?;
    let position = stored.unwrap_or(0);

    if json {
        print_json(&PositionOutput {
            media_id: id,
            position,
            stored: stored.is_some(),
        })
    } else {
        println!("{position}\t{}", format_timestamp(position));
        Ok(())
    }
}

fn set_position(args: &PositionSetArgs, store: &mut PersistenceStore, json: bool) -> Result<()> {
    let item = args.metadata.to_item(&args.id);
    info!(media_id = %args.id, position = args.ms, "Recording position");
    let outcome = store.update_position(&item, args.ms)?;

    if json {
        print_json(&PositionWriteOutput {
            media_id: &args.id,
            position: args.ms,
            outcome,
        })
    } else {
        println!("{} at {}", args.id, format_timestamp(args.ms));
        Ok(())
    }
}
