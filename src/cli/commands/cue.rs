//! Cue command implementation.

use super::{format_timestamp, print_json};
use crate::cli::{CueAddArgs, CueCommands};
use crate::error::Result;
use crate::model::CueWrite;
use crate::storage::PersistenceStore;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct CueWriteOutput<'a> {
    media_id: &'a str,
    position: u64,
    outcome: CueWrite,
}

#[derive(Debug, Serialize)]
struct CueChangeOutput<'a> {
    media_id: &'a str,
    position: u64,
    changed: bool,
}

/// Execute the cue command.
///
/// # Errors
///
/// Returns an error if the storage call fails.
pub fn execute(command: &CueCommands, store: &mut PersistenceStore, json: bool) -> Result<()> {
    match command {
        CueCommands::Add(args) => add_cue(args, store, json),
        CueCommands::List { id } => list_cues(id, store, json),
        CueCommands::Rm { id, ms } => {
            info!(media_id = %id, position = ms, "Removing cue point");
            let changed = store.delete_cue_point(id, *ms)?;
            report_change(id, *ms, changed, "Removed", json)
        }
        CueCommands::Describe { id, ms, text } => {
            let changed = store.set_description(id, *ms, text)?;
            report_change(id, *ms, changed, "Updated", json)
        }
    }
}

fn add_cue(args: &CueAddArgs, store: &mut PersistenceStore, json: bool) -> Result<()> {
    let item = args.metadata.to_item(&args.id);
    info!(media_id = %args.id, position = args.ms, "Adding cue point");
    let outcome = store.add_cue_point(&item, args.ms, args.description.as_deref())?;

    if json {
        return print_json(&CueWriteOutput {
            media_id: &args.id,
            position: args.ms,
            outcome,
        });
    }

    let at = format_timestamp(args.ms);
    match outcome {
        CueWrite::Inserted => println!("Added cue point to {} at {at}", args.id),
        CueWrite::Replaced => println!("Replaced cue point on {} at {at}", args.id),
        CueWrite::Kept => println!("Cue point on {} at {at} already exists, kept", args.id),
    }
    Ok(())
}

fn list_cues(id: &str, store: &PersistenceStore, json: bool) -> Result<()> {
    let cues = store.cue_points(id)?;

    if json {
        return print_json(&cues);
    }

    if cues.is_empty() {
        println!("No cue points for {id}");
    }
    for cue in &cues {
        match &cue.description {
            Some(text) => println!("{}\t{}\t{text}", cue.position, format_timestamp(cue.position)),
            None => println!("{}\t{}", cue.position, format_timestamp(cue.position)),
        }
    }
    Ok(())
}

fn report_change(id: &str, ms: u64, changed: bool, verb: &str, json: bool) -> Result<()> {
    if json {
        return print_json(&CueChangeOutput {
            media_id: id,
            position: ms,
            changed,
        });
    }

    let at = format_timestamp(ms);
    if changed {
        println!("{verb} cue point on {id} at {at}");
    } else {
        println!("No cue point on {id} at {at}");
    }
    Ok(())
}
