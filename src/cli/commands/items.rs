//! Items command implementation.

use super::print_json;
use crate::error::Result;
use crate::storage::PersistenceStore;
use tracing::info;

/// Execute the items command.
///
/// # Errors
///
/// Returns an error if the discovery query fails.
pub fn execute(store: &PersistenceStore, json: bool) -> Result<()> {
    let items = store.cue_point_items()?;
    info!(count = items.len(), "Found media items with cue points");

    if json {
        return print_json(&items);
    }

    for item in &items {
        let title = item.title.as_deref().unwrap_or("(untitled)");
        match &item.artist {
            Some(artist) => println!("{}\t{title} - {artist}", item.id),
            None => println!("{}\t{title}", item.id),
        }
    }
    Ok(())
}
