//! Command implementations.

pub mod cue;
pub mod items;
pub mod position;
pub mod schema;

use crate::cli::Commands;
use crate::config::{self, CliOverrides};
use crate::error::Result;
use serde::Serialize;

/// Dispatch a parsed command.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the store cannot be
/// opened, or the command's storage call fails.
pub fn execute(command: &Commands, overrides: &CliOverrides, json: bool) -> Result<()> {
    let config = config::load_config(overrides)?;

    if matches!(command, Commands::Config) {
        return if json {
            print_json(&config)
        } else {
            println!("database:       {}", config.database.display());
            println!("busy-timeout:   {} ms", config.busy_timeout_ms);
            println!("upsert:         {}", config.upsert);
            println!("duplicate-cues: {}", config.duplicate_cues);
            Ok(())
        };
    }

    let mut store = config::open_store(&config)?;
    match command {
        Commands::Position { command } => position::execute(command, &mut store, json),
        Commands::Cue { command } => cue::execute(command, &mut store, json),
        Commands::Items => items::execute(&store, json),
        Commands::Schema => schema::execute(&store),
        Commands::Config => Ok(()),
    }?;

    store.close()
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value)?;
    println!("{output}");
    Ok(())
}

/// Render milliseconds as `h:mm:ss.mmm`, dropping the hour when zero.
#[must_use]
pub fn format_timestamp(ms: u64) -> String {
    let millis = ms % 1000;
    let total_secs = ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;

    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}.{millis:03}")
    } else {
        format!("{mins}:{secs:02}.{millis:03}")
    }
}
