//! Command-line interface definitions.

pub mod commands;

use crate::config::CliOverrides;
use crate::model::MediaItem;
use crate::storage::{DuplicateCuePolicy, UpsertStrategy};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Inspect and edit playback progress and cue points.
#[derive(Parser, Debug)]
#[command(name = "cuestore", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write JSON logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Database file (overrides config and CUESTORE_DB)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Extra config file layered over the user config
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// How position upserts are written
    #[arg(long, global = true, value_parser = parse_upsert, value_name = "STRATEGY")]
    pub upsert: Option<UpsertStrategy>,

    /// What adding a cue point at an occupied position does
    #[arg(long, global = true, value_parser = parse_duplicate_cues, value_name = "POLICY")]
    pub duplicate_cues: Option<DuplicateCuePolicy>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

impl Cli {
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            db: self.db.clone(),
            config: self.config.clone(),
            upsert: self.upsert,
            duplicate_cues: self.duplicate_cues,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read or record playback positions
    Position {
        #[command(subcommand)]
        command: PositionCommands,
    },
    /// Manage cue points
    Cue {
        #[command(subcommand)]
        command: CueCommands,
    },
    /// List media items that have at least one cue point
    Items,
    /// Print JSON Schema for stored records and the schema version
    Schema,
    /// Print the resolved configuration
    Config,
}

#[derive(Subcommand, Debug)]
pub enum PositionCommands {
    /// Print the stored position (0 if none)
    Get {
        /// Media id
        id: String,
    },
    /// Record a position, creating the metadata row if needed
    Set(PositionSetArgs),
}

#[derive(Args, Debug)]
pub struct PositionSetArgs {
    /// Media id
    pub id: String,
    /// Position in milliseconds
    pub ms: u64,
    #[command(flatten)]
    pub metadata: MetadataArgs,
}

#[derive(Subcommand, Debug)]
pub enum CueCommands {
    /// Add a cue point
    Add(CueAddArgs),
    /// List cue points of a media item, ordered by position
    List {
        /// Media id
        id: String,
    },
    /// Remove the cue point at an exact position
    Rm {
        /// Media id
        id: String,
        /// Position in milliseconds
        ms: u64,
    },
    /// Replace the description of a cue point
    Describe {
        /// Media id
        id: String,
        /// Position in milliseconds
        ms: u64,
        /// New description
        text: String,
    },
}

#[derive(Args, Debug)]
pub struct CueAddArgs {
    /// Media id
    pub id: String,
    /// Position in milliseconds
    pub ms: u64,
    /// Note attached to the cue point
    #[arg(short, long)]
    pub description: Option<String>,
    #[command(flatten)]
    pub metadata: MetadataArgs,
}

/// Metadata passed through to the catalog when a write creates the item.
#[derive(Args, Debug, Default)]
pub struct MetadataArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub artist: Option<String>,
    #[arg(long)]
    pub album: Option<String>,
    /// Duration in milliseconds
    #[arg(long, value_name = "MS")]
    pub duration: Option<u64>,
    #[arg(long, value_name = "URL")]
    pub artwork_url: Option<String>,
}

impl MetadataArgs {
    #[must_use]
    pub fn to_item(&self, id: &str) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            title: self.title.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            duration: self.duration,
            artwork_url: self.artwork_url.clone(),
        }
    }
}

fn parse_upsert(raw: &str) -> Result<UpsertStrategy, String> {
    raw.parse().map_err(|err: crate::StoreError| err.to_string())
}

fn parse_duplicate_cues(raw: &str) -> Result<DuplicateCuePolicy, String> {
    raw.parse().map_err(|err: crate::StoreError| err.to_string())
}
