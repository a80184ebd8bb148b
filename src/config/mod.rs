//! Configuration management for `cuestore`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`CUESTORE_*`)
//! 3. Explicit config file (`--config`)
//! 4. User config (~/.config/cuestore/config.yaml)
//! 5. Defaults

use crate::error::{Result, StoreError};
use crate::storage::{DuplicateCuePolicy, PersistenceStore, StoreOptions, UpsertStrategy};
use crate::storage::options::DEFAULT_BUSY_TIMEOUT_MS;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const APP_DIR: &str = "cuestore";
const DEFAULT_DB_FILENAME: &str = "library.db";
const CONFIG_FILENAME: &str = "config.yaml";

pub const ENV_DB: &str = "CUESTORE_DB";
pub const ENV_BUSY_TIMEOUT_MS: &str = "CUESTORE_BUSY_TIMEOUT_MS";
pub const ENV_UPSERT: &str = "CUESTORE_UPSERT";
pub const ENV_DUPLICATE_CUES: &str = "CUESTORE_DUPLICATE_CUES";

/// One configuration source. Unset fields defer to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub busy_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upsert: Option<UpsertStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_cues: Option<DuplicateCuePolicy>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        if let Some(database) = &other.database {
            self.database = Some(database.clone());
        }
        if other.busy_timeout_ms.is_some() {
            self.busy_timeout_ms = other.busy_timeout_ms;
        }
        if other.upsert.is_some() {
            self.upsert = other.upsert;
        }
        if other.duplicate_cues.is_some() {
            self.duplicate_cues = other.duplicate_cues;
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        debug!(path = %path.display(), "Loaded config file");
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Build a layer from `CUESTORE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(&|key| env::var(key).ok())
    }

    fn from_env_with(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut layer = Self::default();

        if let Some(path) = value(ENV_DB) {
            layer.database = Some(PathBuf::from(path));
        }
        if let Some(raw) = value(ENV_BUSY_TIMEOUT_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|_| {
                StoreError::Config(format!("{ENV_BUSY_TIMEOUT_MS} is not a number: {raw}"))
            })?;
            layer.busy_timeout_ms = Some(ms);
        }
        if let Some(raw) = value(ENV_UPSERT) {
            layer.upsert = Some(raw.parse()?);
        }
        if let Some(raw) = value(ENV_DUPLICATE_CUES) {
            layer.duplicate_cues = Some(raw.parse()?);
        }

        Ok(layer)
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub upsert: Option<UpsertStrategy>,
    pub duplicate_cues: Option<DuplicateCuePolicy>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        ConfigLayer {
            database: self.db.clone(),
            busy_timeout_ms: None,
            upsert: self.upsert,
            duplicate_cues: self.duplicate_cues,
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreConfig {
    pub database: PathBuf,
    pub busy_timeout_ms: u64,
    pub upsert: UpsertStrategy,
    pub duplicate_cues: DuplicateCuePolicy,
}

impl StoreConfig {
    #[must_use]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            upsert: self.upsert,
            duplicate_cues: self.duplicate_cues,
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }
}

/// Load configuration with the documented precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed, an
/// environment variable is malformed, or no database path can be determined.
pub fn load_config(cli: &CliOverrides) -> Result<StoreConfig> {
    load_config_with_env(cli, &|key| env::var(key).ok())
}

fn load_config_with_env(
    cli: &CliOverrides,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<StoreConfig> {
    let user = match user_config_path(lookup) {
        Some(path) => ConfigLayer::from_yaml(&path)?,
        None => ConfigLayer::default(),
    };
    let explicit = match &cli.config {
        Some(path) => {
            if !path.exists() {
                return Err(StoreError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            ConfigLayer::from_yaml(path)?
        }
        None => ConfigLayer::default(),
    };
    let env_layer = ConfigLayer::from_env_with(lookup)?;
    let cli_layer = cli.as_layer();

    let merged = ConfigLayer::merge_layers(&[user, explicit, env_layer, cli_layer]);
    resolve(merged, lookup)
}

fn resolve(layer: ConfigLayer, lookup: &dyn Fn(&str) -> Option<String>) -> Result<StoreConfig> {
    let database = match layer.database {
        Some(path) => path,
        None => default_database_path(lookup).ok_or_else(|| {
            StoreError::Config(format!(
                "cannot determine a data directory; set {ENV_DB} or pass --db"
            ))
        })?,
    };

    Ok(StoreConfig {
        database,
        busy_timeout_ms: layer.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
        upsert: layer.upsert.unwrap_or_default(),
        duplicate_cues: layer.duplicate_cues.unwrap_or_default(),
    })
}

fn default_database_path(lookup: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let data_home = lookup("XDG_DATA_HOME")
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            lookup("HOME")
                .filter(|v| !v.trim().is_empty())
                .map(|home| Path::new(&home).join(".local").join("share"))
        })?;
    Some(data_home.join(APP_DIR).join(DEFAULT_DB_FILENAME))
}

fn user_config_path(lookup: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let config_home = lookup("XDG_CONFIG_HOME")
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            lookup("HOME")
                .filter(|v| !v.trim().is_empty())
                .map(|home| Path::new(&home).join(".config"))
        })?;
    Some(config_home.join(APP_DIR).join(CONFIG_FILENAME))
}

/// Open the store described by `config`, creating its directory if needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the database cannot be opened.
pub fn open_store(config: &StoreConfig) -> Result<PersistenceStore> {
    if let Some(parent) = config
        .database
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)?;
    }
    PersistenceStore::open_with(&config.database, config.store_options())
}
