//! Configuration loading and database path resolution
//!
//! Database path priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `BNC_INGEST_DATABASE`
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing config file is not an error; defaults apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the database location
pub const DATABASE_ENV_VAR: &str = "BNC_INGEST_DATABASE";

/// Speaker codes the corpus uses for an unidentified speaker and for a group of speakers
pub const DEFAULT_PLACEHOLDER_SPEAKERS: &[&str] = &["PS000", "PS001"];

const APP_DIR: &str = "bnc-ingest";

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub database: Option<PathBuf>,
    pub placeholder_speakers: Option<Vec<String>>,
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Parse a config file; a missing file is an error here
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load `explicit` if given, else the platform config file if it exists, else defaults
    ///
    /// An explicitly named file must exist and parse. The implicit
    /// platform file falls back to defaults with a warning when unreadable.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => match Self::load(&path) {
                Ok(config) => {
                    debug!("Loaded config file: {}", path.display());
                    Ok(config)
                }
                Err(e) => {
                    warn!("Ignoring unreadable config file {}: {}", path.display(), e);
                    Ok(Self::default())
                }
            },
            _ => Ok(Self::default()),
        }
    }

    /// Configured placeholder speaker codes, or the corpus defaults
    pub fn placeholder_speakers(&self) -> Vec<String> {
        match &self.placeholder_speakers {
            Some(codes) => codes.clone(),
            None => DEFAULT_PLACEHOLDER_SPEAKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Platform config file: `<config_dir>/bnc-ingest/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR).join("bnc.db"))
        .unwrap_or_else(|| PathBuf::from("./bnc_data/bnc.db"))
}

/// Resolve the database path following the priority order above
pub fn resolve_database_path(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.database {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_database_path()
}
