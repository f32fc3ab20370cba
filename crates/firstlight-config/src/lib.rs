//! # firstlight-config
//!
//! Layered configuration loading for Firstlight using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`FIRSTLIGHT_*` prefix, `__` as separator)
//! 2. Explicit config file passed on the command line (`--config`)
//! 3. User-level `~/.config/firstlight/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `FIRSTLIGHT_TNS__API_KEY` -> `tns.api_key`,
//! `FIRSTLIGHT_N1__DRB_MIN` -> `n1.drb_min`, etc. The `__` (double
//! underscore) separates nested config sections.

mod dedup;
mod error;
mod n1;
mod tns;

pub use dedup::DedupConfig;
pub use error::ConfigError;
pub use n1::N1Policy;
pub use tns::TnsConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FirstlightConfig {
    #[serde(default)]
    pub n1: N1Policy,
    #[serde(default)]
    pub tns: TnsConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
}

impl FirstlightConfig {
    /// Load configuration from all sources.
    ///
    /// Does NOT call `dotenvy` — use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any layer fails to parse or extract.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(config_file).extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// Loads `.env` from the current directory (if present) before building
    /// the figment. This is the typical entry point for the CLI.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any layer fails to parse or extract.
    pub fn load_with_dotenv(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(config_file)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    #[must_use]
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("FIRSTLIGHT_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("firstlight").join("config.toml"))
    }
}
