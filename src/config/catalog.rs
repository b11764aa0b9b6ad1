//! Category seed configuration loading from config.toml
//!
//! The categories listed in the configuration file are created on startup
//! when no category with the same slug exists yet.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_VAR: &str = "SHOPSITE_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Categories to seed
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

/// Configuration for a single category
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CategoryConfig {
    /// Display name of the category
    pub name: String,
    /// URL identifier of the category
    pub slug: String,
}

/// Loads seed configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads seed configuration from `$SHOPSITE_CONFIG`, or `./config.toml` when unset.
///
/// A missing file is not an error: it yields an empty configuration.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        debug!("No configuration file at {}, nothing to seed", path);
        return Ok(Config::default());
    }
    let config = load_config(&path)?;
    info!(
        "Loaded {} category seed(s) from {}",
        config.categories.len(),
        path
    );
    Ok(config)
}
