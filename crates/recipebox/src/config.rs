//! Configuration management for recipebox.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "recipebox";

/// Default images directory name, relative to the data folder.
const IMAGES_DIR_NAME: &str = "images";

/// Prefix for configuration environment variables.
const ENV_PREFIX: &str = "RECIPEBOX_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `RECIPEBOX_`, nested with `__`)
/// 2. TOML config file at `~/.config/recipebox/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document storage configuration.
    pub storage: StorageConfig,
    /// Image folder configuration.
    pub images: ImagesConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Folder holding the documents and their `backup/` directory.
    /// Defaults to `~/.local/share/recipebox`
    pub data_folder: Option<PathBuf>,
    /// File name of the recipes document inside the data folder.
    pub recipes_file: String,
    /// File name of the users document inside the data folder.
    pub users_file: String,
    /// Take a routine backup of each document when it is opened.
    pub backup_on_open: bool,
}

/// Image-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Folder that recipe image files live in.
    /// Defaults to `<data_folder>/images`
    pub folder: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_folder: None, // Will be resolved to default at runtime
            recipes_file: "recipes.yaml".to_string(),
            users_file: "users.yaml".to_string(),
            backup_on_open: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `RECIPEBOX_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        for (key, name) in [
            ("recipes_file", &self.storage.recipes_file),
            ("users_file", &self.storage.users_file),
        ] {
            if name.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: format!("storage.{key} cannot be empty"),
                });
            }
            if name.contains(['/', '\\']) {
                return Err(Error::ConfigValidation {
                    message: format!("storage.{key} must be a file name, got '{name}'"),
                });
            }
        }

        if self.storage.recipes_file == self.storage.users_file {
            return Err(Error::ConfigValidation {
                message: format!(
                    "recipes_file and users_file cannot both be '{}'",
                    self.storage.recipes_file
                ),
            });
        }

        Ok(())
    }

    /// Get the data folder, resolving defaults if not set.
    #[must_use]
    pub fn data_folder(&self) -> PathBuf {
        self.storage
            .data_folder
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the recipes document path.
    #[must_use]
    pub fn recipes_path(&self) -> PathBuf {
        self.data_folder().join(&self.storage.recipes_file)
    }

    /// Get the users document path.
    #[must_use]
    pub fn users_path(&self) -> PathBuf {
        self.data_folder().join(&self.storage.users_file)
    }

    /// Get the images folder, resolving defaults if not set.
    #[must_use]
    pub fn images_folder(&self) -> PathBuf {
        self.images
            .folder
            .clone()
            .unwrap_or_else(|| self.data_folder().join(IMAGES_DIR_NAME))
    }
}
