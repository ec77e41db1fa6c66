//! Process-wide handle on the recipe and user stores.
//!
//! Built once during bootstrap and passed to whatever serves requests.

use std::path::PathBuf;

use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::query::QueryEngine;
use crate::record::{Recipe, User};
use crate::storage::{RecordStore, StoreOptions};
use crate::users::UserDirectory;

/// Owns both stores for the lifetime of the service.
#[derive(Debug)]
pub struct ServiceContext {
    config: Config,
    recipes: RecordStore<Recipe>,
    users: RecordStore<User>,
}

impl ServiceContext {
    /// Open the stores described by `config`.
    ///
    /// The data folder is created if missing. Both documents are loaded, and
    /// recovered if invalid, before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the data folder cannot be created or either
    /// document cannot be read or written.
    pub fn open(config: Config) -> Result<Self> {
        let data_folder = config.data_folder();
        std::fs::create_dir_all(&data_folder).map_err(|source| Error::DirectoryCreate {
            path: data_folder.clone(),
            source,
        })?;

        let options = StoreOptions {
            backup_on_open: config.storage.backup_on_open,
        };
        let recipes = RecordStore::open_with(config.recipes_path(), options)?;
        let users = RecordStore::open_with(config.users_path(), options)?;

        info!("Service ready with data folder {}", data_folder.display());
        Ok(Self {
            config,
            recipes,
            users,
        })
    }

    /// Configuration the context was opened with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Recipe queries.
    #[must_use]
    pub fn recipes(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.recipes)
    }

    /// User account operations.
    #[must_use]
    pub fn users(&self) -> UserDirectory<'_> {
        UserDirectory::new(&self.users)
    }

    /// The underlying recipe store.
    #[must_use]
    pub fn recipe_store(&self) -> &RecordStore<Recipe> {
        &self.recipes
    }

    /// The underlying user store.
    #[must_use]
    pub fn user_store(&self) -> &RecordStore<User> {
        &self.users
    }

    /// Folder that recipe images are resolved against.
    #[must_use]
    pub fn images_folder(&self) -> PathBuf {
        self.config.images_folder()
    }
}
