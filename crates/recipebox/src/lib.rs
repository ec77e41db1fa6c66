//! `recipebox` - Embedded record store for a recipe-sharing service
//!
//! This library keeps recipe and user collections in YAML documents on local
//! disk, validates them against a schema when they are opened, and enforces
//! per-owner access on mutation. An invalid document is backed up and
//! replaced with an empty collection instead of stopping the service.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod query;
pub mod record;
pub mod storage;
pub mod users;

pub use config::Config;
pub use context::ServiceContext;
pub use error::{Error, ErrorKind, Result};
pub use logging::init_logging;
pub use query::QueryEngine;
pub use record::{Recipe, RecipeInput, Record, Requester, User};
pub use storage::{LoadOutcome, RecordStore, StoreOptions, StoreStats};
pub use users::UserDirectory;
