//! Recipe queries with ownership rules.
//!
//! [`QueryEngine`] is what request handlers call. It borrows the recipe
//! store, enforces per-owner access on mutation and persists every change
//! before returning.

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::{Recipe, RecipeInput, Requester};
use crate::storage::RecordStore;

/// Get, put and delete over a recipe store.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    store: &'a RecordStore<Recipe>,
}

impl<'a> QueryEngine<'a> {
    /// Create a query engine over `store`.
    #[must_use]
    pub fn new(store: &'a RecordStore<Recipe>) -> Self {
        Self { store }
    }

    /// List recipes in insertion order.
    ///
    /// Only the requester's own recipes are returned unless `include_all` is
    /// set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if a writer panicked.
    pub fn get(&self, requester: &Requester, include_all: bool) -> Result<Vec<Recipe>> {
        self.store.read(|records| {
            records
                .iter()
                .filter(|recipe| include_all || requester.owns(recipe))
                .cloned()
                .collect()
        })
    }

    /// Create a recipe owned by `requester`.
    ///
    /// A missing id is allocated, a missing timestamp defaults to now and a
    /// missing body to the empty string. A rejected input consumes no id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a duplicate id, a blank title or a
    /// bad image file name, and a storage error if the document cannot be
    /// written.
    pub fn put(&self, requester: &Requester, input: RecipeInput) -> Result<Recipe> {
        let timestamp = input.timestamp.unwrap_or_else(|| Utc::now().timestamp());

        let result = self.store.write(|records, ids| {
            let id = match input.id {
                Some(id) if records.iter().any(|r| r.id == id) => {
                    return Err(Error::validation(format!(
                        "recipe with id {id} already exists"
                    )));
                }
                Some(id) => {
                    ids.observe(id);
                    id
                }
                None => ids
                    .allocate()
                    .ok_or_else(|| Error::validation("no recipe ids left to allocate"))?,
            };

            let title = match input.title {
                Some(title) if !title.trim().is_empty() => title,
                _ => return Err(Error::validation("recipe title can't be empty")),
            };

            if let Some(filename) = &input.image_filename {
                check_image_filename(filename)?;
            }

            let recipe = Recipe {
                id,
                title,
                body: input.body.unwrap_or_default(),
                timestamp,
                owner: requester.name.clone(),
                image_filename: input.image_filename,
            };
            records.push(recipe.clone());
            Ok(recipe)
        });

        match &result {
            Ok(recipe) => debug!("Created recipe {} for {}", recipe.id, requester.name),
            Err(err) => debug!("Rejected recipe from {}: {}", requester.name, err),
        }
        result
    }

    /// Create a recipe from a raw JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a field has the wrong type, otherwise
    /// whatever [`put`](Self::put) returns.
    pub fn put_json(&self, requester: &Requester, body: &Value) -> Result<Recipe> {
        let input = RecipeInput::from_json(body).inspect_err(|err| {
            debug!("Rejected recipe from {}: {}", requester.name, err);
        })?;
        self.put(requester, input)
    }

    /// Delete the recipe with `id` and return it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such recipe and
    /// [`Error::Ownership`] if it belongs to someone else; the recipe is left
    /// untouched in both cases.
    pub fn delete(&self, requester: &Requester, id: i64) -> Result<Recipe> {
        let result = self.store.write(|records, _| {
            let index = records
                .iter()
                .position(|r| r.id == id)
                .ok_or(Error::NotFound { id })?;

            if !requester.owns(&records[index]) {
                return Err(Error::Ownership {
                    id,
                    requester: requester.name.clone(),
                });
            }
            Ok(records.remove(index))
        });

        match &result {
            Ok(_) => debug!("Deleted recipe {} for {}", id, requester.name),
            Err(err) => debug!("Refused to delete recipe {} for {}: {}", id, requester.name, err),
        }
        result
    }
}

/// Image references must be bare file names inside the images folder.
fn check_image_filename(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(Error::validation(format!(
            "image_filename must be a bare file name, found '{name}' instead"
        )));
    }
    Ok(())
}
