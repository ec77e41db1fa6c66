//! User account lookups and registration.

use tracing::debug;

use crate::error::{Error, Result};
use crate::record::User;
use crate::storage::RecordStore;

/// Account operations over a users store.
#[derive(Debug, Clone, Copy)]
pub struct UserDirectory<'a> {
    store: &'a RecordStore<User>,
}

impl<'a> UserDirectory<'a> {
    /// Create a directory over `store`.
    #[must_use]
    pub fn new(store: &'a RecordStore<User>) -> Self {
        Self { store }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a field is blank or the name or email
    /// is already taken, and a storage error if the document cannot be
    /// written.
    pub fn create(&self, name: &str, email: &str, password: &str) -> Result<User> {
        for (field, value) in [("name", name), ("email", email), ("password", password)] {
            if value.trim().is_empty() {
                return Err(Error::validation(format!("user {field} can't be empty")));
            }
        }

        let result = self.store.write(|users, _| {
            if users.iter().any(|u| u.name == name) {
                return Err(Error::validation(format!("user name '{name}' is taken")));
            }
            if users.iter().any(|u| u.email == email) {
                return Err(Error::validation(format!("email '{email}' is already registered")));
            }

            let user = User {
                name: name.to_owned(),
                email: email.to_owned(),
                password: password.to_owned(),
            };
            users.push(user.clone());
            Ok(user)
        });

        match &result {
            Ok(user) => debug!("Registered user {}", user.name),
            Err(err) => debug!("Rejected registration of {}: {}", name, err),
        }
        result
    }

    /// Look up an account by user name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if a writer panicked.
    pub fn find_by_name(&self, name: &str) -> Result<Option<User>> {
        self.store
            .read(|users| users.iter().find(|u| u.name == name).cloned())
    }

    /// Look up an account by email.
    ///
    /// Only a single exact match counts; a document edited by hand may hold
    /// the same address twice, and then nobody is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if a writer panicked.
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.store.read(|users| {
            let mut matches = users.iter().filter(|u| u.email == email);
            match (matches.next(), matches.next()) {
                (Some(user), None) => Some(user.clone()),
                _ => None,
            }
        })
    }

    /// All accounts in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if a writer panicked.
    pub fn list(&self) -> Result<Vec<User>> {
        self.store.snapshot()
    }
}
