//! Record types for recipebox.
//!
//! A store persists one collection of records. Each record type binds itself
//! to a document key, an item schema and the field that must be unique across
//! the collection through the [`Record`] trait.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Error, Result};

/// A record type that can live in a [`RecordStore`](crate::storage::RecordStore).
pub trait Record: Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync {
    /// Top-level document key holding the record array.
    const COLLECTION: &'static str;

    /// Field whose value must be unique across the collection.
    const UNIQUE_FIELD: &'static str;

    /// JSON schema for a single array element.
    fn item_schema() -> Value;

    /// Numeric id used to seed the id allocator, if the record has one.
    fn record_id(&self) -> Option<i64> {
        None
    }
}

/// The authenticated identity on whose behalf an operation runs.
///
/// Supplied by the authentication layer and trusted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requester {
    /// Stable user name.
    pub name: String,
}

impl Requester {
    /// Create a requester for the given user name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Check whether this requester owns the recipe.
    #[must_use]
    pub fn owns(&self, recipe: &Recipe) -> bool {
        recipe.owner == self.name
    }
}

impl From<&User> for Requester {
    fn from(user: &User) -> Self {
        Self::new(user.name.clone())
    }
}

/// A stored recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique id, assigned once and never reused.
    pub id: i64,

    /// Recipe title; `put` refuses blank ones.
    pub title: String,

    /// Free-form recipe text.
    #[serde(default)]
    pub body: String,

    /// Creation time in seconds since the Unix epoch.
    pub timestamp: i64,

    /// Name of the user that created the recipe.
    #[serde(rename = "user")]
    pub owner: String,

    /// File name of an attached image, resolved by the image storage layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_filename: Option<String>,
}

impl Record for Recipe {
    const COLLECTION: &'static str = "recipes";
    const UNIQUE_FIELD: &'static str = "id";

    fn item_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "integer" },
                "title": { "type": "string" },
                "body": { "type": "string" },
                "timestamp": { "type": "integer" },
                "user": { "type": "string" },
                "image_filename": { "type": "string" }
            },
            "required": ["id", "title", "timestamp", "user"],
            "additionalProperties": false
        })
    }

    fn record_id(&self) -> Option<i64> {
        Some(self.id)
    }
}

/// A stored user account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user name; recipes reference it as their owner.
    pub name: String,
    /// Contact address, unique across accounts.
    pub email: String,
    /// Credential as handed in by the authentication layer.
    pub password: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Record for User {
    const COLLECTION: &'static str = "users";
    const UNIQUE_FIELD: &'static str = "name";

    fn item_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "email": { "type": "string" },
                "password": { "type": "string" }
            },
            "required": ["name", "email", "password"],
            "additionalProperties": false
        })
    }
}

/// Client-supplied fields for a new recipe.
///
/// The owner is deliberately absent: it always comes from the [`Requester`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeInput {
    /// Explicit id; allocated when absent.
    pub id: Option<i64>,
    /// Title; required.
    pub title: Option<String>,
    /// Body; empty when absent.
    pub body: Option<String>,
    /// Creation time; now when absent.
    pub timestamp: Option<i64>,
    /// Attached image file name.
    pub image_filename: Option<String>,
}

impl RecipeInput {
    /// Create an input with only a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Set an explicit id.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set an explicit timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Reference an image file.
    #[must_use]
    pub fn with_image(mut self, filename: impl Into<String>) -> Self {
        self.image_filename = Some(filename.into());
        self
    }

    /// Build an input from a raw JSON request body.
    ///
    /// Unknown keys, including any client-supplied `user`, are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the body is not an object or a known
    /// field has the wrong type.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(Error::validation(format!(
                "recipe must be a JSON object, found '{value}' instead"
            )));
        };

        Ok(Self {
            id: object.get("id").map(|v| integer_field("id", v)).transpose()?,
            title: object
                .get("title")
                .map(|v| string_field("title", v))
                .transpose()?,
            body: object
                .get("body")
                .map(|v| string_field("body", v))
                .transpose()?,
            timestamp: object
                .get("timestamp")
                .map(|v| integer_field("timestamp", v))
                .transpose()?,
            image_filename: object
                .get("image_filename")
                .map(|v| string_field("image_filename", v))
                .transpose()?,
        })
    }
}

fn integer_field(name: &str, value: &Value) -> Result<i64> {
    value.as_i64().ok_or_else(|| {
        Error::validation(format!(
            "{name} must be of type integer, found '{value}' instead"
        ))
    })
}

fn string_field(name: &str, value: &Value) -> Result<String> {
    value.as_str().map(str::to_owned).ok_or_else(|| {
        Error::validation(format!(
            "{name} must be of type string, found '{value}' instead"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soup() -> Recipe {
        Recipe {
            id: 1,
            title: "Soup".to_string(),
            body: String::new(),
            timestamp: 1_700_000_000,
            owner: "alice".to_string(),
            image_filename: None,
        }
    }

    #[test]
    fn test_recipe_serializes_owner_as_user() {
        let value = serde_json::to_value(soup()).unwrap();
        assert_eq!(value["user"], "alice");
        assert!(value.get("owner").is_none());
        assert!(value.get("image_filename").is_none());
    }

    #[test]
    fn test_recipe_body_defaults_to_empty() {
        let recipe: Recipe = serde_json::from_value(json!({
            "id": 3, "title": "Bread", "timestamp": 5, "user": "bob"
        }))
        .unwrap();
        assert_eq!(recipe.body, "");
        assert_eq!(recipe.record_id(), Some(3));
    }

    #[test]
    fn test_requester_owns() {
        let recipe = soup();
        assert!(Requester::new("alice").owns(&recipe));
        assert!(!Requester::new("bob").owns(&recipe));
    }

    #[test]
    fn test_user_debug_redacts_password() {
        let user = User {
            name: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let debug_str = format!("{user:?}");
        assert!(debug_str.contains("alice@example.com"));
        assert!(!debug_str.contains("hunter2"));
        assert_eq!(user.record_id(), None);
    }

    #[test]
    fn test_input_from_json_full() {
        let input = RecipeInput::from_json(&json!({
            "id": 9,
            "title": "Stew",
            "body": "Simmer.",
            "timestamp": 1234,
            "image_filename": "9_abc.jpg",
            "user": "mallory"
        }))
        .unwrap();
        assert_eq!(
            input,
            RecipeInput::titled("Stew")
                .with_id(9)
                .with_body("Simmer.")
                .with_timestamp(1234)
                .with_image("9_abc.jpg")
        );
    }

    #[test]
    fn test_input_from_json_rejects_string_timestamp() {
        let err = RecipeInput::from_json(&json!({"title": "A", "timestamp": "yesterday"}))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().contains("timestamp must be of type integer"));
    }

    #[test]
    fn test_input_from_json_rejects_float_id() {
        let err = RecipeInput::from_json(&json!({"title": "A", "id": 1.5})).unwrap_err();
        assert!(err.to_string().contains("id must be of type integer"));
    }

    #[test]
    fn test_input_from_json_rejects_non_object() {
        let err = RecipeInput::from_json(&json!(["Soup"])).unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }

    #[test]
    fn test_input_from_json_missing_fields_are_none() {
        let input = RecipeInput::from_json(&json!({})).unwrap();
        assert_eq!(input, RecipeInput::default());
    }
}
