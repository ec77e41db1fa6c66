//! Structural contract for record collection documents.
//!
//! A document is an object with exactly one key, the collection name, whose
//! value is an array of records matching the record type's item schema.
//! Repeated values of the unique field are structurally valid; they are
//! reported by [`SchemaValidator::duplicates`] so the loader can log them.

use std::collections::HashSet;

use jsonschema::{Draft, Validator};
use serde_json::{json, Value};
use thiserror::Error;

use crate::error::{Error, Result};
use crate::record::Record;

/// A document failed structural validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("document failed schema validation: {}", .reasons.join("; "))]
pub struct SchemaError {
    /// One entry per violation found.
    pub reasons: Vec<String>,
}

impl SchemaError {
    /// Create a schema error from a list of reasons.
    #[must_use]
    pub fn new(reasons: Vec<String>) -> Self {
        Self { reasons }
    }
}

/// Validates documents for one record collection.
pub struct SchemaValidator {
    collection: &'static str,
    unique_field: &'static str,
    validator: Validator,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("collection", &self.collection)
            .field("unique_field", &self.unique_field)
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compile the document schema for record type `R`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the built-in schema does not compile.
    pub fn for_record<R: Record>() -> Result<Self> {
        let schema = document_schema::<R>();
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .map_err(|err| Error::internal(format!("invalid {} schema: {err}", R::COLLECTION)))?;

        Ok(Self {
            collection: R::COLLECTION,
            unique_field: R::UNIQUE_FIELD,
            validator,
        })
    }

    /// Name of the collection this validator checks.
    #[must_use]
    pub fn collection(&self) -> &'static str {
        self.collection
    }

    /// The smallest valid document: an empty collection.
    #[must_use]
    pub fn empty_document(&self) -> Value {
        keyed(self.collection, json!([]))
    }

    /// Validate a whole document.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] listing every violation found.
    pub fn validate(&self, document: &Value) -> std::result::Result<(), SchemaError> {
        let reasons: Vec<String> = self
            .validator
            .iter_errors(document)
            .map(|err| err.to_string())
            .collect();

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::new(reasons))
        }
    }

    /// Values of the unique field that occur more than once, each listed once
    /// in order of first repetition.
    #[must_use]
    pub fn duplicates(&self, document: &Value) -> Vec<String> {
        let Some(items) = document.get(self.collection).and_then(Value::as_array) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut repeated = Vec::new();
        for key in items.iter().filter_map(|item| item.get(self.unique_field)) {
            let key = key.to_string();
            if !seen.insert(key.clone()) && !repeated.contains(&key) {
                repeated.push(key);
            }
        }
        repeated
    }

    /// Field that is expected to be unique across the collection.
    #[must_use]
    pub fn unique_field(&self) -> &'static str {
        self.unique_field
    }
}

/// Build the full document schema for record type `R`.
#[must_use]
pub fn document_schema<R: Record>() -> Value {
    let collection = json!({
        "type": "array",
        "items": R::item_schema()
    });
    json!({
        "type": "object",
        "properties": keyed(R::COLLECTION, collection),
        "required": [R::COLLECTION],
        "additionalProperties": false
    })
}

/// Wrap `value` in a single-key object.
pub(crate) fn keyed(key: &str, value: Value) -> Value {
    let mut object = serde_json::Map::new();
    object.insert(key.to_owned(), value);
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Recipe, User};

    fn recipes() -> SchemaValidator {
        SchemaValidator::for_record::<Recipe>().unwrap()
    }

    #[test]
    fn test_empty_document_is_valid() {
        let validator = recipes();
        assert!(validator.validate(&validator.empty_document()).is_ok());
        assert_eq!(validator.collection(), "recipes");
    }

    #[test]
    fn test_valid_recipes_document() {
        let doc = json!({
            "recipes": [
                {"id": 1, "title": "Soup", "body": "Hot", "timestamp": 10, "user": "alice"},
                {"id": 2, "title": "Salad", "timestamp": 11, "user": "bob",
                 "image_filename": "2_ab.png"}
            ]
        });
        assert!(recipes().validate(&doc).is_ok());
    }

    #[test]
    fn test_missing_required_field() {
        let doc = json!({"recipes": [{"id": 1, "title": "Soup", "timestamp": 10}]});
        let err = recipes().validate(&doc).unwrap_err();
        assert_eq!(err.reasons.len(), 1);
        assert!(err.reasons[0].contains("user"));
    }

    #[test]
    fn test_additional_record_property_rejected() {
        let doc = json!({
            "recipes": [{"id": 1, "title": "Soup", "timestamp": 10, "user": "a", "rating": 5}]
        });
        assert!(recipes().validate(&doc).is_err());
    }

    #[test]
    fn test_additional_top_level_key_rejected() {
        let doc = json!({"recipes": [], "version": 2});
        assert!(recipes().validate(&doc).is_err());
    }

    #[test]
    fn test_missing_collection_key_rejected() {
        assert!(recipes().validate(&json!({})).is_err());
        assert!(recipes().validate(&Value::Null).is_err());
    }

    #[test]
    fn test_wrong_types_rejected() {
        let doc = json!({
            "recipes": [{"id": "1", "title": "Soup", "timestamp": 10.5, "user": "a"}]
        });
        let err = recipes().validate(&doc).unwrap_err();
        assert_eq!(err.reasons.len(), 2);
    }

    #[test]
    fn test_blank_and_bom_titles_are_structurally_valid() {
        let doc = json!({
            "recipes": [
                {"id": 1, "title": "  ", "timestamp": 1, "user": "a"},
                {"id": 2, "title": "\u{feff}", "timestamp": 2, "user": "a"}
            ]
        });
        assert!(recipes().validate(&doc).is_ok());
    }

    #[test]
    fn test_duplicate_ids_are_valid_but_reported() {
        let doc = json!({
            "recipes": [
                {"id": 4, "title": "A", "timestamp": 1, "user": "a"},
                {"id": 4, "title": "B", "timestamp": 2, "user": "b"},
                {"id": 5, "title": "C", "timestamp": 3, "user": "b"},
                {"id": 4, "title": "D", "timestamp": 4, "user": "b"}
            ]
        });
        let validator = recipes();
        assert!(validator.validate(&doc).is_ok());
        assert_eq!(validator.duplicates(&doc), vec!["4".to_string()]);
        assert_eq!(validator.unique_field(), "id");
    }

    #[test]
    fn test_duplicate_user_names_reported_quoted() {
        let validator = SchemaValidator::for_record::<User>().unwrap();
        let doc = json!({"users": [
            {"name": "a", "email": "a@x", "password": "p"},
            {"name": "a", "email": "b@x", "password": "q"}
        ]});
        assert!(validator.validate(&doc).is_ok());
        assert_eq!(validator.duplicates(&doc), vec!["\"a\"".to_string()]);
    }

    #[test]
    fn test_users_schema() {
        let validator = SchemaValidator::for_record::<User>().unwrap();
        let ok = json!({"users": [{"name": "a", "email": "a@x", "password": "p"}]});
        assert!(validator.validate(&ok).is_ok());

        let missing = json!({"users": [{"name": "a", "email": "a@x"}]});
        assert!(validator.validate(&missing).is_err());

        let recipes_doc = json!({"recipes": []});
        assert!(validator.validate(&recipes_doc).is_err());
    }

    #[test]
    fn test_schema_error_display_joins_reasons() {
        let err = SchemaError::new(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(
            err.to_string(),
            "document failed schema validation: first; second"
        );
    }
}
