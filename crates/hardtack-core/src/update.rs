//! Field-level edits to an existing recipe.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{Payload, Recipe, RecipeId};

/// Replacement values for existing recipe fields.
///
/// Lists are replaced wholesale: adding a tag means sending the full new list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeUpdate {
    pub uuid: RecipeId,
    pub update_params: Payload,
}

impl RecipeUpdate {
    pub fn new(uuid: RecipeId) -> Self {
        Self { uuid, update_params: Payload::new() }
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.update_params.insert(key.into(), value.into());
        self
    }

    /// Applies the update to `recipe` and returns the edited copy.
    ///
    /// Keys must already exist in the stored form of the recipe and `uuid`
    /// can never change.
    pub fn apply_to(&self, recipe: &Recipe) -> Result<Recipe> {
        if self.uuid != recipe.uuid {
            return Err(Error::InvalidUpdate(format!(
                "update targets {} but recipe is {}",
                self.uuid, recipe.uuid
            )));
        }
        let Value::Object(mut fields) = serde_json::to_value(recipe)? else {
            return Err(Error::Operation("recipe did not serialize to an object".into()));
        };
        for (key, value) in &self.update_params {
            if key == "uuid" {
                return Err(Error::InvalidUpdate("uuid is immutable".into()));
            }
            if !fields.contains_key(key) {
                return Err(Error::InvalidUpdate(format!("unknown field '{key}'")));
            }
            fields.insert(key.clone(), value.clone());
        }
        serde_json::from_value(Value::Object(fields)).map_err(|e| Error::InvalidUpdate(e.to_string()))
    }
}
