//! Ingredient domain model.
//!
//! # Invariants
//! - `category_id` is required; an ingredient never exists without a category.

use crate::model::category::CategoryId;
use crate::model::{validate_name, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Store-assigned ingredient identifier.
pub type IngredientId = i64;

/// Persisted ingredient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    /// Free text, may be empty.
    pub notes: String,
    pub category_id: CategoryId,
}

/// Write model for a not-yet-persisted ingredient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIngredient {
    pub name: String,
    pub notes: String,
    pub category_id: CategoryId,
}

impl NewIngredient {
    pub fn new(category_id: CategoryId, name: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: notes.into(),
            category_id,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_name("name", &self.name)
    }

    /// Attaches the store-assigned id.
    pub fn into_ingredient(self, id: IngredientId) -> Ingredient {
        Ingredient {
            id,
            name: self.name,
            notes: self.notes,
            category_id: self.category_id,
        }
    }
}
