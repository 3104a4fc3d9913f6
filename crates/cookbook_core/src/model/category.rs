//! Category domain model.

use crate::model::{validate_name, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Store-assigned category identifier.
pub type CategoryId = i64;

/// A named group of ingredients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Replaces the name only when a new one is supplied.
    ///
    /// Returns whether the name was changed.
    pub fn rename(&mut self, name: Option<String>) -> bool {
        match name {
            Some(name) => {
                self.name = name;
                true
            }
            None => false,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_name("name", &self.name)
    }
}
