//! Cookbook domain model.
//!
//! # Responsibility
//! - Define the records persisted by the cookbook store.
//! - Own write-time validation shared by every repository.
//!
//! # Invariants
//! - Identifiers are assigned by the store and never change.
//! - Every ingredient references exactly one category.

pub mod category;
pub mod ingredient;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum length, in characters, of category and ingredient names.
pub const NAME_MAX_CHARS: usize = 100;

/// Write-time validation failures for cookbook records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    TooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "{field} must be at most {max_chars} characters, got {actual_chars}"
            ),
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn validate_name(field: &'static str, value: &str) -> Result<(), ModelValidationError> {
    let actual_chars = value.chars().count();
    if actual_chars > NAME_MAX_CHARS {
        return Err(ModelValidationError::TooLong {
            field,
            max_chars: NAME_MAX_CHARS,
            actual_chars,
        });
    }
    Ok(())
}
