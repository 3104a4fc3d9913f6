//! Core domain logic for the cookbook API.
//! This crate is the single source of truth for persistence invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{Category, CategoryId};
pub use model::ingredient::{Ingredient, IngredientId, NewIngredient};
pub use model::{ModelValidationError, NAME_MAX_CHARS};
pub use repo::category_repo::{
    CategoryFilter, CategoryListQuery, CategoryRepository, SqliteCategoryRepository,
};
pub use repo::ingredient_repo::{
    IngredientFilter, IngredientListQuery, IngredientRepository, SqliteIngredientRepository,
};
pub use repo::{RepoError, RepoResult};
pub use service::cookbook_service::{CookbookService, SqliteCookbookService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
