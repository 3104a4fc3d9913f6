//! Cookbook use-case service.
//!
//! # Responsibility
//! - Provide the create/read/update/delete entry points used by the API layer.
//! - Turn "looked up by id and absent" into semantic not-found errors.
//!
//! # Invariants
//! - Every write is a single repository call; lookups that precede a write
//!   are separate store round-trips, not a transaction.
//! - A failed lookup performs no write.

use crate::model::category::{Category, CategoryId};
use crate::model::ingredient::{Ingredient, IngredientId, NewIngredient};
use crate::repo::category_repo::{
    CategoryFilter, CategoryListQuery, CategoryRepository, SqliteCategoryRepository,
};
use crate::repo::ingredient_repo::{
    IngredientFilter, IngredientListQuery, IngredientRepository, SqliteIngredientRepository,
};
use crate::repo::{RepoError, RepoResult};
use log::info;
use rusqlite::Connection;

/// Use-case service over category and ingredient repositories.
pub struct CookbookService<C: CategoryRepository, I: IngredientRepository> {
    categories: C,
    ingredients: I,
}

/// Service wired to SQLite repositories sharing one connection.
pub type SqliteCookbookService<'conn> =
    CookbookService<SqliteCategoryRepository<'conn>, SqliteIngredientRepository<'conn>>;

impl<'conn> CookbookService<SqliteCategoryRepository<'conn>, SqliteIngredientRepository<'conn>> {
    /// Builds SQLite repositories over a migrated connection.
    pub fn try_from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteCategoryRepository::try_new(conn)?,
            SqliteIngredientRepository::try_new(conn)?,
        ))
    }
}

impl<C: CategoryRepository, I: IngredientRepository> CookbookService<C, I> {
    pub fn new(categories: C, ingredients: I) -> Self {
        Self {
            categories,
            ingredients,
        }
    }

    /// Creates a category with the given name.
    pub fn create_category(&self, name: &str) -> RepoResult<Category> {
        let category = self.categories.create_category(name)?;
        info!(
            "event=category_create module=service status=ok id={}",
            category.id
        );
        Ok(category)
    }

    /// Replaces the category name when `name` is supplied, otherwise keeps it.
    ///
    /// The category is persisted in both cases.
    ///
    /// # Errors
    /// - `RepoError::CategoryNotFound` when `id` does not exist.
    pub fn update_category(&self, id: CategoryId, name: Option<String>) -> RepoResult<Category> {
        let mut category = self.require_category(id)?;
        let renamed = category.rename(name);
        self.categories.update_category(&category)?;
        info!("event=category_update module=service status=ok id={id} renamed={renamed}");
        Ok(category)
    }

    /// Deletes a category and returns the values it held.
    ///
    /// Ingredients of the category are removed by the store's cascade rule.
    ///
    /// # Errors
    /// - `RepoError::CategoryNotFound` when `id` does not exist.
    pub fn delete_category(&self, id: CategoryId) -> RepoResult<Category> {
        let category = self.require_category(id)?;
        self.categories.delete_category(id)?;
        info!("event=category_delete module=service status=ok id={id}");
        Ok(category)
    }

    pub fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        self.categories.get_category(id)
    }

    /// Like `get_category`, but absence is an error.
    pub fn require_category(&self, id: CategoryId) -> RepoResult<Category> {
        self.categories
            .get_category(id)?
            .ok_or(RepoError::CategoryNotFound(id))
    }

    /// Exact-name lookup; a miss is `Ok(None)`.
    pub fn category_by_name(&self, name: &str) -> RepoResult<Option<Category>> {
        self.categories.find_category_by_name(name)
    }

    pub fn list_categories(&self, query: &CategoryListQuery) -> RepoResult<Vec<Category>> {
        self.categories.list_categories(query)
    }

    pub fn count_categories(&self, filter: &CategoryFilter) -> RepoResult<u64> {
        self.categories.count_categories(filter)
    }

    /// Creates an ingredient inside an existing category.
    ///
    /// # Errors
    /// - `RepoError::CategoryNotFound` when `category_id` does not exist.
    pub fn create_ingredient(
        &self,
        category_id: CategoryId,
        name: &str,
        notes: &str,
    ) -> RepoResult<Ingredient> {
        let category = self.require_category(category_id)?;
        let ingredient = self
            .ingredients
            .create_ingredient(&NewIngredient::new(category.id, name, notes))?;
        info!(
            "event=ingredient_create module=service status=ok id={} category_id={}",
            ingredient.id, category.id
        );
        Ok(ingredient)
    }

    pub fn get_ingredient(&self, id: IngredientId) -> RepoResult<Option<Ingredient>> {
        self.ingredients.get_ingredient(id)
    }

    /// Like `get_ingredient`, but absence is an error.
    pub fn require_ingredient(&self, id: IngredientId) -> RepoResult<Ingredient> {
        self.ingredients
            .get_ingredient(id)?
            .ok_or(RepoError::IngredientNotFound(id))
    }

    /// Every ingredient, unfiltered and unpaginated.
    pub fn all_ingredients(&self) -> RepoResult<Vec<Ingredient>> {
        self.ingredients
            .list_ingredients(&IngredientListQuery::default())
    }

    pub fn list_ingredients(&self, query: &IngredientListQuery) -> RepoResult<Vec<Ingredient>> {
        self.ingredients.list_ingredients(query)
    }

    pub fn count_ingredients(&self, filter: &IngredientFilter) -> RepoResult<u64> {
        self.ingredients.count_ingredients(filter)
    }
}
