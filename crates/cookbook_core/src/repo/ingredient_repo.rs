//! Ingredient repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Write paths call `NewIngredient::validate()` before SQL mutations.
//! - `category_id` must reference an existing category; the store's foreign
//!   key rejects dangling references.
//! - Listing order is deterministic: `id ASC`.

use crate::model::category::CategoryId;
use crate::model::ingredient::{Ingredient, IngredientId, NewIngredient};
use crate::repo::{
    count_to_u64, ensure_connection_ready, escape_like, push_page, RepoResult, WhereClause,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const INGREDIENT_SELECT_SQL: &str = "SELECT id, name, notes, category_id FROM ingredients";

/// Field filters for ingredient listing. All set fields must match.
///
/// The `i`-prefixed lookups fold ASCII letters only; `Ä` and `ä` stay distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientFilter {
    pub name: Option<String>,
    pub name_icontains: Option<String>,
    pub name_istartswith: Option<String>,
    pub notes: Option<String>,
    pub notes_icontains: Option<String>,
    pub category_id: Option<CategoryId>,
    /// Exact name of the owning category.
    pub category_name: Option<String>,
}

impl IngredientFilter {
    pub fn for_category(category_id: CategoryId) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }
}

/// Query options for listing ingredients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientListQuery {
    pub filter: IngredientFilter,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for ingredient persistence.
///
/// Ingredients are create-only at this layer; removal happens through the
/// owning category's cascade.
pub trait IngredientRepository {
    fn create_ingredient(&self, ingredient: &NewIngredient) -> RepoResult<Ingredient>;
    fn get_ingredient(&self, id: IngredientId) -> RepoResult<Option<Ingredient>>;
    fn list_ingredients(&self, query: &IngredientListQuery) -> RepoResult<Vec<Ingredient>>;
    fn count_ingredients(&self, filter: &IngredientFilter) -> RepoResult<u64>;
}

/// SQLite-backed ingredient repository.
pub struct SqliteIngredientRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIngredientRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "ingredients",
            &["id", "name", "notes", "category_id"],
        )?;
        Ok(Self { conn })
    }
}

impl IngredientRepository for SqliteIngredientRepository<'_> {
    fn create_ingredient(&self, ingredient: &NewIngredient) -> RepoResult<Ingredient> {
        ingredient.validate()?;

        self.conn.execute(
            "INSERT INTO ingredients (name, notes, category_id) VALUES (?1, ?2, ?3);",
            params![
                ingredient.name.as_str(),
                ingredient.notes.as_str(),
                ingredient.category_id,
            ],
        )?;

        Ok(ingredient
            .clone()
            .into_ingredient(self.conn.last_insert_rowid()))
    }

    fn get_ingredient(&self, id: IngredientId) -> RepoResult<Option<Ingredient>> {
        let ingredient = self
            .conn
            .query_row(
                &format!("{INGREDIENT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_ingredient_row,
            )
            .optional()?;
        Ok(ingredient)
    }

    fn list_ingredients(&self, query: &IngredientListQuery) -> RepoResult<Vec<Ingredient>> {
        let (where_sql, mut binds) = ingredient_where(&query.filter).render();
        let mut sql = format!("{INGREDIENT_SELECT_SQL}{where_sql} ORDER BY id ASC");
        push_page(&mut sql, &mut binds, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let ingredients = stmt
            .query_map(params_from_iter(binds), parse_ingredient_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ingredients)
    }

    fn count_ingredients(&self, filter: &IngredientFilter) -> RepoResult<u64> {
        let (where_sql, binds) = ingredient_where(filter).render();
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM ingredients{where_sql};"),
            params_from_iter(binds),
            |row| row.get(0),
        )?;
        count_to_u64(count)
    }
}

fn ingredient_where(filter: &IngredientFilter) -> WhereClause {
    let contains = |value: &Option<String>| {
        value
            .as_deref()
            .map(|value| format!("%{}%", escape_like(value)))
    };
    let starts_with = |value: &Option<String>| {
        value
            .as_deref()
            .map(|value| format!("{}%", escape_like(value)))
    };

    let mut clause = WhereClause::default();
    clause.push_text("name = ?", filter.name.as_deref());
    clause.push_text(
        "name LIKE ? ESCAPE '\\'",
        contains(&filter.name_icontains).as_deref(),
    );
    clause.push_text(
        "name LIKE ? ESCAPE '\\'",
        starts_with(&filter.name_istartswith).as_deref(),
    );
    clause.push_text("notes = ?", filter.notes.as_deref());
    clause.push_text(
        "notes LIKE ? ESCAPE '\\'",
        contains(&filter.notes_icontains).as_deref(),
    );
    clause.push_id("category_id = ?", filter.category_id);
    clause.push_text(
        "category_id IN (SELECT c.id FROM categories c WHERE c.name = ?)",
        filter.category_name.as_deref(),
    );
    clause
}

fn parse_ingredient_row(row: &Row<'_>) -> rusqlite::Result<Ingredient> {
    Ok(Ingredient {
        id: row.get("id")?,
        name: row.get("name")?,
        notes: row.get("notes")?,
        category_id: row.get("category_id")?,
    })
}
