//! Category repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Write paths call `Category::validate()` before SQL mutations.
//! - Listing order is deterministic: `id ASC`.

use crate::model::category::{Category, CategoryId};
use crate::model::ingredient::IngredientId;
use crate::model::validate_name;
use crate::repo::{
    count_to_u64, ensure_connection_ready, push_page, RepoError, RepoResult, WhereClause,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT id, name FROM categories";

/// Field filters for category listing. Unset fields add no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    /// Exact, case-sensitive name match.
    pub name: Option<String>,
    /// Keep categories owning any of these ingredients; empty adds no constraint.
    pub ingredient_ids: Vec<IngredientId>,
}

/// Query options for listing categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryListQuery {
    pub filter: CategoryFilter,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for category CRUD operations.
pub trait CategoryRepository {
    fn create_category(&self, name: &str) -> RepoResult<Category>;
    fn update_category(&self, category: &Category) -> RepoResult<()>;
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    /// Exact name lookup; several matches is an error, not a pick.
    fn find_category_by_name(&self, name: &str) -> RepoResult<Option<Category>>;
    fn list_categories(&self, query: &CategoryListQuery) -> RepoResult<Vec<Category>>;
    fn count_categories(&self, filter: &CategoryFilter) -> RepoResult<u64>;
    fn delete_category(&self, id: CategoryId) -> RepoResult<()>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "categories", &["id", "name"])?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create_category(&self, name: &str) -> RepoResult<Category> {
        validate_name("name", name)?;

        self.conn
            .execute("INSERT INTO categories (name) VALUES (?1);", [name])?;

        Ok(Category::new(self.conn.last_insert_rowid(), name))
    }

    fn update_category(&self, category: &Category) -> RepoResult<()> {
        category.validate()?;

        let changed = self.conn.execute(
            "UPDATE categories SET name = ?1 WHERE id = ?2;",
            params![category.name.as_str(), category.id],
        )?;

        if changed == 0 {
            return Err(RepoError::CategoryNotFound(category.id));
        }

        Ok(())
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let category = self
            .conn
            .query_row(
                &format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_category_row,
            )
            .optional()?;
        Ok(category)
    }

    fn find_category_by_name(&self, name: &str) -> RepoResult<Option<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL} WHERE name = ?1 ORDER BY id ASC LIMIT 2;"
        ))?;
        let mut matches = stmt
            .query_map([name], parse_category_row)?
            .collect::<Result<Vec<_>, _>>()?;

        if matches.len() > 1 {
            return Err(RepoError::MultipleResults {
                entity: "category",
                key: name.to_string(),
            });
        }

        Ok(matches.pop())
    }

    fn list_categories(&self, query: &CategoryListQuery) -> RepoResult<Vec<Category>> {
        let (where_sql, mut binds) = category_where(&query.filter).render();
        let mut sql = format!("{CATEGORY_SELECT_SQL}{where_sql} ORDER BY id ASC");
        push_page(&mut sql, &mut binds, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let categories = stmt
            .query_map(params_from_iter(binds), parse_category_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn count_categories(&self, filter: &CategoryFilter) -> RepoResult<u64> {
        let (where_sql, binds) = category_where(filter).render();
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM categories{where_sql};"),
            params_from_iter(binds),
            |row| row.get(0),
        )?;
        count_to_u64(count)
    }

    fn delete_category(&self, id: CategoryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::CategoryNotFound(id));
        }

        Ok(())
    }
}

fn category_where(filter: &CategoryFilter) -> WhereClause {
    let mut clause = WhereClause::default();
    clause.push_text("name = ?", filter.name.as_deref());
    clause.push_any_id(
        |slots| {
            format!(
                "EXISTS (
            SELECT 1 FROM ingredients i
            WHERE i.category_id = categories.id AND i.id IN ({slots})
        )"
            )
        },
        &filter.ingredient_ids,
    );
    clause
}

fn parse_category_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}
