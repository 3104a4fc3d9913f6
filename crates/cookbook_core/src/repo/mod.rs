//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes validate records before persistence.
//! - Repository APIs return semantic errors (`*NotFound`) in addition to DB
//!   transport errors.
//! - Repositories refuse connections whose schema is not fully migrated.

pub mod category_repo;
pub mod ingredient_repo;

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::category::CategoryId;
use crate::model::ingredient::IngredientId;
use crate::model::ModelValidationError;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for cookbook persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    CategoryNotFound(CategoryId),
    IngredientNotFound(IngredientId),
    /// A lookup expected to match one row matched several.
    MultipleResults {
        entity: &'static str,
        key: String,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl RepoError {
    /// Whether this error means the addressed record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CategoryNotFound(_) | Self::IngredientNotFound(_)
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::IngredientNotFound(id) => write!(f, "ingredient not found: {id}"),
            Self::MultipleResults { entity, key } => {
                write!(f, "more than one {entity} matches `{key}`")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Conjunctive `WHERE` clause builder with positional binds.
#[derive(Debug, Default)]
pub(crate) struct WhereClause {
    predicates: Vec<String>,
    binds: Vec<Value>,
}

impl WhereClause {
    pub(crate) fn push(&mut self, predicate: &'static str, bind: Value) {
        self.predicates.push(predicate.to_string());
        self.binds.push(bind);
    }

    /// Adds a predicate matching any of `ids`; an empty list adds nothing.
    ///
    /// `predicate` receives the bind slots, e.g. `?, ?, ?`, for an `IN (..)` list.
    pub(crate) fn push_any_id(&mut self, predicate: impl FnOnce(&str) -> String, ids: &[i64]) {
        if ids.is_empty() {
            return;
        }
        let slots = vec!["?"; ids.len()].join(", ");
        self.predicates.push(predicate(&slots));
        self.binds.extend(ids.iter().map(|id| Value::Integer(*id)));
    }

    pub(crate) fn push_text(&mut self, predicate: &'static str, value: Option<&str>) {
        if let Some(value) = value {
            self.push(predicate, Value::Text(value.to_string()));
        }
    }

    pub(crate) fn push_id(&mut self, predicate: &'static str, value: Option<i64>) {
        if let Some(value) = value {
            self.push(predicate, Value::Integer(value));
        }
    }

    /// Renders ` WHERE a AND b` (or nothing) and hands back the binds.
    pub(crate) fn render(self) -> (String, Vec<Value>) {
        if self.predicates.is_empty() {
            return (String::new(), self.binds);
        }
        (
            format!(" WHERE {}", self.predicates.join(" AND ")),
            self.binds,
        )
    }
}

/// Escapes `LIKE` wildcards so user text matches literally.
pub(crate) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Appends `LIMIT`/`OFFSET` to `sql` in a form SQLite accepts.
pub(crate) fn push_page(sql: &mut String, binds: &mut Vec<Value>, limit: Option<u32>, offset: u32) {
    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        binds.push(Value::Integer(i64::from(limit)));
        if offset > 0 {
            sql.push_str(" OFFSET ?");
            binds.push(Value::Integer(i64::from(offset)));
        }
    } else if offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        binds.push(Value::Integer(i64::from(offset)));
    }
}

pub(crate) fn count_to_u64(count: i64) -> RepoResult<u64> {
    u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
}

/// Verifies the connection is migrated and carries the given table shape.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{escape_like, WhereClause};
    use rusqlite::types::Value;

    #[test]
    fn escape_like_escapes_wildcards_and_backslash() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn empty_where_clause_renders_nothing() {
        let (sql, binds) = WhereClause::default().render();
        assert!(sql.is_empty());
        assert!(binds.is_empty());
    }

    #[test]
    fn where_clause_joins_predicates_with_and() {
        let mut clause = WhereClause::default();
        clause.push_text("name = ?", Some("Dairy"));
        clause.push_text("notes = ?", None);
        clause.push_id("id = ?", Some(3));

        let (sql, binds) = clause.render();
        assert_eq!(sql, " WHERE name = ? AND id = ?");
        assert_eq!(
            binds,
            vec![Value::Text("Dairy".to_string()), Value::Integer(3)]
        );
    }

    #[test]
    fn any_id_predicate_gets_one_slot_per_id() {
        let mut clause = WhereClause::default();
        clause.push_any_id(|slots| format!("id IN ({slots})"), &[4, 9]);
        clause.push_any_id(|slots| format!("category_id IN ({slots})"), &[]);

        let (sql, binds) = clause.render();
        assert_eq!(sql, " WHERE id IN (?, ?)");
        assert_eq!(binds, vec![Value::Integer(4), Value::Integer(9)]);
    }
}
