//! Shared store handle injected into the schema as context data.
//!
//! # Invariants
//! - One SQLite connection serves all requests; each store call holds the
//!   lock for its synchronous duration only.
//! - Every call goes through `SqliteCookbookService`, so repository
//!   readiness checks and validation always apply.

use crate::error::{ApiError, ApiResult};
use async_graphql::dynamic::ResolverContext;
use cookbook_core::db::{open_db, open_db_in_memory, DbError};
use cookbook_core::{RepoResult, SqliteCookbookService};
use log::warn;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Wraps a connection that already has migrations applied.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Store handle registered as schema data.
    pub fn from_context<'c>(ctx: &'c ResolverContext<'_>) -> async_graphql::Result<&'c Self> {
        ctx.data::<Self>()
    }

    /// Runs one use-case call against the store.
    pub fn run<T>(
        &self,
        call: impl FnOnce(&SqliteCookbookService<'_>) -> RepoResult<T>,
    ) -> ApiResult<T> {
        let conn = self.conn.lock().map_err(|_| {
            warn!("event=store_call module=api status=error error_code=lock_poisoned");
            ApiError::StoreUnavailable
        })?;
        let service = SqliteCookbookService::try_from_connection(&conn)?;
        call(&service).map_err(|err| {
            if !err.is_not_found() {
                warn!("event=store_call module=api status=error error={err}");
            }
            ApiError::from(err)
        })
    }
}
