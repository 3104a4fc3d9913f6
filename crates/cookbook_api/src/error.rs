//! API-layer errors and their GraphQL rendering.
//!
//! Every error surfaces as an entry in the response `errors` list with a
//! stable `extensions.code`; the failing field resolves to `null`.

use async_graphql::ErrorExtensions;
use cookbook_core::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    Repo(RepoError),
    /// Identifier argument cannot be decoded or names the wrong type.
    InvalidId(String),
    /// Required input field absent or malformed.
    Validation(String),
    InvalidPagination(String),
    /// Store lock was poisoned by a panicking request.
    StoreUnavailable,
}

impl ApiError {
    /// Machine-readable code exposed as `extensions.code`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Repo(err) if err.is_not_found() => "NOT_FOUND",
            Self::Repo(RepoError::MultipleResults { .. }) => "MULTIPLE_RESULTS",
            Self::Repo(RepoError::Validation(_)) => "VALIDATION",
            Self::Repo(_) | Self::StoreUnavailable => "INTERNAL",
            Self::InvalidId(_) => "INVALID_ID",
            Self::Validation(_) => "VALIDATION",
            Self::InvalidPagination(_) => "INVALID_PAGINATION",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::InvalidId(message) => write!(f, "{message}"),
            Self::Validation(message) => write!(f, "{message}"),
            Self::InvalidPagination(message) => write!(f, "{message}"),
            Self::StoreUnavailable => write!(f, "store is unavailable"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, extensions| {
            extensions.set("code", self.code().to_string());
        })
    }
}
