//! Error types for jobly

use std::fmt;
use thiserror::Error;

/// Result type alias for jobly operations
pub type JoblyResult<T> = Result<T, JoblyError>;

/// Which store constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Check,
    NotNull,
}

impl ConstraintKind {
    /// Classify a SQLSTATE code from the integrity-constraint class (`23xxx`).
    pub fn from_sqlstate(code: &str) -> Option<Self> {
        match code {
            "23505" => Some(Self::Unique),
            "23503" => Some(Self::ForeignKey),
            "23514" => Some(Self::Check),
            "23502" => Some(Self::NotNull),
            _ => None,
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unique => "unique",
            Self::ForeignKey => "foreign key",
            Self::Check => "check",
            Self::NotNull => "not null",
        };
        f.write_str(s)
    }
}

/// Error types for data-access operations
#[derive(Debug, Error)]
pub enum JoblyError {
    /// Caller supplied structurally invalid input (e.g. an empty partial update)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate or otherwise constraint-violating write
    #[error("{kind} constraint violation: {message}")]
    ConstraintViolation {
        kind: ConstraintKind,
        message: String,
    },

    /// Caller is not allowed to perform the operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Token signing error
    #[error("Token error: {0}")]
    Token(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Migration error
    #[cfg(feature = "migrate")]
    #[error("Migration error: {0}")]
    Migration(String),
}

impl JoblyError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is any constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::ConstraintViolation {
                kind: ConstraintKind::Unique,
                ..
            }
        )
    }

    /// Check if this is an unauthorized error
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// HTTP status a route layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidArgument(_) | Self::ConstraintViolation { .. } => 400,
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// Parse a tokio_postgres error into a more specific JoblyError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            if let Some(kind) = ConstraintKind::from_sqlstate(db_err.code().code()) {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return Self::ConstraintViolation {
                    kind,
                    message: format!("{}: {}", constraint, db_err.message()),
                };
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for JoblyError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for JoblyError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Token(err.to_string())
    }
}

#[cfg(feature = "migrate")]
impl From<refinery::Error> for JoblyError {
    fn from(err: refinery::Error) -> Self {
        Self::Migration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlstate_classification() {
        assert_eq!(ConstraintKind::from_sqlstate("23505"), Some(ConstraintKind::Unique));
        assert_eq!(
            ConstraintKind::from_sqlstate("23503"),
            Some(ConstraintKind::ForeignKey)
        );
        assert_eq!(ConstraintKind::from_sqlstate("23514"), Some(ConstraintKind::Check));
        assert_eq!(ConstraintKind::from_sqlstate("23502"), Some(ConstraintKind::NotNull));
        assert_eq!(ConstraintKind::from_sqlstate("42P01"), None);
    }

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(JoblyError::invalid_argument("no data").status_code(), 400);
        assert_eq!(JoblyError::not_found("No job: 1").status_code(), 404);
        assert_eq!(JoblyError::unauthorized("nope").status_code(), 401);
        let dup = JoblyError::ConstraintViolation {
            kind: ConstraintKind::Unique,
            message: "jobs_title_key: duplicate".into(),
        };
        assert_eq!(dup.status_code(), 400);
        assert!(dup.is_unique_violation());
        assert!(dup.is_constraint_violation());
        assert_eq!(JoblyError::Config("bad".into()).status_code(), 500);
    }

    #[test]
    fn display_names_the_constraint_kind() {
        let err = JoblyError::ConstraintViolation {
            kind: ConstraintKind::ForeignKey,
            message: "jobs_company_handle_fkey: missing company".into(),
        };
        assert_eq!(
            err.to_string(),
            "foreign key constraint violation: jobs_company_handle_fkey: missing company"
        );
    }
}
