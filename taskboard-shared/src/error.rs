/// Domain error taxonomy shared by the query and repository layers
///
/// Query functions produce these errors at the point where a failure is
/// detected; repositories pass them through unchanged, and the API layer
/// is the only place that turns an error kind into an HTTP status.
///
/// # Example
///
/// ```
/// use taskboard_shared::error::RepoError;
///
/// let err = RepoError::not_found("task", 42);
/// assert_eq!(err.to_string(), "task 42 not found");
/// assert!(err.is_not_found());
/// ```

use crate::auth::password::PasswordError;

/// Result alias for query and repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors surfaced by the query and repository layers
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// No row matched the lookup key
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    /// A task referenced a user that does not exist
    #[error("user with ID {0} does not exist")]
    InvalidReference(i32),

    /// Uniqueness or foreign-key constraint rejected the write
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Login failed; deliberately does not say which half was wrong
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Schema initialization failed and was rolled back
    #[error("schema initialization failed: {0}")]
    Schema(#[source] sqlx::Error),

    /// Password hashing or verification failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Any other store or connectivity failure
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl RepoError {
    /// Builds a `NotFound` error for `entity` keyed by `key`
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        RepoError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// True for `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound { .. })
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
                let constraint = db_err
                    .constraint()
                    .map(str::to_string)
                    .unwrap_or_else(|| db_err.message().to_string());
                return RepoError::ConstraintViolation(constraint);
            }
        }

        RepoError::Database(err)
    }
}
