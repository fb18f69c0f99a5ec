/// User model and user queries
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id SERIAL PRIMARY KEY,
///     username VARCHAR(100) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password TEXT NOT NULL,
///     role VARCHAR(50) NOT NULL DEFAULT 'user'
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{NewUser, User};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let user = User::insert(&pool, NewUser {
///     username: "alice".to_string(),
///     email: "a@x.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: "user".to_string(),
/// }).await?;
///
/// let found = User::find_by_email(&pool, "a@x.com").await?;
/// assert_eq!(found.id, user.id);
/// # Ok(())
/// # }
/// ```

use crate::error::{RepoError, RepoResult};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};

/// Role assigned when registration does not specify one
pub const DEFAULT_ROLE: &str = "user";

/// User account
///
/// `password` holds the Argon2 hash. It is skipped during serialization once
/// cleared, so responses built from a cleared user carry no password field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Store-generated ID
    pub id: i32,

    /// Unique display name
    pub username: String,

    /// Unique email address
    pub email: String,

    /// Argon2 hash, never plaintext
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,

    /// Free-form role, e.g. "user", "manager", "admin"
    pub role: String,
}

impl User {
    /// Drops the password hash so the user can be sent to a client
    pub fn without_password(mut self) -> Self {
        self.password.clear();
        self
    }
}

/// Input for inserting a user; the password must already be hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

impl User {
    /// Inserts a new user and returns the stored row
    ///
    /// # Errors
    ///
    /// - `RepoError::ConstraintViolation` if the username or email is taken
    /// - `RepoError::Database` for any other store failure
    pub async fn insert(pool: &PgPool, data: NewUser) -> RepoResult<Self> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password, role
            "#,
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.role)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            warn!(email = %data.email, error = %e, "Failed to insert user");
            RepoError::from(e)
        })?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Finds a user by email address
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if no user has this email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> RepoResult<Self> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, role
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            warn!(email, error = %e, "Failed to fetch user by email");
            RepoError::from(e)
        })?
        .ok_or_else(|| RepoError::not_found("user", email))
    }

    /// Finds a user by ID
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if no user has this ID
    pub async fn find_by_id(pool: &PgPool, id: i32) -> RepoResult<Self> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            warn!(user_id = id, error = %e, "Failed to fetch user by ID");
            RepoError::from(e)
        })?
        .ok_or_else(|| RepoError::not_found("user", id))
    }

    /// Returns true if a user with this ID exists
    pub async fn exists<'e, E>(executor: E, id: i32) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(executor)
            .await?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: "$argon2id$v=19$hash".to_string(),
            role: DEFAULT_ROLE.to_string(),
        }
    }

    #[test]
    fn test_without_password_clears_hash() {
        let user = sample_user().without_password();
        assert!(user.password.is_empty());
        assert_eq!(user.email, "a@x.com");
    }

    #[test]
    fn test_cleared_password_is_not_serialized() {
        let json = serde_json::to_value(sample_user().without_password()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "alice");
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn test_hash_is_serialized_until_cleared() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password").is_some());
    }
}
