/// User repository
///
/// Adds password handling on top of the user queries: registration hashes
/// the plaintext before it reaches the store, login verifies against the
/// stored hash. Argon2 is CPU-bound, so both run on the blocking pool.

use crate::auth::password::{self, PasswordError};
use crate::error::{RepoError, RepoResult};
use crate::models::user::{NewUser, User};
use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, warn};
use validator::Validate;

/// Registration input carrying the plaintext password
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Defaults to "user"
    #[validate(length(max = 50, message = "Role must be at most 50 characters"))]
    pub role: Option<String>,
}

/// Everything the HTTP layer can do with users
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Hashes the password and stores the user
    ///
    /// Fails with `ConstraintViolation` when the username or email is taken.
    async fn register(&self, user: RegisterUser) -> RepoResult<User>;

    /// Checks credentials and returns the full user, hash included
    ///
    /// Fails with `InvalidCredentials` both for an unknown email and for a
    /// wrong password.
    async fn login(&self, email: &str, password: &str) -> RepoResult<User>;

    /// Fetches one user; fails with `NotFound`
    async fn get_user(&self, id: i32) -> RepoResult<User>;
}

/// Hashes `plaintext` on the blocking pool
pub async fn hash_in_background(plaintext: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || password::hash_password(&plaintext))
        .await
        .map_err(|e| PasswordError::HashError(format!("Hashing task failed: {}", e)))?
}

/// Verifies `plaintext` against `hash` on the blocking pool
pub async fn verify_in_background(plaintext: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || password::verify_password(&plaintext, &hash))
        .await
        .map_err(|e| PasswordError::VerifyError(format!("Verification task failed: {}", e)))?
}

/// PostgreSQL-backed [`UserStore`]
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn register(&self, user: RegisterUser) -> RepoResult<User> {
        let password_hash = hash_in_background(user.password).await.map_err(|e| {
            warn!(error = %e, "Failed to hash password");
            RepoError::from(e)
        })?;

        User::insert(
            &self.pool,
            NewUser {
                username: user.username,
                email: user.email,
                password_hash,
                role: user
                    .role
                    .filter(|role| !role.is_empty())
                    .unwrap_or_else(|| crate::models::user::DEFAULT_ROLE.to_string()),
            },
        )
        .await
    }

    async fn login(&self, email: &str, password: &str) -> RepoResult<User> {
        let user = match User::find_by_email(&self.pool, email).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                debug!(email, "Login for unknown email");
                return Err(RepoError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let valid = verify_in_background(password.to_string(), user.password.clone())
            .await
            .map_err(|e| {
                warn!(user_id = user.id, error = %e, "Failed to verify password");
                RepoError::from(e)
            })?;

        if !valid {
            debug!(user_id = user.id, "Login with wrong password");
            return Err(RepoError::InvalidCredentials);
        }

        Ok(user)
    }

    async fn get_user(&self, id: i32) -> RepoResult<User> {
        User::find_by_id(&self.pool, id).await
    }
}
