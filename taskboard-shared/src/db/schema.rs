/// Schema initializer
///
/// Creates the `users` and `tasks` tables if they are missing. Runs on every
/// startup; the `IF NOT EXISTS` guards make repeated runs a no-op.
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
///
/// CREATE TABLE tasks (
///     id SERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     due_date DATE,
///     priority VARCHAR(50),
///     status VARCHAR(50),
///     created_by INT REFERENCES users(id),
///     assigned_to INT REFERENCES users(id),
///     created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
///     updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
/// );
/// ```

use crate::error::{RepoError, RepoResult};
use sqlx::PgPool;
use tracing::{error, info};

/// Table definitions, in dependency order
pub const SCHEMA_STATEMENTS: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username VARCHAR(100) NOT NULL UNIQUE,
        email VARCHAR(255) NOT NULL UNIQUE,
        password TEXT NOT NULL,
        role VARCHAR(50) NOT NULL DEFAULT 'user'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id SERIAL PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        description TEXT,
        due_date DATE,
        priority VARCHAR(50),
        status VARCHAR(50),
        created_by INT REFERENCES users(id),
        assigned_to INT REFERENCES users(id),
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
    "#,
];

/// Error for a failed statement; a failed rollback is logged, not returned
fn statement_failure(cause: sqlx::Error, rollback: Result<(), sqlx::Error>) -> RepoError {
    if let Err(e) = rollback {
        error!(error = %e, "Schema rollback failed");
    }
    RepoError::Schema(cause)
}

/// Creates both tables inside a single transaction
///
/// # Errors
///
/// Returns `RepoError::Schema` if the transaction cannot be opened, any
/// statement fails (the transaction is rolled back) or the commit fails.
pub async fn initialize_schema(pool: &PgPool) -> RepoResult<()> {
    let mut tx = pool.begin().await.map_err(RepoError::Schema)?;

    for statement in SCHEMA_STATEMENTS {
        if let Err(e) = sqlx::query(statement).execute(&mut *tx).await {
            error!(error = %e, statement = statement.trim(), "Schema statement failed");
            return Err(statement_failure(e, tx.rollback().await));
        }
    }

    tx.commit().await.map_err(RepoError::Schema)?;

    info!("User and task tables are ready");
    Ok(())
}
