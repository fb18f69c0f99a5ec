/// Repositories: the domain operations handlers call
///
/// Each repository is exposed through a narrow capability trait so the HTTP
/// layer can hold an `Arc<dyn TaskStore>` / `Arc<dyn UserStore>` and the
/// concrete PostgreSQL implementation is chosen once at startup.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_shared::repository::{TaskRepository, TaskStore};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let tasks: Arc<dyn TaskStore> = Arc::new(TaskRepository::new(pool));
/// let dashboard = tasks.dashboard(1).await?;
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod user;

pub use task::{TaskRepository, TaskStore};
pub use user::{RegisterUser, UserRepository, UserStore};
