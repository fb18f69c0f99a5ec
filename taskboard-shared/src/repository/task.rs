/// Task repository
///
/// Forwards every operation to the task queries in `models::task`, adding
/// only debug logging. Errors pass through unchanged.

use crate::error::RepoResult;
use crate::models::task::{Dashboard, NewTask, Task, TaskFilter, UpdateTask};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

/// Everything the HTTP layer can do with tasks
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Creates a task; fails with `InvalidReference` for an unknown creator
    async fn create_task(&self, task: NewTask) -> RepoResult<Task>;

    /// Fetches one task; fails with `NotFound`
    async fn get_task(&self, id: i32) -> RepoResult<Task>;

    /// Overwrites a task; fails with `NotFound` for an unknown ID
    async fn update_task(&self, task: UpdateTask) -> RepoResult<Task>;

    /// Deletes a task; fails with `NotFound` for an unknown ID
    async fn delete_task(&self, id: i32) -> RepoResult<()>;

    /// All tasks
    async fn list_tasks(&self) -> RepoResult<Vec<Task>>;

    /// Tasks matching every set field of the filter
    async fn search_tasks(&self, filter: &TaskFilter) -> RepoResult<Vec<Task>>;

    /// Tasks created by or assigned to `user_id`, grouped by status
    async fn dashboard(&self, user_id: i32) -> RepoResult<Dashboard>;
}

/// PostgreSQL-backed [`TaskStore`]
#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for TaskRepository {
    async fn create_task(&self, task: NewTask) -> RepoResult<Task> {
        Task::insert(&self.pool, task).await
    }

    async fn get_task(&self, id: i32) -> RepoResult<Task> {
        debug!(task_id = id, "Fetching task");
        Task::find_by_id(&self.pool, id).await
    }

    async fn update_task(&self, task: UpdateTask) -> RepoResult<Task> {
        Task::update(&self.pool, task).await
    }

    async fn delete_task(&self, id: i32) -> RepoResult<()> {
        Task::delete(&self.pool, id).await
    }

    async fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let tasks = Task::list(&self.pool).await?;
        debug!(count = tasks.len(), "Listed tasks");
        Ok(tasks)
    }

    async fn search_tasks(&self, filter: &TaskFilter) -> RepoResult<Vec<Task>> {
        let tasks = Task::search(&self.pool, filter).await?;
        debug!(count = tasks.len(), ?filter, "Searched tasks");
        Ok(tasks)
    }

    async fn dashboard(&self, user_id: i32) -> RepoResult<Dashboard> {
        Task::dashboard_for_user(&self.pool, user_id).await
    }
}
