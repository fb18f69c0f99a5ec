/// Task model and task queries
///
/// Tasks are created by a user and optionally assigned to one. Priority and
/// status are free-form strings; the store does not restrict their values.
///
/// # Schema
///
/// ```sql
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
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{NewTask, Task, TaskFilter};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let task = Task::insert(&pool, NewTask {
///     title: "Write report".to_string(),
///     description: None,
///     due_date: None,
///     priority: "high".to_string(),
///     status: "todo".to_string(),
///     created_by: 1,
///     assigned_to: Some(2),
/// }).await?;
///
/// let done = Task::search(&pool, &TaskFilter {
///     status: Some("done".to_string()),
///     ..Default::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

use crate::error::{RepoError, RepoResult};
use crate::models::user::User;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};
use validator::Validate;

/// Tasks grouped by status value, keys in ascending order
pub type Dashboard = BTreeMap<String, Vec<Task>>;

/// A task as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Store-generated ID
    pub id: i32,

    pub title: String,

    pub description: Option<String>,

    /// Calendar date, serialized as `YYYY-MM-DD`
    pub due_date: Option<NaiveDate>,

    /// e.g. "low", "medium", "high"
    pub priority: String,

    /// e.g. "todo", "in-progress", "done"
    pub status: String,

    /// User who created the task; checked to exist at insert time
    pub created_by: i32,

    /// User the task is assigned to
    pub assigned_to: Option<i32>,

    pub created_at: NaiveDateTime,

    /// Refreshed on every update
    pub updated_at: NaiveDateTime,
}

/// Input for creating a task
///
/// Any `id`, `created_at` or `updated_at` in the request body is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTask {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default = "default_priority")]
    #[validate(length(max = 50, message = "Priority must be at most 50 characters"))]
    pub priority: String,

    #[serde(default = "default_status")]
    #[validate(length(max = 50, message = "Status must be at most 50 characters"))]
    pub status: String,

    pub created_by: i32,

    #[serde(default)]
    pub assigned_to: Option<i32>,
}

fn default_priority() -> String {
    "medium".to_string()
}

fn default_status() -> String {
    "todo".to_string()
}

/// Full overwrite of a task's mutable fields
///
/// `created_by` and `created_at` are not mutable; `updated_at` is set by the
/// store.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateTask {
    pub id: i32,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[validate(length(max = 50, message = "Priority must be at most 50 characters"))]
    pub priority: String,

    #[validate(length(max = 50, message = "Status must be at most 50 characters"))]
    pub status: String,

    #[serde(default)]
    pub assigned_to: Option<i32>,
}

/// Search criteria; every set field narrows the result
///
/// Empty strings and zero IDs count as unset, so a query string such as
/// `?status=&assigned_to=0` matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Case-insensitive substring of the title
    pub title: Option<String>,

    pub status: Option<String>,

    pub priority: Option<String>,

    /// Due strictly before this date
    #[serde(default, deserialize_with = "blank_as_none")]
    pub due_before: Option<NaiveDate>,

    /// Due strictly after this date
    #[serde(default, deserialize_with = "blank_as_none")]
    pub due_after: Option<NaiveDate>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub assigned_to: Option<i32>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub created_by: Option<i32>,
}

/// A typed value, or the raw text a query string carries
#[derive(Deserialize)]
#[serde(untagged)]
enum TypedOrText<T> {
    Typed(T),
    Text(String),
}

/// Reads an optional value, treating an empty or blank string as unset
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    match Option::<TypedOrText<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(TypedOrText::Typed(value)) => Ok(Some(value)),
        Some(TypedOrText::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                Ok(None)
            } else {
                text.parse().map(Some).map_err(de::Error::custom)
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn non_zero(value: Option<i32>) -> Option<i32> {
    value.filter(|id| *id != 0)
}

/// Escapes LIKE wildcards so the title filter matches literally
fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl TaskFilter {
    /// True when no field narrows the search
    pub fn is_empty(&self) -> bool {
        non_empty(&self.title).is_none()
            && non_empty(&self.status).is_none()
            && non_empty(&self.priority).is_none()
            && self.due_before.is_none()
            && self.due_after.is_none()
            && non_zero(self.assigned_to).is_none()
            && non_zero(self.created_by).is_none()
    }

    /// Builds the search query, binding every value positionally
    pub fn to_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new(
            "SELECT id, title, description, due_date, priority, status, \
             created_by, assigned_to, created_at, updated_at \
             FROM tasks WHERE 1=1",
        );

        if let Some(status) = non_empty(&self.status) {
            query.push(" AND status = ").push_bind(status.to_string());
        }
        if let Some(priority) = non_empty(&self.priority) {
            query.push(" AND priority = ").push_bind(priority.to_string());
        }
        if let Some(assigned_to) = non_zero(self.assigned_to) {
            query.push(" AND assigned_to = ").push_bind(assigned_to);
        }
        if let Some(title) = non_empty(&self.title) {
            query.push(" AND title ILIKE ").push_bind(like_pattern(title));
        }
        if let Some(due_before) = self.due_before {
            query.push(" AND due_date < ").push_bind(due_before);
        }
        if let Some(due_after) = self.due_after {
            query.push(" AND due_date > ").push_bind(due_after);
        }
        if let Some(created_by) = non_zero(self.created_by) {
            query.push(" AND created_by = ").push_bind(created_by);
        }

        query.push(" ORDER BY id");
        query
    }

    /// Evaluates the filter against a task already in memory
    ///
    /// Agrees with [`TaskFilter::to_query`]: a task without a due date never
    /// satisfies a date bound.
    pub fn matches(&self, task: &Task) -> bool {
        if non_empty(&self.status).is_some_and(|status| task.status != status) {
            return false;
        }
        if non_empty(&self.priority).is_some_and(|priority| task.priority != priority) {
            return false;
        }
        if non_zero(self.assigned_to).is_some_and(|id| task.assigned_to != Some(id)) {
            return false;
        }
        if let Some(title) = non_empty(&self.title) {
            if !task.title.to_lowercase().contains(&title.to_lowercase()) {
                return false;
            }
        }
        if let Some(bound) = self.due_before {
            if !task.due_date.is_some_and(|due| due < bound) {
                return false;
            }
        }
        if let Some(bound) = self.due_after {
            if !task.due_date.is_some_and(|due| due > bound) {
                return false;
            }
        }
        non_zero(self.created_by).map_or(true, |id| task.created_by == id)
    }
}

/// Groups tasks by status, keeping each group's input order
pub fn group_by_status(tasks: Vec<Task>) -> Dashboard {
    let mut dashboard = Dashboard::new();
    for task in tasks {
        dashboard.entry(task.status.clone()).or_default().push(task);
    }
    dashboard
}

fn store_error(operation: &'static str, err: sqlx::Error) -> RepoError {
    warn!(operation, error = %err, "Task query failed");
    RepoError::from(err)
}

impl Task {
    /// Creates a task after checking that its creator exists
    ///
    /// The existence check and the insert share one transaction.
    ///
    /// # Errors
    ///
    /// - `RepoError::InvalidReference` if `created_by` is not a user; nothing
    ///   is inserted
    /// - `RepoError::ConstraintViolation` if `assigned_to` is not a user
    /// - `RepoError::Database` for any other store failure
    pub async fn insert(pool: &PgPool, data: NewTask) -> RepoResult<Self> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| store_error("insert_task", e))?;

        let creator_exists = User::exists(&mut *tx, data.created_by)
            .await
            .map_err(|e| store_error("check_task_creator", e))?;

        if !creator_exists {
            warn!(created_by = data.created_by, "Task creator does not exist");
            return Err(RepoError::InvalidReference(data.created_by));
        }

        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, due_date, priority, status, created_by, assigned_to)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, due_date, priority, status,
                      created_by, assigned_to, created_at, updated_at
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.due_date)
        .bind(&data.priority)
        .bind(&data.status)
        .bind(data.created_by)
        .bind(data.assigned_to)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| store_error("insert_task", e))?;

        tx.commit()
            .await
            .map_err(|e| store_error("insert_task", e))?;

        info!(task_id = task.id, title = %task.title, "Task created");
        Ok(task)
    }

    /// Finds a task by ID
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if no task has this ID
    pub async fn find_by_id(pool: &PgPool, id: i32) -> RepoResult<Self> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, priority, status,
                   created_by, assigned_to, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| store_error("get_task", e))?
        .ok_or_else(|| RepoError::not_found("task", id))
    }

    /// Overwrites a task's mutable fields and refreshes `updated_at`
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if no task has `data.id`
    pub async fn update(pool: &PgPool, data: UpdateTask) -> RepoResult<Self> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks SET
                title = $1, description = $2, due_date = $3, priority = $4, status = $5,
                assigned_to = $6, updated_at = CURRENT_TIMESTAMP
            WHERE id = $7
            RETURNING id, title, description, due_date, priority, status,
                      created_by, assigned_to, created_at, updated_at
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.due_date)
        .bind(&data.priority)
        .bind(&data.status)
        .bind(data.assigned_to)
        .bind(data.id)
        .fetch_optional(pool)
        .await
        .map_err(|e| store_error("update_task", e))?
        .ok_or_else(|| RepoError::not_found("task", data.id))?;

        info!(task_id = task.id, "Task updated");
        Ok(task)
    }

    /// Deletes a task by ID
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if no row was deleted
    pub async fn delete(pool: &PgPool, id: i32) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| store_error("delete_task", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("task", id));
        }

        info!(task_id = id, "Task deleted");
        Ok(())
    }

    /// Lists every task, ordered by ID
    pub async fn list(pool: &PgPool) -> RepoResult<Vec<Self>> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, priority, status,
                   created_by, assigned_to, created_at, updated_at
            FROM tasks
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(|e| store_error("list_tasks", e))
    }

    /// Tasks the user created or is assigned to, grouped by status
    ///
    /// A task that is both created by and assigned to the user appears once.
    /// No matching tasks gives an empty dashboard.
    pub async fn dashboard_for_user(pool: &PgPool, user_id: i32) -> RepoResult<Dashboard> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, priority, status,
                   created_by, assigned_to, created_at, updated_at
            FROM tasks
            WHERE created_by = $1 OR assigned_to = $1
            ORDER BY status, id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| store_error("user_dashboard", e))?;

        debug!(user_id, tasks = tasks.len(), "Dashboard tasks fetched");
        Ok(group_by_status(tasks))
    }

    /// Tasks matching every set field of `filter`
    ///
    /// An empty filter returns the same rows as [`Task::list`].
    pub async fn search(pool: &PgPool, filter: &TaskFilter) -> RepoResult<Vec<Self>> {
        let mut query = filter.to_query();
        query
            .build_query_as::<Task>()
            .fetch_all(pool)
            .await
            .map_err(|e| store_error("search_tasks", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: i32, status: &str) -> Task {
        let now = chrono::Utc::now().naive_utc();
        Task {
            id,
            title: format!("task {}", id),
            description: None,
            due_date: None,
            priority: "medium".to_string(),
            status: status.to_string(),
            created_by: 1,
            assigned_to: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_filter_selects_everything() {
        let filter = TaskFilter::default();
        assert!(filter.is_empty());

        let query = filter.to_query();
        assert!(query.sql().ends_with("FROM tasks WHERE 1=1 ORDER BY id"));
        assert!(!query.sql().contains('$'));
    }

    #[test]
    fn test_blank_and_zero_fields_are_unset() {
        let filter = TaskFilter {
            status: Some(String::new()),
            assigned_to: Some(0),
            created_by: Some(0),
            ..Default::default()
        };

        assert!(filter.is_empty());
        assert!(!filter.to_query().sql().contains("AND"));
    }

    #[test]
    fn test_filter_binds_positionally_in_order() {
        let filter = TaskFilter {
            status: Some("done".to_string()),
            priority: Some("high".to_string()),
            assigned_to: Some(3),
            ..Default::default()
        };

        let query = filter.to_query();
        assert!(query.sql().contains(
            "WHERE 1=1 AND status = $1 AND priority = $2 AND assigned_to = $3 ORDER BY id"
        ));
    }

    #[test]
    fn test_filter_values_never_inlined() {
        let filter = TaskFilter {
            status: Some("done'; DROP TABLE tasks; --".to_string()),
            ..Default::default()
        };

        let query = filter.to_query();
        assert!(!query.sql().contains("DROP TABLE"));
        assert!(query.sql().contains("status = $1"));
    }

    #[test]
    fn test_extended_filter_fields() {
        let filter = TaskFilter {
            title: Some("report".to_string()),
            due_before: NaiveDate::from_ymd_opt(2025, 1, 31),
            due_after: NaiveDate::from_ymd_opt(2025, 1, 1),
            created_by: Some(9),
            ..Default::default()
        };

        let sql = filter.to_query().sql().to_string();
        assert!(sql.contains("title ILIKE $1"));
        assert!(sql.contains("due_date < $2"));
        assert!(sql.contains("due_date > $3"));
        assert!(sql.contains("created_by = $4"));
    }

    #[test]
    fn test_matches_in_memory() {
        let mut t = task(1, "done");
        t.title = "Write Report".to_string();
        t.assigned_to = Some(2);
        t.due_date = NaiveDate::from_ymd_opt(2025, 3, 14);

        assert!(TaskFilter::default().matches(&t));
        assert!(TaskFilter {
            status: Some("done".to_string()),
            title: Some("report".to_string()),
            assigned_to: Some(2),
            due_after: NaiveDate::from_ymd_opt(2025, 3, 1),
            ..Default::default()
        }
        .matches(&t));
        assert!(!TaskFilter {
            status: Some("todo".to_string()),
            ..Default::default()
        }
        .matches(&t));
        assert!(!TaskFilter {
            due_before: NaiveDate::from_ymd_opt(2025, 3, 14),
            ..Default::default()
        }
        .matches(&t));

        t.due_date = None;
        assert!(!TaskFilter {
            due_after: NaiveDate::from_ymd_opt(2000, 1, 1),
            ..Default::default()
        }
        .matches(&t));
    }

    #[test]
    fn test_blank_filter_values_deserialize_as_unset() {
        let filter: TaskFilter = serde_json::from_value(serde_json::json!({
            "status": "",
            "assigned_to": "",
            "created_by": " ",
            "due_before": "",
            "due_after": ""
        }))
        .unwrap();

        assert!(filter.is_empty());
        assert_eq!(filter.assigned_to, None);
        assert_eq!(filter.due_before, None);
    }

    #[test]
    fn test_filter_values_deserialize_from_text_or_typed() {
        let filter: TaskFilter = serde_json::from_value(serde_json::json!({
            "assigned_to": "3",
            "created_by": 4,
            "due_after": "2025-01-01"
        }))
        .unwrap();

        assert_eq!(filter.assigned_to, Some(3));
        assert_eq!(filter.created_by, Some(4));
        assert_eq!(filter.due_after, NaiveDate::from_ymd_opt(2025, 1, 1));

        let bad = serde_json::from_value::<TaskFilter>(serde_json::json!({ "assigned_to": "abc" }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("plain"), "%plain%");
    }

    #[test]
    fn test_group_by_status() {
        let dashboard = group_by_status(vec![
            task(1, "done"),
            task(2, "todo"),
            task(3, "done"),
            task(4, "in-progress"),
        ]);

        assert_eq!(dashboard.len(), 3);
        let done: Vec<i32> = dashboard["done"].iter().map(|t| t.id).collect();
        assert_eq!(done, vec![1, 3]);
        assert_eq!(dashboard["todo"][0].id, 2);
        assert_eq!(dashboard["in-progress"][0].id, 4);

        let total: usize = dashboard.values().map(Vec::len).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_group_by_status_empty() {
        assert!(group_by_status(Vec::new()).is_empty());
    }

    #[test]
    fn test_new_task_defaults_and_ignored_fields() {
        let task: NewTask = serde_json::from_value(serde_json::json!({
            "id": 99,
            "title": "Write report",
            "created_by": 1,
            "created_at": "2020-01-01T00:00:00"
        }))
        .unwrap();

        assert_eq!(task.priority, "medium");
        assert_eq!(task.status, "todo");
        assert_eq!(task.assigned_to, None);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_new_task_rejects_empty_title() {
        let task: NewTask = serde_json::from_value(serde_json::json!({
            "title": "",
            "created_by": 1
        }))
        .unwrap();

        assert!(task.validate().is_err());
    }

    #[test]
    fn test_due_date_format() {
        let task: NewTask = serde_json::from_value(serde_json::json!({
            "title": "t",
            "created_by": 1,
            "due_date": "2025-03-14"
        }))
        .unwrap();

        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 3, 14));
    }
}
