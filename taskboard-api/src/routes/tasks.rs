/// Task endpoints
///
/// # Endpoints
///
/// - `POST /task/create` - Create a task
/// - `GET /task/get/:id` - Fetch one task
/// - `POST /task/update` - Overwrite a task
/// - `POST /task/delete/:id` - Delete a task
/// - `GET /task/list` - All tasks
/// - `GET /task/search` - Tasks matching query-string filters
/// - `GET /task/dashboard/:user_id` - A user's tasks grouped by status

use super::{decode_body, parse_id, MessageResponse};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use taskboard_shared::{
    error::RepoError,
    models::task::{Dashboard, NewTask, Task, TaskFilter, UpdateTask},
};
use tracing::warn;
use validator::Validate;

/// Create/update response
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub message: String,
    pub task: Task,
}

fn not_found_or(err: RepoError, internal: &str) -> ApiError {
    if err.is_not_found() {
        ApiError::NotFound("Task not found".to_string())
    } else {
        ApiError::InternalError(internal.to_string())
    }
}

/// Creates a task
///
/// # Endpoint
///
/// ```text
/// POST /task/create
/// Content-Type: application/json
///
/// {
///   "title": "Write report",
///   "description": "Q3 numbers",
///   "due_date": "2025-03-14",
///   "priority": "high",
///   "status": "todo",
///   "created_by": 1,
///   "assigned_to": 2
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Body does not decode or fails validation
/// - `500 Internal Server Error`: Creation failed, including an unknown
///   `created_by`
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let new_task = decode_body(payload)?;
    new_task.validate()?;

    let task = state
        .tasks
        .create_task(new_task)
        .await
        .map_err(|_| ApiError::InternalError("Failed to create task".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            message: "Task created successfully".to_string(),
            task,
        }),
    ))
}

/// Fetches one task
///
/// # Errors
///
/// - `400 Bad Request`: ID is not an integer
/// - `404 Not Found`: No such task
pub async fn get_task(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let id = parse_id(id, "Invalid task ID")?;

    let task = state
        .tasks
        .get_task(id)
        .await
        .map_err(|e| not_found_or(e, "Failed to fetch task"))?;

    Ok(Json(task))
}

/// Overwrites a task's mutable fields
///
/// The body is the full task including `id`; omitted optional fields are
/// cleared.
///
/// # Errors
///
/// - `400 Bad Request`: Body does not decode or fails validation
/// - `404 Not Found`: No task with this ID
/// - `500 Internal Server Error`: Update failed
pub async fn update_task(
    State(state): State<AppState>,
    payload: Result<Json<UpdateTask>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let update = decode_body(payload)?;
    update.validate()?;

    let task = state
        .tasks
        .update_task(update)
        .await
        .map_err(|e| not_found_or(e, "Failed to update task"))?;

    Ok(Json(TaskResponse {
        message: "Task updated successfully".to_string(),
        task,
    }))
}

/// Deletes a task
///
/// # Errors
///
/// - `400 Bad Request`: ID is not an integer
/// - `404 Not Found`: No task with this ID
/// - `500 Internal Server Error`: Delete failed
pub async fn delete_task(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(id, "Invalid task ID")?;

    state
        .tasks
        .delete_task(id)
        .await
        .map_err(|e| not_found_or(e, "Failed to delete task"))?;

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

/// Lists every task
///
/// # Errors
///
/// - `404 Not Found`: There are no tasks
/// - `500 Internal Server Error`: Listing failed
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state
        .tasks
        .list_tasks()
        .await
        .map_err(|_| ApiError::InternalError("Failed to list tasks".to_string()))?;

    if tasks.is_empty() {
        return Err(ApiError::NotFound("No tasks found".to_string()));
    }

    Ok(Json(tasks))
}

/// Searches tasks
///
/// # Endpoint
///
/// ```text
/// GET /task/search?status=done&priority=high&assigned_to=2
/// GET /task/search?title=report&due_after=2025-01-01&due_before=2025-02-01&created_by=1
/// ```
///
/// Every supplied parameter narrows the result; none returns all tasks.
/// An empty result is `200` with `[]`.
///
/// # Errors
///
/// - `400 Bad Request`: A parameter does not parse
/// - `500 Internal Server Error`: Search failed
pub async fn search_tasks(
    State(state): State<AppState>,
    query: Result<Query<TaskFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Query(filter) = query.map_err(|rejection| {
        warn!(error = %rejection, "Invalid search parameters");
        ApiError::BadRequest("Invalid search parameters".to_string())
    })?;

    let tasks = state
        .tasks
        .search_tasks(&filter)
        .await
        .map_err(|_| ApiError::InternalError("Failed to search tasks".to_string()))?;

    Ok(Json(tasks))
}

/// Tasks created by or assigned to a user, grouped by status
///
/// # Response
///
/// ```json
/// {
///   "done": [{ "id": 3, "title": "...", "status": "done", ... }],
///   "todo": [{ "id": 1, "title": "...", "status": "todo", ... }]
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: User ID is not an integer
/// - `500 Internal Server Error`: Query failed
pub async fn get_dashboard(
    State(state): State<AppState>,
    user_id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<Dashboard>> {
    let user_id = parse_id(user_id, "Invalid userID")?;

    let dashboard = state
        .tasks
        .dashboard(user_id)
        .await
        .map_err(|_| ApiError::InternalError("Failed to get dashboard data".to_string()))?;

    Ok(Json(dashboard))
}
