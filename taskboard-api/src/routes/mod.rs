/// API route handlers
///
/// - `health`: Health check endpoint
/// - `tasks`: task CRUD, search and dashboard
/// - `users`: registration, login, user lookup

pub mod health;
pub mod tasks;
pub mod users;

use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    Json,
};
use serde::Serialize;
use tracing::warn;

/// Plain acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Unwraps a JSON body or turns the rejection into a 400
pub(crate) fn decode_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!(error = %rejection, "Failed to decode request body");
        ApiError::BadRequest("Invalid request body".to_string())
    })
}

/// Unwraps an integer path segment or turns the rejection into a 400
pub(crate) fn parse_id(path: Result<Path<i32>, PathRejection>, message: &str) -> ApiResult<i32> {
    path.map(|Path(id)| id).map_err(|rejection| {
        warn!(error = %rejection, "Invalid ID in path");
        ApiError::BadRequest(message.to_string())
    })
}
