/// User endpoints
///
/// # Endpoints
///
/// - `POST /user/register` - Register a new user
/// - `POST /user/login` - Check credentials and issue a token
/// - `GET /user/get/:id` - Fetch a user (without password)

use super::{decode_body, parse_id};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::jwt,
    error::RepoError,
    models::user::User,
    repository::RegisterUser,
};
use tracing::error;
use validator::Validate;

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,

    /// The stored user, password removed
    pub user: User,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Not checked for shape; a malformed address is just a failed login
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// The authenticated user, password removed
    pub user: User,

    /// Signed access token
    pub token: String,
}

/// Registers a new user
///
/// # Endpoint
///
/// ```text
/// POST /user/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "a@x.com",
///   "password": "pw1",
///   "role": "manager"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Body does not decode or fails validation
/// - `500 Internal Server Error`: Registration failed, including a taken
///   username or email
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let request = decode_body(payload)?;
    request.validate()?;

    let user = state
        .users
        .register(request)
        .await
        .map_err(|_| ApiError::InternalError("Registration failed".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful".to_string(),
            user: user.without_password(),
        }),
    ))
}

/// Logs a user in
///
/// # Response
///
/// ```json
/// {
///   "user": { "id": 1, "username": "alice", "email": "a@x.com", "role": "user" },
///   "token": "eyJ..."
/// }
/// ```
///
/// The token carries the user's id, email and role and expires after the
/// configured number of hours (24 by default).
///
/// # Errors
///
/// - `400 Bad Request`: Body does not decode or a field is empty
/// - `401 Unauthorized`: Unknown email or wrong password
/// - `500 Internal Server Error`: Token signing or lookup failed
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let request = decode_body(payload)?;
    request.validate()?;

    let user = state
        .users
        .login(&request.email, &request.password)
        .await
        .map_err(|e| match e {
            RepoError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            _ => ApiError::InternalError("Login failed".to_string()),
        })?;

    let claims = jwt::Claims::with_expiration(
        user.id,
        &user.email,
        &user.role,
        Duration::hours(state.config.jwt.expiration_hours),
    );
    let token = jwt::create_token(&claims, state.jwt_secret()).map_err(|e| {
        error!(user_id = user.id, error = %e, "Failed to sign token");
        ApiError::InternalError("Could not generate token".to_string())
    })?;

    Ok(Json(LoginResponse {
        user: user.without_password(),
        token,
    }))
}

/// Fetches a user by ID
///
/// # Errors
///
/// - `400 Bad Request`: ID is not an integer
/// - `404 Not Found`: No such user
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<User>> {
    let id = parse_id(id, "Invalid user ID")?;

    let user = state.users.get_user(id).await.map_err(|e| {
        if e.is_not_found() {
            ApiError::NotFound("User not found".to_string())
        } else {
            ApiError::InternalError("Failed to fetch user".to_string())
        }
    })?;

    Ok(Json(user.without_password()))
}
