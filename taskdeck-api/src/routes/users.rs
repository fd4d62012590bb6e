/// User endpoints
///
/// # Endpoints
///
/// - `POST /api/users`: register
/// - `GET /api/users/:id`
/// - `PUT /api/users/:id`
/// - `DELETE /api/users/:id`
/// - `POST /api/users/login`
/// - `GET /api/users/:id/tasks`
/// - `GET /api/users/:id/categories`
/// - `GET /api/users/:id/tasks-with-reminders`
///
/// Single-user responses wrap the record as `{"user": ...}`, with a
/// `message` alongside on everything but registration. The password hash
/// never leaves the server.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiPath, ValidatedJson},
    routes::MessageResponse,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::password,
    models::{
        category::Category,
        task::Task,
        user::{CreateUser, UpdateUser, User},
    },
    repository::{CategoryRepository, TaskRepository, UserRepository},
};
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Username is required"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: String,
}

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Username is required"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// `{"user": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}

/// `{"message": ..., "user": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct UserMessage {
    pub message: String,
    pub user: User,
}

const INVALID_CREDENTIALS: &str = "Invalid username or password";

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

/// Registers a user
///
/// Duplicate username or email is a 409.
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserEnvelope>)> {
    tracing::info!(username = %req.username, "Registering user");

    let password_hash = password::hash_password(&req.password)?;

    let user = state
        .store
        .create_user(CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            full_name: req.full_name,
        })
        .await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((StatusCode::CREATED, Json(UserEnvelope { user })))
}

pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<UserMessage>> {
    let user = state.store.find_user(id).await?.ok_or_else(user_not_found)?;

    Ok(Json(UserMessage {
        message: "User retrieved successfully".to_string(),
        user,
    }))
}

pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<UserMessage>> {
    let user = state
        .store
        .update_user(
            id,
            UpdateUser {
                username: req.username,
                email: req.email,
                full_name: req.full_name,
            },
        )
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(UserMessage {
        message: "User updated successfully".to_string(),
        user,
    }))
}

/// Deletes a user along with their tasks, categories, and reminders
pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.store.delete_user(id).await? {
        return Err(user_not_found());
    }

    tracing::info!(user_id = id, "User deleted");
    Ok(MessageResponse::new("User deleted successfully"))
}

/// Logs a user in
///
/// Unknown usernames and wrong passwords get the same 401 after the same
/// amount of hashing work. The `last_login` stamp is best-effort: a failure is logged, not returned.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<UserMessage>> {
    let Some(mut user) = state.store.find_user_by_username(&req.username).await? else {
        password::verify_absent_user(&req.password);
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = user.id, "Password mismatch");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    match state.store.touch_last_login(user.id).await {
        Ok(true) => user.last_login = Some(Utc::now()),
        Ok(false) => tracing::warn!(user_id = user.id, "User vanished before last_login update"),
        Err(e) => tracing::warn!(user_id = user.id, error = %e, "Failed to update last_login"),
    }

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(UserMessage {
        message: "Login successful".to_string(),
        user,
    }))
}

pub async fn list_user_tasks(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.store.list_tasks_by_user(user_id).await?))
}

pub async fn list_user_categories(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.store.list_categories_by_user(user_id).await?))
}

/// Tasks with at least one reminder, each listed once
pub async fn list_tasks_with_reminders(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.store.list_tasks_with_reminders(user_id).await?))
}
