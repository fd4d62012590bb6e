/// Task endpoints
///
/// # Endpoints
///
/// - `POST /api/tasks`
/// - `GET /api/tasks/:id`
/// - `PUT /api/tasks/:id`
/// - `DELETE /api/tasks/:id`
///
/// Tasks are returned bare. A missing `status` becomes "Pending", and a
/// `category_id` of `0` or `null` leaves the task uncategorized.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiPath, ValidatedJson},
    routes::MessageResponse,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use taskdeck_shared::{
    models::task::{normalize_category_id, CreateTask, Task, TaskStatus, UpdateTask},
    repository::TaskRepository,
};
use validator::Validate;

/// Task creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Defaults to now
    pub deadline: Option<DateTime<Utc>>,

    #[serde(default)]
    #[validate(length(max = 50, message = "Priority must be at most 50 characters"))]
    pub priority: String,

    #[validate(length(max = 50, message = "Status must be at most 50 characters"))]
    pub status: Option<String>,

    pub category_id: Option<i64>,

    #[validate(range(min = 1, message = "User ID is required"))]
    pub user_id: i64,
}

/// Task update request
///
/// An absent `deadline` keeps the stored one.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub deadline: Option<DateTime<Utc>>,

    #[serde(default)]
    #[validate(length(max = 50, message = "Priority must be at most 50 characters"))]
    pub priority: String,

    #[validate(length(max = 50, message = "Status must be at most 50 characters"))]
    pub status: Option<String>,

    pub category_id: Option<i64>,
}

fn status_or_default(status: Option<String>) -> String {
    status
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| TaskStatus::Pending.as_str().to_string())
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}

pub async fn create_task(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state
        .store
        .create_task(CreateTask {
            title: req.title,
            description: req.description,
            deadline: req.deadline.unwrap_or_else(Utc::now),
            priority: req.priority,
            status: status_or_default(req.status),
            category_id: normalize_category_id(req.category_id),
            user_id: req.user_id,
        })
        .await?;

    tracing::info!(task_id = task.id, user_id = task.user_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Task>> {
    let task = state.store.find_task(id).await?.ok_or_else(task_not_found)?;
    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = state
        .store
        .update_task(
            id,
            UpdateTask {
                title: req.title,
                description: req.description,
                deadline: req.deadline,
                priority: req.priority,
                status: status_or_default(req.status),
                category_id: normalize_category_id(req.category_id),
            },
        )
        .await?
        .ok_or_else(task_not_found)?;

    Ok(Json(task))
}

/// Deletes a task and its reminders
pub async fn delete_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.store.delete_task(id).await? {
        return Err(task_not_found());
    }

    tracing::info!(task_id = id, "Task deleted");
    Ok(MessageResponse::new("Task deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_to_pending() {
        assert_eq!(status_or_default(None), "Pending");
        assert_eq!(status_or_default(Some(String::new())), "Pending");
        assert_eq!(status_or_default(Some("Completed".to_string())), "Completed");
    }

    #[test]
    fn test_create_request_rejects_missing_owner() {
        let req: CreateTaskRequest =
            serde_json::from_str(r#"{"title":"t","description":"d","user_id":0}"#).unwrap();
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("user_id"));
    }

    #[test]
    fn test_labels_longer_than_columns_are_rejected() {
        let req: UpdateTaskRequest = serde_json::from_value(serde_json::json!({
            "title": "t",
            "description": "d",
            "priority": "p".repeat(51),
            "status": "s".repeat(51),
        }))
        .unwrap();

        let err = req.validate().unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("priority"));
        assert!(fields.contains_key("status"));
    }
}
