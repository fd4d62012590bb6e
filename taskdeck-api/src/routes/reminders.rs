/// Reminder endpoints
///
/// # Endpoints
///
/// - `POST /api/reminders`
/// - `GET /api/reminders/:id`
/// - `PUT /api/reminders/:id`
/// - `DELETE /api/reminders/:id`
/// - `GET /api/tasks/:id/reminders`
///
/// A new reminder within a minute of an existing one for the same task and
/// user is a 409. Updates move a reminder without that check.

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
    models::reminder::{CreateReminder, Reminder, UpdateReminder},
    policy,
    repository::ReminderRepository,
};
use validator::Validate;

/// Reminder creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReminderRequest {
    #[validate(range(min = 1, message = "Task ID is required"))]
    pub task_id: i64,

    #[validate(range(min = 1, message = "User ID is required"))]
    pub user_id: i64,

    pub reminder_time: DateTime<Utc>,

    #[serde(default)]
    pub is_sent: bool,
}

/// Reminder update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReminderRequest {
    pub reminder_time: DateTime<Utc>,

    #[serde(default)]
    pub is_sent: bool,

    #[validate(range(min = 1, message = "User ID is required"))]
    pub user_id: i64,
}

fn reminder_not_found() -> ApiError {
    ApiError::NotFound("Reminder not found".to_string())
}

pub async fn create_reminder(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateReminderRequest>,
) -> ApiResult<(StatusCode, Json<Reminder>)> {
    let reminder = policy::create_reminder(
        state.store.as_ref(),
        CreateReminder {
            task_id: req.task_id,
            user_id: req.user_id,
            reminder_time: req.reminder_time,
            is_sent: req.is_sent,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(reminder)))
}

pub async fn get_reminder(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Reminder>> {
    let reminder = state
        .store
        .find_reminder(id)
        .await?
        .ok_or_else(reminder_not_found)?;
    Ok(Json(reminder))
}

pub async fn update_reminder(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(req): ValidatedJson<UpdateReminderRequest>,
) -> ApiResult<Json<Reminder>> {
    let reminder = state
        .store
        .update_reminder(
            id,
            UpdateReminder {
                reminder_time: req.reminder_time,
                is_sent: req.is_sent,
                user_id: req.user_id,
            },
        )
        .await?
        .ok_or_else(reminder_not_found)?;

    Ok(Json(reminder))
}

pub async fn delete_reminder(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.store.delete_reminder(id).await? {
        return Err(reminder_not_found());
    }

    Ok(MessageResponse::new("Reminder deleted successfully"))
}

pub async fn list_task_reminders(
    State(state): State<AppState>,
    ApiPath(task_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Reminder>>> {
    Ok(Json(state.store.list_reminders_by_task(task_id).await?))
}
