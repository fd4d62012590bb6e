/// Statistics endpoint
///
/// ```text
/// GET /api/users/:id/statistics
/// ```
///
/// ```json
/// {
///   "user_id": 1,
///   "total_tasks": 3,
///   "completed_tasks": 1,
///   "in_progress_tasks": 1,
///   "pending_tasks": 1,
///   "overdue_tasks": 0,
///   "tasks_by_month": { "Jan": 2, "Feb": 1 },
///   "completed_by_month": { "Jan": 1, "Feb": 0 }
/// }
/// ```

use crate::{app::AppState, error::ApiResult, extract::ApiPath};
use axum::{extract::State, Json};
use taskdeck_shared::{models::statistics::UserTaskStatistics, statistics};

pub async fn get_user_statistics(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<UserTaskStatistics>> {
    let stats = statistics::user_task_statistics(state.store.as_ref(), user_id).await?;

    tracing::debug!(user_id, total_tasks = stats.total_tasks, "Computed statistics");

    Ok(Json(stats))
}
