/// Task model
///
/// A task belongs to one user and optionally to one category. Its status is
/// a free-form string that by convention holds one of the [`TaskStatus`]
/// labels; nothing in storage enforces that.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     task_id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     deadline TIMESTAMPTZ NOT NULL,
///     priority VARCHAR(50) NOT NULL DEFAULT '',
///     status VARCHAR(50) NOT NULL DEFAULT 'Pending',
///     category_id BIGINT REFERENCES categories(category_id) ON DELETE SET NULL,
///     user_id BIGINT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conventional task status labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// The label as stored in the `status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Parses a stored label; anything unconventional yields `None`
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Pending" => Some(TaskStatus::Pending),
            "In Progress" => Some(TaskStatus::InProgress),
            "Completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    #[serde(rename = "task_id")]
    #[sqlx(rename = "task_id")]
    pub id: i64,

    pub title: String,

    pub description: String,

    /// Due time; defaults to the creation time when the client sends none
    pub deadline: DateTime<Utc>,

    /// Free-form priority label
    pub priority: String,

    /// Status label, see [`TaskStatus`]
    pub status: String,

    /// Owning category (None when uncategorized)
    pub category_id: Option<i64>,

    /// Owning user
    pub user_id: i64,

    pub created_at: DateTime<Utc>,

    /// Refreshed on every write
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether the task counts as overdue at `now`
    ///
    /// A task is overdue when its deadline is strictly in the past and it
    /// has not been completed.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.deadline < now && self.status != TaskStatus::Completed.as_str()
    }
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub priority: String,
    pub status: String,
    pub category_id: Option<i64>,
    pub user_id: i64,
}

/// Replacement values for a task's mutable fields
///
/// `deadline` of `None` keeps the stored deadline.
#[derive(Debug, Clone)]
pub struct UpdateTask {
    pub title: String,
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: String,
    pub status: String,
    pub category_id: Option<i64>,
}

/// Treats the client's "no category" spellings (`null` or `0`) alike
pub fn normalize_category_id(category_id: Option<i64>) -> Option<i64> {
    category_id.filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task_with(status: &str, deadline: DateTime<Utc>) -> Task {
        let now = Utc::now();
        Task {
            id: 1,
            title: "t".to_string(),
            description: "d".to_string(),
            deadline,
            priority: "High".to_string(),
            status: status.to_string(),
            category_id: None,
            user_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_labels_roundtrip() {
        for status in [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed] {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::parse("in progress"), None);
        assert_eq!(TaskStatus::InProgress.to_string(), "In Progress");
    }

    #[test]
    fn test_overdue_requires_past_deadline_and_open_status() {
        let now = Utc::now();
        let past = now - Duration::hours(1);
        let future = now + Duration::hours(1);

        assert!(task_with("Pending", past).is_overdue_at(now));
        assert!(task_with("In Progress", past).is_overdue_at(now));
        assert!(!task_with("Completed", past).is_overdue_at(now));
        assert!(!task_with("Pending", future).is_overdue_at(now));
        // deadline == now is not strictly before now
        assert!(!task_with("Pending", now).is_overdue_at(now));
    }

    #[test]
    fn test_normalize_category_id() {
        assert_eq!(normalize_category_id(None), None);
        assert_eq!(normalize_category_id(Some(0)), None);
        assert_eq!(normalize_category_id(Some(4)), Some(4));
    }

    #[test]
    fn test_task_json_uses_task_id() {
        let json = serde_json::to_value(task_with("Pending", Utc::now())).unwrap();
        assert_eq!(json["task_id"], 1);
        assert!(json.get("id").is_none());
        assert!(json["category_id"].is_null());
    }
}
