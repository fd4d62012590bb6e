/// Reminder model
///
/// Two reminders for the same (task, user) may not be scheduled within a
/// minute of each other; see [`crate::policy::reminder_window`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE reminders (
///     reminder_id BIGSERIAL PRIMARY KEY,
///     task_id BIGINT NOT NULL REFERENCES tasks(task_id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
///     reminder_time TIMESTAMPTZ NOT NULL,
///     is_sent BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled reminder for a task
///
/// Serialized with a bare `id` key, which is what mobile clients expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reminder {
    #[sqlx(rename = "reminder_id")]
    pub id: i64,

    pub task_id: i64,

    pub user_id: i64,

    pub reminder_time: DateTime<Utc>,

    pub is_sent: bool,
}

/// Input for creating a new reminder
#[derive(Debug, Clone)]
pub struct CreateReminder {
    pub task_id: i64,
    pub user_id: i64,
    pub reminder_time: DateTime<Utc>,
    pub is_sent: bool,
}

/// Replacement values for a reminder's mutable fields
#[derive(Debug, Clone)]
pub struct UpdateReminder {
    pub reminder_time: DateTime<Utc>,
    pub is_sent: bool,
    pub user_id: i64,
}
