/// Duplicate and conflict checks that run before writes
///
/// Both rules are read-then-write with no transaction or lock between the
/// check and the insert, so two identical requests racing each other can
/// both pass. Storage has no constraint backing either rule.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::models::{
    category::{Category, CreateCategory},
    reminder::{CreateReminder, Reminder},
};
use crate::repository::{
    CategoryRepository, ReminderRepository, RepositoryError, RepositoryResult,
};

/// Half-width of the reminder conflict window, in seconds
pub const REMINDER_CONFLICT_WINDOW_SECS: i64 = 60;

pub const CATEGORY_EXISTS: &str = "Category already exists";

pub const REMINDER_TOO_CLOSE: &str =
    "A reminder for this task already exists close to the chosen time";

/// Inclusive time range around a proposed reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReminderWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// The window a proposed reminder at `at` must keep clear
pub fn reminder_window(at: DateTime<Utc>) -> ReminderWindow {
    let half = Duration::seconds(REMINDER_CONFLICT_WINDOW_SECS);
    ReminderWindow {
        start: at - half,
        end: at + half,
    }
}

/// Fails with `Conflict` if `user_id` already has a category named `category_name`
pub async fn ensure_category_available<R>(
    repo: &R,
    category_name: &str,
    user_id: i64,
) -> RepositoryResult<()>
where
    R: CategoryRepository + ?Sized,
{
    if repo.category_exists(category_name, user_id).await? {
        debug!(user_id, category_name, "Category name already taken");
        return Err(RepositoryError::Conflict(CATEGORY_EXISTS.to_string()));
    }
    Ok(())
}

/// Creates a category unless the user already has one with the same name
pub async fn create_category<R>(repo: &R, data: CreateCategory) -> RepositoryResult<Category>
where
    R: CategoryRepository + ?Sized,
{
    ensure_category_available(repo, &data.category_name, data.user_id).await?;

    let category = repo.create_category(data).await?;
    info!(
        category_id = category.id,
        user_id = category.user_id,
        "Category created"
    );
    Ok(category)
}

/// Fails with `Conflict` if (`task_id`, `user_id`) has a reminder within the window around `at`
pub async fn ensure_reminder_slot_free<R>(
    repo: &R,
    task_id: i64,
    user_id: i64,
    at: DateTime<Utc>,
) -> RepositoryResult<()>
where
    R: ReminderRepository + ?Sized,
{
    let window = reminder_window(at);
    let nearby = repo
        .count_reminders_between(task_id, user_id, window.start, window.end)
        .await?;

    if nearby > 0 {
        debug!(task_id, user_id, nearby, "Reminder window occupied");
        return Err(RepositoryError::Conflict(REMINDER_TOO_CLOSE.to_string()));
    }
    Ok(())
}

/// Creates a reminder unless another one for the same task and user is too close
pub async fn create_reminder<R>(repo: &R, data: CreateReminder) -> RepositoryResult<Reminder>
where
    R: ReminderRepository + ?Sized,
{
    ensure_reminder_slot_free(repo, data.task_id, data.user_id, data.reminder_time).await?;

    let reminder = repo.create_reminder(data).await?;
    info!(
        reminder_id = reminder.id,
        task_id = reminder.task_id,
        "Reminder created"
    );
    Ok(reminder)
}
