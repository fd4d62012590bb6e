/// Repository traits and the storage outcome taxonomy
///
/// Every read and write the service performs goes through one of the traits
/// below. Handlers never see a connection pool; they hold an
/// `Arc<dyn Store>` so tests can swap the PostgreSQL implementation for the
/// in-process [`memory::MemoryStore`].
///
/// # Outcomes
///
/// - `Ok(Some(_))` / `Ok(true)`: the row was found or affected
/// - `Ok(None)` / `Ok(false)`: no matching row (get/update/delete "not found")
/// - `Err(RepositoryError::Conflict)`: a uniqueness rule was violated
/// - `Err(RepositoryError::InvalidReference)`: a parent row does not exist
/// - `Err(RepositoryError::Database)`: anything else went wrong in storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    category::{Category, CreateCategory, UpdateCategory},
    reminder::{CreateReminder, Reminder, UpdateReminder},
    statistics::{MonthlyCount, TaskOverview},
    task::{CreateTask, Task, UpdateTask},
    user::{CreateUser, UpdateUser, User},
};

pub mod memory;
pub mod postgres;

/// SQLSTATE for `unique_violation`
pub const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE for `foreign_key_violation`
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errors that can occur during repository operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// A uniqueness rule rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The write referenced a user, task, or category that does not exist
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Any other storage failure
    #[error("Database error: {0}")]
    Database(String),
}

/// Repository result type alias
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Client-facing message for a violated unique constraint
///
/// Constraint names follow PostgreSQL's defaults (`users_username_key`,
/// `users_email_key`).
pub fn conflict_message(constraint: Option<&str>) -> String {
    match constraint {
        Some(c) if c.contains("username") => "Username already exists".to_string(),
        Some(c) if c.contains("email") => "Email already exists".to_string(),
        _ => "Resource already exists".to_string(),
    }
}

/// Client-facing message for a violated foreign key
///
/// Constraint names follow PostgreSQL's defaults (`tasks_category_id_fkey`,
/// `reminders_task_id_fkey`, `tasks_user_id_fkey`, ...).
pub fn reference_message(constraint: Option<&str>) -> String {
    match constraint {
        Some(c) if c.contains("category_id") => "Referenced category does not exist".to_string(),
        Some(c) if c.contains("task_id") => "Referenced task does not exist".to_string(),
        Some(c) if c.contains("user_id") => "Referenced user does not exist".to_string(),
        _ => "Referenced resource does not exist".to_string(),
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return RepositoryError::Conflict(conflict_message(db_err.constraint()));
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return RepositoryError::InvalidReference(reference_message(
                        db_err.constraint(),
                    ));
                }
                _ => {}
            }
        }

        RepositoryError::Database(err.to_string())
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user; duplicate username or email is a `Conflict`
    async fn create_user(&self, data: CreateUser) -> RepositoryResult<User>;

    async fn find_user(&self, id: i64) -> RepositoryResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;

    /// Replaces username, email, and full name; `None` if no such user
    async fn update_user(&self, id: i64, data: UpdateUser) -> RepositoryResult<Option<User>>;

    /// `false` if no such user
    async fn delete_user(&self, id: i64) -> RepositoryResult<bool>;

    /// Stamps `last_login` with the current time
    async fn touch_last_login(&self, id: i64) -> RepositoryResult<bool>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create_task(&self, data: CreateTask) -> RepositoryResult<Task>;

    async fn find_task(&self, id: i64) -> RepositoryResult<Option<Task>>;

    /// Replaces the mutable fields and refreshes `updated_at`
    async fn update_task(&self, id: i64, data: UpdateTask) -> RepositoryResult<Option<Task>>;

    async fn delete_task(&self, id: i64) -> RepositoryResult<bool>;

    async fn list_tasks_by_user(&self, user_id: i64) -> RepositoryResult<Vec<Task>>;

    /// Tasks owned by `user_id` that have at least one reminder, each listed
    /// once no matter how many reminders it has
    async fn list_tasks_with_reminders(&self, user_id: i64) -> RepositoryResult<Vec<Task>>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create_category(&self, data: CreateCategory) -> RepositoryResult<Category>;

    async fn find_category(&self, id: i64) -> RepositoryResult<Option<Category>>;

    async fn update_category(
        &self,
        id: i64,
        data: UpdateCategory,
    ) -> RepositoryResult<Option<Category>>;

    async fn delete_category(&self, id: i64) -> RepositoryResult<bool>;

    async fn list_categories_by_user(&self, user_id: i64) -> RepositoryResult<Vec<Category>>;

    /// Whether `user_id` already has a category called `category_name`
    async fn category_exists(&self, category_name: &str, user_id: i64) -> RepositoryResult<bool>;
}

#[async_trait]
pub trait ReminderRepository: Send + Sync {
    async fn create_reminder(&self, data: CreateReminder) -> RepositoryResult<Reminder>;

    async fn find_reminder(&self, id: i64) -> RepositoryResult<Option<Reminder>>;

    async fn update_reminder(
        &self,
        id: i64,
        data: UpdateReminder,
    ) -> RepositoryResult<Option<Reminder>>;

    async fn delete_reminder(&self, id: i64) -> RepositoryResult<bool>;

    async fn list_reminders_by_task(&self, task_id: i64) -> RepositoryResult<Vec<Reminder>>;

    /// Reminders for (`task_id`, `user_id`) with `start <= reminder_time <= end`
    async fn count_reminders_between(
        &self,
        task_id: i64,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<i64>;
}

#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    /// Status counts over all of the user's tasks
    ///
    /// `None` means the store produced no row, which callers treat as all
    /// zeros.
    async fn task_overview(&self, user_id: i64) -> RepositoryResult<Option<TaskOverview>>;

    /// One entry per creation month that has at least one task
    async fn monthly_breakdown(&self, user_id: i64) -> RepositoryResult<Vec<MonthlyCount>>;
}

/// Everything the HTTP layer needs from storage
#[async_trait]
pub trait Store:
    UserRepository + TaskRepository + CategoryRepository + ReminderRepository + StatisticsRepository
{
    /// Round-trips to the backing store to confirm it is reachable
    async fn ping(&self) -> RepositoryResult<()>;
}
