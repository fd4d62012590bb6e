/// PostgreSQL-backed store
///
/// Each operation is one parameterized statement against the shared
/// [`PgPool`]. No operation opens a transaction, so the multi-step policies
/// in [`crate::policy`] and [`crate::statistics`] run as independent
/// round-trips.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdeck_shared::repository::{postgres::PgStore, Store, TaskRepository};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
/// let tasks = store.list_tasks_by_user(1).await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use super::{
    CategoryRepository, ReminderRepository, RepositoryResult, StatisticsRepository, Store,
    TaskRepository, UserRepository,
};
use crate::models::{
    category::{Category, CreateCategory, UpdateCategory},
    reminder::{CreateReminder, Reminder, UpdateReminder},
    statistics::{MonthlyCount, TaskOverview},
    task::{CreateTask, Task, UpdateTask},
    user::{CreateUser, UpdateUser, User},
};

const USER_COLUMNS: &str =
    "user_id, username, email, password_hash, full_name, created_at, last_login";

const TASK_COLUMNS: &str = "task_id, title, description, deadline, priority, status, \
     category_id, user_id, created_at, updated_at";

const CATEGORY_COLUMNS: &str = "category_id, category_name, color, user_id, description";

const REMINDER_COLUMNS: &str = "reminder_id, task_id, user_id, reminder_time, is_sent";

/// Store implementation over a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for migrations and pool statistics
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, data: CreateUser) -> RepositoryResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, full_name, created_at) \
             VALUES ($1, $2, $3, $4, NOW()) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.full_name)
        .fetch_one(&self.pool)
        .await?;

        debug!(user_id = user.id, "Inserted user");
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user(&self, id: i64, data: UpdateUser) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET username = $2, email = $3, full_name = $4 \
             WHERE user_id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(data.username)
        .bind(data.email)
        .bind(data.full_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn touch_last_login(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("UPDATE users SET last_login = NOW() WHERE user_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn create_task(&self, data: CreateTask) -> RepositoryResult<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks \
             (title, description, deadline, priority, status, category_id, user_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW()) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.deadline)
        .bind(data.priority)
        .bind(data.status)
        .bind(data.category_id)
        .bind(data.user_id)
        .fetch_one(&self.pool)
        .await?;

        debug!(task_id = task.id, user_id = task.user_id, "Inserted task");
        Ok(task)
    }

    async fn find_task(&self, id: i64) -> RepositoryResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn update_task(&self, id: i64, data: UpdateTask) -> RepositoryResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks \
             SET title = $2, description = $3, deadline = COALESCE($4, deadline), \
                 priority = $5, status = $6, category_id = $7, updated_at = NOW() \
             WHERE task_id = $1 \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.deadline)
        .bind(data.priority)
        .bind(data.status)
        .bind(data.category_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn delete_task(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE task_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_tasks_by_user(&self, user_id: i64) -> RepositoryResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 ORDER BY task_id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn list_tasks_with_reminders(&self, user_id: i64) -> RepositoryResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks t \
             WHERE t.user_id = $1 \
               AND EXISTS (SELECT 1 FROM reminders r WHERE r.task_id = t.task_id) \
             ORDER BY t.task_id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }
}

#[async_trait]
impl CategoryRepository for PgStore {
    async fn create_category(&self, data: CreateCategory) -> RepositoryResult<Category> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (category_name, color, user_id, description) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(data.category_name)
        .bind(data.color)
        .bind(data.user_id)
        .bind(data.description)
        .fetch_one(&self.pool)
        .await?;

        debug!(category_id = category.id, "Inserted category");
        Ok(category)
    }

    async fn find_category(&self, id: i64) -> RepositoryResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE category_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn update_category(
        &self,
        id: i64,
        data: UpdateCategory,
    ) -> RepositoryResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories SET category_name = $2, color = $3, description = $4 \
             WHERE category_id = $1 \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(data.category_name)
        .bind(data.color)
        .bind(data.description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn delete_category(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE category_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_categories_by_user(&self, user_id: i64) -> RepositoryResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE user_id = $1 ORDER BY category_id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn category_exists(&self, category_name: &str, user_id: i64) -> RepositoryResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE category_name = $1 AND user_id = $2)",
        )
        .bind(category_name)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[async_trait]
impl ReminderRepository for PgStore {
    async fn create_reminder(&self, data: CreateReminder) -> RepositoryResult<Reminder> {
        let reminder = sqlx::query_as::<_, Reminder>(&format!(
            "INSERT INTO reminders (task_id, user_id, reminder_time, is_sent, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, NOW(), NOW()) \
             RETURNING {REMINDER_COLUMNS}"
        ))
        .bind(data.task_id)
        .bind(data.user_id)
        .bind(data.reminder_time)
        .bind(data.is_sent)
        .fetch_one(&self.pool)
        .await?;

        debug!(reminder_id = reminder.id, task_id = reminder.task_id, "Inserted reminder");
        Ok(reminder)
    }

    async fn find_reminder(&self, id: i64) -> RepositoryResult<Option<Reminder>> {
        let reminder = sqlx::query_as::<_, Reminder>(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE reminder_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reminder)
    }

    async fn update_reminder(
        &self,
        id: i64,
        data: UpdateReminder,
    ) -> RepositoryResult<Option<Reminder>> {
        let reminder = sqlx::query_as::<_, Reminder>(&format!(
            "UPDATE reminders \
             SET reminder_time = $2, is_sent = $3, user_id = $4, updated_at = NOW() \
             WHERE reminder_id = $1 \
             RETURNING {REMINDER_COLUMNS}"
        ))
        .bind(id)
        .bind(data.reminder_time)
        .bind(data.is_sent)
        .bind(data.user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reminder)
    }

    async fn delete_reminder(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM reminders WHERE reminder_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_reminders_by_task(&self, task_id: i64) -> RepositoryResult<Vec<Reminder>> {
        let reminders = sqlx::query_as::<_, Reminder>(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE task_id = $1 ORDER BY reminder_id"
        ))
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders)
    }

    async fn count_reminders_between(
        &self,
        task_id: i64,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reminders \
             WHERE task_id = $1 AND user_id = $2 \
               AND reminder_time BETWEEN $3 AND $4",
        )
        .bind(task_id)
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[async_trait]
impl StatisticsRepository for PgStore {
    async fn task_overview(&self, user_id: i64) -> RepositoryResult<Option<TaskOverview>> {
        let overview = sqlx::query_as::<_, TaskOverview>(
            "SELECT \
                COUNT(*) AS total_tasks, \
                COUNT(*) FILTER (WHERE status = 'Completed') AS completed_tasks, \
                COUNT(*) FILTER (WHERE status = 'In Progress') AS in_progress_tasks, \
                COUNT(*) FILTER (WHERE status = 'Pending') AS pending_tasks, \
                COUNT(*) FILTER (WHERE deadline < NOW() AND status <> 'Completed') AS overdue_tasks \
             FROM tasks \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(overview)
    }

    async fn monthly_breakdown(&self, user_id: i64) -> RepositoryResult<Vec<MonthlyCount>> {
        // Bucket in UTC so keys match chrono's `%b` regardless of session TimeZone
        let months = sqlx::query_as::<_, MonthlyCount>(
            "SELECT \
                to_char(created_at AT TIME ZONE 'UTC', 'Mon') AS month, \
                COUNT(*) AS total_tasks, \
                COUNT(*) FILTER (WHERE status = 'Completed') AS completed_tasks \
             FROM tasks \
             WHERE user_id = $1 \
             GROUP BY 1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(months)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> RepositoryResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }
}
