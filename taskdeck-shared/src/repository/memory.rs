/// In-process store
///
/// Mirrors the PostgreSQL schema's observable rules closely enough to drive
/// the HTTP layer in tests and local runs without a database:
///
/// - `BIGSERIAL`-style identifiers starting at 1
/// - unique `username` and `email`
/// - foreign keys: writes that reference a missing user, task, or category
///   fail with `InvalidReference`
/// - `ON DELETE CASCADE` from users and tasks, `ON DELETE SET NULL` from
///   categories
///
/// Like the real schema, categories carry no uniqueness rule of their own;
/// that check lives in [`crate::policy`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    conflict_message, reference_message, CategoryRepository, ReminderRepository,
    RepositoryError, RepositoryResult, StatisticsRepository, Store, TaskRepository,
    UserRepository,
};
use crate::models::{
    category::{Category, CreateCategory, UpdateCategory},
    reminder::{CreateReminder, Reminder, UpdateReminder},
    statistics::{MonthlyCount, TaskOverview},
    task::{CreateTask, Task, UpdateTask},
    user::{CreateUser, UpdateUser, User},
};
use crate::policy::ReminderWindow;
use crate::statistics;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, Task>,
    categories: BTreeMap<i64, Category>,
    reminders: BTreeMap<i64, Reminder>,
    last_user_id: i64,
    last_task_id: i64,
    last_category_id: i64,
    last_reminder_id: i64,
}

impl Tables {
    fn ensure_unique_user(&self, username: &str, email: &str, except: Option<i64>) -> RepositoryResult<()> {
        for user in self.users.values().filter(|u| Some(u.id) != except) {
            if user.username == username {
                return Err(RepositoryError::Conflict(conflict_message(Some(
                    "users_username_key",
                ))));
            }
            if user.email == email {
                return Err(RepositoryError::Conflict(conflict_message(Some(
                    "users_email_key",
                ))));
            }
        }
        Ok(())
    }

    fn ensure_user(&self, user_id: i64, constraint: &str) -> RepositoryResult<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(RepositoryError::InvalidReference(reference_message(Some(constraint))))
        }
    }

    fn ensure_category(&self, category_id: Option<i64>) -> RepositoryResult<()> {
        match category_id {
            Some(id) if !self.categories.contains_key(&id) => Err(
                RepositoryError::InvalidReference(reference_message(Some("tasks_category_id_fkey"))),
            ),
            _ => Ok(()),
        }
    }

    fn ensure_task(&self, task_id: i64) -> RepositoryResult<()> {
        if self.tasks.contains_key(&task_id) {
            Ok(())
        } else {
            Err(RepositoryError::InvalidReference(reference_message(Some(
                "reminders_task_id_fkey",
            ))))
        }
    }

    fn remove_task_cascade(&mut self, task_id: i64) -> bool {
        let removed = self.tasks.remove(&task_id).is_some();
        if removed {
            self.reminders.retain(|_, r| r.task_id != task_id);
        }
        removed
    }

    fn remove_user_cascade(&mut self, user_id: i64) -> bool {
        if self.users.remove(&user_id).is_none() {
            return false;
        }

        let owned_tasks: Vec<i64> = self
            .tasks
            .values()
            .filter(|t| t.user_id == user_id)
            .map(|t| t.id)
            .collect();
        for task_id in owned_tasks {
            self.remove_task_cascade(task_id);
        }

        let owned_categories: Vec<i64> = self
            .categories
            .values()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.id)
            .collect();
        for category_id in owned_categories {
            self.remove_category(category_id);
        }

        self.reminders.retain(|_, r| r.user_id != user_id);
        true
    }

    fn remove_category(&mut self, category_id: i64) -> bool {
        let removed = self.categories.remove(&category_id).is_some();
        if removed {
            for task in self.tasks.values_mut() {
                if task.category_id == Some(category_id) {
                    task.category_id = None;
                }
            }
        }
        removed
    }

    fn tasks_of(&self, user_id: i64) -> Vec<Task> {
        self.tasks
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }
}

/// Thread-safe in-memory [`Store`]
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides a task's `created_at`
    ///
    /// Creation time is server-assigned, so this is the only way to lay out
    /// tasks across months, e.g. for statistics fixtures.
    pub async fn backdate_task(&self, task_id: i64, created_at: DateTime<Utc>) -> bool {
        let mut tables = self.tables.write().await;
        match tables.tasks.get_mut(&task_id) {
            Some(task) => {
                task.created_at = created_at;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> RepositoryResult<User> {
        let mut tables = self.tables.write().await;
        tables.ensure_unique_user(&data.username, &data.email, None)?;

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            full_name: data.full_name,
            created_at: Utc::now(),
            last_login: None,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user(&self, id: i64) -> RepositoryResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn update_user(&self, id: i64, data: UpdateUser) -> RepositoryResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        tables.ensure_unique_user(&data.username, &data.email, Some(id))?;

        let user = tables.users.get_mut(&id).map(|user| {
            user.username = data.username;
            user.email = data.email;
            user.full_name = data.full_name;
            user.clone()
        });

        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> RepositoryResult<bool> {
        Ok(self.tables.write().await.remove_user_cascade(id))
    }

    async fn touch_last_login(&self, id: i64) -> RepositoryResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(match tables.users.get_mut(&id) {
            Some(user) => {
                user.last_login = Some(Utc::now());
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn create_task(&self, data: CreateTask) -> RepositoryResult<Task> {
        let mut tables = self.tables.write().await;
        tables.ensure_user(data.user_id, "tasks_user_id_fkey")?;
        tables.ensure_category(data.category_id)?;

        tables.last_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: tables.last_task_id,
            title: data.title,
            description: data.description,
            deadline: data.deadline,
            priority: data.priority,
            status: data.status,
            category_id: data.category_id,
            user_id: data.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn find_task(&self, id: i64) -> RepositoryResult<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn update_task(&self, id: i64, data: UpdateTask) -> RepositoryResult<Option<Task>> {
        let mut tables = self.tables.write().await;
        if !tables.tasks.contains_key(&id) {
            return Ok(None);
        }
        tables.ensure_category(data.category_id)?;

        let task = tables.tasks.get_mut(&id).map(|task| {
            task.title = data.title;
            task.description = data.description;
            if let Some(deadline) = data.deadline {
                task.deadline = deadline;
            }
            task.priority = data.priority;
            task.status = data.status;
            task.category_id = data.category_id;
            task.updated_at = Utc::now();
            task.clone()
        });

        Ok(task)
    }

    async fn delete_task(&self, id: i64) -> RepositoryResult<bool> {
        Ok(self.tables.write().await.remove_task_cascade(id))
    }

    async fn list_tasks_by_user(&self, user_id: i64) -> RepositoryResult<Vec<Task>> {
        Ok(self.tables.read().await.tasks_of(user_id))
    }

    async fn list_tasks_with_reminders(&self, user_id: i64) -> RepositoryResult<Vec<Task>> {
        let tables = self.tables.read().await;
        let tasks = tables
            .tasks
            .values()
            .filter(|t| t.user_id == user_id)
            .filter(|t| tables.reminders.values().any(|r| r.task_id == t.id))
            .cloned()
            .collect();

        Ok(tasks)
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create_category(&self, data: CreateCategory) -> RepositoryResult<Category> {
        let mut tables = self.tables.write().await;
        tables.ensure_user(data.user_id, "categories_user_id_fkey")?;

        tables.last_category_id += 1;
        let category = Category {
            id: tables.last_category_id,
            category_name: data.category_name,
            color: data.color,
            user_id: data.user_id,
            description: data.description,
        };
        tables.categories.insert(category.id, category.clone());

        Ok(category)
    }

    async fn find_category(&self, id: i64) -> RepositoryResult<Option<Category>> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn update_category(
        &self,
        id: i64,
        data: UpdateCategory,
    ) -> RepositoryResult<Option<Category>> {
        let mut tables = self.tables.write().await;
        let category = tables.categories.get_mut(&id).map(|category| {
            category.category_name = data.category_name;
            category.color = data.color;
            category.description = data.description;
            category.clone()
        });

        Ok(category)
    }

    async fn delete_category(&self, id: i64) -> RepositoryResult<bool> {
        Ok(self.tables.write().await.remove_category(id))
    }

    async fn list_categories_by_user(&self, user_id: i64) -> RepositoryResult<Vec<Category>> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn category_exists(&self, category_name: &str, user_id: i64) -> RepositoryResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .any(|c| c.user_id == user_id && c.category_name == category_name))
    }
}

#[async_trait]
impl ReminderRepository for MemoryStore {
    async fn create_reminder(&self, data: CreateReminder) -> RepositoryResult<Reminder> {
        let mut tables = self.tables.write().await;
        tables.ensure_task(data.task_id)?;
        tables.ensure_user(data.user_id, "reminders_user_id_fkey")?;

        tables.last_reminder_id += 1;
        let reminder = Reminder {
            id: tables.last_reminder_id,
            task_id: data.task_id,
            user_id: data.user_id,
            reminder_time: data.reminder_time,
            is_sent: data.is_sent,
        };
        tables.reminders.insert(reminder.id, reminder.clone());

        Ok(reminder)
    }

    async fn find_reminder(&self, id: i64) -> RepositoryResult<Option<Reminder>> {
        Ok(self.tables.read().await.reminders.get(&id).cloned())
    }

    async fn update_reminder(
        &self,
        id: i64,
        data: UpdateReminder,
    ) -> RepositoryResult<Option<Reminder>> {
        let mut tables = self.tables.write().await;
        if !tables.reminders.contains_key(&id) {
            return Ok(None);
        }
        tables.ensure_user(data.user_id, "reminders_user_id_fkey")?;

        let reminder = tables.reminders.get_mut(&id).map(|reminder| {
            reminder.reminder_time = data.reminder_time;
            reminder.is_sent = data.is_sent;
            reminder.user_id = data.user_id;
            reminder.clone()
        });

        Ok(reminder)
    }

    async fn delete_reminder(&self, id: i64) -> RepositoryResult<bool> {
        Ok(self.tables.write().await.reminders.remove(&id).is_some())
    }

    async fn list_reminders_by_task(&self, task_id: i64) -> RepositoryResult<Vec<Reminder>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reminders
            .values()
            .filter(|r| r.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn count_reminders_between(
        &self,
        task_id: i64,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<i64> {
        let window = ReminderWindow { start, end };
        let tables = self.tables.read().await;
        let count = tables
            .reminders
            .values()
            .filter(|r| r.task_id == task_id && r.user_id == user_id)
            .filter(|r| window.contains(r.reminder_time))
            .count();

        Ok(count as i64)
    }
}

#[async_trait]
impl StatisticsRepository for MemoryStore {
    async fn task_overview(&self, user_id: i64) -> RepositoryResult<Option<TaskOverview>> {
        let tasks = self.tables.read().await.tasks_of(user_id);
        Ok(Some(statistics::tally_overview(&tasks, Utc::now())))
    }

    async fn monthly_breakdown(&self, user_id: i64) -> RepositoryResult<Vec<MonthlyCount>> {
        let tasks = self.tables.read().await.tasks_of(user_id);
        Ok(statistics::tally_months(&tasks))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}
