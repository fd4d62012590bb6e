/// Records for Taskdeck
///
/// Plain data types shared by the repositories and the HTTP layer. Every
/// query against storage lives in [`crate::repository`]. This module only
/// describes rows and the inputs used to write them.
///
/// # Models
///
/// - `user`: user accounts
/// - `task`: tasks and the conventional status labels
/// - `category`: per-user task categories
/// - `reminder`: scheduled reminders for tasks
/// - `statistics`: the derived per-user statistics record
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::user::CreateUser;
/// use taskdeck_shared::repository::{memory::MemoryStore, UserRepository};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
///
/// let user = store
///     .create_user(CreateUser {
///         username: "alice".to_string(),
///         email: "a@x.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         full_name: "Alice A".to_string(),
///     })
///     .await?;
/// println!("Created user {}", user.id);
/// # Ok(())
/// # }
/// ```

pub mod category;
pub mod reminder;
pub mod statistics;
pub mod task;
pub mod user;
