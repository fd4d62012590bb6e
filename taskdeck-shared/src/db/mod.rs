/// Database layer for Taskdeck
///
/// This module provides PostgreSQL connection pooling and migrations.
/// Entity queries live in [`crate::repository::postgres`].
///
/// # Modules
///
/// - `pool`: connection pool creation with a reachability check
/// - `migrations`: embedded schema migrations
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         username: std::env::var("DB_USER")?,
///         password: std::env::var("DB_PASSWORD")?,
///         database: std::env::var("DB_NAME")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
