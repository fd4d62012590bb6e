/// Integration tests for database migrations
///
/// These tests require a running PostgreSQL database and are ignored by
/// default. Run with:
///
/// ```text
/// cargo test --test db_migrations_tests -- --ignored --test-threads=1
/// ```

use std::env;
use taskdeck_shared::db::migrations::{embedded_migration_count, get_migration_status, run_migrations};
use taskdeck_shared::db::pool::{close_pool, create_pool, DatabaseConfig};

fn test_config() -> DatabaseConfig {
    let var = |key: &str, default: &str| env::var(key).unwrap_or_else(|_| default.to_string());
    let (host, port) = DatabaseConfig::split_host(&var("DB_HOST", "localhost"));

    DatabaseConfig {
        username: var("DB_USER", "taskdeck"),
        password: var("DB_PASSWORD", "taskdeck"),
        host,
        port,
        database: var("DB_NAME", "taskdeck_test"),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_migrations_are_idempotent() {
    let pool = create_pool(test_config()).await.expect("Failed to create pool");

    run_migrations(&pool).await.expect("First migration run failed");
    let status_1 = get_migration_status(&pool).await.expect("Failed to get status");

    run_migrations(&pool).await.expect("Second migration run failed");
    let status_2 = get_migration_status(&pool).await.expect("Failed to get status");

    assert_eq!(status_1, status_2, "Migrations should be idempotent");
    assert!(status_2.is_up_to_date);
    assert_eq!(status_2.applied_migrations, embedded_migration_count());

    close_pool(pool).await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_migration_creates_all_tables() {
    let pool = create_pool(test_config()).await.expect("Failed to create pool");
    run_migrations(&pool).await.expect("Migrations failed");

    for table in ["users", "categories", "tasks", "reminders"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .expect("Failed to query information_schema");

        assert!(exists, "Table {} should exist", table);
    }

    close_pool(pool).await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_categories_have_no_name_uniqueness_constraint() {
    let pool = create_pool(test_config()).await.expect("Failed to create pool");
    run_migrations(&pool).await.expect("Migrations failed");

    let unique_constraints: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM information_schema.table_constraints
         WHERE table_name = 'categories' AND constraint_type = 'UNIQUE'",
    )
    .fetch_one(&pool)
    .await
    .expect("Failed to query constraints");

    assert_eq!(unique_constraints, 0);

    close_pool(pool).await;
}
