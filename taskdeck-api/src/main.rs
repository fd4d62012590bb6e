//! # Taskdeck API Server
//!
//! Serves the Taskdeck HTTP/JSON API over PostgreSQL.
//!
//! ## Usage
//!
//! ```bash
//! DB_USER=taskdeck DB_PASSWORD=secret DB_HOST=localhost DB_NAME=taskdeck \
//!     cargo run -p taskdeck-api
//! ```

use std::sync::Arc;
use taskdeck_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskdeck_shared::{
    db::{
        migrations::{get_migration_status, run_migrations},
        pool::{close_pool, create_pool},
    },
    repository::{postgres::PgStore, Store},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskdeck API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(config.database.clone()).await?;

    if config.run_migrations {
        run_migrations(&pool).await?;
    }

    let status = get_migration_status(&pool).await?;
    if status.is_up_to_date {
        tracing::info!(
            applied_migrations = status.applied_migrations,
            latest_version = ?status.latest_version,
            "Database schema is up to date"
        );
    } else {
        tracing::warn!(
            applied_migrations = status.applied_migrations,
            "Database schema is behind this build; set RUN_MIGRATIONS=true to apply"
        );
    }

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool.clone()));
    let bind_address = config.bind_address();
    let app = build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
