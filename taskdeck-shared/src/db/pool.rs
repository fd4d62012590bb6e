/// Database connection pool management
///
/// This module owns the one pooled connection handle the service talks to
/// PostgreSQL through. The pool is created once at startup, verified with a
/// `SELECT 1` round-trip, and then shared by every in-flight request.
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         username: "taskdeck".to_string(),
///         password: "secret".to_string(),
///         host: "localhost".to_string(),
///         port: 5432,
///         database: "taskdeck".to_string(),
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///
///     let row: (i64,) = sqlx::query_as("SELECT $1")
///         .bind(42i64)
///         .fetch_one(&pool)
///         .await?;
///
///     Ok(())
/// }
/// ```

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default PostgreSQL port used when `DB_HOST` carries no explicit port
pub const DEFAULT_PORT: u16 = 5432;

/// Configuration for the database connection pool
///
/// Credentials are kept as separate parts rather than a URL so that
/// passwords containing URL metacharacters need no escaping.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Database role to connect as
    pub username: String,

    /// Password for the role
    pub password: String,

    /// Server hostname or address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Database name
    pub database: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of idle connections to maintain
    pub min_connections: u32,

    /// Timeout for acquiring a connection from the pool (seconds)
    pub connect_timeout_seconds: u64,

    /// How long a connection can remain idle before being closed (seconds)
    pub idle_timeout_seconds: Option<u64>,

    /// Maximum lifetime of a connection before forced recycling (seconds)
    pub max_lifetime_seconds: Option<u64>,

    /// Whether to test connections before returning them from the pool
    pub test_before_acquire: bool,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .finish_non_exhaustive()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            database: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
            max_lifetime_seconds: Some(1800),
            test_before_acquire: true,
        }
    }
}

impl DatabaseConfig {
    /// Splits a `host[:port]` value into its host and port parts
    ///
    /// IPv6 literals take a port only in bracketed form (`[::1]:5432`); a
    /// bare literal such as `::1` is used whole. A missing or unparsable
    /// port falls back to [`DEFAULT_PORT`].
    ///
    /// ```
    /// use taskdeck_shared::db::pool::DatabaseConfig;
    ///
    /// assert_eq!(DatabaseConfig::split_host("db:6543"), ("db".to_string(), 6543));
    /// assert_eq!(DatabaseConfig::split_host("db"), ("db".to_string(), 5432));
    /// assert_eq!(DatabaseConfig::split_host("[::1]:6543"), ("::1".to_string(), 6543));
    /// ```
    pub fn split_host(value: &str) -> (String, u16) {
        if let Some((host, rest)) = value
            .strip_prefix('[')
            .and_then(|inner| inner.split_once(']'))
        {
            let port = match rest.strip_prefix(':') {
                Some(port) => parse_port(value, port),
                None => DEFAULT_PORT,
            };
            return (host.to_string(), port);
        }

        // Unbracketed IPv6 literal
        if value.matches(':').count() > 1 {
            return (value.to_string(), DEFAULT_PORT);
        }

        match value.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() => (host.to_string(), parse_port(value, port)),
            _ => (value.to_string(), DEFAULT_PORT),
        }
    }

    /// Builds sqlx connect options from the configured parts
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
    }
}

fn parse_port(value: &str, port: &str) -> u16 {
    port.parse::<u16>().unwrap_or_else(|_| {
        warn!(host_value = value, "Ignoring unparsable port in DB_HOST");
        DEFAULT_PORT
    })
}

/// Creates and initializes a PostgreSQL connection pool
///
/// This function:
/// 1. Creates a pool with the specified configuration
/// 2. Performs a health check to verify database connectivity
/// 3. Returns an error if the database is unreachable
///
/// # Errors
///
/// Returns an error if the server cannot be reached or the health check
/// fails.
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        host = %config.host,
        port = config.port,
        database = %config.database,
        max_connections = config.max_connections,
        "Creating database connection pool"
    );

    let mut pool_options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .test_before_acquire(config.test_before_acquire);

    if let Some(idle_timeout) = config.idle_timeout_seconds {
        pool_options = pool_options.idle_timeout(Duration::from_secs(idle_timeout));
        debug!(idle_timeout_seconds = idle_timeout, "Set idle timeout");
    }

    if let Some(max_lifetime) = config.max_lifetime_seconds {
        pool_options = pool_options.max_lifetime(Duration::from_secs(max_lifetime));
        debug!(max_lifetime_seconds = max_lifetime, "Set max lifetime");
    }

    let pool = pool_options.connect_with(config.connect_options()).await?;

    health_check(&pool).await?;

    info!("Database connection pool created successfully");
    Ok(pool)
}

/// Performs a health check on the database connection
///
/// # Errors
///
/// Returns an error if the health check query fails
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    debug!("Performing database health check");

    let result: (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if result.0 == 1 {
        debug!("Database health check passed");
        Ok(())
    } else {
        warn!("Database health check returned unexpected value: {}", result.0);
        Err(sqlx::Error::Protocol(
            "Health check returned unexpected value".into(),
        ))
    }
}

/// Snapshot of the pool's connection usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub active_connections: usize,

    /// Number of idle connections available
    pub idle_connections: usize,

    /// Total connections in the pool
    pub total_connections: usize,
}

pub fn get_pool_stats(pool: &PgPool) -> PoolStats {
    let size = pool.size();
    let idle = pool.num_idle();

    PoolStats {
        active_connections: (size as usize).saturating_sub(idle),
        idle_connections: idle,
        total_connections: size as usize,
    }
}

/// Gracefully closes the connection pool
pub async fn close_pool(pool: PgPool) {
    let stats = get_pool_stats(&pool);
    info!(
        active_connections = stats.active_connections,
        idle_connections = stats.idle_connections,
        "Closing database connection pool"
    );
    pool.close().await;
    info!("Database connection pool closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.connect_timeout_seconds, 30);
        assert!(config.test_before_acquire);
    }

    #[test]
    fn test_split_host_with_port() {
        assert_eq!(
            DatabaseConfig::split_host("db.internal:6543"),
            ("db.internal".to_string(), 6543)
        );
    }

    #[test]
    fn test_split_host_without_port() {
        assert_eq!(
            DatabaseConfig::split_host("localhost"),
            ("localhost".to_string(), DEFAULT_PORT)
        );
    }

    #[test]
    fn test_split_host_bad_port_falls_back() {
        assert_eq!(
            DatabaseConfig::split_host("localhost:abc"),
            ("localhost".to_string(), DEFAULT_PORT)
        );
    }

    #[test]
    fn test_split_host_ipv6() {
        assert_eq!(
            DatabaseConfig::split_host("::1"),
            ("::1".to_string(), DEFAULT_PORT)
        );
        assert_eq!(
            DatabaseConfig::split_host("[::1]:6543"),
            ("::1".to_string(), 6543)
        );
        assert_eq!(
            DatabaseConfig::split_host("[fe80::2]"),
            ("fe80::2".to_string(), DEFAULT_PORT)
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = DatabaseConfig {
            password: "hunter2".to_string(),
            ..Default::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
