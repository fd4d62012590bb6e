/// Configuration management for the API server
///
/// Configuration comes from environment variables, with a `.env` file in
/// the working directory loaded first when present.
///
/// # Environment Variables
///
/// Required:
/// - `DB_USER`, `DB_PASSWORD`: PostgreSQL credentials
/// - `DB_HOST`: server host, optionally with `:port` (default port 5432);
///   IPv6 addresses take a port as `[addr]:port`
/// - `DB_NAME`: database name
///
/// Optional:
/// - `PORT`: port to bind to (default: 8080)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `DB_MAX_CONNECTIONS`: pool size (default: 10)
/// - `CORS_ORIGINS`: comma-separated allowed origins, `*` for any (default: `*`)
/// - `RUN_MIGRATIONS`: apply embedded migrations at startup (default: true)
/// - `RUST_LOG`: log filter
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use taskdeck_shared::db::pool::DatabaseConfig;

const REQUIRED_DB_VARS: [&str; 4] = ["DB_USER", "DB_PASSWORD", "DB_HOST", "DB_NAME"];

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database connection settings
    pub database: DatabaseConfig,

    /// Whether to apply pending migrations before serving
    pub run_migrations: bool,
}

/// API server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error naming every missing `DB_*` variable, or the first
    /// optional variable whose value does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let missing: Vec<&str> = REQUIRED_DB_VARS
            .iter()
            .copied()
            .filter(|&key| lookup(key).map_or(true, |v| v.is_empty()))
            .collect();
        if !missing.is_empty() {
            anyhow::bail!(
                "Missing required database environment variables: {}",
                missing.join(", ")
            );
        }

        let required = |key: &str| lookup(key).unwrap_or_default();
        let (host, port) = DatabaseConfig::split_host(&required("DB_HOST"));

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .map_err(|e| anyhow::anyhow!("Invalid DB_MAX_CONNECTIONS '{}': {}", v, e))?,
            None => 10,
        };

        let api_port = match lookup("PORT") {
            Some(v) => v
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("Invalid PORT '{}': {}", v, e))?,
            None => 8080,
        };

        let run_migrations = match lookup("RUN_MIGRATIONS") {
            Some(v) => parse_bool(&v)
                .ok_or_else(|| anyhow::anyhow!("Invalid RUN_MIGRATIONS '{}'", v))?,
            None => true,
        };

        Ok(Self {
            api: ApiConfig {
                host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: api_port,
                cors_origins: parse_origins(lookup("CORS_ORIGINS").as_deref().unwrap_or("*")),
            },
            database: DatabaseConfig {
                username: required("DB_USER"),
                password: required("DB_PASSWORD"),
                host,
                port,
                database: required("DB_NAME"),
                max_connections,
                ..Default::default()
            },
            run_migrations,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `*` (alone or in the list) allows any origin and yields an empty list
fn parse_origins(value: &str) -> Vec<String> {
    let origins: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|o| o == "*") {
        Vec::new()
    } else {
        origins
    }
}
