//! # Taskdeck Shared Library
//!
//! Domain types, storage, and business rules used by the Taskdeck API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: records for users, tasks, categories, reminders, statistics
//! - `repository`: storage traits plus PostgreSQL and in-memory stores
//! - `policy`: duplicate and conflict checks run before writes
//! - `statistics`: per-user task statistics
//! - `auth`: password hashing
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod policy;
pub mod repository;
pub mod statistics;

/// Current version of the Taskdeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
