/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: liveness and store reachability
/// - `users`: registration, profile, login, per-user listings
/// - `tasks`: task CRUD
/// - `categories`: category CRUD
/// - `reminders`: reminder CRUD and per-task listing
/// - `statistics`: per-user task statistics

use axum::Json;
use serde::{Deserialize, Serialize};

pub mod categories;
pub mod health;
pub mod reminders;
pub mod statistics;
pub mod tasks;
pub mod users;

/// `{"message": ...}` body returned by deletes
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}
