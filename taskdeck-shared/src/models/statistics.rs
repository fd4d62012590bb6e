/// Per-user task statistics
///
/// Nothing here is persisted. [`UserTaskStatistics`] is assembled on demand
/// from two independent reads: an overview row of status counts and a list
/// of per-month buckets. See [`crate::statistics`] for the aggregation
/// itself.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status counts across all of a user's tasks
///
/// `Default` is the all-zero overview used when the store returns no row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct TaskOverview {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
    pub pending_tasks: i64,
    /// Deadline strictly in the past and status other than "Completed"
    pub overdue_tasks: i64,
}

/// Task counts for one calendar month, keyed by its 3-letter abbreviation
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MonthlyCount {
    /// `Jan` .. `Dec`
    pub month: String,
    pub total_tasks: i64,
    pub completed_tasks: i64,
}

/// Statistics response for a single user
///
/// The month maps are sparse: a month with no tasks has no entry in either
/// map rather than a zero entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTaskStatistics {
    pub user_id: i64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
    pub pending_tasks: i64,
    pub overdue_tasks: i64,
    pub tasks_by_month: HashMap<String, i64>,
    pub completed_by_month: HashMap<String, i64>,
}
