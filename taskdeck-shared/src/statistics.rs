/// Per-user task statistics
///
/// Statistics are assembled from two reads against the store: an overview of
/// status counts and a per-month breakdown keyed by the month's 3-letter
/// English abbreviation. Tasks created in the same month of different years
/// share a bucket.
///
/// The `tally_*` helpers compute the same figures from a slice of tasks. The
/// in-memory store uses them directly.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::models::{
    statistics::{MonthlyCount, TaskOverview, UserTaskStatistics},
    task::{Task, TaskStatus},
};
use crate::repository::{RepositoryResult, StatisticsRepository};

/// Computes the statistics record for `user_id`
///
/// A user without tasks, or one that does not exist, gets all-zero counts
/// and empty month maps.
pub async fn user_task_statistics<R>(repo: &R, user_id: i64) -> RepositoryResult<UserTaskStatistics>
where
    R: StatisticsRepository + ?Sized,
{
    let overview = repo.task_overview(user_id).await?.unwrap_or_default();
    let monthly = repo.monthly_breakdown(user_id).await?;

    Ok(assemble(user_id, overview, monthly))
}

/// Combines an overview and month buckets into the response record
///
/// Every bucket lands in both maps, so a month with tasks but no completions
/// maps to 0 in `completed_by_month`. Months without tasks have no bucket and
/// appear in neither.
pub fn assemble(user_id: i64, overview: TaskOverview, monthly: Vec<MonthlyCount>) -> UserTaskStatistics {
    let mut stats = UserTaskStatistics {
        user_id,
        total_tasks: overview.total_tasks,
        completed_tasks: overview.completed_tasks,
        in_progress_tasks: overview.in_progress_tasks,
        pending_tasks: overview.pending_tasks,
        overdue_tasks: overview.overdue_tasks,
        ..Default::default()
    };

    for bucket in monthly {
        *stats.tasks_by_month.entry(bucket.month.clone()).or_insert(0) += bucket.total_tasks;
        *stats.completed_by_month.entry(bucket.month).or_insert(0) += bucket.completed_tasks;
    }

    stats
}

/// Month bucket key for a creation time (`Jan` .. `Dec`, UTC)
pub fn month_key(at: DateTime<Utc>) -> String {
    at.format("%b").to_string()
}

/// Status counts over `tasks`, with overdue judged against `now`
pub fn tally_overview(tasks: &[Task], now: DateTime<Utc>) -> TaskOverview {
    tasks.iter().fold(TaskOverview::default(), |mut acc, task| {
        acc.total_tasks += 1;
        match TaskStatus::parse(&task.status) {
            Some(TaskStatus::Completed) => acc.completed_tasks += 1,
            Some(TaskStatus::InProgress) => acc.in_progress_tasks += 1,
            Some(TaskStatus::Pending) => acc.pending_tasks += 1,
            None => {}
        }
        if task.is_overdue_at(now) {
            acc.overdue_tasks += 1;
        }
        acc
    })
}

/// Per-month totals and completions over `tasks`
pub fn tally_months(tasks: &[Task]) -> Vec<MonthlyCount> {
    let mut buckets: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for task in tasks {
        let entry = buckets.entry(month_key(task.created_at)).or_insert((0, 0));
        entry.0 += 1;
        if task.status == TaskStatus::Completed.as_str() {
            entry.1 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(month, (total_tasks, completed_tasks))| MonthlyCount {
            month,
            total_tasks,
            completed_tasks,
        })
        .collect()
}
