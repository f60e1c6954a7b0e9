//! Aggregate statistics over a task collection.

use crate::model::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters shown next to the task list.
///
/// # Invariants
/// - `remaining == total - completed`.
/// - `overdue + due_soon <= remaining`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
    pub overdue: usize,
    pub due_soon: usize,
}

impl TaskStats {
    /// Computes all counters in one pass, classifying against `now`.
    pub fn collect<'a, I>(tasks: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let mut stats = Self::default();
        for task in tasks {
            stats.total += 1;
            if task.is_completed() {
                stats.completed += 1;
            }
            if task.is_overdue_at(now) {
                stats.overdue += 1;
            }
            if task.is_due_soon_at(now) {
                stats.due_soon += 1;
            }
        }
        stats.remaining = stats.total - stats.completed;
        stats
    }
}
