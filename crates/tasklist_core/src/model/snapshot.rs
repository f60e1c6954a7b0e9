//! Persisted shape of a task collection.
//!
//! # Invariants
//! - Task ids are non-zero and unique within one snapshot.
//! - `next_id` is the counter value at save time; restore never hands out an
//!   id at or below any id the snapshot has seen.

use crate::model::task::{Task, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tasks in creation order plus the id counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub tasks: Vec<Task>,
    pub next_id: u64,
}

impl TaskSnapshot {
    /// Validates every task, id uniqueness, and that each id leaves room for a
    /// successor.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            task.validate()?;
            if task.id().get() == u64::MAX {
                return Err(ValidationError::IdSpaceExhausted);
            }
            if !seen.insert(task.id()) {
                return Err(ValidationError::DuplicateId(task.id()));
            }
        }
        Ok(())
    }

    /// Smallest id safe to assign next: above the stored counter's floor and
    /// above every task id present.
    pub fn effective_next_id(&self) -> u64 {
        let after_max = self
            .tasks
            .iter()
            .map(|task| task.id().get().saturating_add(1))
            .max()
            .unwrap_or(1);
        self.next_id.max(after_max).max(1)
    }
}

impl Default for TaskSnapshot {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }
}
