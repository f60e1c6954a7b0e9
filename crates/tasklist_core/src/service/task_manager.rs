//! Task list use-case service.
//!
//! # Responsibility
//! - Own the ordered task collection and the id counter.
//! - Expose commands (add/delete/toggle/clear) and queries (list/stats).
//! - Bridge to persistence through `TaskSnapshot`.
//!
//! # Invariants
//! - Ids are assigned from a monotonic counter starting at 1 and are never
//!   reused, including after deletion or a snapshot round trip.
//! - Collection order equals creation order; removal never reorders.
//! - A failed `add_task` leaves tasks and counter untouched.
//! - Stats and classification read the clock on every call.

use crate::clock::{Clock, SystemClock};
use crate::model::snapshot::TaskSnapshot;
use crate::model::stats::TaskStats;
use crate::model::task::{Task, TaskId, ValidationError};
use chrono::{DateTime, Utc};
use log::debug;

const FIRST_TASK_ID: u64 = 1;

/// In-memory task collection with injectable time source.
#[derive(Debug)]
pub struct TaskManager<C: Clock = SystemClock> {
    tasks: Vec<Task>,
    next_id: u64,
    clock: C,
}

impl TaskManager<SystemClock> {
    /// Creates an empty manager reading the system wall clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for TaskManager<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TaskManager<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            tasks: Vec::new(),
            next_id: FIRST_TASK_ID,
            clock,
        }
    }

    /// Restores a manager from a persisted snapshot.
    ///
    /// The counter resumes at [`TaskSnapshot::effective_next_id`].
    ///
    /// # Errors
    /// - Returns the first snapshot validation failure (blank text, zero,
    ///   duplicate or `u64::MAX` id).
    pub fn from_snapshot(snapshot: TaskSnapshot, clock: C) -> Result<Self, ValidationError> {
        snapshot.validate()?;
        let next_id = snapshot.effective_next_id();
        debug!(
            "event=task_restore module=task_manager status=ok task_count={} next_id={}",
            snapshot.tasks.len(),
            next_id
        );
        Ok(Self {
            tasks: snapshot.tasks,
            next_id,
            clock,
        })
    }

    /// Copies current state into its persisted shape.
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            tasks: self.tasks.clone(),
            next_id: self.next_id,
        }
    }

    /// Creates a task from user input.
    ///
    /// # Contract
    /// - Stored text is `text.trim()`.
    /// - New task is not completed and `created_at == clock.now()`.
    ///
    /// # Errors
    /// - `ValidationError::EmptyText` when `text` is blank after trimming.
    /// - `ValidationError::IdSpaceExhausted` when the counter cannot advance.
    pub fn add_task(
        &mut self,
        text: &str,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<&Task, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyText);
        }

        let following = self
            .next_id
            .checked_add(1)
            .ok_or(ValidationError::IdSpaceExhausted)?;
        let id = TaskId::new(self.next_id);
        self.next_id = following;
        let task = Task::new(id, trimmed.to_string(), self.clock.now(), deadline);
        debug!(
            "event=task_add module=task_manager status=ok task_id={} has_deadline={}",
            id,
            deadline.is_some()
        );

        self.tasks.push(task);
        let index = self.tasks.len() - 1;
        Ok(&self.tasks[index])
    }

    /// Removes the task with `id`; returns whether one was removed.
    ///
    /// Unknown ids are a no-op.
    pub fn delete_task(&mut self, id: TaskId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.tasks.remove(index);
        debug!("event=task_delete module=task_manager status=ok task_id={id}");
        true
    }

    /// Flips completion of the first task with `id`; returns whether one matched.
    ///
    /// Unknown ids are a no-op.
    pub fn toggle_task(&mut self, id: TaskId) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id() == id) else {
            return false;
        };
        task.toggle_completion();
        debug!(
            "event=task_toggle module=task_manager status=ok task_id={} completed={}",
            id,
            task.is_completed()
        );
        true
    }

    /// Removes every completed task, keeping the rest in order.
    ///
    /// Returns the number of removed tasks.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.is_completed());
        let removed = before - self.tasks.len();
        if removed > 0 {
            debug!("event=task_clear_completed module=task_manager status=ok removed={removed}");
        }
        removed
    }

    /// Aggregate counters computed against the current clock reading.
    pub fn stats(&self) -> TaskStats {
        TaskStats::collect(&self.tasks, self.clock.now())
    }

    /// Independent copy of the collection in current order.
    pub fn all_tasks(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Borrowed view of the collection in current order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Id the next successful `add_task` will assign.
    pub fn next_id(&self) -> TaskId {
        TaskId::new(self.next_id)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id() == id)
    }
}
