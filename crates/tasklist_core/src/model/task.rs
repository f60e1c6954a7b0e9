//! Task domain model.
//!
//! # Responsibility
//! - Define the to-do entity owned by `TaskManager`.
//! - Derive time-based classification (overdue, due-soon) on demand.
//! - Parse deadline form input and render timestamps for display.
//!
//! # Invariants
//! - `text` is never blank; trimming happens before construction.
//! - `text`, `created_at` and `deadline` never change after construction.
//! - A completed task, or one without a deadline, is never overdue or due-soon.
//! - Overdue and due-soon are mutually exclusive: due-soon needs a strictly
//!   future deadline.

use crate::clock::{Clock, SystemClock};
use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound (inclusive) on time remaining for a task to count as due-soon.
pub const DUE_SOON_WINDOW_HOURS: i64 = 24;

const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Naive forms a view may hand over for a deadline, read in local time.
const LOCAL_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Identifier unique within one `TaskManager`; never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation failures for task input and persisted task shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Task text is empty or whitespace-only.
    EmptyText,
    /// Deadline input could not be read as a point in time.
    InvalidDeadline(String),
    /// Task id `0` is reserved; ids start at `1`.
    ZeroId,
    /// Two tasks in one collection share an id.
    DuplicateId(TaskId),
    /// No unused id is left to assign.
    IdSpaceExhausted,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be blank"),
            Self::InvalidDeadline(value) => write!(f, "invalid deadline: `{value}`"),
            Self::ZeroId => write!(f, "task id must be >= 1"),
            Self::DuplicateId(id) => write!(f, "duplicate task id: {id}"),
            Self::IdSpaceExhausted => write!(f, "task id space exhausted"),
        }
    }
}

impl Error for ValidationError {}

/// Read-time display classification with precedence
/// completed > overdue > due-soon > normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Completed,
    Overdue,
    DueSoon,
    Normal,
}

impl DisplayState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Overdue => "overdue",
            Self::DueSoon => "due_soon",
            Self::Normal => "normal",
        }
    }
}

/// One to-do item.
///
/// Created only by `TaskManager::add_task` (or restored from a snapshot);
/// `completed` is the only mutable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord")]
pub struct Task {
    id: TaskId,
    text: String,
    completed: bool,
    created_at: DateTime<Utc>,
    deadline: Option<DateTime<Utc>>,
}

/// Unchecked wire shape; converted into `Task` through validation.
#[derive(Deserialize)]
struct TaskRecord {
    id: TaskId,
    text: String,
    completed: bool,
    created_at: DateTime<Utc>,
    deadline: Option<DateTime<Utc>>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = ValidationError;

    fn try_from(value: TaskRecord) -> Result<Self, Self::Error> {
        let task = Self {
            id: value.id,
            text: value.text,
            completed: value.completed,
            created_at: value.created_at,
            deadline: value.deadline,
        };
        task.validate()?;
        Ok(task)
    }
}

impl Task {
    /// Builds a fresh, not-completed task.
    ///
    /// Performs no validation; callers pass already-trimmed, non-blank text.
    pub(crate) fn new(
        id: TaskId,
        text: String,
        created_at: DateTime<Utc>,
        deadline: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            text,
            completed: false,
            created_at,
            deadline,
        }
    }

    /// Rebuilds a task from persisted fields, enforcing entity invariants.
    pub(crate) fn restore(
        id: TaskId,
        text: String,
        completed: bool,
        created_at: DateTime<Utc>,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        TaskRecord {
            id,
            text,
            completed,
            created_at,
            deadline,
        }
        .try_into()
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Checks entity-level invariants (non-zero id, non-blank text).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.get() == 0 {
            return Err(ValidationError::ZeroId);
        }
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        Ok(())
    }

    pub fn toggle_completion(&mut self) {
        self.completed = !self.completed;
    }

    /// `true` when not completed and `now` is strictly past the deadline.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if !self.completed => now > deadline,
            _ => false,
        }
    }

    /// `true` when not completed and the deadline is in `(now, now + 24h]`.
    pub fn is_due_soon_at(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if !self.completed => {
                let remaining = deadline.signed_duration_since(now);
                remaining > Duration::zero() && remaining <= due_soon_window()
            }
            _ => false,
        }
    }

    /// Same as [`Task::is_overdue_at`] against the system clock.
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(SystemClock.now())
    }

    /// Same as [`Task::is_due_soon_at`] against the system clock.
    pub fn is_due_soon(&self) -> bool {
        self.is_due_soon_at(SystemClock.now())
    }

    pub fn display_state_at(&self, now: DateTime<Utc>) -> DisplayState {
        if self.completed {
            DisplayState::Completed
        } else if self.is_overdue_at(now) {
            DisplayState::Overdue
        } else if self.is_due_soon_at(now) {
            DisplayState::DueSoon
        } else {
            DisplayState::Normal
        }
    }

    /// Creation time as `dd/mm/yyyy HH:MM` in the local timezone.
    pub fn formatted_created_at(&self) -> String {
        self.formatted_created_at_in(&Local)
    }

    pub fn formatted_created_at_in<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        format_timestamp(self.created_at, tz)
    }

    /// Deadline as `dd/mm/yyyy HH:MM` in the local timezone, `None` when unset.
    pub fn formatted_deadline(&self) -> Option<String> {
        self.formatted_deadline_in(&Local)
    }

    pub fn formatted_deadline_in<Tz>(&self, tz: &Tz) -> Option<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.deadline.map(|deadline| format_timestamp(deadline, tz))
    }
}

/// Width of the due-soon window.
pub fn due_soon_window() -> Duration {
    Duration::hours(DUE_SOON_WINDOW_HOURS)
}

/// Parses deadline form input, reading naive date-times in local time.
///
/// Accepted:
/// - blank input -> `Ok(None)` (no deadline)
/// - RFC 3339 with explicit offset, e.g. `2026-10-14T18:30:00Z`
/// - `YYYY-MM-DDTHH:MM[:SS]` and `YYYY-MM-DD HH:MM[:SS]`
///
/// # Errors
/// - `ValidationError::InvalidDeadline` for anything else, including local
///   times skipped by a DST transition.
pub fn parse_deadline(input: &str) -> Result<Option<DateTime<Utc>>, ValidationError> {
    parse_deadline_in(input, &Local)
}

/// Timezone-explicit variant of [`parse_deadline`].
///
/// Ambiguous local times (DST fall-back) resolve to the earlier instant.
pub fn parse_deadline_in<Tz: TimeZone>(
    input: &str,
    tz: &Tz,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    for format in LOCAL_INPUT_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return match tz.from_local_datetime(&naive) {
                LocalResult::Single(value) => Ok(Some(value.with_timezone(&Utc))),
                LocalResult::Ambiguous(earliest, _) => Ok(Some(earliest.with_timezone(&Utc))),
                LocalResult::None => Err(ValidationError::InvalidDeadline(trimmed.to_string())),
            };
        }
    }

    Err(ValidationError::InvalidDeadline(trimmed.to_string()))
}

fn format_timestamp<Tz>(value: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    value.with_timezone(tz).format(DISPLAY_FORMAT).to_string()
}
