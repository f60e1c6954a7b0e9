//! Task list domain model.
//!
//! # Responsibility
//! - Define the `Task` entity and its derived, time-based state.
//! - Define aggregate statistics and the persisted snapshot shape.
//!
//! # Invariants
//! - Derived state (overdue, due-soon, stats) is computed at read time and
//!   never stored.

pub mod snapshot;
pub mod stats;
pub mod task;
