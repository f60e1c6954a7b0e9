//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the save/load boundary between the task core and durable storage.
//! - Isolate SQLite query details from the in-memory manager.
//!
//! # Invariants
//! - Write paths validate snapshots before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod task_repo;
