//! Core use-case services.
//!
//! # Responsibility
//! - Expose command/query entry points for view collaborators.
//! - Keep rendering and storage concerns out of the domain core.

pub mod task_manager;
