//! # prio - Priority-scheduling task tracker
//!
//! A single-user task tracker whose core is a priority-scheduling engine:
//! every task gets a numeric score derived from urgency, deadline proximity,
//! and age, and the final ordering always respects dependency edges, broken
//! by score when several orderings are valid.

pub mod cli;
pub mod core;
pub mod error;
pub mod export;
pub mod graph;
pub mod store;

// Re-export commonly used types
pub use crate::core::{score, Scheduler, Task, TaskDraft, TaskPatch, TaskRecord};
pub use crate::error::{Error, Result};

pub use crate::graph::DepGraph;
