//! Core task model, scorer, and scheduler.

pub mod scheduler;
pub mod score;
pub mod task;

pub use scheduler::{Scheduler, TaskDraft, TaskPatch};
pub use score::score;
pub use task::{Task, TaskRecord};
