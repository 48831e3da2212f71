//! Task model and serialization records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Urgency scale bounds.
pub const URGENCY_MIN: u8 = 1;
pub const URGENCY_MAX: u8 = 10;

/// Clamp a raw urgency value onto the 1..=10 scale.
///
/// Interactive operations (`add`, `edit`, `set_urgency`) clamp rather than
/// reject; strict range validation only happens when rebuilding state from
/// persisted records.
pub fn clamp_urgency(raw: u8) -> u8 {
    raw.clamp(URGENCY_MIN, URGENCY_MAX)
}

/// A task in the scheduler's collection.
///
/// `dependencies` holds the ids of prerequisite tasks (edge direction
/// task -> prerequisite). `created_at` is immutable after creation; `id` is
/// never reused after deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub urgency: u8,
    pub dependencies: BTreeSet<i64>,
    pub created_at: DateTime<Utc>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Whether this task participates in scheduling.
    pub fn is_active(&self) -> bool {
        !self.completed
    }

    /// Get the status character for display.
    pub fn status_char(&self) -> char {
        if self.completed {
            '✓'
        } else {
            '○'
        }
    }

    /// Whether the deadline has passed relative to `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) => !self.completed && deadline < now,
            None => false,
        }
    }

    /// Whether the deadline falls on the same UTC calendar day as `now`.
    pub fn is_due_today(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) => !self.completed && deadline.date_naive() == now.date_naive(),
            None => false,
        }
    }
}

/// Flat serialization record for one task.
///
/// This is the persistence contract: plain data, timestamps as RFC 3339,
/// dependencies as a sorted id list. Rebuilding a scheduler from records
/// re-validates everything (see `Scheduler::deserialize`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    pub urgency: u8,
    #[serde(default)]
    pub dependencies: Vec<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            deadline: task.deadline,
            urgency: task.urgency,
            dependencies: task.dependencies.iter().copied().collect(),
            created_at: task.created_at,
            completed: task.completed,
            completed_at: task.completed_at,
        }
    }
}
