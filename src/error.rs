//! Error types for the prio task tracker.

use std::io;

/// Result type alias for prio operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the prio task tracker.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Adding a dependency edge would close a cycle.
    #[error("#{0} -> #{1} would create a cycle: {2}")]
    CycleDetected(i64, i64, String),

    /// Task not found.
    #[error("Task #{0} not found")]
    TaskNotFound(i64),

    /// Task title is empty.
    #[error("Task title must not be empty")]
    EmptyTitle,

    /// Task listed itself as a dependency.
    #[error("Task #{0} cannot depend on itself")]
    SelfDependency(i64),

    /// Urgency outside the 1..=10 scale (load-time validation only;
    /// interactive operations clamp instead).
    #[error("Urgency {0} is out of range (expected 1..=10)")]
    UrgencyOutOfRange(i64),

    /// Two persisted records share an id.
    #[error("Duplicate task id #{0} in input records")]
    DuplicateId(i64),

    /// A persisted record references a task that is not in the input.
    #[error("Task #{task} depends on unknown task #{dependency}")]
    UnknownDependency { task: i64, dependency: i64 },

    /// Deserialization failed; wraps the underlying validation or cycle error.
    #[error("Failed to load task records: {0}")]
    Load(#[source] Box<Error>),

    /// Unparseable deadline argument.
    #[error("Invalid deadline '{0}' (expected RFC 3339, 'YYYY-MM-DD HH:MM', or 'YYYY-MM-DD')")]
    InvalidDeadline(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Wrap a validation or cycle error raised while rebuilding state from
    /// persisted records.
    pub fn into_load(self) -> Error {
        Error::Load(Box::new(self))
    }
}

/// Format a list of task IDs as a comma-separated string with # prefix.
pub fn format_task_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| format!("#{id}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_task_ids() {
        assert_eq!(format_task_ids(&[1, 2, 3]), "#1, #2, #3");
        assert_eq!(format_task_ids(&[42]), "#42");
        assert_eq!(format_task_ids(&[]), "");
    }

    #[test]
    fn test_load_wraps_source() {
        let err = Error::TaskNotFound(7).into_load();
        assert!(matches!(err, Error::Load(_)));
        assert!(err.to_string().contains("#7"));
    }
}
