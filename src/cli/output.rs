//! Plain-text rendering of tasks for the CLI.

use crate::core::{score, Task};
use crate::error::format_task_ids;
use chrono::{DateTime, Utc};

/// Render one task as a list line:
/// `  3 ○ 142  Write report  [due 2026-03-03, deps: #1]`
pub fn task_line(task: &Task, now: DateTime<Utc>) -> String {
    let mut notes = Vec::new();
    if let Some(deadline) = task.deadline {
        if task.is_overdue(now) {
            notes.push(format!("due {} !overdue", deadline.format("%Y-%m-%d")));
        } else {
            notes.push(format!("due {}", deadline.format("%Y-%m-%d")));
        }
    }
    if !task.dependencies.is_empty() {
        let ids: Vec<i64> = task.dependencies.iter().copied().collect();
        notes.push(format!("deps: {}", format_task_ids(&ids)));
    }

    let suffix = if notes.is_empty() {
        String::new()
    } else {
        format!("  [{}]", notes.join(", "))
    };

    format!(
        "{:>4} {} {:>3}  {}{}",
        task.id,
        task.status_char(),
        score(task, now),
        task.title,
        suffix
    )
}

/// Render the full detail block for `show`.
pub fn task_detail(task: &Task, now: DateTime<Utc>) -> String {
    let mut lines = vec![
        format!("Task #{}: {}", task.id, task.title),
        format!("  status:   {}", if task.completed { "completed" } else { "active" }),
        format!("  urgency:  {}", task.urgency),
        format!("  score:    {}", score(task, now)),
        format!("  created:  {}", task.created_at.format("%Y-%m-%d %H:%M")),
    ];

    match task.deadline {
        Some(deadline) => {
            let marker = if task.is_overdue(now) { " (overdue)" } else { "" };
            lines.push(format!(
                "  deadline: {}{marker}",
                deadline.format("%Y-%m-%d %H:%M")
            ));
        }
        None => lines.push("  deadline: none".to_string()),
    }

    if let Some(description) = &task.description {
        lines.push(format!("  desc:     {description}"));
    }
    if !task.dependencies.is_empty() {
        let ids: Vec<i64> = task.dependencies.iter().copied().collect();
        lines.push(format!("  deps:     {}", format_task_ids(&ids)));
    }
    if let Some(completed_at) = task.completed_at {
        lines.push(format!(
            "  done at:  {}",
            completed_at.format("%Y-%m-%d %H:%M")
        ));
    }

    lines.join("\n")
}
