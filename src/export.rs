//! Flattened tabular export.
//!
//! One row per task in scheduled order, purely derived from
//! `Scheduler::get_ordered_tasks`; no ordering logic of its own.

use crate::core::{score, Scheduler};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// One export row. Dependencies are a `;`-joined id list, the score is the
/// value at export time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub id: i64,
    pub title: String,
    pub deadline: String,
    pub urgency: u8,
    pub dependencies: String,
    pub score: i64,
    pub completed: bool,
}

/// Flatten the full collection (completed tasks included) into rows.
pub fn export_rows(scheduler: &Scheduler, now: DateTime<Utc>) -> Result<Vec<ExportRow>> {
    let tasks = scheduler.get_ordered_tasks(now, true)?;

    Ok(tasks
        .iter()
        .map(|task| ExportRow {
            id: task.id,
            title: task.title.clone(),
            deadline: task
                .deadline
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            urgency: task.urgency,
            dependencies: task
                .dependencies
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(";"),
            score: score(task, now),
            completed: task.completed,
        })
        .collect())
}

/// Write rows as CSV with a header line.
pub fn write_csv<W: Write>(writer: W, rows: &[ExportRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TaskDraft;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn sample_scheduler() -> Scheduler {
        let mut s = Scheduler::new();
        let a = s.add_task(TaskDraft::new("A"), now()).unwrap();
        let mut b = TaskDraft::new("B");
        b.urgency = 9;
        b.deadline = Some(now() + Duration::days(2));
        b.dependencies.insert(a);
        s.add_task(b, now()).unwrap();
        s
    }

    #[test]
    fn test_rows_follow_scheduled_order() {
        let rows = export_rows(&sample_scheduler(), now()).unwrap();
        assert_eq!(rows.len(), 2);
        // A precedes B despite B's higher score.
        assert_eq!(rows[0].title, "A");
        assert_eq!(rows[1].title, "B");
        assert_eq!(rows[1].dependencies, "1");
        assert_eq!(rows[1].score, 140);
        assert_eq!(rows[0].deadline, "");
    }

    #[test]
    fn test_completed_tasks_are_exported() {
        let mut s = sample_scheduler();
        s.complete_task(1, now()).unwrap();

        let rows = export_rows(&s, now()).unwrap();
        assert_eq!(rows.len(), 2);
        let done: Vec<&ExportRow> = rows.iter().filter(|r| r.completed).collect();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, 1);
    }

    #[test]
    fn test_csv_shape() {
        let rows = export_rows(&sample_scheduler(), now()).unwrap();
        let mut buf = Vec::new();
        write_csv(&mut buf, &rows).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,title,deadline,urgency,dependencies,score,completed"
        );
        assert_eq!(lines.count(), 2);
    }
}
