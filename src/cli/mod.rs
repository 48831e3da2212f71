//! CLI commands for prio.

pub mod output;

use crate::core::{TaskDraft, TaskPatch};
use crate::error::{Error, Result};
use crate::export;
use crate::store;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "prio")]
#[command(about = "Priority-scheduling task tracker")]
#[command(version)]
pub struct Cli {
    /// Task store file
    #[arg(long, global = true, default_value = store::DEFAULT_STORE_FILE)]
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task (prints the assigned id)
    Add {
        /// Task title
        title: String,
        /// Optional description
        #[arg(long)]
        desc: Option<String>,
        /// Deadline (RFC 3339, 'YYYY-MM-DD HH:MM', or YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,
        /// Urgency on the 1..=10 scale (clamped)
        #[arg(long, default_value_t = 5)]
        urgency: u8,
        /// Prerequisite task id (repeatable)
        #[arg(long = "dep")]
        deps: Vec<i64>,
    },

    /// List tasks in scheduled order
    List {
        /// Include completed tasks
        #[arg(long)]
        all: bool,
        /// Only overdue tasks
        #[arg(long)]
        overdue: bool,
        /// Only tasks due today
        #[arg(long)]
        due_today: bool,
        /// Only tasks with urgency >= 8
        #[arg(long)]
        high: bool,
    },

    /// Show task details
    Show {
        /// Task ID
        id: i64,
    },

    /// Edit an existing task
    Edit {
        /// Task ID
        id: i64,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long, conflicts_with = "no_desc")]
        desc: Option<String>,
        /// Clear the description
        #[arg(long)]
        no_desc: bool,
        /// New deadline
        #[arg(long, conflicts_with = "no_deadline")]
        deadline: Option<String>,
        /// Clear the deadline
        #[arg(long)]
        no_deadline: bool,
        /// New urgency (clamped to 1..=10)
        #[arg(long)]
        urgency: Option<u8>,
    },

    /// Mark a task completed
    Done {
        /// Task ID
        id: i64,
    },

    /// Delete a task (other tasks' dependencies on it are removed)
    Delete {
        /// Task ID
        id: i64,
    },

    /// Add a dependency: task <id> requires <prerequisite> first
    Depend {
        /// Task ID
        id: i64,
        /// Prerequisite task ID
        prerequisite: i64,
    },

    /// Remove a dependency
    Undepend {
        /// Task ID
        id: i64,
        /// Prerequisite task ID
        prerequisite: i64,
    },

    /// Export all tasks as CSV in scheduled order
    Export {
        /// Output CSV path
        path: PathBuf,
    },
}

/// Run one CLI invocation against the store file.
pub fn run(cli: Cli) -> Result<()> {
    let now = Utc::now();
    let file = cli.file.as_path();

    match cli.command {
        Commands::Add {
            title,
            desc,
            deadline,
            urgency,
            deps,
        } => cmd_add(file, now, title, desc, deadline, urgency, deps),
        Commands::List {
            all,
            overdue,
            due_today,
            high,
        } => cmd_list(file, now, all, overdue, due_today, high),
        Commands::Show { id } => cmd_show(file, now, id),
        Commands::Edit {
            id,
            title,
            desc,
            no_desc,
            deadline,
            no_deadline,
            urgency,
        } => cmd_edit(file, id, title, desc, no_desc, deadline, no_deadline, urgency),
        Commands::Done { id } => cmd_done(file, now, id),
        Commands::Delete { id } => cmd_delete(file, id),
        Commands::Depend { id, prerequisite } => cmd_depend(file, id, prerequisite),
        Commands::Undepend { id, prerequisite } => cmd_undepend(file, id, prerequisite),
        Commands::Export { path } => cmd_export(file, now, &path),
    }
}

/// Parse a deadline argument.
///
/// Accepted forms, tried in order: RFC 3339, a naive `YYYY-MM-DD HH:MM`
/// (taken as UTC), and a bare date. A bare date means the end of that day
/// UTC, so a task due "today" stays in the due-today band all day.
pub fn parse_deadline(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(end_of_day) = date.and_hms_opt(23, 59, 59) {
            return Ok(end_of_day.and_utc());
        }
    }
    Err(Error::InvalidDeadline(input.to_string()))
}

fn cmd_add(
    file: &Path,
    now: DateTime<Utc>,
    title: String,
    desc: Option<String>,
    deadline: Option<String>,
    urgency: u8,
    deps: Vec<i64>,
) -> Result<()> {
    let deadline = deadline.as_deref().map(parse_deadline).transpose()?;

    let mut scheduler = store::load_or_default(file)?;
    let id = scheduler.add_task(
        TaskDraft {
            title,
            description: desc,
            deadline,
            urgency,
            dependencies: deps.into_iter().collect::<BTreeSet<i64>>(),
        },
        now,
    )?;
    store::save(file, &scheduler)?;

    println!("{id}");
    Ok(())
}

fn cmd_list(
    file: &Path,
    now: DateTime<Utc>,
    all: bool,
    overdue: bool,
    due_today: bool,
    high: bool,
) -> Result<()> {
    let scheduler = store::load_or_default(file)?;

    let tasks = if overdue {
        scheduler.overdue_tasks(now)
    } else if due_today {
        scheduler.due_today(now)
    } else if high {
        scheduler.high_priority()
    } else {
        scheduler.get_ordered_tasks(now, all)?
    };

    if tasks.is_empty() {
        println!("No tasks");
        return Ok(());
    }
    for task in &tasks {
        println!("{}", output::task_line(task, now));
    }
    Ok(())
}

fn cmd_show(file: &Path, now: DateTime<Utc>, id: i64) -> Result<()> {
    let scheduler = store::load_or_default(file)?;
    let task = scheduler.get_task(id)?;
    println!("{}", output::task_detail(task, now));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_edit(
    file: &Path,
    id: i64,
    title: Option<String>,
    desc: Option<String>,
    no_desc: bool,
    deadline: Option<String>,
    no_deadline: bool,
    urgency: Option<u8>,
) -> Result<()> {
    let deadline = match (deadline, no_deadline) {
        (Some(input), _) => Some(Some(parse_deadline(&input)?)),
        (None, true) => Some(None),
        (None, false) => None,
    };
    let description = match (desc, no_desc) {
        (Some(text), _) => Some(Some(text)),
        (None, true) => Some(None),
        (None, false) => None,
    };

    let mut scheduler = store::load_or_default(file)?;
    scheduler.edit_task(
        id,
        TaskPatch {
            title,
            description,
            deadline,
            urgency,
            dependencies: None,
        },
    )?;
    store::save(file, &scheduler)?;

    println!("Updated #{id}");
    Ok(())
}

fn cmd_done(file: &Path, now: DateTime<Utc>, id: i64) -> Result<()> {
    let mut scheduler = store::load_or_default(file)?;
    scheduler.complete_task(id, now)?;
    store::save(file, &scheduler)?;

    println!("Completed #{id}");
    Ok(())
}

fn cmd_delete(file: &Path, id: i64) -> Result<()> {
    let mut scheduler = store::load_or_default(file)?;
    scheduler.delete_task(id)?;
    store::save(file, &scheduler)?;

    println!("Deleted #{id}");
    Ok(())
}

fn cmd_depend(file: &Path, id: i64, prerequisite: i64) -> Result<()> {
    let mut scheduler = store::load_or_default(file)?;
    scheduler.add_dependency(id, prerequisite)?;
    store::save(file, &scheduler)?;

    println!("#{id} now depends on #{prerequisite}");
    Ok(())
}

fn cmd_undepend(file: &Path, id: i64, prerequisite: i64) -> Result<()> {
    let mut scheduler = store::load_or_default(file)?;
    scheduler.remove_dependency(id, prerequisite)?;
    store::save(file, &scheduler)?;

    println!("#{id} no longer depends on #{prerequisite}");
    Ok(())
}

fn cmd_export(file: &Path, now: DateTime<Utc>, path: &Path) -> Result<()> {
    let scheduler = store::load_or_default(file)?;
    let rows = export::export_rows(&scheduler, now)?;
    export::write_csv(File::create(path)?, &rows)?;

    println!("Exported {} tasks to {}", rows.len(), path.display());
    Ok(())
}
