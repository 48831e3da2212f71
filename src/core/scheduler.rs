//! The scheduler: exclusive owner of the task collection and dependency graph.
//!
//! Every mutation goes through these operations; external collaborators (CLI,
//! store, export) never hold a writable reference to a task. All operations
//! are synchronous, run to completion, and commit nothing on failure.

use crate::core::score::score;
use crate::core::task::{clamp_urgency, Task, TaskRecord, URGENCY_MAX, URGENCY_MIN};
use crate::error::{Error, Result};
use crate::graph::{linearize, DepGraph, OrderKey};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Fields for a new task. `id`, `created_at`, and completion state are
/// assigned by the scheduler.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub urgency: u8,
    pub dependencies: BTreeSet<i64>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            deadline: None,
            urgency: 5,
            dependencies: BTreeSet::new(),
        }
    }
}

/// Partial update for `edit_task`. `None` leaves a field untouched; the
/// double options distinguish "don't touch" from "clear".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub urgency: Option<u8>,
    pub dependencies: Option<BTreeSet<i64>>,
}

/// Priority scheduler over an owned task collection.
///
/// Ids increase monotonically and are never reused after deletion. Scores
/// and the final ordering are recomputed from scratch on every
/// [`get_ordered_tasks`] call; deadline proximity is time-dependent, and the
/// collection is small enough that re-derivation beats cache invalidation.
///
/// [`get_ordered_tasks`]: Scheduler::get_ordered_tasks
#[derive(Debug, Clone)]
pub struct Scheduler {
    tasks: BTreeMap<i64, Task>,
    graph: DepGraph,
    next_id: i64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            graph: DepGraph::new(),
            next_id: 1,
        }
    }

    /// Number of tasks, completed ones included.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Get a task by id.
    pub fn get_task(&self, id: i64) -> Result<&Task> {
        self.tasks.get(&id).ok_or(Error::TaskNotFound(id))
    }

    /// Create a new task and return its id.
    ///
    /// Validates the title, clamps urgency onto 1..=10, and requires every
    /// dependency to name an existing task. All-or-nothing: if any edge is
    /// rejected, neither the task nor any of its edges are committed.
    pub fn add_task(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> Result<i64> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::EmptyTitle);
        }
        for &dep in &draft.dependencies {
            if !self.tasks.contains_key(&dep) {
                return Err(Error::TaskNotFound(dep));
            }
        }

        let id = self.next_id;
        self.graph.add_node(id);
        for &dep in &draft.dependencies {
            if let Err(e) = self.graph.add_edge(id, dep) {
                self.graph.remove_node(id);
                return Err(e);
            }
        }

        self.tasks.insert(
            id,
            Task {
                id,
                title,
                description: draft.description,
                deadline: draft.deadline,
                urgency: clamp_urgency(draft.urgency),
                dependencies: draft.dependencies,
                created_at: now,
                completed: false,
                completed_at: None,
            },
        );
        self.next_id += 1;

        debug!(id, "task added");
        Ok(id)
    }

    /// Apply a partial update to a task.
    ///
    /// A dependency change is validated (existence, self-dependency,
    /// acyclicity) against a scratch copy of the graph and committed only as
    /// a whole; a rejected patch mutates nothing.
    pub fn edit_task(&mut self, id: i64, patch: TaskPatch) -> Result<()> {
        if !self.tasks.contains_key(&id) {
            return Err(Error::TaskNotFound(id));
        }
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(Error::EmptyTitle);
            }
        }

        if let Some(deps) = patch.dependencies {
            if deps.contains(&id) {
                return Err(Error::SelfDependency(id));
            }
            for &dep in &deps {
                if !self.tasks.contains_key(&dep) {
                    return Err(Error::TaskNotFound(dep));
                }
            }

            let mut graph = self.graph.clone();
            let current: Vec<i64> = graph.dependencies_of(id).collect();
            for dep in current {
                graph.remove_edge(id, dep);
            }
            for &dep in &deps {
                graph.add_edge(id, dep)?;
            }

            self.graph = graph;
            if let Some(task) = self.tasks.get_mut(&id) {
                task.dependencies = deps;
            }
        }

        let task = self.tasks.get_mut(&id).ok_or(Error::TaskNotFound(id))?;
        if let Some(title) = patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(deadline) = patch.deadline {
            task.deadline = deadline;
        }
        if let Some(urgency) = patch.urgency {
            task.urgency = clamp_urgency(urgency);
        }

        debug!(id, "task edited");
        Ok(())
    }

    /// Clamp-and-set urgency.
    pub fn set_urgency(&mut self, id: i64, urgency: u8) -> Result<()> {
        self.edit_task(
            id,
            TaskPatch {
                urgency: Some(urgency),
                ..TaskPatch::default()
            },
        )
    }

    /// Set or clear the deadline.
    pub fn edit_deadline(&mut self, id: i64, deadline: Option<DateTime<Utc>>) -> Result<()> {
        self.edit_task(
            id,
            TaskPatch {
                deadline: Some(deadline),
                ..TaskPatch::default()
            },
        )
    }

    /// Add the dependency `id -> prerequisite`.
    pub fn add_dependency(&mut self, id: i64, prerequisite: i64) -> Result<()> {
        if !self.tasks.contains_key(&id) {
            return Err(Error::TaskNotFound(id));
        }
        if !self.tasks.contains_key(&prerequisite) {
            return Err(Error::TaskNotFound(prerequisite));
        }

        self.graph.add_edge(id, prerequisite)?;
        if let Some(task) = self.tasks.get_mut(&id) {
            task.dependencies.insert(prerequisite);
        }
        debug!(id, prerequisite, "dependency added");
        Ok(())
    }

    /// Remove the dependency `id -> prerequisite`. Idempotent on the edge.
    pub fn remove_dependency(&mut self, id: i64, prerequisite: i64) -> Result<()> {
        if !self.tasks.contains_key(&id) {
            return Err(Error::TaskNotFound(id));
        }

        self.graph.remove_edge(id, prerequisite);
        if let Some(task) = self.tasks.get_mut(&id) {
            task.dependencies.remove(&prerequisite);
        }
        Ok(())
    }

    /// Mark a task completed, recording the completion instant.
    ///
    /// Completing an already-completed task is a no-op that preserves the
    /// original `completed_at`. Completion is terminal: there is no reopen
    /// operation, and the record is retained for history and filtering.
    pub fn complete_task(&mut self, id: i64, now: DateTime<Utc>) -> Result<()> {
        let task = self.tasks.get_mut(&id).ok_or(Error::TaskNotFound(id))?;
        if task.completed {
            debug!(id, "task already completed; no-op");
            return Ok(());
        }

        task.completed = true;
        task.completed_at = Some(now);
        debug!(id, "task completed");
        Ok(())
    }

    /// Delete a task, cascading removal from every other task's dependency
    /// set so no dangling ids remain.
    pub fn delete_task(&mut self, id: i64) -> Result<()> {
        if self.tasks.remove(&id).is_none() {
            return Err(Error::TaskNotFound(id));
        }

        for task in self.tasks.values_mut() {
            task.dependencies.remove(&id);
        }
        self.graph.remove_node(id);

        debug!(id, "task deleted");
        Ok(())
    }

    /// The scheduled task sequence at instant `now`.
    ///
    /// Active tasks are rescored, then linearized so every prerequisite
    /// precedes its dependents, ties broken by descending score, ascending
    /// `created_at`, ascending id. With `include_completed`, completed tasks
    /// are appended ordered by completion recency (most recent last), exempt
    /// from dependency ordering.
    pub fn get_ordered_tasks(
        &self,
        now: DateTime<Utc>,
        include_completed: bool,
    ) -> Result<Vec<Task>> {
        let keys: HashMap<i64, OrderKey> = self
            .tasks
            .values()
            .filter(|t| t.is_active())
            .map(|t| {
                (
                    t.id,
                    OrderKey {
                        score: score(t, now),
                        created_at: t.created_at,
                        id: t.id,
                    },
                )
            })
            .collect();

        let order = linearize(&keys, self.graph.deps())?;
        let mut result: Vec<Task> = order
            .iter()
            .filter_map(|id| self.tasks.get(id).cloned())
            .collect();

        if include_completed {
            let mut done: Vec<&Task> = self.tasks.values().filter(|t| t.completed).collect();
            done.sort_by_key(|t| (t.completed_at, t.id));
            result.extend(done.into_iter().cloned());
        }

        Ok(result)
    }

    /// Active tasks whose deadline has passed, soonest-expired first.
    pub fn overdue_tasks(&self, now: DateTime<Utc>) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|t| t.is_overdue(now))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.deadline, t.id));
        tasks
    }

    /// Active tasks due on `now`'s UTC calendar day.
    pub fn due_today(&self, now: DateTime<Utc>) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|t| t.is_due_today(now))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.deadline, t.id));
        tasks
    }

    /// Active tasks with urgency >= 8.
    pub fn high_priority(&self) -> Vec<Task> {
        self.tasks
            .values()
            .filter(|t| t.is_active() && t.urgency >= 8)
            .cloned()
            .collect()
    }

    /// Flatten the collection into plain persistence records, ascending id.
    pub fn serialize(&self) -> Vec<TaskRecord> {
        self.tasks.values().map(TaskRecord::from).collect()
    }

    /// Rebuild a scheduler from persisted records.
    ///
    /// Everything is re-validated: duplicate ids, empty titles, out-of-range
    /// urgency (rejected here, not clamped: corrupt data is surfaced, never
    /// silently repaired), self-dependencies, unknown dependency ids, and
    /// acyclicity of the full graph. Any failure wraps in `Error::Load`; no
    /// partial state is ever returned.
    pub fn deserialize(records: Vec<TaskRecord>) -> Result<Self> {
        Self::rebuild(records).map_err(Error::into_load)
    }

    fn rebuild(records: Vec<TaskRecord>) -> Result<Self> {
        let mut scheduler = Scheduler::new();

        for record in records {
            if scheduler.tasks.contains_key(&record.id) {
                return Err(Error::DuplicateId(record.id));
            }
            if record.title.trim().is_empty() {
                return Err(Error::EmptyTitle);
            }
            if record.urgency < URGENCY_MIN || record.urgency > URGENCY_MAX {
                return Err(Error::UrgencyOutOfRange(i64::from(record.urgency)));
            }
            if record.dependencies.contains(&record.id) {
                return Err(Error::SelfDependency(record.id));
            }

            scheduler.tasks.insert(
                record.id,
                Task {
                    id: record.id,
                    title: record.title,
                    description: record.description,
                    deadline: record.deadline,
                    urgency: record.urgency,
                    dependencies: record.dependencies.into_iter().collect(),
                    created_at: record.created_at,
                    completed: record.completed,
                    completed_at: record.completed_at,
                },
            );
        }

        let Scheduler { tasks, graph, .. } = &mut scheduler;
        for task in tasks.values() {
            graph.add_node(task.id);
            for &dep in &task.dependencies {
                if !tasks.contains_key(&dep) {
                    return Err(Error::UnknownDependency {
                        task: task.id,
                        dependency: dep,
                    });
                }
                graph.add_edge_unchecked(task.id, dep);
            }
        }
        scheduler.graph.ensure_acyclic()?;

        scheduler.next_id = scheduler.tasks.keys().max().map_or(1, |max| max + 1);
        Ok(scheduler)
    }
}
