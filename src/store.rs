//! JSON file persistence.
//!
//! The store is an external collaborator of the scheduler: it only moves
//! `TaskRecord` sequences in and out of a file, and every structural check
//! happens in `Scheduler::deserialize`. The on-disk format is a pretty-printed
//! JSON array of records.

use crate::core::{Scheduler, TaskRecord};
use crate::error::Result;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Default store file name, relative to the working directory.
pub const DEFAULT_STORE_FILE: &str = "tasks.json";

/// Write the scheduler's records to `path`, replacing any previous content.
pub fn save(path: &Path, scheduler: &Scheduler) -> Result<()> {
    let records = scheduler.serialize();
    let json = serde_json::to_string_pretty(&records)?;
    fs::write(path, json)?;
    debug!(path = %path.display(), tasks = records.len(), "store saved");
    Ok(())
}

/// Load a scheduler from `path`.
///
/// Corrupt content fails with `Error::Json` (malformed JSON) or `Error::Load`
/// (records that do not reconstruct a valid state); nothing is skipped or
/// repaired, the caller decides whether to fall back to an empty state.
pub fn load(path: &Path) -> Result<Scheduler> {
    let json = fs::read_to_string(path)?;
    let records: Vec<TaskRecord> = serde_json::from_str(&json)?;
    debug!(path = %path.display(), tasks = records.len(), "store loaded");
    Scheduler::deserialize(records)
}

/// Load the scheduler if the store file exists, otherwise start empty.
pub fn load_or_default(path: &Path) -> Result<Scheduler> {
    if path.exists() {
        load(path)
    } else {
        Ok(Scheduler::new())
    }
}
