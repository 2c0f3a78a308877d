//! Portable JSON snapshot of the task list and streak.

use crate::store::TaskStore;
use crate::types::{Streak, Task};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Snapshot format version.
pub const SNAPSHOT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub snapshot_version: String,

    /// ISO 8601 timestamp of export
    pub exported_at: String,

    /// Tool name and version that created this snapshot
    pub exported_by: String,

    pub tasks: Vec<Task>,
    pub streak: Streak,
}

impl Snapshot {
    /// Capture the store's current state.
    pub fn capture(store: &TaskStore) -> Self {
        Self {
            snapshot_version: SNAPSHOT_VERSION.to_string(),
            exported_at: store.clock().now().to_rfc3339(),
            exported_by: format!("task-streak v{}", env!("CARGO_PKG_VERSION")),
            tasks: store.tasks().to_vec(),
            streak: store.streak(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Write to `path`, or to stdout when `path` is `None`.
    pub fn write_to(&self, path: Option<&Path>) -> Result<()> {
        let json = self.to_json_pretty()?;
        match path {
            Some(path) => std::fs::write(path, json + "\n")?,
            None => println!("{}", json),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::kv::MemoryStore;
    use crate::types::Priority;
    use chrono::NaiveDate;
    use std::sync::Arc;

    #[test]
    fn test_capture_includes_tasks_and_streak() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let mut store = TaskStore::load(
            Arc::new(MemoryStore::new()),
            Arc::new(FixedClock::at_day(day)),
        )
        .unwrap();
        let id = store.create("Read", day, Priority::Medium).unwrap();
        store.toggle(id, true).unwrap();
        store.evaluate_streak().unwrap();

        let snapshot = Snapshot::capture(&store);
        assert_eq!(snapshot.tasks.len(), 1);
        assert_eq!(snapshot.streak.count, 1);
        assert!(snapshot.exported_at.starts_with("2026-10-14T12:00:00"));

        let parsed = Snapshot::from_json(&snapshot.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed.tasks, snapshot.tasks);
    }
}
