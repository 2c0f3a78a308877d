//! Task store: the ordered task list plus the streak, backed by a [`KvStore`].
//!
//! Every mutation is written through to storage before returning. The store
//! is owned by the caller and handed to the view and streak components by
//! reference.

pub mod codec;

use crate::clock::Clock;
use crate::error::{StorageError, TodoError, TodoResult};
use crate::kv::{KvStore, STREAK_KEY, TASKS_KEY};
use crate::streak;
use crate::types::{Priority, Progress, Streak, Task, TaskId};
use crate::view;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

pub struct TaskStore {
    kv: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    tasks: Vec<Task>,
    streak: Streak,
    /// `None` once every id up to [`TaskId::MAX`] is taken.
    next_id: Option<TaskId>,
}

impl TaskStore {
    /// Load tasks and streak from storage. Missing or malformed keys load as
    /// defaults; only backend failures are errors.
    pub fn load(kv: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Result<Self, StorageError> {
        let tasks = codec::decode_tasks(kv.get(TASKS_KEY)?.as_deref());
        let streak = codec::decode_streak(kv.get(STREAK_KEY)?.as_deref());
        let next_id = match tasks.iter().map(|t| t.id).max() {
            Some(max) => max.next(),
            None => Some(TaskId(1)),
        };

        debug!(
            tasks = tasks.len(),
            streak = streak.count,
            "Loaded task store"
        );

        Ok(Self {
            kv,
            clock,
            tasks,
            streak,
            next_id,
        })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn streak(&self) -> Streak {
        self.streak
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn progress(&self) -> Progress {
        view::progress(&self.tasks)
    }

    /// Append a new open task. Names that trim to empty are rejected.
    pub fn create(
        &mut self,
        name: &str,
        date: NaiveDate,
        priority: Priority,
    ) -> TodoResult<TaskId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TodoError::empty_name());
        }
        let id = self
            .next_id
            .ok_or_else(|| TodoError::internal("no task ids left"))?;

        let mut tasks = self.tasks.clone();
        tasks.push(Task {
            id,
            name: name.to_string(),
            date,
            priority,
            done: false,
            date_completed: None,
        });
        self.commit(tasks)?;
        self.next_id = id.next();

        info!(task_id = %id, %date, %priority, "Created task");
        Ok(id)
    }

    /// Mark a task done (stamping the completion time) or open again.
    pub fn toggle(&mut self, id: TaskId, done: bool) -> TodoResult<()> {
        let now = self.clock.now();
        let index = self.position(id)?;
        let mut tasks = self.tasks.clone();
        tasks[index].done = done;
        tasks[index].date_completed = done.then_some(now);
        self.commit(tasks)?;

        info!(task_id = %id, done, "Toggled task");
        Ok(())
    }

    /// Replace a task's name. Names that trim to empty are rejected.
    pub fn rename(&mut self, id: TaskId, new_name: &str) -> TodoResult<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(TodoError::empty_name());
        }

        let index = self.position(id)?;
        let mut tasks = self.tasks.clone();
        tasks[index].name = new_name.to_string();
        self.commit(tasks)?;

        info!(task_id = %id, "Renamed task");
        Ok(())
    }

    /// Remove a task, returning it.
    pub fn delete(&mut self, id: TaskId) -> TodoResult<Task> {
        let index = self.position(id)?;
        let mut tasks = self.tasks.clone();
        let removed = tasks.remove(index);
        self.commit(tasks)?;

        info!(task_id = %id, "Deleted task");
        Ok(removed)
    }

    /// Reorder the stored sequence by date. Ties keep their relative order.
    pub fn sort_by_date(&mut self) -> TodoResult<()> {
        let mut tasks = self.tasks.clone();
        tasks.sort_by_key(|t| t.date);
        self.commit(tasks)?;

        info!(tasks = self.tasks.len(), "Sorted tasks by date");
        Ok(())
    }

    /// Run the daily streak transition for today and persist the result.
    pub fn evaluate_streak(&mut self) -> TodoResult<Streak> {
        let before = self.streak;
        let after = streak::evaluate(before, &self.tasks, self.clock.as_ref());
        self.save_streak(&after)?;
        self.streak = after;

        if after != before {
            info!(
                count = after.count,
                last_date = ?after.last_date,
                "Streak updated"
            );
        }
        Ok(after)
    }

    fn position(&self, id: TaskId) -> TodoResult<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TodoError::task_not_found(id))
    }

    /// Persist `tasks`, then adopt them. On failure the store is unchanged.
    fn commit(&mut self, tasks: Vec<Task>) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&tasks).map_err(|source| StorageError::Encode {
            key: TASKS_KEY.to_string(),
            source,
        })?;
        self.kv.set(TASKS_KEY, &raw)?;
        self.tasks = tasks;
        debug!(tasks = self.tasks.len(), "Saved tasks");
        Ok(())
    }

    fn save_streak(&self, streak: &Streak) -> Result<(), StorageError> {
        let raw = serde_json::to_string(streak).map_err(|source| StorageError::Encode {
            key: STREAK_KEY.to_string(),
            source,
        })?;
        self.kv.set(STREAK_KEY, &raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::kv::MemoryStore;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn setup() -> (Arc<MemoryStore>, TaskStore) {
        let kv = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::at_day(day(10, 14)));
        let store = TaskStore::load(kv.clone(), clock).unwrap();
        (kv, store)
    }

    #[test]
    fn test_create_trims_and_persists() {
        let (kv, mut store) = setup();
        let id = store.create("  Buy milk ", day(10, 15), Priority::High).unwrap();

        let task = store.get(id).unwrap();
        assert_eq!(task.name, "Buy milk");
        assert!(!task.done);
        assert!(task.date_completed.is_none());

        let raw = kv.get(TASKS_KEY).unwrap().unwrap();
        assert!(raw.contains("Buy milk"));
    }

    #[test]
    fn test_blank_name_rejected_without_write() {
        let (kv, mut store) = setup();
        let err = store.create(" \t ", day(10, 15), Priority::Low).unwrap_err();
        assert!(err.is_rejection());
        assert!(store.tasks().is_empty());
        assert_eq!(kv.get(TASKS_KEY).unwrap(), None);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let (_kv, mut store) = setup();
        let a = store.create("a", day(10, 1), Priority::Low).unwrap();
        let b = store.create("b", day(10, 1), Priority::Low).unwrap();
        store.delete(b).unwrap();
        let c = store.create("c", day(10, 1), Priority::Low).unwrap();
        assert_ne!(b, c);
        assert!(c > a);
    }

    /// Backend whose writes always fail.
    struct ReadOnlyStore(MemoryStore);

    impl KvStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let seeded = serde_json::json!([
            {"id": 1, "name": "kept", "date": "2026-10-14", "priority": "low", "done": false}
        ])
        .to_string();
        let kv = Arc::new(ReadOnlyStore(MemoryStore::with_values([(TASKS_KEY, seeded)])));
        let clock = Arc::new(FixedClock::at_day(day(10, 14)));
        let mut store = TaskStore::load(kv, clock).unwrap();
        let before = store.tasks().to_vec();

        let err = store.create("new", day(10, 15), Priority::High).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::StorageError);
        assert!(store.toggle(TaskId(1), true).is_err());
        assert!(store.rename(TaskId(1), "renamed").is_err());
        assert!(store.delete(TaskId(1)).is_err());
        assert!(store.evaluate_streak().is_err());
        assert_eq!(store.tasks(), before.as_slice());
        assert_eq!(store.streak(), Streak::default());

        // The id was not consumed by the failed create.
        assert_eq!(store.next_id, Some(TaskId(2)));
    }

    #[test]
    fn test_create_fails_once_ids_are_exhausted() {
        let seeded = serde_json::json!([
            {"id": TaskId::MAX.0, "name": "last", "date": "2026-10-14", "priority": "low", "done": false}
        ])
        .to_string();
        let kv = Arc::new(MemoryStore::with_values([(TASKS_KEY, seeded)]));
        let clock = Arc::new(FixedClock::at_day(day(10, 14)));
        let mut store = TaskStore::load(kv, clock).unwrap();
        assert_eq!(store.tasks().len(), 1);

        let err = store.create("one more", day(10, 14), Priority::Low).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InternalError);
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn test_load_with_out_of_range_id_starts_empty() {
        let seeded = serde_json::json!([
            {"id": u64::MAX, "name": "x", "date": "2026-10-14", "priority": "low", "done": false},
            {"name": "legacy", "date": "2026-10-14", "priority": "low", "done": false}
        ])
        .to_string();
        let kv = Arc::new(MemoryStore::with_values([(TASKS_KEY, seeded)]));
        let clock = Arc::new(FixedClock::at_day(day(10, 14)));
        let mut store = TaskStore::load(kv, clock).unwrap();
        assert!(store.tasks().is_empty());
        assert_eq!(store.create("fresh", day(10, 14), Priority::Low).unwrap(), TaskId(1));
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let (_kv, mut store) = setup();
        let err = store.toggle(TaskId(99), true).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::TaskNotFound);
    }
}
