//! Display projection of the task list.

use crate::types::{Progress, StatusFilter, Task, TaskRow};

/// Filter and search applied to a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub filter: StatusFilter,
    pub search: String,
}

impl ViewQuery {
    pub fn new(filter: StatusFilter, search: impl Into<String>) -> Self {
        Self {
            filter,
            search: search.into(),
        }
    }

    fn matches(&self, task: &Task, needle: &str) -> bool {
        self.filter.keeps(task.done) && task.name.to_lowercase().contains(needle)
    }
}

/// Rows to display, ordered by date. The stored order is not touched.
pub fn project(tasks: &[Task], query: &ViewQuery) -> Vec<TaskRow> {
    let needle = query.search.to_lowercase();

    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by_key(|t| t.date);

    sorted
        .into_iter()
        .filter(|t| query.matches(t, &needle))
        .map(row)
        .collect()
}

/// Display row for one task. Done tasks are struck through.
pub fn row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id,
        done: task.done,
        strikethrough: task.done,
        name: task.name.clone(),
        date: task.date,
        priority: task.priority,
    }
}

/// Share of tasks that are done, rounded to the nearest whole percent.
pub fn progress(tasks: &[Task]) -> Progress {
    let total = tasks.len();
    let done = tasks.iter().filter(|t| t.done).count();
    let percent = if total == 0 {
        0
    } else {
        // Integer round-half-up of 100 * done / total.
        ((200 * done + total) / (2 * total)) as u8
    };
    Progress {
        done,
        total,
        percent,
    }
}
