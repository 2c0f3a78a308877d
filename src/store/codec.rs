//! Total decoding of persisted state.
//!
//! Raw payloads are checked against the recognized shape. Anything that does
//! not match decodes to the default value and the fallback is logged, so a
//! corrupted key never stops the application from starting.

use crate::types::{Priority, Streak, Task, TaskId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::warn;

/// Reasons a payload was not recognized.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("not valid JSON of the expected shape: {0}")]
    Json(#[from] serde_json::Error),

    #[error("task {index}: {field} {reason}")]
    Field {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("duplicate task id {0}")]
    DuplicateId(TaskId),

    #[error("streak: {0}")]
    Streak(String),
}

fn field_error(index: usize, field: &'static str, reason: impl Into<String>) -> ShapeError {
    ShapeError::Field {
        index,
        field,
        reason: reason.into(),
    }
}

/// Task record as it appears on disk. `id` is absent in legacy payloads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTask {
    #[serde(default)]
    id: Option<u64>,
    name: String,
    date: String,
    priority: String,
    done: bool,
    #[serde(default)]
    date_completed: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredStreak {
    count: u32,
    #[serde(default)]
    last_date: Option<String>,
}

/// Parse a day in ISO form, or in the long form `Wed Oct 14 2026`.
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%a %b %d %Y"))
        .ok()
}

/// Strictly parse a serialized task sequence.
///
/// Records without an id are given fresh ids above every id in the payload.
pub fn parse_tasks(raw: &str) -> Result<Vec<Task>, ShapeError> {
    let stored: Vec<StoredTask> = serde_json::from_str(raw)?;

    let mut seen = HashSet::new();
    for (index, record) in stored.iter().enumerate() {
        let Some(id) = record.id else { continue };
        if id > TaskId::MAX.0 {
            return Err(field_error(index, "id", format!("{} is out of range", id)));
        }
        if !seen.insert(id) {
            return Err(ShapeError::DuplicateId(TaskId(id)));
        }
    }
    let mut next_id = match seen.iter().max() {
        Some(&max) => TaskId(max).next(),
        None => Some(TaskId(1)),
    };

    let mut tasks = Vec::with_capacity(stored.len());
    for (index, record) in stored.into_iter().enumerate() {
        let name = record.name.trim();
        if name.is_empty() {
            return Err(field_error(index, "name", "is empty"));
        }

        let date = parse_day(&record.date)
            .ok_or_else(|| field_error(index, "date", format!("{:?} is not a date", record.date)))?;

        let priority = Priority::parse(&record.priority).ok_or_else(|| {
            field_error(
                index,
                "priority",
                format!("{:?} is not a priority", record.priority),
            )
        })?;

        let date_completed = match (record.done, record.date_completed) {
            (true, Some(ts)) => Some(
                DateTime::parse_from_rfc3339(&ts)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| field_error(index, "dateCompleted", e.to_string()))?,
            ),
            (false, None) => None,
            (true, None) => {
                return Err(field_error(index, "dateCompleted", "missing on a done task"));
            }
            (false, Some(_)) => {
                return Err(field_error(index, "dateCompleted", "set on an open task"));
            }
        };

        let id = match record.id {
            Some(id) => TaskId(id),
            None => {
                let id = next_id.ok_or_else(|| field_error(index, "id", "cannot be assigned"))?;
                next_id = id.next();
                id
            }
        };

        tasks.push(Task {
            id,
            name: name.to_string(),
            date,
            priority,
            done: record.done,
            date_completed,
        });
    }

    Ok(tasks)
}

/// Strictly parse a serialized streak.
pub fn parse_streak(raw: &str) -> Result<Streak, ShapeError> {
    let stored: StoredStreak = serde_json::from_str(raw)?;
    let last_date = match stored.last_date {
        Some(day) => Some(
            parse_day(&day).ok_or_else(|| ShapeError::Streak(format!("{:?} is not a date", day)))?,
        ),
        None => None,
    };
    Ok(Streak {
        count: stored.count,
        last_date,
    })
}

/// Decode the `tasks` key. Absent or unrecognized payloads yield an empty list.
pub fn decode_tasks(raw: Option<&str>) -> Vec<Task> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match parse_tasks(raw) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(error = %e, "Stored tasks are malformed, starting with an empty list");
            Vec::new()
        }
    }
}

/// Decode the `streak` key. Absent or unrecognized payloads yield a zero streak.
pub fn decode_streak(raw: Option<&str>) -> Streak {
    let Some(raw) = raw else {
        return Streak::default();
    };
    match parse_streak(raw) {
        Ok(streak) => streak,
        Err(e) => {
            warn!(error = %e, "Stored streak is malformed, resetting to zero");
            Streak::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_legacy_records_get_ids() {
        let raw = json!([
            {"name": "a", "date": "2026-01-02", "priority": "low", "done": false, "dateCompleted": null},
            {"id": 7, "name": "b", "date": "2026-01-01", "priority": "high", "done": true,
             "dateCompleted": "2026-01-01T10:00:00.000Z"},
            {"name": "c", "date": "2026-01-03", "priority": "medium", "done": false},
        ])
        .to_string();

        let tasks = parse_tasks(&raw).unwrap();
        let ids: Vec<u64> = tasks.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![8, 7, 9]);
        assert_eq!(tasks[1].date, day(2026, 1, 1));
        assert!(tasks[1].date_completed.is_some());
    }

    #[test]
    fn test_done_without_timestamp_is_mismatch() {
        let raw = json!([
            {"id": 1, "name": "a", "date": "2026-01-02", "priority": "low", "done": true, "dateCompleted": null}
        ])
        .to_string();
        assert!(matches!(
            parse_tasks(&raw),
            Err(ShapeError::Field { field: "dateCompleted", .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let raw = json!([
            {"id": 1, "name": "a", "date": "2026-01-02", "priority": "low", "done": false},
            {"id": 1, "name": "b", "date": "2026-01-02", "priority": "low", "done": false}
        ])
        .to_string();
        assert!(matches!(parse_tasks(&raw), Err(ShapeError::DuplicateId(TaskId(1)))));
    }

    #[test]
    fn test_out_of_range_ids_fall_back() {
        let raw = json!([
            {"id": u64::MAX, "name": "a", "date": "2026-01-02", "priority": "low", "done": false},
            {"name": "legacy", "date": "2026-01-02", "priority": "low", "done": false}
        ])
        .to_string();
        assert!(matches!(parse_tasks(&raw), Err(ShapeError::Field { field: "id", .. })));
        assert!(decode_tasks(Some(&raw)).is_empty());
    }

    #[test]
    fn test_legacy_id_cannot_exceed_max() {
        let raw = json!([
            {"id": TaskId::MAX.0, "name": "a", "date": "2026-01-02", "priority": "low", "done": false},
            {"name": "legacy", "date": "2026-01-02", "priority": "low", "done": false}
        ])
        .to_string();
        assert!(matches!(parse_tasks(&raw), Err(ShapeError::Field { index: 1, field: "id", .. })));

        let raw = json!([
            {"id": TaskId::MAX.0, "name": "a", "date": "2026-01-02", "priority": "low", "done": false}
        ])
        .to_string();
        assert_eq!(parse_tasks(&raw).unwrap()[0].id, TaskId::MAX);
    }

    #[test]
    fn test_decode_falls_back_on_garbage() {
        assert!(decode_tasks(Some("not json")).is_empty());
        assert!(decode_tasks(Some(r#"{"tasks": []}"#)).is_empty());
        assert!(decode_tasks(None).is_empty());
        assert_eq!(decode_streak(Some(r#"{"count": -3}"#)), Streak::default());
        assert_eq!(decode_streak(Some("[]")), Streak::default());
    }

    #[test]
    fn test_streak_accepts_long_day_form() {
        let streak = decode_streak(Some(r#"{"count": 4, "lastDate": "Wed Oct 14 2026"}"#));
        assert_eq!(streak.count, 4);
        assert_eq!(streak.last_date, Some(day(2026, 10, 14)));

        let streak = decode_streak(Some(r#"{"count": 0, "lastDate": null}"#));
        assert_eq!(streak, Streak::default());
    }
}
