//! Month grid annotated with task days and today.

use crate::error::{TodoError, TodoResult};
use crate::types::Task;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashSet;

/// Column headers, Sunday first.
pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub date: NaiveDate,
    pub has_task: bool,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    /// Empty cells before day 1 (weekday of day 1, Sunday = 0).
    pub leading_blanks: u32,
    pub cells: Vec<DayCell>,
}

impl CalendarMonth {
    /// Rows of seven slots; `None` is a blank.
    pub fn weeks(&self) -> Vec<Vec<Option<&DayCell>>> {
        let mut slots: Vec<Option<&DayCell>> = Vec::new();
        slots.extend((0..self.leading_blanks).map(|_| None));
        slots.extend(self.cells.iter().map(Some));
        while slots.len() % 7 != 0 {
            slots.push(None);
        }
        slots.chunks(7).map(|week| week.to_vec()).collect()
    }
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// Build the grid for `year`/`month`.
pub fn month_grid(
    year: i32,
    month: u32,
    tasks: &[Task],
    today: NaiveDate,
) -> TodoResult<CalendarMonth> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| TodoError::invalid_value("month", "month must be between 1 and 12"))?;
    let days = days_in_month(year, month)
        .ok_or_else(|| TodoError::invalid_value("month", "month is out of range"))?;

    let task_days: HashSet<NaiveDate> = tasks.iter().map(|t| t.date).collect();

    let cells = (1..=days)
        .filter_map(|day| first.with_day(day))
        .map(|date| DayCell {
            day: date.day(),
            date,
            has_task: task_days.contains(&date),
            is_today: date == today,
        })
        .collect();

    Ok(CalendarMonth {
        year,
        month,
        leading_blanks: first.weekday().num_days_from_sunday(),
        cells,
    })
}
