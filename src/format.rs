//! Output formatting utilities for plain text, markdown and JSON.

use crate::calendar::{CalendarMonth, DAY_NAMES, DayCell};
use crate::types::{Progress, Streak, TaskRow};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| json!({ "error": e.to_string() }).to_string())
}

/// Format one task line.
pub fn format_row(row: &TaskRow, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!(
            "[{}] #{:<3} {} — {} — {}",
            if row.done { "x" } else { " " },
            row.id,
            row.name,
            row.date,
            row.priority
        ),
        OutputFormat::Markdown => {
            let name = if row.strikethrough {
                format!("~~**{}**~~", row.name)
            } else {
                format!("**{}**", row.name)
            };
            format!(
                "- [{}] `{}` {} — {} — {}",
                if row.done { "x" } else { " " },
                row.id,
                name,
                row.date,
                row.priority
            )
        }
        OutputFormat::Json => to_json(row),
    }
}

/// Format a task listing.
pub fn format_rows(rows: &[TaskRow], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&rows),
        OutputFormat::Markdown => {
            let mut md = format!("# Tasks ({})\n\n", rows.len());
            for row in rows {
                md.push_str(&format_row(row, format));
                md.push('\n');
            }
            md
        }
        OutputFormat::Text => {
            if rows.is_empty() {
                return "No tasks.\n".to_string();
            }
            let mut out = String::new();
            for row in rows {
                out.push_str(&format_row(row, format));
                out.push('\n');
            }
            out
        }
    }
}

pub fn format_progress(progress: &Progress, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(progress),
        OutputFormat::Markdown => format!(
            "**Progress**: {}% ({}/{})\n",
            progress.percent, progress.done, progress.total
        ),
        OutputFormat::Text => {
            let filled = usize::from(progress.percent) / 5;
            format!(
                "[{}{}] {}% ({}/{})\n",
                "#".repeat(filled),
                "-".repeat(20 - filled),
                progress.percent,
                progress.done,
                progress.total
            )
        }
    }
}

pub fn format_streak(streak: &Streak, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(streak),
        OutputFormat::Markdown => format!("**Streak**: {}\n", streak.count),
        OutputFormat::Text => {
            let days = if streak.count == 1 { "day" } else { "days" };
            match streak.last_date {
                Some(last) => format!(
                    "Streak: {} {} (last completion {})\n",
                    streak.count, days, last
                ),
                None => format!("Streak: {} {}\n", streak.count, days),
            }
        }
    }
}

/// Format the month grid.
///
/// Text and markdown mark task days with `*` and today with brackets.
pub fn format_calendar(month: &CalendarMonth, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return to_json(month);
    }

    let cell = |slot: Option<&DayCell>| -> String {
        match slot {
            None => "     ".to_string(),
            Some(c) => {
                let mark = if c.has_task { "*" } else { " " };
                if c.is_today {
                    format!("[{:>2}]{}", c.day, mark)
                } else {
                    format!(" {:>2} {}", c.day, mark)
                }
            }
        }
    };

    let mut out = String::new();
    if format == OutputFormat::Markdown {
        out.push_str(&format!("## {}-{:02}\n\n```\n", month.year, month.month));
    } else {
        out.push_str(&format!("{}-{:02}\n", month.year, month.month));
    }

    let header: Vec<String> = DAY_NAMES.iter().map(|d| format!(" {:<5}", d)).collect();
    out.push_str(header.join("").trim_end());
    out.push('\n');

    for week in month.weeks() {
        let line: String = week.into_iter().map(|slot| format!(" {}", cell(slot))).collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if format == OutputFormat::Markdown {
        out.push_str("```\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::month_grid;
    use crate::types::{Priority, TaskId};
    use chrono::NaiveDate;

    fn row(done: bool) -> TaskRow {
        TaskRow {
            id: TaskId(2),
            done,
            strikethrough: done,
            name: "Call mom".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
            priority: Priority::Low,
        }
    }

    #[test]
    fn test_markdown_strikes_done_rows() {
        let line = format_row(&row(true), OutputFormat::Markdown);
        assert!(line.contains("~~**Call mom**~~"));
        assert!(line.starts_with("- [x]"));

        let line = format_row(&row(false), OutputFormat::Markdown);
        assert!(!line.contains("~~"));
    }

    #[test]
    fn test_text_row_layout() {
        let line = format_row(&row(false), OutputFormat::Text);
        assert_eq!(line, "[ ] #2   Call mom — 2026-10-14 — low");
    }

    #[test]
    fn test_json_rows_array() {
        let out = format_rows(&[row(true)], OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["strikethrough"], true);
        assert_eq!(value[0]["priority"], "low");
    }

    #[test]
    fn test_progress_bar() {
        let progress = Progress { done: 1, total: 2, percent: 50 };
        assert_eq!(
            format_progress(&progress, OutputFormat::Text),
            "[##########----------] 50% (1/2)\n"
        );
    }

    #[test]
    fn test_calendar_marks_today() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let grid = month_grid(2026, 10, &[], today).unwrap();
        let text = format_calendar(&grid, OutputFormat::Text);
        assert!(text.starts_with("2026-10\n"));
        assert!(text.contains("[14]"));
        assert!(text.lines().nth(1).unwrap().starts_with(" Sun"));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("MD"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::parse("yaml"), None);
    }
}
