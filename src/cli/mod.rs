//! CLI command definitions for task-streak
//!
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::config::StorageBackend;
use crate::format::OutputFormat;
use crate::store::codec::parse_day;
use crate::types::{Priority, StatusFilter, TaskId};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Storage backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Memory,
    Json,
    Sqlite,
}

impl From<BackendArg> for StorageBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Memory => StorageBackend::Memory,
            BackendArg::Json => StorageBackend::Json,
            BackendArg::Sqlite => StorageBackend::Sqlite,
        }
    }
}

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    #[value(alias = "md")]
    Markdown,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Listing filter selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FilterArg {
    #[default]
    All,
    Active,
    Completed,
}

impl From<FilterArg> for StatusFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => StatusFilter::All,
            FilterArg::Active => StatusFilter::Active,
            FilterArg::Completed => StatusFilter::Completed,
        }
    }
}

/// To-do list with a daily completion streak
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory (overrides config)
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Storage backend (overrides config)
    #[arg(short, long, value_enum, global = true)]
    pub backend: Option<BackendArg>,

    /// Output format (overrides config)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<FormatArg>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a task
    Add(AddArgs),

    /// Mark a task done
    Done {
        #[arg(value_name = "ID")]
        id: TaskId,
    },

    /// Mark a task as not done
    Undo {
        #[arg(value_name = "ID")]
        id: TaskId,
    },

    /// Change a task's name
    Rename {
        #[arg(value_name = "ID")]
        id: TaskId,
        /// New name
        name: String,
    },

    /// Delete a task
    Delete {
        #[arg(value_name = "ID")]
        id: TaskId,
    },

    /// List tasks ordered by date (default if no subcommand given)
    List(ListArgs),

    /// Reorder the stored list by date
    Sort,

    /// Show a month calendar marking days with tasks
    Calendar(CalendarArgs),

    /// Show the daily completion streak
    Streak,

    /// Show the share of tasks done
    Progress,

    /// Sound a one-shot reminder after a delay
    Remind(RemindArgs),

    /// Run the recurring reminder notification until interrupted
    Watch,

    /// Write a JSON snapshot of tasks and streak
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task name
    pub name: String,

    /// Due date, YYYY-MM-DD (default: today)
    #[arg(long, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,

    /// low, medium or high
    #[arg(short, long, value_parser = parse_priority_arg, default_value = "medium")]
    pub priority: Priority,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Which tasks to show
    #[arg(long, value_enum, default_value_t = FilterArg::All)]
    pub filter: FilterArg,

    /// Case-insensitive name search
    #[arg(short, long, default_value = "")]
    pub search: String,
}

#[derive(Args, Debug)]
pub struct CalendarArgs {
    /// Year (default: current)
    #[arg(long)]
    pub year: Option<i32>,

    /// Month 1-12 (default: current)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
}

#[derive(Args, Debug)]
pub struct RemindArgs {
    /// Reminder text
    pub message: String,

    /// Delay in seconds
    #[arg(long = "in", value_name = "SECONDS")]
    pub delay_secs: u64,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_day(s).ok_or_else(|| format!("{:?} is not a date (expected YYYY-MM-DD)", s))
}

fn parse_priority_arg(s: &str) -> Result<Priority, String> {
    Priority::parse(s).ok_or_else(|| format!("{:?} is not one of low, medium, high", s))
}
