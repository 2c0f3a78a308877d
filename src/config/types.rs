//! Configuration types and structures.

use crate::format::OutputFormat;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name of the SQLite database inside the data directory.
pub const SQLITE_FILE: &str = "tasks.db";

/// Longest reminder interval honoured, in hours (one week).
pub const MAX_INTERVAL_HOURS: u64 = 7 * 24;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub reminders: RemindersConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Which key-value backend holds the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Nothing survives the process (useful for trying things out).
    Memory,
    /// One `<key>.json` file per key (default).
    #[default]
    Json,
    /// A `kv` table in `tasks.db`.
    Sqlite,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Data directory. The JSON backend writes its key files here and the
    /// SQLite backend keeps `tasks.db` here.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    pub fn sqlite_path(&self) -> PathBuf {
        self.dir.join(SQLITE_FILE)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("task-streak"))
        .unwrap_or_else(|| PathBuf::from(".task-streak"))
}

/// Notification permission as configured by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionSetting {
    Granted,
    Denied,
    /// Decide once at startup from the environment.
    #[default]
    Prompt,
}

/// Sound played when an alarm fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChimeKind {
    /// Terminal bell.
    #[default]
    Bell,
    Silent,
}

/// Reminder and notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    /// Hours between recurring notifications (default: 4).
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_message")]
    pub message: String,

    #[serde(default)]
    pub notifications: PermissionSetting,

    #[serde(default)]
    pub chime: ChimeKind,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            interval_hours: default_interval_hours(),
            title: default_title(),
            message: default_message(),
            notifications: PermissionSetting::default(),
            chime: ChimeKind::default(),
        }
    }
}

impl RemindersConfig {
    /// Time between notifications. Hours are clamped to `1..=MAX_INTERVAL_HOURS`.
    pub fn interval(&self) -> std::time::Duration {
        let hours = self.interval_hours.clamp(1, MAX_INTERVAL_HOURS);
        std::time::Duration::from_secs(hours * 60 * 60)
    }
}

fn default_interval_hours() -> u64 {
    4
}

fn default_title() -> String {
    "Progress Tracker".to_string()
}

fn default_message() -> String {
    "Don't forget to check your tasks today!".to_string()
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Ensure the data directory exists.
    pub fn ensure_data_dir(&self) -> Result<()> {
        if self.storage.backend != StorageBackend::Memory {
            std::fs::create_dir_all(&self.storage.dir)?;
        }
        Ok(())
    }
}
