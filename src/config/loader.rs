//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::{Config, PermissionSetting, StorageBackend};
use crate::format::OutputFormat;
use anyhow::{Result, anyhow};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "TASK_STREAK_CONFIG_PATH";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Built-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/task-streak/)
    Project = 1,
    /// User-level config (~/.task-streak/)
    User = 2,
    /// Explicit file from --config or TASK_STREAK_CONFIG_PATH
    Explicit = 3,
    /// Environment variables (highest priority)
    Environment = 4,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Explicit => write!(f, "explicit"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Paths for each configuration tier.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: TASK_STREAK_USER_DIR or ~/.task-streak
        let user_dir = std::env::var("TASK_STREAK_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".task-streak")));

        // Project dir: TASK_STREAK_PROJECT_DIR or $CWD/task-streak
        let project_dir = std::env::var("TASK_STREAK_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("task-streak")));

        Self {
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// What contributed to each tier, lowest tier first: a file path for file
    /// tiers, the variable name for environment overrides.
    sources: Vec<(ConfigTier, String)>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    ///
    /// `explicit` (from `--config`) wins over `TASK_STREAK_CONFIG_PATH`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));
        Self::load_with(ConfigPaths::discover(), explicit.as_deref(), |name| {
            std::env::var(name).ok()
        })
    }

    /// Load configuration with explicit paths and environment lookup.
    pub fn load_with<F>(paths: ConfigPaths, explicit: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut configs: Vec<Value> = Vec::new();
        let mut sources = Vec::new();

        // Tier 1: Defaults
        configs.push(serde_json::to_value(Config::default())?);
        sources.push((ConfigTier::Defaults, "built-in".to_string()));

        // Tier 2: Project config
        if let Some(ref project_dir) = paths.project_dir {
            let path = project_dir.join("config.yaml");
            if let Some(value) = read_tier(&path, ConfigTier::Project) {
                configs.push(value);
                sources.push((ConfigTier::Project, path.display().to_string()));
            }
        }

        // Tier 3: User config
        if let Some(ref user_dir) = paths.user_dir {
            let path = user_dir.join("config.yaml");
            if let Some(value) = read_tier(&path, ConfigTier::User) {
                configs.push(value);
                sources.push((ConfigTier::User, path.display().to_string()));
            }
        }

        // Tier 4: Explicit file must exist and parse
        if let Some(path) = explicit {
            let content = std::fs::read_to_string(path)
                .map_err(|e| anyhow!("cannot read config {}: {}", path.display(), e))?;
            let value: Value = serde_yaml::from_str(&content)
                .map_err(|e| anyhow!("invalid config {}: {}", path.display(), e))?;
            configs.push(value);
            sources.push((ConfigTier::Explicit, path.display().to_string()));
        }

        let merged = deep_merge_all(configs);
        let mut config: Config = serde_json::from_value(merged)?;

        // Tier 5: Environment variable overrides
        for name in apply_env_overrides(&mut config, env) {
            sources.push((ConfigTier::Environment, name.to_string()));
        }

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Tiers that contributed, lowest first.
    pub fn sources(&self) -> &[(ConfigTier, String)] {
        &self.sources
    }
}

/// Read an optional tier file. Unreadable or invalid files are skipped.
fn read_tier(path: &Path, tier: ConfigTier) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| serde_yaml::from_str::<Value>(&content).map_err(|e| e.to_string()));
    match parsed {
        Ok(value) => {
            debug!(%tier, path = %path.display(), "Loaded config tier");
            Some(value)
        }
        Err(e) => {
            warn!(%tier, path = %path.display(), error = %e, "Ignoring unreadable config file");
            None
        }
    }
}

/// Apply environment variable overrides to config. Returns the names of the
/// variables that took effect.
fn apply_env_overrides<F>(config: &mut Config, env: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();

    if let Some(dir) = env("TASK_STREAK_DATA_DIR") {
        config.storage.dir = PathBuf::from(dir);
        applied.push("TASK_STREAK_DATA_DIR");
    }

    if let Some(backend) = env("TASK_STREAK_BACKEND") {
        let parsed = match backend.to_lowercase().as_str() {
            "memory" => Some(StorageBackend::Memory),
            "json" => Some(StorageBackend::Json),
            "sqlite" => Some(StorageBackend::Sqlite),
            _ => None,
        };
        match parsed {
            Some(backend) => {
                config.storage.backend = backend;
                applied.push("TASK_STREAK_BACKEND");
            }
            None => warn!(value = %backend, "Ignoring unknown TASK_STREAK_BACKEND"),
        }
    }

    if let Some(hours) = env("TASK_STREAK_REMINDER_HOURS") {
        match hours.parse() {
            Ok(hours) => {
                config.reminders.interval_hours = hours;
                applied.push("TASK_STREAK_REMINDER_HOURS");
            }
            Err(_) => warn!(value = %hours, "Ignoring non-numeric TASK_STREAK_REMINDER_HOURS"),
        }
    }

    if let Some(permission) = env("TASK_STREAK_NOTIFICATIONS") {
        let parsed = match permission.to_lowercase().as_str() {
            "granted" => Some(PermissionSetting::Granted),
            "denied" => Some(PermissionSetting::Denied),
            "prompt" => Some(PermissionSetting::Prompt),
            _ => None,
        };
        match parsed {
            Some(setting) => {
                config.reminders.notifications = setting;
                applied.push("TASK_STREAK_NOTIFICATIONS");
            }
            None => warn!(value = %permission, "Ignoring unknown TASK_STREAK_NOTIFICATIONS"),
        }
    }

    if let Some(format) = env("TASK_STREAK_FORMAT") {
        match OutputFormat::parse(&format) {
            Some(format) => {
                config.display.format = format;
                applied.push("TASK_STREAK_FORMAT");
            }
            None => warn!(value = %format, "Ignoring unknown TASK_STREAK_FORMAT"),
        }
    }

    applied
}
