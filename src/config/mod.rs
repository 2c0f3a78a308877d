//! Layered configuration.
//!
//! Tiers, lowest to highest priority, merged field-by-field:
//! 1. **Defaults** - built into the binary
//! 2. **Project** - `$CWD/task-streak/config.yaml`
//! 3. **User** - `~/.task-streak/config.yaml`
//! 4. **Explicit** - `--config FILE` or `TASK_STREAK_CONFIG_PATH`
//! 5. **Environment** - individual overrides
//!
//! ## Environment Variables
//! - `TASK_STREAK_CONFIG_PATH` - Explicit config file
//! - `TASK_STREAK_DATA_DIR` - Data directory
//! - `TASK_STREAK_BACKEND` - `memory`, `json` or `sqlite`
//! - `TASK_STREAK_REMINDER_HOURS` - Hours between notifications
//! - `TASK_STREAK_NOTIFICATIONS` - `granted`, `denied` or `prompt`
//! - `TASK_STREAK_FORMAT` - `text`, `markdown` or `json`
//! - `TASK_STREAK_USER_DIR` - User config dir (default: `~/.task-streak`)
//! - `TASK_STREAK_PROJECT_DIR` - Project config dir (default: `./task-streak`)

mod loader;
mod merge;
mod types;

pub use loader::{CONFIG_PATH_ENV, ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
