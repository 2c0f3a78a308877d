//! One-shot alarms and the recurring "check your tasks" notification.
//!
//! Neither timer touches the task store. The recurring loop may read the
//! persisted list through a [`KvStore`] handle to mention how many tasks are
//! still open, and copes with the list being empty or missing.

use crate::config::{ChimeKind, PermissionSetting, RemindersConfig};
use crate::kv::{KvStore, TASKS_KEY};
use crate::store::codec;
use anyhow::{Context, Result};
use std::io::{IsTerminal, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

/// Outcome of the one-time permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Where alerts and notifications are shown.
pub trait Notifier: Send + Sync {
    /// Ask for permission to show notifications. Called once per process.
    fn request_permission(&self) -> Permission;

    /// Show an alarm alert. Alerts are not gated on notification permission.
    fn alert(&self, message: &str);

    /// Show a notification.
    fn notify(&self, title: &str, body: &str);
}

/// Sound played with an alert.
pub trait Chime: Send + Sync {
    fn play(&self) -> Result<()>;
}

/// Writes alerts and notifications to stderr.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    setting: PermissionSetting,
}

impl TerminalNotifier {
    pub fn new(setting: PermissionSetting) -> Self {
        Self { setting }
    }
}

impl Notifier for TerminalNotifier {
    fn request_permission(&self) -> Permission {
        match self.setting {
            PermissionSetting::Granted => Permission::Granted,
            PermissionSetting::Denied => Permission::Denied,
            // Nobody would see a notification without a terminal.
            PermissionSetting::Prompt if std::io::stderr().is_terminal() => Permission::Granted,
            PermissionSetting::Prompt => Permission::Denied,
        }
    }

    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn notify(&self, title: &str, body: &str) {
        eprintln!("{}: {}", title, body);
    }
}

/// Terminal bell.
#[derive(Debug, Clone, Copy, Default)]
pub struct BellChime;

impl Chime for BellChime {
    fn play(&self) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(b"\x07").context("writing bell")?;
        stdout.flush().context("flushing bell")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentChime;

impl Chime for SilentChime {
    fn play(&self) -> Result<()> {
        Ok(())
    }
}

pub fn chime_for(kind: ChimeKind) -> Arc<dyn Chime> {
    match kind {
        ChimeKind::Bell => Arc::new(BellChime),
        ChimeKind::Silent => Arc::new(SilentChime),
    }
}

/// Something a [`RecordingNotifier`] was asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Alert(String),
    Notification { title: String, body: String },
}

/// Keeps everything it is asked to show; for tests and dry runs.
#[derive(Debug)]
pub struct RecordingNotifier {
    permission: Permission,
    requests: Mutex<usize>,
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission,
            requests: Mutex::new(0),
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// How many times permission was requested.
    pub fn permission_requests(&self) -> usize {
        *self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notice);
    }
}

impl Notifier for RecordingNotifier {
    fn request_permission(&self) -> Permission {
        *self.requests.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        self.permission
    }

    fn alert(&self, message: &str) {
        self.record(Notice::Alert(message.to_string()));
    }

    fn notify(&self, title: &str, body: &str) {
        self.record(Notice::Notification {
            title: title.to_string(),
            body: body.to_string(),
        });
    }
}

/// Text shown when an alarm fires.
pub fn alert_text(message: &str) -> String {
    format!("⏰ Reminder: {}", message)
}

/// Show the alert and play the chime. A failing chime is logged, not raised.
pub fn fire_alarm(message: &str, notifier: &dyn Notifier, chime: &dyn Chime) {
    notifier.alert(&alert_text(message));
    if let Err(e) = chime.play() {
        warn!(error = %e, "Error playing alarm sound");
    }
}

/// Fire an alarm once after `delay`.
pub fn schedule_alarm(
    message: impl Into<String>,
    delay: Duration,
    notifier: Arc<dyn Notifier>,
    chime: Arc<dyn Chime>,
) -> JoinHandle<()> {
    let message = message.into();
    debug!(delay_secs = delay.as_secs(), "Alarm scheduled");
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        info!(message = %message, "Alarm fired");
        fire_alarm(&message, notifier.as_ref(), chime.as_ref());
    })
}

/// Recurring notification reminding the user to look at their tasks.
pub struct NotificationLoop {
    notifier: Arc<dyn Notifier>,
    permission: Permission,
    period: Duration,
    title: String,
    message: String,
    kv: Option<Arc<dyn KvStore>>,
}

impl NotificationLoop {
    /// `permission` is the answer to the single startup request.
    pub fn new(
        notifier: Arc<dyn Notifier>,
        permission: Permission,
        config: &RemindersConfig,
    ) -> Self {
        Self {
            notifier,
            permission,
            period: config.interval(),
            title: config.title.clone(),
            message: config.message.clone(),
            kv: None,
        }
    }

    /// Mention the open-task count read from this store.
    pub fn with_store(mut self, kv: Arc<dyn KvStore>) -> Self {
        self.kv = Some(kv);
        self
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Notification body, with the open-task count when it is known and non-zero.
    pub fn body(&self) -> String {
        let Some(ref kv) = self.kv else {
            return self.message.clone();
        };
        match kv.get(TASKS_KEY) {
            Ok(raw) => {
                let open = codec::decode_tasks(raw.as_deref())
                    .iter()
                    .filter(|t| !t.done)
                    .count();
                if open == 0 {
                    self.message.clone()
                } else {
                    format!("{} ({} open)", self.message, open)
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not read tasks for reminder");
                self.message.clone()
            }
        }
    }

    /// One reminder. Returns whether a notification was shown.
    pub fn tick(&self) -> bool {
        if self.permission != Permission::Granted {
            info!("Notification permission not granted. Cannot show notification.");
            return false;
        }
        self.notifier.notify(&self.title, &self.body());
        true
    }

    /// Remind every period, starting one period from now. Never returns.
    ///
    /// A zero period, or one too long for the timer, disables reminders.
    pub async fn run(self) {
        let start = Instant::now().checked_add(self.period);
        let Some(start) = start.filter(|_| !self.period.is_zero()) else {
            warn!(
                period_secs = self.period.as_secs(),
                "Unusable reminder period, reminders disabled"
            );
            return std::future::pending().await;
        };
        let mut ticker = interval_at(start, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.tick();
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
