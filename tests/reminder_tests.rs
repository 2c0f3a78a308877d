//! Timer tests for alarms and the recurring notification.
//!
//! All tests run with paused tokio time, so hours pass instantly.

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use task_streak::config::RemindersConfig;
use task_streak::kv::MemoryStore;
use task_streak::reminder::{
    Chime, Notice, NotificationLoop, Notifier, Permission, RecordingNotifier, SilentChime,
    schedule_alarm,
};

#[derive(Default)]
struct CountingChime {
    plays: AtomicUsize,
}

impl Chime for CountingChime {
    fn play(&self) -> Result<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingChime;

impl Chime for FailingChime {
    fn play(&self) -> Result<()> {
        anyhow::bail!("audio device busy")
    }
}

fn notifications(notifier: &RecordingNotifier) -> usize {
    notifier
        .notices()
        .iter()
        .filter(|n| matches!(n, Notice::Notification { .. }))
        .count()
}

mod alarm_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn alarm_fires_once_after_delay() {
        let notifier = Arc::new(RecordingNotifier::new(Permission::Granted));
        let chime = Arc::new(CountingChime::default());

        let handle = schedule_alarm(
            "Take a break",
            Duration::from_secs(90),
            notifier.clone(),
            chime.clone(),
        );

        tokio::time::sleep(Duration::from_secs(89)).await;
        assert!(notifier.notices().is_empty());

        handle.await.unwrap();
        assert_eq!(
            notifier.notices(),
            vec![Notice::Alert("⏰ Reminder: Take a break".to_string())]
        );
        assert_eq!(chime.plays.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_chime_does_not_block_alert() {
        let notifier = Arc::new(RecordingNotifier::new(Permission::Denied));
        schedule_alarm("Call back", Duration::from_secs(5), notifier.clone(), Arc::new(FailingChime))
            .await
            .unwrap();
        assert_eq!(notifier.notices().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn alarms_ignore_notification_permission() {
        let notifier = Arc::new(RecordingNotifier::new(Permission::Denied));
        schedule_alarm("Still shown", Duration::ZERO, notifier.clone(), Arc::new(SilentChime))
            .await
            .unwrap();
        assert_eq!(notifier.notices().len(), 1);
    }
}

mod notification_loop_tests {
    use super::*;

    fn granted_loop(notifier: Arc<RecordingNotifier>) -> NotificationLoop {
        let permission = notifier.request_permission();
        NotificationLoop::new(notifier, permission, &RemindersConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn fires_every_four_hours() {
        let notifier = Arc::new(RecordingNotifier::new(Permission::Granted));
        let reminders = granted_loop(notifier.clone());
        assert_eq!(reminders.period(), Duration::from_secs(4 * 60 * 60));
        let handle = reminders.spawn();

        tokio::time::sleep(Duration::from_secs(4 * 60 * 60 - 1)).await;
        assert_eq!(notifications(&notifier), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(notifications(&notifier), 1);

        tokio::time::sleep(Duration::from_secs(8 * 60 * 60)).await;
        assert_eq!(notifications(&notifier), 3);

        assert_eq!(notifier.permission_requests(), 1);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn notification_uses_configured_text() {
        let notifier = Arc::new(RecordingNotifier::new(Permission::Granted));
        let handle = granted_loop(notifier.clone())
            .with_period(Duration::from_secs(60))
            .spawn();

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(
            notifier.notices(),
            vec![Notice::Notification {
                title: "Progress Tracker".to_string(),
                body: "Don't forget to check your tasks today!".to_string(),
            }]
        );
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn denied_permission_shows_nothing() {
        let notifier = Arc::new(RecordingNotifier::new(Permission::Denied));
        let permission = notifier.request_permission();
        let handle = NotificationLoop::new(notifier.clone(), permission, &RemindersConfig::default())
            .with_period(Duration::from_secs(60))
            .spawn();

        tokio::time::sleep(Duration::from_secs(10 * 60)).await;
        assert!(notifier.notices().is_empty());
        assert_eq!(notifier.permission_requests(), 1);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn unusable_periods_disable_reminders() {
        for period in [Duration::ZERO, Duration::MAX] {
            let notifier = Arc::new(RecordingNotifier::new(Permission::Granted));
            let handle = granted_loop(notifier.clone()).with_period(period).spawn();

            tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
            assert!(notifier.notices().is_empty());
            assert!(!handle.is_finished());
            handle.abort();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn configured_hours_are_clamped_to_a_week() {
        let notifier = Arc::new(RecordingNotifier::new(Permission::Granted));
        let config = RemindersConfig {
            interval_hours: u64::MAX,
            ..RemindersConfig::default()
        };
        let reminders = NotificationLoop::new(notifier.clone(), Permission::Granted, &config);
        assert_eq!(reminders.period(), Duration::from_secs(7 * 24 * 60 * 60));

        let handle = reminders.spawn();
        tokio::time::sleep(Duration::from_secs(7 * 24 * 60 * 60 + 1)).await;
        assert_eq!(notifications(&notifier), 1);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn body_counts_open_tasks() {
        let tasks = json!([
            { "id": 1, "name": "open", "date": "2026-10-14", "priority": "low", "done": false },
            { "id": 2, "name": "also open", "date": "2026-10-15", "priority": "high", "done": false },
            {
                "id": 3,
                "name": "finished",
                "date": "2026-10-13",
                "priority": "medium",
                "done": true,
                "dateCompleted": "2026-10-13T09:00:00Z"
            }
        ]);
        let kv = Arc::new(MemoryStore::with_values([("tasks", tasks.to_string())]));
        let notifier = Arc::new(RecordingNotifier::new(Permission::Granted));
        let reminders = granted_loop(notifier).with_store(kv);
        assert_eq!(reminders.body(), "Don't forget to check your tasks today! (2 open)");
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_store_does_not_break_tick() {
        let kv = Arc::new(MemoryStore::with_values([("tasks", "oops")]));
        let notifier = Arc::new(RecordingNotifier::new(Permission::Granted));
        let reminders = granted_loop(notifier.clone()).with_store(kv);
        assert!(reminders.tick());
        assert_eq!(notifications(&notifier), 1);
    }
}
