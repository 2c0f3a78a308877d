//! Task Streak
//!
//! Command-line to-do list that tracks a daily completion streak.

use anyhow::Result;
use chrono::Datelike;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use task_streak::calendar::month_grid;
use task_streak::cli::{Cli, Command, ListArgs};
use task_streak::clock::SystemClock;
use task_streak::config::{Config, ConfigLoader};
use task_streak::error::TodoResult;
use task_streak::format::{
    OutputFormat, format_calendar, format_progress, format_row, format_rows, format_streak,
};
use task_streak::kv::{self, KvStore};
use task_streak::logging::{self, LogTarget};
use task_streak::reminder::{
    NotificationLoop, Notifier, Permission, TerminalNotifier, chime_for, schedule_alarm,
};
use task_streak::snapshot::Snapshot;
use task_streak::store::TaskStore;
use task_streak::types::{Task, TaskId, TaskRow};
use task_streak::view::{self, ViewQuery};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut loader = ConfigLoader::load(cli.config.as_deref())?;
    for (tier, origin) in loader.sources() {
        debug!(%tier, %origin, "Config tier applied");
    }

    // CLI arguments override every config tier
    let config = loader.config_mut();
    if let Some(dir) = &cli.data_dir {
        config.storage.dir = dir.clone();
    }
    if let Some(backend) = cli.backend {
        config.storage.backend = backend.into();
    }
    if let Some(format) = cli.format {
        config.display.format = format.into();
    }
    let config = loader.into_config();

    config.ensure_data_dir()?;
    let kv = kv::open(&config.storage)?;
    let mut store = TaskStore::load(Arc::clone(&kv), Arc::new(SystemClock))?;

    // Render cycle: every invocation starts with a streak evaluation
    store.evaluate_streak()?;

    let command = cli.command.unwrap_or(Command::List(ListArgs::default()));
    run_command(command, &mut store, kv, &config).await
}

async fn run_command(
    command: Command,
    store: &mut TaskStore,
    kv: Arc<dyn KvStore>,
    config: &Config,
) -> Result<()> {
    let format = config.display.format;

    match command {
        Command::Add(args) => {
            let date = args.date.unwrap_or_else(|| store.clock().today());
            if let Some(id) = accept(store.create(&args.name, date, args.priority))? {
                store.evaluate_streak()?;
                print_task(store, id, format);
            }
        }
        Command::Done { id } => {
            store.toggle(id, true)?;
            store.evaluate_streak()?;
            print_task(store, id, format);
        }
        Command::Undo { id } => {
            store.toggle(id, false)?;
            store.evaluate_streak()?;
            print_task(store, id, format);
        }
        Command::Rename { id, name } => {
            if accept(store.rename(id, &name))?.is_some() {
                store.evaluate_streak()?;
                print_task(store, id, format);
            }
        }
        Command::Delete { id } => {
            let removed = store.delete(id)?;
            store.evaluate_streak()?;
            emit(&format_row(&view::row(&removed), format));
        }
        Command::List(args) => {
            let query = ViewQuery::new(args.filter.into(), args.search);
            emit(&format_rows(&view::project(store.tasks(), &query), format));
        }
        Command::Sort => {
            store.sort_by_date()?;
            store.evaluate_streak()?;
            emit(&format_rows(&rows_of(store.tasks()), format));
        }
        Command::Calendar(args) => {
            let today = store.clock().today();
            let year = args.year.unwrap_or(today.year());
            let month = args.month.unwrap_or(today.month());
            let grid = month_grid(year, month, store.tasks(), today)?;
            emit(&format_calendar(&grid, format));
        }
        Command::Streak => {
            emit(&format_streak(&store.streak(), format));
        }
        Command::Progress => {
            emit(&format_progress(&store.progress(), format));
        }
        Command::Remind(args) => {
            let notifier: Arc<dyn Notifier> =
                Arc::new(TerminalNotifier::new(config.reminders.notifications));
            let permission = notifier.request_permission();
            debug!(?permission, "Notification permission");

            let delay = Duration::from_secs(args.delay_secs);
            let alarm = schedule_alarm(
                args.message,
                delay,
                notifier,
                chime_for(config.reminders.chime),
            );
            tokio::select! {
                result = alarm => result?,
                result = tokio::signal::ctrl_c() => {
                    result?;
                    info!("Alarm cancelled");
                }
            }
        }
        Command::Watch => {
            let notifier: Arc<dyn Notifier> =
                Arc::new(TerminalNotifier::new(config.reminders.notifications));
            let permission = notifier.request_permission();
            if permission == Permission::Denied {
                warn!("Notification permission not granted; reminders will not be shown");
            }

            let reminders =
                NotificationLoop::new(notifier, permission, &config.reminders).with_store(kv);
            info!(
                period_secs = reminders.period().as_secs(),
                "Watching for reminders (Ctrl-C to stop)"
            );
            tokio::select! {
                _ = reminders.run() => {}
                result = tokio::signal::ctrl_c() => {
                    result?;
                    info!("Stopped watching");
                }
            }
        }
        Command::Export(args) => {
            let snapshot = Snapshot::capture(store);
            snapshot.write_to(args.output.as_deref())?;
            if let Some(path) = &args.output {
                info!(
                    path = %path.display(),
                    tasks = snapshot.tasks.len(),
                    "Exported snapshot"
                );
            }
        }
    }

    Ok(())
}

/// Input rejections are logged and leave the exit status at success.
fn accept<T>(result: TodoResult<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_rejection() => {
            warn!(code = ?e.code, field = ?e.field, "{}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn rows_of(tasks: &[Task]) -> Vec<TaskRow> {
    tasks.iter().map(view::row).collect()
}

fn print_task(store: &TaskStore, id: TaskId, format: OutputFormat) {
    if let Some(task) = store.get(id) {
        emit(&format_row(&view::row(task), format));
    }
}

fn emit(text: &str) {
    if text.ends_with('\n') {
        print!("{}", text);
    } else {
        println!("{}", text);
    }
}
