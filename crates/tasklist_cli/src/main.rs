//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `tasklist_core` wiring end to end: config, logging, storage and
//!   the task manager.
//! - Keep output deterministic `key=value` lines for quick sanity checks.
//!
//! With text, one task is added and the snapshot is saved back before the
//! listing and summary are printed. `--due` is only accepted together with text.

use clap::Parser;
use log::info;
use std::error::Error;
use std::process::ExitCode;
use tasklist_core::db::open_db;
use tasklist_core::{
    init_logging, parse_deadline, Clock, CoreConfig, SqliteTaskRepository, SystemClock,
    TaskManager, TaskRepository,
};

#[derive(Debug, Parser)]
#[command(name = "tasklist_cli")]
#[command(version)]
#[command(about = "Task list storage and stats smoke check")]
struct Cli {
    /// Deadline for the new task (RFC 3339, or `YYYY-MM-DD HH:MM` local time)
    #[arg(long, value_name = "DEADLINE", requires = "text")]
    due: Option<String>,
    /// Text of a task to add; words are joined with single spaces
    text: Vec<String>,
}

impl Cli {
    fn task_text(&self) -> Option<String> {
        if self.text.is_empty() {
            None
        } else {
            Some(self.text.join(" "))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tasklist_cli error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let deadline = cli.due.as_deref().map(parse_deadline).transpose()?.flatten();

    let config = CoreConfig::from_env()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level.as_str(), log_dir)?;
    }

    println!("tasklist_core ping={}", tasklist_core::ping());
    println!("tasklist_core version={}", tasklist_core::core_version());

    let mut conn = open_db(&config.db_path)?;
    let mut repo = SqliteTaskRepository::try_new(&mut conn)?;
    let mut manager = TaskManager::from_snapshot(repo.load_snapshot()?, SystemClock)?;

    if let Some(text) = cli.task_text() {
        let task = manager.add_task(&text, deadline)?;
        println!(
            "added id={} due={}",
            task.id(),
            task.formatted_deadline().unwrap_or_default()
        );
        repo.save_snapshot(&manager.snapshot())?;
        info!("event=cli_add module=cli status=ok task_count={}", manager.len());
    }

    let now = manager.clock().now();
    for task in manager.tasks() {
        println!(
            "task id={} state={} due={}",
            task.id(),
            task.display_state_at(now).as_str(),
            task.formatted_deadline().unwrap_or_default()
        );
    }

    let stats = manager.stats();
    println!(
        "tasks total={} completed={} remaining={} overdue={} due_soon={}",
        stats.total, stats.completed, stats.remaining, stats.overdue, stats.due_soon
    );
    Ok(())
}
