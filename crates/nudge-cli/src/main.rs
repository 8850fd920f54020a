use std::sync::Arc;

use clap::{Parser, Subcommand};
use nudge_core::{NudgeConfig, TaskId};
use nudge_tasks::{TaskEntry, TaskError};
use tracing::info;

mod app;
mod session;
mod terminal;

use terminal::{entry_line, TerminalDialog, TerminalView};

/// nudge: to-do list with early and due-time reminders.
#[derive(Parser)]
#[command(name = "nudge", version, about)]
struct Cli {
    /// Path to the TOML config file (default ~/.nudge/nudge.toml).
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive session; reminders fire while it runs (default).
    Run,

    /// Add a task.
    Add {
        /// Due time: 2026-10-18T09:30, "2026-10-18 09:30" or RFC 3339.
        time: String,
        /// Task title.
        #[arg(trailing_var_arg = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// List tasks.
    List,

    /// Replace a task's title.
    Edit {
        id: TaskId,
        #[arg(trailing_var_arg = true, num_args = 0..)]
        title: Vec<String>,
    },

    /// Delete a task.
    Delete { id: TaskId },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "nudge=info,nudge_tasks=info,nudge_scheduler=info,nudge_triggers=warn".into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // load config: --config / NUDGE_CONFIG > ~/.nudge/nudge.toml
    let config_path = cli.config.or_else(|| std::env::var("NUDGE_CONFIG").ok());
    let config = NudgeConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!(code = e.code(), "config load failed ({e}), using defaults");
        NudgeConfig::default()
    });

    let dialog = Arc::new(TerminalDialog);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let manager = app::start_manager(&config, Arc::new(TerminalView::new()), dialog)?;
            session::run(manager).await
        }
        Command::Add { time, title } => {
            let mut manager = app::start_manager(&config, Arc::new(TerminalView::muted()), dialog)?;
            match manager.add_task(&title.join(" "), &time) {
                Ok(task) => {
                    println!("added {}", entry_line(&TaskEntry::from_task(&task)));
                    info!(task_id = %task.id, "reminders only fire while `nudge run` is active");
                    Ok(())
                }
                Err(e) => fail(e),
            }
        }
        Command::List => {
            let manager = app::start_manager(&config, Arc::new(TerminalView::muted()), dialog)?;
            session::print_list(&manager);
            Ok(())
        }
        Command::Edit { id, title } => {
            let mut manager = app::start_manager(&config, Arc::new(TerminalView::muted()), dialog)?;
            match manager.edit_task(id, &title.join(" ")) {
                Ok(true) => {
                    if let Some(task) = manager.task(id) {
                        println!("edited {}", entry_line(&TaskEntry::from_task(task)));
                    }
                    Ok(())
                }
                Ok(false) => {
                    println!("title unchanged");
                    Ok(())
                }
                Err(e) => fail(e),
            }
        }
        Command::Delete { id } => {
            let mut manager = app::start_manager(&config, Arc::new(TerminalView::muted()), dialog)?;
            if manager.delete_task(id)? {
                println!("deleted [{id}]");
            } else {
                println!("no task [{id}]");
            }
            Ok(())
        }
    }
}

/// Validation failures were already shown through the dialog; exit non-zero
/// without repeating them.
fn fail(err: TaskError) -> anyhow::Result<()> {
    match err {
        TaskError::Validation(_) => std::process::exit(2),
        other => Err(other.into()),
    }
}
