//! Interactive session: the process lifetime is the reminder lifetime.
//!
//! Reads one command per line from stdin until `quit`, EOF or Ctrl-C.
//! Timers armed during the session fire in the background; they are dropped
//! with the manager when the session ends.

use std::io::Write;

use anyhow::bail;
use nudge_core::{time::display_local, TaskId};
use nudge_tasks::{TaskEntry, TaskError, TaskManager};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::terminal::entry_line;

const HELP: &str = "\
commands:
  add <time> <title>    time as 2026-10-18T09:30, 2026-10-18 09:30 or RFC 3339
  list                  show tasks and their pending reminders
  edit <id> <title>     replace a task's title
  delete <id>           remove a task and cancel its reminders
  help                  show this text
  quit                  end the session (pending reminders are dropped)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Add { time: String, title: String },
    List,
    Edit { id: TaskId, title: String },
    Delete { id: TaskId },
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<SessionCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "add" => {
            let (time, title) = split_time(rest);
            SessionCommand::Add {
                time: time.to_string(),
                title: title.to_string(),
            }
        }
        "list" | "ls" => SessionCommand::List,
        "edit" => {
            let (id, title) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            SessionCommand::Edit {
                id: parse_id(id)?,
                title: title.trim().to_string(),
            }
        }
        "delete" | "del" | "rm" => SessionCommand::Delete {
            id: parse_id(rest)?,
        },
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => bail!("unknown command '{other}' (try 'help')"),
    };
    Ok(Some(cmd))
}

/// Split `add` arguments into the time and the title. A time written as
/// `YYYY-MM-DD HH:MM` spans two words.
fn split_time(args: &str) -> (&str, &str) {
    let mut words = args.split_whitespace();
    let Some(first) = words.next() else {
        return ("", "");
    };
    let mut time_len = first.len();
    if first.len() == 10 && first.matches('-').count() == 2 {
        if let Some(second) = words.next() {
            if second.contains(':') {
                // Offset of the second word's end inside `args`.
                let start = args[first.len()..]
                    .find(second)
                    .map(|i| i + first.len())
                    .unwrap_or(first.len());
                time_len = start + second.len();
            }
        }
    }
    (args[..time_len].trim(), args[time_len..].trim())
}

fn parse_id(raw: &str) -> anyhow::Result<TaskId> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("missing task id");
    }
    raw.parse::<TaskId>()
        .map_err(|_| anyhow::anyhow!("'{raw}' is not a task id"))
}

enum Flow {
    Continue,
    Quit,
}

/// Run the interactive loop until the user quits.
pub async fn run(mut manager: TaskManager) -> anyhow::Result<()> {
    println!(
        "nudge {} ({} tasks). Type 'help' for commands.",
        env!("CARGO_PKG_VERSION"),
        manager.tasks().len()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                None
            }
        };
        let Some(line) = line else { break };

        match parse_line(&line) {
            Ok(Some(cmd)) => {
                debug!(?cmd, "session command");
                if let Flow::Quit = execute(&mut manager, cmd) {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => eprintln!("! {e}"),
        }
    }

    let dropped = manager.pending_reminders();
    info!(dropped, "session ended");
    if dropped > 0 {
        println!("{dropped} pending reminder(s) dropped");
    }
    Ok(())
}

fn execute(manager: &mut TaskManager, cmd: SessionCommand) -> Flow {
    match cmd {
        SessionCommand::Add { time, title } => {
            if let Ok(task) = manager.add_task(&title, &time) {
                print_reminders(manager, task.id);
            }
        }
        SessionCommand::List => print_list(manager),
        SessionCommand::Edit { id, title } => match manager.edit_task(id, &title) {
            Ok(true) => {}
            Ok(false) => println!("title unchanged"),
            Err(e) => report(e),
        },
        SessionCommand::Delete { id } => match manager.delete_task(id) {
            Ok(true) => {}
            Ok(false) => println!("no task [{id}]"),
            Err(e) => report(e),
        },
        SessionCommand::Help => println!("{HELP}"),
        SessionCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}

// Validation failures were already shown through the dialog.
fn report(err: TaskError) {
    if !matches!(err, TaskError::Validation(_)) {
        eprintln!("! {err}");
    }
}

pub fn print_list(manager: &TaskManager) {
    if manager.tasks().is_empty() {
        println!("no tasks");
        return;
    }
    for task in manager.tasks() {
        println!("  {}", entry_line(&TaskEntry::from_task(task)));
        print_reminders(manager, task.id);
    }
}

fn print_reminders(manager: &TaskManager, id: TaskId) {
    for reminder in manager.armed_reminders(id) {
        println!(
            "      {} reminder at {}",
            reminder.kind,
            display_local(&reminder.fire_at)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> SessionCommand {
        parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn add_with_single_word_time() {
        assert_eq!(
            parse("add 2026-10-18T09:30 buy milk"),
            SessionCommand::Add {
                time: "2026-10-18T09:30".into(),
                title: "buy milk".into(),
            }
        );
    }

    #[test]
    fn add_with_date_and_time_words() {
        assert_eq!(
            parse("add 2026-10-18 09:30 call the dentist"),
            SessionCommand::Add {
                time: "2026-10-18 09:30".into(),
                title: "call the dentist".into(),
            }
        );
    }

    #[test]
    fn add_keeps_empty_parts_for_validation() {
        assert_eq!(
            parse("add"),
            SessionCommand::Add {
                time: String::new(),
                title: String::new(),
            }
        );
        assert_eq!(
            parse("add 2026-10-18T09:30"),
            SessionCommand::Add {
                time: "2026-10-18T09:30".into(),
                title: String::new(),
            }
        );
    }

    #[test]
    fn edit_and_delete_take_an_id() {
        assert_eq!(
            parse("edit 1760778000000 New title"),
            SessionCommand::Edit {
                id: TaskId(1760778000000),
                title: "New title".into(),
            }
        );
        assert_eq!(
            parse("edit 7"),
            SessionCommand::Edit {
                id: TaskId(7),
                title: String::new(),
            }
        );
        assert_eq!(parse("rm 7"), SessionCommand::Delete { id: TaskId(7) });
    }

    #[test]
    fn bad_input_is_rejected() {
        assert!(parse_line("delete").is_err());
        assert!(parse_line("delete seven").is_err());
        assert!(parse_line("frobnicate").is_err());
    }

    #[test]
    fn verbs_are_case_insensitive() {
        assert_eq!(parse("LIST"), SessionCommand::List);
        assert_eq!(parse("Quit"), SessionCommand::Quit);
    }
}
