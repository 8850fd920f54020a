//! Terminal implementations of the list view and the message box.

use nudge_core::TaskId;
use nudge_tasks::{Dialog, TaskEntry, TaskView};

/// Prints list changes to stdout, one line per entry.
pub struct TerminalView {
    enabled: bool,
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            enabled: true,
        }
    }

    /// A view that prints nothing. One-shot commands report their own result.
    pub fn muted() -> Self {
        Self {
            enabled: false,
        }
    }

    fn print(&self, line: String) {
        if self.enabled {
            println!("{line}");
        }
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

pub fn entry_line(entry: &TaskEntry) -> String {
    format!("[{}] {}", entry.id, entry.display_text)
}

impl TaskView for TerminalView {
    fn render(&self, entry: &TaskEntry) {
        self.print(format!("  {}", entry_line(entry)));
    }

    fn update(&self, entry: &TaskEntry) {
        self.print(format!("~ {}", entry_line(entry)));
    }

    fn remove(&self, id: TaskId) {
        self.print(format!("- [{id}] removed"));
    }
}

/// Writes user-facing messages to stderr.
pub struct TerminalDialog;

impl Dialog for TerminalDialog {
    fn alert(&self, message: &str) {
        eprintln!("! {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_line_shows_id_and_text() {
        let entry = TaskEntry {
            id: TaskId(42),
            display_text: "buy milk - 2026-10-18 09:00:00".into(),
        };
        assert_eq!(entry_line(&entry), "[42] buy milk - 2026-10-18 09:00:00");
    }
}
