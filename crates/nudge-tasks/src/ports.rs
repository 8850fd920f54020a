//! Collaborators the manager talks to but does not own: the list view and
//! the user-facing message box.

use nudge_core::{time::display_local, Task, TaskId};

/// What the list view shows for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    pub id: TaskId,
    /// `"{title} - {local due time}"`
    pub display_text: String,
}

impl TaskEntry {
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id,
            display_text: format!("{} - {}", task.title, display_local(&task.time)),
        }
    }
}

/// Rendering boundary. Entries are keyed by task id; edit and delete actions
/// are wired by the view back to the manager.
pub trait TaskView: Send + Sync {
    fn render(&self, entry: &TaskEntry);
    fn update(&self, entry: &TaskEntry);
    fn remove(&self, id: TaskId);
}

/// Blocking user-visible message (validation failures).
pub trait Dialog: Send + Sync {
    fn alert(&self, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn display_text_is_title_dash_local_time() {
        let time = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        let entry = TaskEntry::from_task(&Task::new(TaskId(9), "buy milk", time));
        assert_eq!(entry.id, TaskId(9));
        assert_eq!(
            entry.display_text,
            format!("buy milk - {}", display_local(&time))
        );
    }
}
