use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Notification permission as reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPermission {
    /// Never asked.
    Default,
    Granted,
    Denied,
}

impl fmt::Display for NotificationPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationPermission::Default => "default",
            NotificationPermission::Granted => "granted",
            NotificationPermission::Denied => "denied",
        };
        write!(f, "{s}")
    }
}

/// Process-wide permission state. Queried before every notification.
pub trait PermissionPort: Send + Sync {
    fn state(&self) -> NotificationPermission;
    /// Ask for permission. Called once at startup; the answer sticks.
    fn request(&self) -> NotificationPermission;
}

/// What the notification trigger hands to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Repeated notifications with the same tag coalesce.
    pub tag: String,
    pub icon: Option<String>,
}

pub trait NotificationSink: Send + Sync {
    fn show(&self, notification: &Notification) -> Result<()>;
}

/// Referenced audio file for the alarm trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioResource {
    pub path: PathBuf,
}

impl AudioResource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn is_available(&self) -> bool {
        self.path.is_file()
    }
}

pub trait AlarmPlayer: Send + Sync {
    fn play(&self, resource: &AudioResource) -> Result<()>;
}

/// Fixed parts of every reminder notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTemplate {
    pub title: String,
    pub tag: String,
    pub icon: Option<String>,
}

impl NotificationTemplate {
    pub fn body_for(&self, task_title: &str) -> String {
        format!("Do it now: {task_title}")
    }
}

impl Default for NotificationTemplate {
    fn default() -> Self {
        Self {
            title: nudge_core::config::NOTIFICATION_TITLE.to_string(),
            tag: nudge_core::config::NOTIFICATION_TAG.to_string(),
            icon: None,
        }
    }
}

/// Sound an alarm for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmTrigger {
    pub task_title: String,
    pub scheduled_time: DateTime<Utc>,
}

/// Show a system notification for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTrigger {
    pub task_title: String,
    pub scheduled_time: DateTime<Utc>,
}

/// Side-effecting action performed at a reminder instant.
///
/// The set of variants is closed; each one carries the task title and the
/// instant it was scheduled for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Alarm(AlarmTrigger),
    Notification(NotificationTrigger),
}

impl Trigger {
    pub fn alarm(task_title: impl Into<String>, scheduled_time: DateTime<Utc>) -> Self {
        Trigger::Alarm(AlarmTrigger {
            task_title: task_title.into(),
            scheduled_time,
        })
    }

    pub fn notification(task_title: impl Into<String>, scheduled_time: DateTime<Utc>) -> Self {
        Trigger::Notification(NotificationTrigger {
            task_title: task_title.into(),
            scheduled_time,
        })
    }

    /// Alarm first, then notification: the pair fired at every reminder instant.
    pub fn pair(task_title: &str, scheduled_time: DateTime<Utc>) -> [Trigger; 2] {
        [
            Trigger::alarm(task_title, scheduled_time),
            Trigger::notification(task_title, scheduled_time),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Trigger::Alarm(_) => "alarm",
            Trigger::Notification(_) => "notification",
        }
    }

    pub fn task_title(&self) -> &str {
        match self {
            Trigger::Alarm(t) => &t.task_title,
            Trigger::Notification(t) => &t.task_title,
        }
    }
}

/// What happened when a trigger fired, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    Delivered,
    /// A capability was missing (permission, sound file, player).
    Skipped { reason: String },
    Failed { error: String },
}

impl TriggerOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        TriggerOutcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, TriggerOutcome::Delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn pair_is_alarm_then_notification() {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let [first, second] = Trigger::pair("water plants", at);
        assert_eq!(first.name(), "alarm");
        assert_eq!(second.name(), "notification");
        assert_eq!(second.task_title(), "water plants");
    }

    #[test]
    fn template_defaults_and_body() {
        let template = NotificationTemplate::default();
        assert_eq!(template.title, "Task Reminder!");
        assert_eq!(template.tag, "to-do-reminder");
        assert_eq!(template.body_for("pay rent"), "Do it now: pay rent");
    }

    #[test]
    fn missing_audio_file_is_unavailable() {
        let res = AudioResource::new("/definitely/not/here.oga");
        assert!(!res.is_available());
    }
}
